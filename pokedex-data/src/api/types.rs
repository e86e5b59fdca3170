//! Payload types for the PokeAPI endpoints the pipeline touches.
//!
//! Every field the upstream may omit or null is modelled as `Option` so a
//! sparse payload deserialises instead of failing the whole item; the
//! resolver decides what a missing field means for each step.

use std::{fmt, ops::Deref};

use pokedex_core::{Pokemon, Stats, join_type_label};
use serde::Deserialize;

/// Base URL for the PokeAPI endpoint.
///
/// # Examples
/// ```
/// # use pokedex_data::api::BaseUrl;
/// let url = BaseUrl::new("https://pokeapi.co/api/v2");
/// assert_eq!(url.as_ref(), "https://pokeapi.co/api/v2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Construct a new [`BaseUrl`] from an owned or borrowed string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Consume the wrapper and return the inner [`String`].
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for BaseUrl {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for BaseUrl {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A name/URL pair as returned by PokeAPI list endpoints.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NamedResource {
    /// Resource name, when the upstream supplies one.
    #[serde(default)]
    pub name: Option<String>,
    /// Absolute URL of the resource detail, when supplied.
    #[serde(default)]
    pub url: Option<String>,
}

/// Top-level listing of generations.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct GenerationIndex {
    /// Generations known to the API.
    #[serde(default)]
    pub results: Vec<NamedResource>,
}

/// Detail payload for a single generation.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct GenerationDetail {
    /// Species introduced in this generation.
    #[serde(default)]
    pub pokemon_species: Vec<NamedResource>,
}

/// One variety entry inside a species payload.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Variety {
    /// Whether this variety is the canonical form of the species.
    #[serde(default)]
    pub is_default: bool,
    /// Reference to the concrete creature record.
    #[serde(default)]
    pub pokemon: Option<NamedResource>,
}

/// Detail payload for a single species.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SpeciesDetail {
    /// Every variety of the species, default or otherwise.
    #[serde(default)]
    pub varieties: Vec<Variety>,
}

impl SpeciesDetail {
    /// URL of the variety flagged as default, if any.
    ///
    /// # Examples
    /// ```
    /// # use pokedex_data::api::{NamedResource, SpeciesDetail, Variety};
    /// let species = SpeciesDetail {
    ///     varieties: vec![Variety {
    ///         is_default: true,
    ///         pokemon: Some(NamedResource {
    ///             name: Some("bulbasaur".into()),
    ///             url: Some("https://pokeapi.co/api/v2/pokemon/1/".into()),
    ///         }),
    ///     }],
    /// };
    /// assert!(species.default_variant_url().is_some());
    /// ```
    #[must_use]
    pub fn default_variant_url(&self) -> Option<String> {
        self.varieties
            .iter()
            .find(|variety| variety.is_default)
            .and_then(|variety| variety.pokemon.as_ref())
            .and_then(|pokemon| pokemon.url.clone())
    }
}

/// One type slot inside a creature payload.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TypeSlot {
    /// The referenced type resource.
    #[serde(rename = "type", default)]
    pub kind: Option<NamedResource>,
}

/// One stat slot inside a creature payload.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct StatSlot {
    /// The referenced stat resource.
    #[serde(default)]
    pub stat: Option<NamedResource>,
    /// Base value for the stat.
    #[serde(default)]
    pub base_stat: Option<i64>,
}

/// Detail payload for a single creature.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PokemonDetail {
    /// Stable upstream identifier.
    #[serde(default)]
    pub id: Option<i64>,
    /// Creature name.
    #[serde(default)]
    pub name: Option<String>,
    /// Ordered type slots.
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    /// Named base stats.
    #[serde(default)]
    pub stats: Vec<StatSlot>,
}

impl PokemonDetail {
    /// Normalise the raw payload into a canonical [`Pokemon`] record.
    ///
    /// Returns `None` when `id` or `name` is missing or invalid; type slots
    /// without a name are skipped when building the label, and stat slots
    /// missing either a name or a value are dropped from the stat set.
    #[must_use]
    pub fn normalise(self) -> Option<Pokemon> {
        let id = self.id?;
        let name = self.name?;
        let type_label = join_type_label(
            self.types
                .into_iter()
                .map(|slot| slot.kind.and_then(|kind| kind.name)),
        );
        let stats: Stats = self
            .stats
            .into_iter()
            .filter_map(|slot| {
                let stat_name = slot.stat.and_then(|stat| stat.name)?;
                let value = slot.base_stat?;
                Some((stat_name, value))
            })
            .collect();
        Pokemon::new(id, name, type_label, stats).ok()
    }
}
