use std::collections::BTreeMap;

use thiserror::Error;

/// Base stat values keyed by stat name.
///
/// A `BTreeMap` keeps iteration deterministic, which in turn keeps persisted
/// row order and log output stable across runs.
pub type Stats = BTreeMap<String, i64>;

/// A single creature record as normalised from the upstream API.
///
/// Identity is the upstream `id`; persisted rows are replaced wholesale on
/// conflict rather than merged field by field.
///
/// # Examples
/// ```
/// use pokedex_core::{Pokemon, Stats};
///
/// let stats = Stats::from([("hp".into(), 45), ("attack".into(), 49)]);
/// let pokemon = Pokemon::new(1, "bulbasaur", "grass/poison", stats)?;
///
/// assert_eq!(pokemon.id, 1);
/// assert_eq!(pokemon.type_label, "grass/poison");
/// # Ok::<(), pokedex_core::PokemonError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pokemon {
    /// Stable upstream identifier.
    pub id: i64,
    /// Creature name as reported upstream.
    pub name: String,
    /// Ordered type names joined with `/`; absent entries already dropped.
    pub type_label: String,
    /// Sparse named stat set; entries with null names or values already dropped.
    pub stats: Stats,
}

/// Errors returned by [`Pokemon::new`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PokemonError {
    /// The upstream identifier was zero or negative.
    #[error("pokemon id must be positive (got {0})")]
    NonPositiveId(i64),
    /// The upstream name was empty.
    #[error("pokemon name must not be empty")]
    EmptyName,
}

impl Pokemon {
    /// Validates and constructs a [`Pokemon`].
    pub fn new(
        id: i64,
        name: impl Into<String>,
        type_label: impl Into<String>,
        stats: Stats,
    ) -> Result<Self, PokemonError> {
        if id <= 0 {
            return Err(PokemonError::NonPositiveId(id));
        }
        let name = name.into();
        if name.is_empty() {
            return Err(PokemonError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            type_label: type_label.into(),
            stats,
        })
    }
}

/// Join type names with `/`, preserving slot order and dropping absent entries.
///
/// # Examples
/// ```
/// use pokedex_core::join_type_label;
///
/// let label = join_type_label([Some("grass".into()), None, Some("poison".into())]);
/// assert_eq!(label, "grass/poison");
/// ```
pub fn join_type_label<I>(types: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    types.into_iter().flatten().collect::<Vec<_>>().join("/")
}
