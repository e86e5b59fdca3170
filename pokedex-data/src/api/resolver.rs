//! Multi-step lookup chain from the generation index to normalised creatures.
//!
//! Each step's failure is isolated per item: a species whose fetch fails, or
//! whose payload lacks a default variety, is logged and dropped without
//! affecting its siblings. Only the initial generation-index fetch can fail
//! the call as a whole, since without it there is nothing to resolve.

use futures_util::future::join_all;
use log::{info, warn};
use pokedex_core::Pokemon;

use super::TransportError;
use super::source::PokeApiSource;

/// Resolve every default-variant creature belonging to the named generations.
///
/// `generation_filter` is an exact-match allow-list against generation names
/// (e.g. `generation-i`). Species and creature detail fetches within a step
/// are issued concurrently and gathered with per-item error isolation; steps
/// themselves run strictly in order. The output carries no ordering
/// guarantee.
pub async fn resolve_pokemon<S: PokeApiSource + ?Sized>(
    source: &S,
    generation_filter: &[String],
) -> Result<Vec<Pokemon>, TransportError> {
    let index = source.generation_index().await?;
    let total = index.results.len();
    let targets: Vec<(String, String)> = index
        .results
        .into_iter()
        .filter_map(|generation| match (generation.name, generation.url) {
            (Some(name), Some(url)) => Some((name, url)),
            _ => None,
        })
        .filter(|(name, _)| generation_filter.iter().any(|wanted| wanted == name))
        .collect();
    info!("matched {} of {total} generations", targets.len());

    let mut pokemons = Vec::new();
    for (name, url) in targets {
        let species_urls = match source.generation(&url).await {
            Ok(detail) => detail
                .pokemon_species
                .into_iter()
                .filter_map(|species| species.url)
                .collect::<Vec<_>>(),
            Err(error) => {
                warn!("skipping generation {name}: {error}");
                continue;
            }
        };
        info!("{} species found in {name}", species_urls.len());

        let variant_urls = default_variant_urls(source, &species_urls).await;
        let resolved = fetch_details(source, &variant_urls).await;
        info!(
            "resolved {} of {} species in {name}",
            resolved.len(),
            species_urls.len()
        );
        pokemons.extend(resolved);
    }
    Ok(pokemons)
}

/// Fetch every species concurrently and keep the default-variety URLs.
async fn default_variant_urls<S: PokeApiSource + ?Sized>(
    source: &S,
    species_urls: &[String],
) -> Vec<String> {
    let tasks = species_urls.iter().map(|url| async move {
        source
            .species(url)
            .await
            .map(|detail| (url.as_str(), detail.default_variant_url()))
    });
    let (resolved, failures) = partition(join_all(tasks).await);
    for error in &failures {
        warn!("species fetch failed: {error}");
    }
    resolved
        .into_iter()
        .filter_map(|(url, variant)| {
            if variant.is_none() {
                warn!("no default variety for species {url}");
            }
            variant
        })
        .collect()
}

/// Fetch every creature detail concurrently and normalise the payloads.
async fn fetch_details<S: PokeApiSource + ?Sized>(
    source: &S,
    variant_urls: &[String],
) -> Vec<Pokemon> {
    let tasks = variant_urls.iter().map(|url| async move {
        source
            .pokemon(url)
            .await
            .map(|detail| (url.as_str(), detail.normalise()))
    });
    let (fetched, failures) = partition(join_all(tasks).await);
    for error in &failures {
        warn!("creature fetch failed: {error}");
    }
    fetched
        .into_iter()
        .filter_map(|(url, pokemon)| {
            if pokemon.is_none() {
                warn!("dropping malformed creature payload from {url}");
            }
            pokemon
        })
        .collect()
}

/// Split gathered task outcomes into successes and typed failures.
fn partition<T>(outcomes: Vec<Result<T, TransportError>>) -> (Vec<T>, Vec<TransportError>) {
    let mut successes = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(value) => successes.push(value),
            Err(error) => failures.push(error),
        }
    }
    (successes, failures)
}
