use rstest::{fixture, rstest};
use serde_json::json;

use super::test_support::{StubSource, block_on_for_tests};
use super::types::PokemonDetail;
use super::{TransportError, resolve_pokemon};

const GEN_I_URL: &str = "https://example.org/generation/1/";
const BULBASAUR_SPECIES_URL: &str = "https://example.org/pokemon-species/1/";
const BULBASAUR_URL: &str = "https://example.org/pokemon/1/";
const CHARMANDER_SPECIES_URL: &str = "https://example.org/pokemon-species/4/";
const SQUIRTLE_SPECIES_URL: &str = "https://example.org/pokemon-species/7/";
const MISSINGNO_SPECIES_URL: &str = "https://example.org/pokemon-species/999/";
const MISSINGNO_URL: &str = "https://example.org/pokemon/999/";

/// Generation I with four species: one resolvable, one whose species fetch
/// fails, one without a default variety, and one with a malformed detail.
#[fixture]
fn stub() -> StubSource {
    let source = StubSource::new();
    let index_url = source.index_url();
    source
        .with_response(
            index_url,
            json!({
                "results": [
                    {"name": "generation-i", "url": GEN_I_URL},
                    {"name": "generation-ii", "url": "https://example.org/generation/2/"},
                ]
            }),
        )
        .with_response(
            GEN_I_URL,
            json!({
                "pokemon_species": [
                    {"name": "bulbasaur", "url": BULBASAUR_SPECIES_URL},
                    {"name": "charmander", "url": CHARMANDER_SPECIES_URL},
                    {"name": "squirtle", "url": SQUIRTLE_SPECIES_URL},
                    {"name": "missingno", "url": MISSINGNO_SPECIES_URL},
                ]
            }),
        )
        .with_response(
            BULBASAUR_SPECIES_URL,
            json!({
                "varieties": [
                    {"is_default": false, "pokemon": {"name": "bulbasaur-weird", "url": "https://example.org/pokemon/10001/"}},
                    {"is_default": true, "pokemon": {"name": "bulbasaur", "url": BULBASAUR_URL}},
                ]
            }),
        )
        .with_response(
            SQUIRTLE_SPECIES_URL,
            json!({
                "varieties": [
                    {"is_default": false, "pokemon": {"name": "squirtle-odd", "url": "https://example.org/pokemon/10002/"}},
                ]
            }),
        )
        .with_response(
            MISSINGNO_SPECIES_URL,
            json!({
                "varieties": [
                    {"is_default": true, "pokemon": {"name": "missingno", "url": MISSINGNO_URL}},
                ]
            }),
        )
        .with_response(
            BULBASAUR_URL,
            json!({
                "id": 1,
                "name": "bulbasaur",
                "types": [
                    {"type": {"name": "grass", "url": "https://example.org/type/12/"}},
                    {"type": {"name": "poison", "url": "https://example.org/type/4/"}},
                ],
                "stats": [
                    {"base_stat": 45, "stat": {"name": "hp", "url": "https://example.org/stat/1/"}},
                    {"base_stat": 49, "stat": {"name": "attack", "url": "https://example.org/stat/2/"}},
                    {"base_stat": 50, "stat": {"name": null, "url": null}},
                ]
            }),
        )
        .with_response(
            MISSINGNO_URL,
            json!({
                "name": "missingno",
                "types": [],
                "stats": []
            }),
        )
}

#[rstest]
fn resolves_default_variants_with_sibling_isolation(stub: StubSource) {
    let filter = vec!["generation-i".to_owned()];
    let pokemons = block_on_for_tests(resolve_pokemon(&stub, &filter))
        .expect("index fetch should succeed");

    // Charmander's species fetch fails, squirtle has no default variety, and
    // missingno's detail lacks an id; only bulbasaur survives.
    assert_eq!(pokemons.len(), 1);
    let bulbasaur = &pokemons[0];
    assert_eq!(bulbasaur.id, 1);
    assert_eq!(bulbasaur.name, "bulbasaur");
    assert_eq!(bulbasaur.type_label, "grass/poison");
    assert_eq!(bulbasaur.stats.get("hp"), Some(&45));
    assert_eq!(bulbasaur.stats.get("attack"), Some(&49));
    assert_eq!(bulbasaur.stats.len(), 2, "null stat names must be dropped");
}

#[rstest]
fn unmatched_generations_are_skipped(stub: StubSource) {
    let filter = vec!["generation-iv".to_owned()];
    let pokemons =
        block_on_for_tests(resolve_pokemon(&stub, &filter)).expect("index fetch should succeed");
    assert!(pokemons.is_empty());
}

#[rstest]
fn failing_generation_detail_does_not_abort_the_run(stub: StubSource) {
    // generation-ii matches the filter but has no stubbed detail payload.
    let filter = vec!["generation-ii".to_owned()];
    let pokemons =
        block_on_for_tests(resolve_pokemon(&stub, &filter)).expect("index fetch should succeed");
    assert!(pokemons.is_empty());
}

#[rstest]
fn missing_index_is_the_only_fatal_fetch() {
    let source = StubSource::new();
    let filter = vec!["generation-i".to_owned()];
    let outcome = block_on_for_tests(resolve_pokemon(&source, &filter));
    assert!(matches!(outcome, Err(TransportError::Http { status: 404, .. })));
}

#[rstest]
fn normalise_requires_id_and_name() {
    let missing_id: PokemonDetail =
        serde_json::from_value(json!({"name": "missingno"})).expect("payload should deserialise");
    assert!(missing_id.normalise().is_none());

    let missing_name: PokemonDetail =
        serde_json::from_value(json!({"id": 999})).expect("payload should deserialise");
    assert!(missing_name.normalise().is_none());
}

#[rstest]
fn normalise_drops_incomplete_stat_slots() {
    let detail: PokemonDetail = serde_json::from_value(json!({
        "id": 25,
        "name": "pikachu",
        "types": [{"type": {"name": "electric", "url": null}}],
        "stats": [
            {"base_stat": 35, "stat": {"name": "hp", "url": null}},
            {"base_stat": null, "stat": {"name": "speed", "url": null}},
            {"base_stat": 55, "stat": null},
        ]
    }))
    .expect("payload should deserialise");

    let pikachu = detail.normalise().expect("id and name are present");
    assert_eq!(pikachu.type_label, "electric");
    assert_eq!(pikachu.stats.len(), 1);
    assert_eq!(pikachu.stats.get("hp"), Some(&35));
}
