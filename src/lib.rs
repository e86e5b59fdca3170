//! Facade crate for the Pokédex ingestion engine.
//!
//! This crate re-exports the core domain types alongside the API client,
//! reconciliation engine, and reporting queries so applications can depend on
//! a single crate.

#![forbid(unsafe_code)]

pub use pokedex_core::{BatchCounts, Pokemon, PokemonError, Stats, SyncMode, SyncTotals};

pub use pokedex_data::api::{
    DEFAULT_USER_AGENT, HttpPokeApiSource, PokeApiSource, TransportError, resolve_pokemon,
};
pub use pokedex_data::store::{
    BATCH_SIZE, ReportError, ReportSummary, SchemaError, SyncError, initialise_schema,
    reconcile_batch, run_report, sync_pokemon,
};
