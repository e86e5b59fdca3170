//! Core domain types for the Pokédex ingestion engine.
//!
//! These models provide basic validation to keep downstream components
//! honest. Constructors return `Result` to surface invalid upstream data
//! early, before it ever reaches the store.

#![forbid(unsafe_code)]

mod pokemon;
mod sync;

pub use pokemon::{Pokemon, PokemonError, Stats, join_type_label};
pub use sync::{BatchCounts, SyncMode, SyncTotals};
