//! Data access and ingestion logic for the Pokédex engine.
//!
//! Responsibilities:
//! - Define the API source trait and its HTTP adapter.
//! - Resolve generations through species to normalised creature records.
//! - Reconcile resolved batches into the SQLite store and report over it.
//!
//! Boundaries:
//! - Domain validation lives in `pokedex-core`.
//! - Keep blocking SQLite work off async executors; reconciliation is
//!   synchronous and only the fetch pipeline suspends.

#![forbid(unsafe_code)]

pub mod api;
pub mod store;
