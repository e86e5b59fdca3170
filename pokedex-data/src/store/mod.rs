//! SQLite persistence: schema initialisation, batch reconciliation, and the
//! fixed reporting queries.
#![forbid(unsafe_code)]

mod report;
mod schema;
mod sync;

pub use report::{
    ReportError, ReportSummary, StatRank, TANKY_THRESHOLD, TankyLabel, TankyTypeCount, TypeCount,
    run_report,
};
pub use schema::{SchemaError, initialise_schema};
pub use sync::{BATCH_SIZE, SyncError, reconcile_batch, sync_pokemon};

#[cfg(test)]
mod tests;
