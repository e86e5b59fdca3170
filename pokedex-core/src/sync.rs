use std::fmt;

/// Controls whether a run preserves existing rows or rebuilds from scratch.
///
/// The mode is decided once at process start and threaded explicitly into
/// schema initialisation and reconciliation; it is never read from ambient
/// state, so the destructive path is testable in isolation and cannot drift
/// mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Preserve existing tables; reconcile stale stat rows per batch.
    Incremental,
    /// Drop and recreate tables before any fetch work; nothing is stale.
    FullRebuild,
}

impl SyncMode {
    /// Whether the stale-row deletion step runs during reconciliation.
    #[must_use]
    pub const fn is_incremental(self) -> bool {
        matches!(self, Self::Incremental)
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incremental => f.write_str("incremental"),
            Self::FullRebuild => f.write_str("full-rebuild"),
        }
    }
}

/// Rows written while reconciling a single batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    /// Creature rows upserted.
    pub pokemon_rows: usize,
    /// Stat rows upserted.
    pub stat_rows: usize,
}

impl BatchCounts {
    /// Construct counts from the rows written for a batch.
    #[must_use]
    pub const fn new(pokemon_rows: usize, stat_rows: usize) -> Self {
        Self {
            pokemon_rows,
            stat_rows,
        }
    }
}

/// Accumulated totals across every batch of a run.
///
/// # Examples
/// ```
/// use pokedex_core::{BatchCounts, SyncTotals};
///
/// let mut totals = SyncTotals::default();
/// totals.absorb(BatchCounts::new(2, 12));
/// totals.record_failure();
///
/// assert_eq!(totals.pokemon_rows, 2);
/// assert_eq!(totals.failed_batches, 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncTotals {
    /// Creature rows written across all committed batches.
    pub pokemon_rows: usize,
    /// Stat rows written across all committed batches.
    pub stat_rows: usize,
    /// Batches rolled back after a store error.
    pub failed_batches: usize,
}

impl SyncTotals {
    /// Fold one committed batch into the running totals.
    pub fn absorb(&mut self, counts: BatchCounts) {
        self.pokemon_rows += counts.pokemon_rows;
        self.stat_rows += counts.stat_rows;
    }

    /// Record a batch whose transaction was rolled back.
    pub fn record_failure(&mut self) {
        self.failed_batches += 1;
    }
}
