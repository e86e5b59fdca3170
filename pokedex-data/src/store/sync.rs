//! Incremental reconciliation of resolved creatures against the store.
//!
//! Each batch is applied as one transaction: creature rows are upserted,
//! stale stat rows (present in the store but absent from the batch payload)
//! are deleted, and the batch's stat rows are upserted. Any failure rolls the
//! whole batch back; prior batches stay committed.

use std::collections::BTreeSet;

use log::{error, info};
use pokedex_core::{BatchCounts, Pokemon, SyncMode, SyncTotals};
use rusqlite::{Connection, Transaction, params, params_from_iter};
use thiserror::Error;

/// Upper bound on creatures reconciled per transaction.
///
/// 250 ids stay well clear of SQLite's default 999 bound-variable limit when
/// expanded into an `IN` list.
pub const BATCH_SIZE: usize = 250;

const UPSERT_POKEMON: &str = "INSERT INTO pokemon (id, name, type_label) VALUES (?1, ?2, ?3)
     ON CONFLICT(id) DO UPDATE SET name = excluded.name, type_label = excluded.type_label";

const DELETE_STAT: &str = "DELETE FROM pokemon_stats WHERE pokemon_id = ?1 AND stat_name = ?2";

const UPSERT_STAT: &str =
    "INSERT INTO pokemon_stats (pokemon_id, stat_name, value) VALUES (?1, ?2, ?3)
     ON CONFLICT(pokemon_id, stat_name) DO UPDATE SET value = excluded.value";

/// Errors raised while reconciling a batch.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A store operation inside the batch transaction failed.
    #[error("failed to {operation}")]
    Sqlite {
        /// The reconciliation step that failed.
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

/// Reconcile one batch of creatures into the store as a single transaction.
///
/// The persisted stat set for every id in the batch ends up equal to exactly
/// the stat set in the batch's payload: creatures and stats are upserted,
/// and in [`SyncMode::Incremental`] stat rows no longer present upstream are
/// deleted. [`SyncMode::FullRebuild`] skips the deletion step because the
/// tables were truncated before the run began, so nothing can be stale.
///
/// An empty batch is a no-op returning zero counts. On any error the
/// transaction rolls back and the store is left exactly as it was.
///
/// # Examples
/// ```
/// use pokedex_core::{Pokemon, Stats, SyncMode};
/// use pokedex_data::store::{initialise_schema, reconcile_batch};
/// use rusqlite::Connection;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_schema(&mut conn, SyncMode::Incremental).expect("create schema");
///
/// let bulbasaur = Pokemon::new(
///     1,
///     "bulbasaur",
///     "grass/poison",
///     Stats::from([("hp".into(), 45), ("attack".into(), 49)]),
/// )
/// .expect("valid creature");
///
/// let counts = reconcile_batch(&mut conn, &[bulbasaur], SyncMode::Incremental)
///     .expect("reconcile batch");
/// assert_eq!((counts.pokemon_rows, counts.stat_rows), (1, 2));
/// ```
pub fn reconcile_batch(
    connection: &mut Connection,
    batch: &[Pokemon],
    mode: SyncMode,
) -> Result<BatchCounts, SyncError> {
    if batch.is_empty() {
        return Ok(BatchCounts::default());
    }

    let transaction = connection
        .transaction()
        .map_err(|source| SyncError::Sqlite {
            operation: "begin batch transaction",
            source,
        })?;

    let counts = apply_batch(&transaction, batch, mode)?;

    transaction.commit().map_err(|source| SyncError::Sqlite {
        operation: "commit batch transaction",
        source,
    })?;
    Ok(counts)
}

fn apply_batch(
    transaction: &Transaction<'_>,
    batch: &[Pokemon],
    mode: SyncMode,
) -> Result<BatchCounts, SyncError> {
    upsert_pokemon(transaction, batch)?;

    let batch_ids: BTreeSet<i64> = batch.iter().map(|pokemon| pokemon.id).collect();
    let (Some(&min_id), Some(&max_id)) = (batch_ids.first(), batch_ids.last()) else {
        return Ok(BatchCounts::default());
    };

    let existing = existing_stat_keys(transaction, &batch_ids)?;
    let desired: BTreeSet<(i64, &str)> = batch
        .iter()
        .flat_map(|pokemon| {
            pokemon
                .stats
                .keys()
                .map(move |stat_name| (pokemon.id, stat_name.as_str()))
        })
        .collect();

    if mode.is_incremental() {
        delete_stale_stats(transaction, &existing, &desired, min_id, max_id)?;
    }

    let stat_rows = upsert_stats(transaction, batch)?;
    Ok(BatchCounts::new(batch.len(), stat_rows))
}

fn upsert_pokemon(transaction: &Transaction<'_>, batch: &[Pokemon]) -> Result<(), SyncError> {
    let mut upsert = transaction
        .prepare_cached(UPSERT_POKEMON)
        .map_err(|source| SyncError::Sqlite {
            operation: "prepare creature upsert",
            source,
        })?;
    for pokemon in batch {
        upsert
            .execute(params![pokemon.id, pokemon.name, pokemon.type_label])
            .map_err(|source| SyncError::Sqlite {
                operation: "upsert creature row",
                source,
            })?;
    }
    Ok(())
}

/// Persisted `(pokemon_id, stat_name)` keys restricted to the batch's ids.
///
/// Membership is a parameterised `IN` list; the reconciliation scope is
/// exactly the id set, never the numeric range between min and max.
fn existing_stat_keys(
    transaction: &Transaction<'_>,
    batch_ids: &BTreeSet<i64>,
) -> Result<BTreeSet<(i64, String)>, SyncError> {
    let placeholders = vec!["?"; batch_ids.len()].join(", ");
    let query = format!(
        "SELECT pokemon_id, stat_name FROM pokemon_stats WHERE pokemon_id IN ({placeholders})"
    );
    let mut statement = transaction
        .prepare(&query)
        .map_err(|source| SyncError::Sqlite {
            operation: "prepare stat key lookup",
            source,
        })?;
    let read_error = |source| SyncError::Sqlite {
        operation: "read existing stat keys",
        source,
    };
    let mut rows = statement
        .query(params_from_iter(batch_ids.iter()))
        .map_err(read_error)?;

    let mut keys = BTreeSet::new();
    while let Some(row) = rows.next().map_err(read_error)? {
        let pokemon_id: i64 = row.get(0).map_err(read_error)?;
        let stat_name: String = row.get(1).map_err(read_error)?;
        keys.insert((pokemon_id, stat_name));
    }
    Ok(keys)
}

fn delete_stale_stats(
    transaction: &Transaction<'_>,
    existing: &BTreeSet<(i64, String)>,
    desired: &BTreeSet<(i64, &str)>,
    min_id: i64,
    max_id: i64,
) -> Result<(), SyncError> {
    let stale: Vec<&(i64, String)> = existing
        .iter()
        .filter(|(pokemon_id, stat_name)| !desired.contains(&(*pokemon_id, stat_name.as_str())))
        .collect();
    if stale.is_empty() {
        info!("no stale stat rows for id range [{min_id}-{max_id}]");
        return Ok(());
    }

    let mut delete = transaction
        .prepare_cached(DELETE_STAT)
        .map_err(|source| SyncError::Sqlite {
            operation: "prepare stale stat delete",
            source,
        })?;
    for (pokemon_id, stat_name) in &stale {
        delete
            .execute(params![pokemon_id, stat_name])
            .map_err(|source| SyncError::Sqlite {
                operation: "delete stale stat row",
                source,
            })?;
    }
    info!(
        "deleted {} stale stat rows for id range [{min_id}-{max_id}]",
        stale.len()
    );
    Ok(())
}

fn upsert_stats(transaction: &Transaction<'_>, batch: &[Pokemon]) -> Result<usize, SyncError> {
    let mut upsert = transaction
        .prepare_cached(UPSERT_STAT)
        .map_err(|source| SyncError::Sqlite {
            operation: "prepare stat upsert",
            source,
        })?;
    let mut stat_rows = 0usize;
    for pokemon in batch {
        for (stat_name, value) in &pokemon.stats {
            upsert
                .execute(params![pokemon.id, stat_name, value])
                .map_err(|source| SyncError::Sqlite {
                    operation: "upsert stat row",
                    source,
                })?;
            stat_rows += 1;
        }
    }
    Ok(stat_rows)
}

/// Reconcile the full resolved set in fixed-size batches, strictly in order.
///
/// A failing batch is rolled back, logged with its id range, and counted as
/// failed; the run continues with the next batch. One corrupt batch must not
/// block ingestion of the rest.
pub fn sync_pokemon(
    connection: &mut Connection,
    pokemons: &[Pokemon],
    mode: SyncMode,
) -> SyncTotals {
    let mut totals = SyncTotals::default();
    for batch in pokemons.chunks(BATCH_SIZE) {
        match reconcile_batch(connection, batch, mode) {
            Ok(counts) => totals.absorb(counts),
            Err(err) => {
                totals.record_failure();
                let (min_id, max_id) = batch_id_range(batch);
                error!("batch [{min_id}-{max_id}] rolled back: {err}");
            }
        }
    }
    info!(
        "sync complete: {} creature rows, {} stat rows, {} failed batches",
        totals.pokemon_rows, totals.stat_rows, totals.failed_batches
    );
    totals
}

fn batch_id_range(batch: &[Pokemon]) -> (i64, i64) {
    batch.iter().fold((i64::MAX, i64::MIN), |(min, max), pokemon| {
        (min.min(pokemon.id), max.max(pokemon.id))
    })
}
