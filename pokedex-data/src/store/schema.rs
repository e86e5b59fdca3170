use log::info;
use pokedex_core::SyncMode;
use rusqlite::{Connection, Error as SqliteError};
use thiserror::Error;

/// Initialise the creature schema inside an existing SQLite database.
///
/// In [`SyncMode::FullRebuild`] both tables are dropped unconditionally
/// before being recreated, so every row in the run starts from a truncated
/// store. In [`SyncMode::Incremental`] creation is idempotent and existing
/// rows are preserved. Callers decide the mode once at process start and
/// thread it through explicitly.
///
/// # Examples
/// ```
/// use pokedex_core::SyncMode;
/// use pokedex_data::store::initialise_schema;
/// use rusqlite::Connection;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_schema(&mut conn, SyncMode::Incremental).expect("create schema");
///
/// let tables: i64 = conn
///     .query_row(
///         "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
///          AND name IN ('pokemon', 'pokemon_stats')",
///         [],
///         |row| row.get(0),
///     )
///     .expect("count tables");
/// assert_eq!(tables, 2);
/// ```
pub fn initialise_schema(connection: &mut Connection, mode: SyncMode) -> Result<(), SchemaError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| SchemaError::ForeignKeys { source })?;

    let transaction = connection
        .transaction()
        .map_err(|source| SchemaError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    if !mode.is_incremental() {
        info!("mode is {mode}; dropping and recreating creature tables");
        run_migration_step(
            &transaction,
            "drop pokemon_stats",
            "DROP TABLE IF EXISTS pokemon_stats",
        )?;
        run_migration_step(&transaction, "drop pokemon", "DROP TABLE IF EXISTS pokemon")?;
    }

    create_tables(&transaction)?;

    transaction
        .commit()
        .map_err(|source| SchemaError::Migration {
            step: "commit schema transaction",
            source,
        })?;

    info!("database schema initialised ({mode})");
    Ok(())
}

fn create_tables(transaction: &rusqlite::Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "create pokemon",
        "CREATE TABLE IF NOT EXISTS pokemon (
            id INTEGER PRIMARY KEY CHECK (id > 0),
            name TEXT NOT NULL CHECK (length(name) > 0),
            type_label TEXT NOT NULL
        )",
    )?;
    run_migration_step(
        transaction,
        "create pokemon_stats",
        "CREATE TABLE IF NOT EXISTS pokemon_stats (
            pokemon_id INTEGER NOT NULL,
            stat_name TEXT NOT NULL CHECK (length(stat_name) > 0),
            value INTEGER NOT NULL,
            PRIMARY KEY (pokemon_id, stat_name),
            FOREIGN KEY (pokemon_id) REFERENCES pokemon(id)
        ) WITHOUT ROWID",
    )
}

fn run_migration_step(
    transaction: &rusqlite::Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), SchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SchemaError::Migration { step, source })
}

/// Errors raised when initialising the creature schema.
///
/// Schema failures are fatal to a run: without a consistent schema there is
/// no guarantee any later batch would commit meaningfully.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Enabling SQLite foreign keys failed.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        #[source]
        source: SqliteError,
    },
    /// A schema step failed.
    #[error("failed to execute schema step '{step}'")]
    Migration {
        step: &'static str,
        #[source]
        source: SqliteError,
    },
}
