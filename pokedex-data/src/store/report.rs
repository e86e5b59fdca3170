//! Fixed analytical queries over the committed store.
//!
//! Read-only aggregations: they never touch reconciliation state and can run
//! against any database the ingest has committed to.

use std::time::Instant;

use log::info;
use rusqlite::{Connection, params};
use thiserror::Error;

/// Combined hp + defense at or above this value classifies a creature as tanky.
pub const TANKY_THRESHOLD: i64 = 150;

const TYPE_DISTRIBUTION: &str = "SELECT type_label, COUNT(*) AS total
     FROM pokemon
     GROUP BY type_label
     ORDER BY total DESC, type_label";

const STAT_RANKS: &str = "SELECT p.type_label, p.name, SUM(s.value) AS total,
            RANK() OVER (PARTITION BY p.type_label ORDER BY SUM(s.value) DESC) AS rank
     FROM pokemon p
     JOIN pokemon_stats s ON s.pokemon_id = p.id
     GROUP BY p.id, p.type_label, p.name
     ORDER BY p.type_label, rank, p.name";

const TANKY_CLASSIFICATION: &str = "SELECT p.name,
            CASE
                WHEN COALESCE(SUM(CASE WHEN s.stat_name IN ('hp', 'defense')
                                       THEN s.value END), 0) >= ?1
                THEN 'tanky' ELSE 'not tanky'
            END AS label
     FROM pokemon p
     LEFT JOIN pokemon_stats s ON s.pokemon_id = p.id
     GROUP BY p.id, p.name
     ORDER BY p.id";

const MOST_TANKY_TYPES: &str = "WITH tanky AS (
         SELECT p.id, p.type_label
         FROM pokemon p
         JOIN pokemon_stats s ON s.pokemon_id = p.id
         WHERE s.stat_name IN ('hp', 'defense')
         GROUP BY p.id, p.type_label
         HAVING SUM(s.value) >= ?1
     ), counts AS (
         SELECT type_label, COUNT(*) AS tanky FROM tanky GROUP BY type_label
     )
     SELECT type_label, tanky FROM counts
     WHERE tanky = (SELECT MAX(tanky) FROM counts)
     ORDER BY type_label";

/// Count of creatures sharing one exact type label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCount {
    pub type_label: String,
    pub pokemon: i64,
}

/// A creature's rank by total stat sum within its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRank {
    pub type_label: String,
    pub name: String,
    pub total: i64,
    pub rank: i64,
}

/// Tanky-or-not classification for one creature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TankyLabel {
    pub name: String,
    pub label: String,
}

/// Number of tanky creatures for a type label tied for the maximum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TankyTypeCount {
    pub type_label: String,
    pub tanky: i64,
}

/// Results of every reporting query, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    /// Creature counts per distinct type label.
    pub type_distribution: Vec<TypeCount>,
    /// Creatures ranked by total stat sum within each type.
    pub stat_ranks: Vec<StatRank>,
    /// Per-creature tanky classification.
    pub tanky: Vec<TankyLabel>,
    /// Type label(s) with the most tanky creatures.
    pub most_tanky_types: Vec<TankyTypeCount>,
}

/// Errors raised while running the reporting queries.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A query failed to prepare or execute.
    #[error("failed to run {query} query")]
    Query {
        /// The reporting query that failed.
        query: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

/// Run every reporting query, logging row counts and durations.
pub fn run_report(connection: &Connection) -> Result<ReportSummary, ReportError> {
    let type_distribution = timed(connection, "type distribution", |conn| {
        collect(conn, TYPE_DISTRIBUTION, [], |row| {
            Ok(TypeCount {
                type_label: row.get(0)?,
                pokemon: row.get(1)?,
            })
        })
    })?;

    let stat_ranks = timed(connection, "stat ranks", |conn| {
        collect(conn, STAT_RANKS, [], |row| {
            Ok(StatRank {
                type_label: row.get(0)?,
                name: row.get(1)?,
                total: row.get(2)?,
                rank: row.get(3)?,
            })
        })
    })?;

    let tanky = timed(connection, "tanky classification", |conn| {
        collect(conn, TANKY_CLASSIFICATION, params![TANKY_THRESHOLD], |row| {
            Ok(TankyLabel {
                name: row.get(0)?,
                label: row.get(1)?,
            })
        })
    })?;

    let most_tanky_types = timed(connection, "most tanky types", |conn| {
        collect(conn, MOST_TANKY_TYPES, params![TANKY_THRESHOLD], |row| {
            Ok(TankyTypeCount {
                type_label: row.get(0)?,
                tanky: row.get(1)?,
            })
        })
    })?;

    Ok(ReportSummary {
        type_distribution,
        stat_ranks,
        tanky,
        most_tanky_types,
    })
}

fn timed<T>(
    connection: &Connection,
    query: &'static str,
    run: impl FnOnce(&Connection) -> Result<Vec<T>, rusqlite::Error>,
) -> Result<Vec<T>, ReportError> {
    let started = Instant::now();
    let rows = run(connection).map_err(|source| ReportError::Query { query, source })?;
    info!(
        "{query}: {} rows in {:?}",
        rows.len(),
        started.elapsed()
    );
    Ok(rows)
}

fn collect<T, P: rusqlite::Params>(
    connection: &Connection,
    sql: &str,
    params: P,
    map: impl FnMut(&rusqlite::Row<'_>) -> Result<T, rusqlite::Error>,
) -> Result<Vec<T>, rusqlite::Error> {
    let mut statement = connection.prepare(sql)?;
    let rows = statement.query_map(params, map)?;
    rows.collect()
}
