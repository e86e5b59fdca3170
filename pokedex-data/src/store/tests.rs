use pokedex_core::{Pokemon, Stats, SyncMode};
use rstest::{fixture, rstest};
use rusqlite::Connection;

use super::{BATCH_SIZE, initialise_schema, reconcile_batch, run_report, sync_pokemon};

fn creature(id: i64, name: &str, type_label: &str, stats: &[(&str, i64)]) -> Pokemon {
    let stats: Stats = stats
        .iter()
        .map(|(stat_name, value)| ((*stat_name).to_owned(), *value))
        .collect();
    Pokemon::new(id, name, type_label, stats).expect("test creature should be valid")
}

fn bulbasaur() -> Pokemon {
    creature(1, "bulbasaur", "grass/poison", &[("hp", 45), ("attack", 49)])
}

/// Every persisted row, sorted, for state comparisons.
fn snapshot(conn: &Connection) -> (Vec<(i64, String, String)>, Vec<(i64, String, i64)>) {
    let pokemon = conn
        .prepare("SELECT id, name, type_label FROM pokemon ORDER BY id")
        .and_then(|mut statement| {
            statement
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
                .collect()
        })
        .expect("read pokemon rows");
    let stats = conn
        .prepare("SELECT pokemon_id, stat_name, value FROM pokemon_stats ORDER BY pokemon_id, stat_name")
        .and_then(|mut statement| {
            statement
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
                .collect()
        })
        .expect("read stat rows");
    (pokemon, stats)
}

#[fixture]
fn conn() -> Connection {
    let mut connection = Connection::open_in_memory().expect("create in-memory database");
    initialise_schema(&mut connection, SyncMode::Incremental).expect("create schema");
    connection
}

#[rstest]
fn first_ingest_writes_entity_and_stat_rows(mut conn: Connection) {
    let counts = reconcile_batch(&mut conn, &[bulbasaur()], SyncMode::Incremental)
        .expect("reconcile should succeed");

    assert_eq!((counts.pokemon_rows, counts.stat_rows), (1, 2));
    let (pokemon, stats) = snapshot(&conn);
    assert_eq!(
        pokemon,
        vec![(1, "bulbasaur".to_owned(), "grass/poison".to_owned())]
    );
    assert_eq!(
        stats,
        vec![
            (1, "attack".to_owned(), 49),
            (1, "hp".to_owned(), 45),
        ]
    );
}

#[rstest]
fn reconcile_is_idempotent(mut conn: Connection) {
    let batch = vec![bulbasaur(), creature(4, "charmander", "fire", &[("hp", 39)])];
    reconcile_batch(&mut conn, &batch, SyncMode::Incremental).expect("first run");
    let before = snapshot(&conn);

    let counts = reconcile_batch(&mut conn, &batch, SyncMode::Incremental).expect("second run");

    assert_eq!((counts.pokemon_rows, counts.stat_rows), (2, 3));
    assert_eq!(snapshot(&conn), before, "re-running must not change state");
}

#[rstest]
#[case(SyncMode::Incremental)]
#[case(SyncMode::FullRebuild)]
fn empty_batch_is_a_no_op(mut conn: Connection, #[case] mode: SyncMode) {
    let before = snapshot(&conn);
    let counts = reconcile_batch(&mut conn, &[], mode).expect("empty batch should succeed");
    assert_eq!((counts.pokemon_rows, counts.stat_rows), (0, 0));
    assert_eq!(snapshot(&conn), before);
}

#[rstest]
fn dropped_upstream_stat_is_deleted(mut conn: Connection) {
    reconcile_batch(&mut conn, &[bulbasaur()], SyncMode::Incremental).expect("first ingest");

    // Attack disappeared upstream; only hp remains.
    let trimmed = creature(1, "bulbasaur", "grass/poison", &[("hp", 45)]);
    let counts =
        reconcile_batch(&mut conn, &[trimmed], SyncMode::Incremental).expect("second ingest");

    assert_eq!((counts.pokemon_rows, counts.stat_rows), (1, 1));
    let (_, stats) = snapshot(&conn);
    assert_eq!(stats, vec![(1, "hp".to_owned(), 45)]);
}

#[rstest]
fn creature_with_no_stats_loses_all_persisted_rows(mut conn: Connection) {
    reconcile_batch(&mut conn, &[bulbasaur()], SyncMode::Incremental).expect("first ingest");

    let hollow = creature(1, "bulbasaur", "grass/poison", &[]);
    let counts =
        reconcile_batch(&mut conn, &[hollow], SyncMode::Incremental).expect("second ingest");

    assert_eq!((counts.pokemon_rows, counts.stat_rows), (1, 0));
    let (_, stats) = snapshot(&conn);
    assert!(stats.is_empty(), "replacement is wholesale, never a merge");
}

#[rstest]
fn upsert_replaces_name_and_type_label(mut conn: Connection) {
    reconcile_batch(&mut conn, &[bulbasaur()], SyncMode::Incremental).expect("first ingest");

    let renamed = creature(1, "fushigidane", "grass", &[("hp", 45), ("attack", 49)]);
    reconcile_batch(&mut conn, &[renamed], SyncMode::Incremental).expect("second ingest");

    let (pokemon, stats) = snapshot(&conn);
    assert_eq!(pokemon, vec![(1, "fushigidane".to_owned(), "grass".to_owned())]);
    assert_eq!(stats.len(), 2, "stats must survive a creature-row replace");
}

#[rstest]
fn full_rebuild_truncates_before_the_run(mut conn: Connection) {
    reconcile_batch(&mut conn, &[bulbasaur()], SyncMode::Incremental).expect("seed data");

    initialise_schema(&mut conn, SyncMode::FullRebuild).expect("rebuild schema");
    let (pokemon, stats) = snapshot(&conn);
    assert!(pokemon.is_empty() && stats.is_empty(), "rebuild drops all rows");

    // With a truncated store nothing is stale, so full-rebuild reconciliation
    // skips the deletion step and the outcome equals the batch exactly.
    let counts = reconcile_batch(&mut conn, &[bulbasaur()], SyncMode::FullRebuild)
        .expect("reconcile after rebuild");
    assert_eq!((counts.pokemon_rows, counts.stat_rows), (1, 2));
}

#[rstest]
fn full_rebuild_mode_never_deletes(mut conn: Connection) {
    // Force the situation full-rebuild mode assumes impossible: pre-existing
    // rows not covered by the batch payload. Incremental would delete them;
    // full-rebuild must not.
    reconcile_batch(&mut conn, &[bulbasaur()], SyncMode::Incremental).expect("seed data");

    let hollow = creature(1, "bulbasaur", "grass/poison", &[]);
    reconcile_batch(&mut conn, &[hollow], SyncMode::FullRebuild).expect("full-rebuild batch");

    let (_, stats) = snapshot(&conn);
    assert_eq!(stats.len(), 2, "deletion step must be skipped entirely");
}

#[rstest]
fn failed_batch_rolls_back_completely(mut conn: Connection) {
    reconcile_batch(&mut conn, &[bulbasaur()], SyncMode::Incremental).expect("seed data");
    let before = snapshot(&conn);

    // Sabotage the stat table so the batch fails after the creature upsert.
    conn.execute("ALTER TABLE pokemon_stats RENAME TO pokemon_stats_gone", [])
        .expect("rename stat table");
    let squirtle = creature(7, "squirtle", "water", &[("hp", 44)]);
    let outcome = reconcile_batch(&mut conn, &[squirtle.clone()], SyncMode::Incremental);
    assert!(outcome.is_err(), "missing table must fail the batch");

    conn.execute("ALTER TABLE pokemon_stats_gone RENAME TO pokemon_stats", [])
        .expect("restore stat table");
    assert_eq!(
        snapshot(&conn),
        before,
        "a failed batch must leave the store untouched"
    );

    // The run-level driver absorbs the failure and keeps going.
    conn.execute("ALTER TABLE pokemon_stats RENAME TO pokemon_stats_gone", [])
        .expect("rename stat table again");
    let totals = sync_pokemon(&mut conn, &[squirtle], SyncMode::Incremental);
    assert_eq!(totals.failed_batches, 1);
    assert_eq!((totals.pokemon_rows, totals.stat_rows), (0, 0));
}

#[rstest]
fn sync_chunks_into_fixed_size_batches(mut conn: Connection) {
    let herd: Vec<Pokemon> = (1..=i64::try_from(BATCH_SIZE + 1).expect("fits in i64"))
        .map(|id| creature(id, &format!("creature-{id}"), "normal", &[("hp", 10)]))
        .collect();

    let totals = sync_pokemon(&mut conn, &herd, SyncMode::Incremental);

    assert_eq!(totals.pokemon_rows, BATCH_SIZE + 1);
    assert_eq!(totals.stat_rows, BATCH_SIZE + 1);
    assert_eq!(totals.failed_batches, 0);
    let (pokemon, _) = snapshot(&conn);
    assert_eq!(pokemon.len(), BATCH_SIZE + 1);
}

#[rstest]
fn report_summarises_committed_state(mut conn: Connection) {
    let batch = vec![
        creature(1, "bulbasaur", "grass/poison", &[("hp", 45), ("defense", 49)]),
        creature(2, "ivysaur", "grass/poison", &[("hp", 60), ("defense", 63)]),
        creature(3, "venusaur", "grass/poison", &[("hp", 80), ("defense", 83)]),
        creature(7, "squirtle", "water", &[("hp", 44), ("defense", 65)]),
    ];
    reconcile_batch(&mut conn, &batch, SyncMode::Incremental).expect("seed data");

    let summary = run_report(&conn).expect("report should run");

    assert_eq!(summary.type_distribution.len(), 2);
    assert_eq!(summary.type_distribution[0].type_label, "grass/poison");
    assert_eq!(summary.type_distribution[0].pokemon, 3);

    let venusaur = summary
        .stat_ranks
        .iter()
        .find(|row| row.name == "venusaur")
        .expect("venusaur is ranked");
    assert_eq!((venusaur.total, venusaur.rank), (163, 1));

    let labels: Vec<(&str, &str)> = summary
        .tanky
        .iter()
        .map(|row| (row.name.as_str(), row.label.as_str()))
        .collect();
    assert_eq!(
        labels,
        vec![
            ("bulbasaur", "not tanky"),
            ("ivysaur", "not tanky"),
            ("venusaur", "tanky"),
            ("squirtle", "not tanky"),
        ]
    );

    assert_eq!(summary.most_tanky_types.len(), 1);
    assert_eq!(summary.most_tanky_types[0].type_label, "grass/poison");
    assert_eq!(summary.most_tanky_types[0].tanky, 1);
}

#[rstest]
fn report_runs_on_an_empty_store(conn: Connection) {
    let summary = run_report(&conn).expect("report should run");
    assert!(summary.type_distribution.is_empty());
    assert!(summary.most_tanky_types.is_empty());
}
