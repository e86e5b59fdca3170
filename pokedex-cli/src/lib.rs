//! Command-line interface for Pokédex ingestion and reporting.
#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pokedex_core::SyncMode;
use pokedex_data::api::{DEFAULT_BASE_URL, HttpPokeApiSource, TransportError, resolve_pokemon};
use pokedex_data::store::{ReportError, SchemaError, initialise_schema, run_report, sync_pokemon};
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ARG_DATABASE: &str = "database";
const ENV_DATABASE: &str = "POKEDEX_CMDS_INGEST_DATABASE";
const DEFAULT_GENERATION: &str = "generation-i";

/// Run the Pokédex CLI with the current process arguments and environment.
pub async fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Ingest(args) => run_ingest(args).await,
        Command::Report(args) => run_report_command(&args),
    }
}

async fn run_ingest(args: IngestArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    info!(
        "starting {} ingest into {:?} from {}",
        config.mode, config.database, config.base_url
    );

    let mut connection = open_database(&config.database)?;
    initialise_schema(&mut connection, config.mode)?;

    let source = HttpPokeApiSource::new(config.base_url.clone());
    let pokemons = resolve_pokemon(&source, &config.generations).await?;
    info!("resolved {} creatures", pokemons.len());

    let totals = sync_pokemon(&mut connection, &pokemons, config.mode);
    if totals.failed_batches > 0 {
        warn!(
            "{} batch(es) rolled back; committed data is still consistent",
            totals.failed_batches
        );
    }
    info!(
        "ingest complete: {} creature rows, {} stat rows ({:?})",
        totals.pokemon_rows, totals.stat_rows, config.database
    );
    Ok(())
}

fn run_report_command(args: &ReportArgs) -> Result<(), CliError> {
    let connection = Connection::open_with_flags(&args.database, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|source| CliError::OpenDatabase {
            path: args.database.clone(),
            source,
        })?;
    let summary = run_report(&connection)?;

    for row in &summary.type_distribution {
        info!("type {}: {} creatures", row.type_label, row.pokemon);
    }
    for row in &summary.most_tanky_types {
        info!("most tanky type: {} ({} tanky creatures)", row.type_label, row.tanky);
    }
    Ok(())
}

fn open_database(path: &Path) -> Result<Connection, CliError> {
    Connection::open(path).map_err(|source| CliError::OpenDatabase {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Parser)]
#[command(
    name = "pokedex",
    about = "Ingest PokeAPI reference data into SQLite and report over it",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the configured generations and reconcile them into the store.
    Ingest(IngestArgs),
    /// Run the fixed analytics queries against an existing store.
    Report(ReportArgs),
}

/// CLI arguments for the `ingest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Define the ingest run. Values can come from CLI flags, \
                 configuration files, or POKEDEX_* environment variables.",
    about = "Describe the database, endpoint, and generations to ingest"
)]
#[ortho_config(prefix = "POKEDEX")]
struct IngestArgs {
    /// Path of the SQLite database to reconcile into.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    database: Option<PathBuf>,
    /// Base URL of the PokeAPI endpoint.
    #[arg(long, value_name = "url")]
    #[serde(default)]
    base_url: Option<String>,
    /// Generation name to ingest; repeat the flag for several.
    #[arg(long = "generation", value_name = "name")]
    #[serde(default)]
    generation: Option<Vec<String>>,
    /// Drop and recreate the tables instead of reconciling incrementally.
    #[arg(long)]
    #[serde(default)]
    full_rebuild: bool,
}

impl IngestArgs {
    fn into_config(self) -> Result<IngestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        IngestConfig::try_from(merged)
    }
}

/// Fully resolved run configuration, decided once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IngestConfig {
    database: PathBuf,
    base_url: String,
    generations: Vec<String>,
    mode: SyncMode,
}

impl TryFrom<IngestArgs> for IngestConfig {
    type Error = CliError;

    fn try_from(args: IngestArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_DATABASE,
        })?;
        let base_url = args
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let generations = args
            .generation
            .filter(|generations| !generations.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_GENERATION.to_owned()]);
        let mode = if args.full_rebuild {
            SyncMode::FullRebuild
        } else {
            SyncMode::Incremental
        };
        Ok(Self {
            database,
            base_url,
            generations,
            mode,
        })
    }
}

/// CLI arguments for the `report` subcommand.
#[derive(Debug, Clone, Parser)]
#[command(about = "Run the fixed analytics queries against an existing store")]
struct ReportArgs {
    /// Path of the SQLite database to read.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    database: PathBuf,
}

/// Errors emitted by the Pokédex CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The SQLite database could not be opened.
    #[error("failed to open database at {path:?}")]
    OpenDatabase {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    /// Schema initialisation failed; the run aborts before any fetch work.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// The generation index could not be fetched.
    #[error(transparent)]
    Resolve(#[from] TransportError),
    /// A reporting query failed.
    #[error(transparent)]
    Report(#[from] ReportError),
}
