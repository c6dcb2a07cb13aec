//! Operator commands for the mock data store.
//!
//! # Responsibility
//! - Parse `simulate`, `seed` and `show` invocations.
//! - Resolve the store from command flags layered over `AppConfig`.
//! - Write human or JSON output to the supplied writer.
//!
//! # Invariants
//! - Flags given on the command line win over environment settings.
//! - `show` reads through the same `QueryService` the HTTP server uses.

use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use refreshmock_core::{
    open_store, seed_store, AppConfig, Collection, MutationSimulator, QueryService, StoreBackend,
    SystemClock, UpdatedAtRange,
};
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

pub type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(name = "refreshmock", version, about = "Mutate and inspect the mock refresh data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one mutation batch against the store.
    Simulate {
        #[command(flatten)]
        store: StoreArgs,
        /// Seed for reproducible runs.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Write the starter fixture into empty collections.
    Seed {
        #[command(flatten)]
        store: StoreArgs,
        /// Overwrite collections that already hold rows.
        #[arg(long)]
        force: bool,
    },
    /// Print a collection as JSON, optionally filtered by `updatedAt`.
    Show {
        collection: CollectionArg,
        #[command(flatten)]
        store: StoreArgs,
        /// Inclusive lower bound.
        #[arg(long)]
        min: Option<String>,
        /// Exclusive upper bound.
        #[arg(long)]
        max: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// Directory holding the collection files (default: `REFRESHMOCK_DATA_DIR`).
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Store backend (default: `REFRESHMOCK_STORE`).
    #[arg(long, value_enum)]
    pub store: Option<BackendArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendArg {
    Csv,
    Sqlite,
}

impl From<BackendArg> for StoreBackend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Csv => StoreBackend::Csv,
            BackendArg::Sqlite => StoreBackend::Sqlite,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionArg {
    Issues,
    Projects,
}

impl From<CollectionArg> for Collection {
    fn from(value: CollectionArg) -> Self {
        match value {
            CollectionArg::Issues => Collection::Issues,
            CollectionArg::Projects => Collection::Projects,
        }
    }
}

impl StoreArgs {
    fn resolve(&self, config: &AppConfig) -> (StoreBackend, PathBuf) {
        (
            self.store.map_or(config.store, StoreBackend::from),
            self.data_dir
                .clone()
                .unwrap_or_else(|| config.data_dir.clone()),
        )
    }
}

/// Executes `cli` and writes its output to `out`.
pub fn execute(cli: Cli, config: &AppConfig, out: &mut impl Write) -> CliResult<()> {
    match cli.command {
        Command::Simulate { store, seed } => {
            let (backend, data_dir) = store.resolve(config);
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let mut simulator =
                MutationSimulator::new(open_store(backend, &data_dir)?, SystemClock, rng);
            let report = simulator.run()?;
            write!(out, "{report}")?;
        }
        Command::Seed { store, force } => {
            let (backend, data_dir) = store.resolve(config);
            let outcome = seed_store(&open_store(backend, &data_dir)?, force)?;
            for collection in &outcome.written {
                writeln!(out, "seeded {collection}")?;
            }
            for collection in &outcome.skipped {
                writeln!(out, "skipped {collection} (not empty; use --force)")?;
            }
        }
        Command::Show {
            collection,
            store,
            min,
            max,
        } => {
            let (backend, data_dir) = store.resolve(config);
            let queries = QueryService::with_policy(
                open_store(backend, &data_dir)?,
                config.read_failure_policy,
            );
            let range = UpdatedAtRange::new(min.as_deref(), max.as_deref());
            let rows = queries.list(collection.into(), &range)?;
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
