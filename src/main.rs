use chrono::{DateTime, Utc};
use clap::Parser;
use gnpl_ledger::config::LedgerConfig;
use gnpl_ledger::domain::ports::LedgerStoreBox;
use gnpl_ledger::infrastructure::in_memory::InMemoryLedgerStore;
#[cfg(feature = "storage-rocksdb")]
use gnpl_ledger::infrastructure::rocksdb::RocksDBStore;
use gnpl_ledger::infrastructure::settings::StaticSettings;
use gnpl_ledger::interfaces::csv::command_reader::{CommandReader, parse_instant};
use gnpl_ledger::interfaces::csv::snapshot_writer::SnapshotWriter;
use gnpl_ledger::interfaces::replay::Replayer;
use gnpl_ledger::telemetry::init_tracing;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input ledger commands CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Instant the final snapshots are evaluated at (RFC 3339 or YYYY-MM-DD).
    /// Defaults to the time of the last command.
    #[arg(long, value_parser = parse_as_of)]
    as_of: Option<DateTime<Utc>>,

    #[command(flatten)]
    config: LedgerConfig,
}

fn parse_as_of(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_instant(value).map_err(|e| e.to_string())
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<LedgerStoreBox> {
    match db_path {
        Some(path) => {
            info!(path = %path.display(), "opening persistent ledger");
            Ok(Box::new(RocksDBStore::open(path).into_diagnostic()?))
        }
        None => Ok(Box::new(InMemoryLedgerStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<LedgerStoreBox> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(Box::new(InMemoryLedgerStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.config.log);

    let settings = StaticSettings::new(cli.config.penalty_configuration().into_diagnostic()?);
    let store = open_store(cli.db_path)?;
    let mut replayer = Replayer::new(store, Box::new(settings), cli.config.retry_policy());

    // Replay commands
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for (index, command) in reader.commands().enumerate() {
        let row = index + 1;
        match command {
            Ok(command) => {
                if let Err(err) = replayer.apply(command).await {
                    warn!(row, error = %err, "command rejected");
                }
            }
            Err(err) => {
                warn!(row, error = %err, "error reading command");
            }
        }
    }

    let snapshots = replayer.finish(cli.as_of).await.into_diagnostic()?;
    info!(accounts = snapshots.len(), "replay finished");

    let stdout = io::stdout();
    let mut writer = SnapshotWriter::new(stdout.lock());
    writer
        .write_snapshots(snapshots.iter().map(|(label, snapshot)| (label.as_str(), snapshot)))
        .into_diagnostic()?;

    Ok(())
}
