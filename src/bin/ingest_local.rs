//! Run one ingestion invocation locally.
//!
//! Blobs are read from `{root}/{bucket}/{key}`; items land in an in-memory store and are
//! printed to stdout as JSON lines, followed by the invocation response.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use blob_record_ingest::config::IngestConfig;
use blob_record_ingest::driver::Ingestor;
use blob_record_ingest::event::S3Event;
use blob_record_ingest::ingestion::LogObserver;
use blob_record_ingest::logger;
use blob_record_ingest::source::FsBlobSource;
use blob_record_ingest::store::InMemoryStore;

#[derive(Debug, Parser)]
#[command(name = "ingest-local", about = "Ingest a CSV/JSON blob described by a notification event")]
struct Args {
    /// Directory whose subdirectories play the role of buckets.
    #[arg(long)]
    root: PathBuf,

    /// Event JSON file; reads stdin when omitted.
    #[arg(long)]
    event: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = logger::parse_level(&args.log_level)
        .ok_or_else(|| format!("unknown log level '{}'", args.log_level))?;
    logger::init_console(level)?;

    let config = IngestConfig::from_env()?;

    let raw = match &args.event {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let event: S3Event = serde_json::from_str(&raw)?;

    let store = Arc::new(InMemoryStore::new(config.keys.clone()));
    let table = config.table_name.clone();
    let ingestor = Ingestor::new(config, Arc::new(FsBlobSource::new(&args.root)), store.clone())
        .with_observer(Arc::new(LogObserver));

    let response = ingestor.handle_event(&event)?;

    let mut out = io::stdout().lock();
    for item in store.items(&table) {
        writeln!(out, "{}", serde_json::to_string(&item)?)?;
    }
    writeln!(out, "{}", serde_json::to_string(&response)?)?;
    Ok(())
}
