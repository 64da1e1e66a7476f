use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::IngestError;
use crate::types::BlobLocator;

use super::unified::IngestionFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (invocation failed on its input).
    Error,
    /// Critical error (fetch, store, or configuration failures).
    Critical,
}

impl IngestionSeverity {
    /// Classify an ingestion error.
    pub fn for_error(e: &IngestError) -> Self {
        match e {
            IngestError::FetchFailed { .. } | IngestError::WriteFailed { .. } | IngestError::Config(_) => {
                Self::Critical
            }
            IngestError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Error,
            },
            IngestError::UnsupportedFormat { .. }
            | IngestError::Json(_)
            | IngestError::MalformedPayload { .. }
            | IngestError::InvalidFieldType { .. }
            | IngestError::MissingRequiredField { .. }
            | IngestError::InvalidEvent { .. } => Self::Error,
        }
    }
}

/// Context about one blob ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// The blob being ingested.
    pub locator: BlobLocator,
    /// Detected format; `None` when detection itself failed.
    pub format: Option<IngestionFormat>,
}

/// Stats reported on successful ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of items written to the store.
    pub records_written: usize,
    /// How many of those items received a generated sort key.
    pub sort_keys_generated: usize,
}

impl std::ops::AddAssign for IngestionStats {
    fn add_assign(&mut self, rhs: Self) {
        self.records_written += rhs.records_written;
        self.sort_keys_generated += rhs.sort_keys_generated;
    }
}

/// Observer interface for ingestion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called when a blob is fully ingested.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when ingestion of a blob fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

struct FormatLabel(Option<IngestionFormat>);

impl fmt::Display for FormatLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(format) => write!(f, "{format}"),
            None => f.write_str("unknown"),
        }
    }
}

/// Routes ingestion events through the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl IngestionObserver for LogObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        log::info!(
            "ingested blob={} format={} records={} generated_sort_keys={}",
            ctx.locator,
            FormatLabel(ctx.format),
            stats.records_written,
            stats.sort_keys_generated
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestError) {
        log::error!(
            "ingest failed severity={:?} blob={} format={} err={}",
            severity,
            ctx.locator,
            FormatLabel(ctx.format),
            error
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestError) {
        log::error!(
            "ALERT ingest failed severity={:?} blob={} format={} err={}",
            severity,
            ctx.locator,
            FormatLabel(ctx.format),
            error
        );
    }
}

/// Logs ingestion events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!(
            "[ingest][ok] format={} blob={} records={}",
            FormatLabel(ctx.format),
            ctx.locator,
            stats.records_written
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestError) {
        eprintln!(
            "[ingest][{:?}] format={} blob={} err={}",
            severity,
            FormatLabel(ctx.format),
            ctx.locator,
            error
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestError) {
        eprintln!(
            "[ALERT][ingest][{:?}] format={} blob={} err={}",
            severity,
            FormatLabel(ctx.format),
            ctx.locator,
            error
        );
    }
}

/// Appends ingestion events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append_line(&format!(
            "{} ok format={} blob={} records={} generated_sort_keys={}",
            unix_ts(),
            FormatLabel(ctx.format),
            ctx.locator,
            stats.records_written,
            stats.sort_keys_generated
        ));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestError) {
        self.append_line(&format!(
            "{} fail severity={:?} format={} blob={} err={}",
            unix_ts(),
            severity,
            FormatLabel(ctx.format),
            ctx.locator,
            error
        ));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} format={} blob={} err={}",
            unix_ts(),
            severity,
            FormatLabel(ctx.format),
            ctx.locator,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
