//! Invocation driver: trigger event → blob locators → detect → fetch → parse → normalize → write.
//!
//! Processing is strictly sequential. Each record is normalized and written before the next
//! one is parsed, and the first error aborts the invocation. Records already written stay
//! written, so a failed invocation may be partially applied.

use std::fmt;
use std::sync::Arc;

use crate::config::IngestConfig;
use crate::error::{IngestError, IngestResult};
use crate::event::{InvocationResponse, S3Event};
use crate::ingestion::{
    IngestionContext, IngestionFormat, IngestionObserver, IngestionSeverity, IngestionStats, SortKeyOrigin,
    decode_payload, normalize_record, parse_records,
};
use crate::source::BlobSource;
use crate::store::ItemStore;
use crate::types::{BlobLocator, Record};

/// Runs ingestion invocations against an explicit configuration and collaborators.
pub struct Ingestor {
    config: IngestConfig,
    source: Arc<dyn BlobSource>,
    store: Arc<dyn ItemStore>,
    observer: Option<Arc<dyn IngestionObserver>>,
    alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ingestor")
            .field("config", &self.config)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Ingestor {
    /// Create a driver with no observer and a `Critical` alert threshold.
    pub fn new(config: IngestConfig, source: Arc<dyn BlobSource>, store: Arc<dyn ItemStore>) -> Self {
        Self {
            config,
            source,
            store,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }

    /// Report per-blob outcomes to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn IngestionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Severity at which failures are additionally reported through `on_alert`.
    pub fn with_alert_threshold(mut self, severity: IngestionSeverity) -> Self {
        self.alert_at_or_above = severity;
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Handle one trigger event.
    ///
    /// Returns the fixed success response once every selected blob is ingested; any failure
    /// propagates to the caller.
    pub fn handle_event(&self, event: &S3Event) -> IngestResult<InvocationResponse> {
        log::info!("received event record_count={}", event.records.len());

        let locators = event.locators(self.config.record_selection)?;
        let mut total = IngestionStats::default();
        for locator in &locators {
            total += self.ingest_blob(locator)?;
        }

        log::info!(
            "invocation complete blobs={} records={} generated_sort_keys={}",
            locators.len(),
            total.records_written,
            total.sort_keys_generated
        );
        Ok(InvocationResponse::success())
    }

    /// Ingest a single blob, reporting the outcome to the observer if one is set.
    pub fn ingest_blob(&self, locator: &BlobLocator) -> IngestResult<IngestionStats> {
        log::info!("ingesting blob={locator} table={}", self.config.table_name);

        let format = IngestionFormat::from_key(&locator.key);
        let ctx = IngestionContext {
            locator: locator.clone(),
            format: format.as_ref().ok().copied(),
        };

        let result = format.and_then(|format| self.run(locator, format));

        if let Some(obs) = self.observer.as_ref() {
            match &result {
                Ok(stats) => obs.on_success(&ctx, *stats),
                Err(e) => {
                    let sev = IngestionSeverity::for_error(e);
                    obs.on_failure(&ctx, sev, e);
                    if sev >= self.alert_at_or_above {
                        obs.on_alert(&ctx, sev, e);
                    }
                }
            }
        }

        result
    }

    fn run(&self, locator: &BlobLocator, format: IngestionFormat) -> IngestResult<IngestionStats> {
        let bytes = self
            .source
            .fetch(locator)
            .map_err(|source| IngestError::FetchFailed {
                locator: locator.to_string(),
                source,
            })?;
        log::debug!("fetched blob={locator} bytes={}", bytes.len());

        let payload = decode_payload(bytes)?;
        let keys = &self.config.keys;

        let mut stats = IngestionStats::default();
        for (idx0, parsed) in parse_records(format, &payload, keys)?.enumerate() {
            let record_no = idx0 + 1;
            let mut record = parsed?;
            if normalize_record(&mut record, keys, record_no)? == SortKeyOrigin::Generated {
                stats.sort_keys_generated += 1;
            }
            self.write(&record, record_no)?;
            stats.records_written += 1;
        }

        Ok(stats)
    }

    fn write(&self, record: &Record, record_no: usize) -> IngestResult<()> {
        self.store
            .put_item(&self.config.table_name, record)
            .map_err(|source| IngestError::WriteFailed {
                record: record_no,
                source,
            })
    }
}
