use thiserror::Error;

use crate::config::ConfigError;
use crate::source::FetchError;
use crate::store::StoreError;

/// Convenience result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Error type returned by every ingestion stage.
///
/// Every variant is fatal to the invocation: nothing is retried locally and nothing is
/// downgraded to a per-record warning. Records written before the failure stay written.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The blob key does not end in a supported suffix (`.json` / `.csv`).
    #[error("unsupported file type: {key}")]
    UnsupportedFormat { key: String },

    /// Delimited-text reader error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The payload is not well-formed JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload decoded, but its shape is not an ingestible record sequence.
    #[error("malformed payload: {message}")]
    MalformedPayload { message: String },

    /// A key field holds a value of the wrong JSON type.
    #[error("record {record}: key field '{field}' must be a string, found {found}")]
    InvalidFieldType {
        record: usize,
        field: String,
        found: &'static str,
    },

    /// The partition key is absent, empty, or whitespace-only.
    #[error("missing required field: {field} (record {record})")]
    MissingRequiredField { field: String, record: usize },

    /// The blob could not be retrieved.
    #[error("failed to fetch {locator}: {source}")]
    FetchFailed {
        locator: String,
        #[source]
        source: FetchError,
    },

    /// The store rejected an item.
    #[error("failed to write record {record}: {source}")]
    WriteFailed {
        record: usize,
        #[source]
        source: StoreError,
    },

    /// The trigger event does not identify a blob.
    #[error("invalid event: {message}")]
    InvalidEvent { message: String },

    /// Startup configuration is missing or invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl IngestError {
    /// Returns `true` for the parse-stage family (malformed CSV, JSON, or payload shape).
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Csv(_) | Self::Json(_) | Self::MalformedPayload { .. } | Self::InvalidFieldType { .. }
        )
    }
}
