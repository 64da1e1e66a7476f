//! Format detection and parser dispatch.
//!
//! The format is decided purely from the blob key's suffix; content is never sniffed. A
//! `.json` key with malformed content therefore fails at parse time, not detection time.

use std::fmt;

use crate::error::{IngestError, IngestResult};
use crate::types::{KeySchema, Record};

use super::{csv, json};

/// Supported payload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// JSON array-of-objects.
    Json,
    /// Comma-separated values with a header row.
    Csv,
}

impl IngestionFormat {
    /// Detect the format from a blob key.
    ///
    /// Matching is case-sensitive on the whole key: `data.json` is JSON, `data.csv` is CSV,
    /// anything else (including `data.CSV` or no suffix) is [`IngestError::UnsupportedFormat`].
    pub fn from_key(key: &str) -> IngestResult<Self> {
        if key.ends_with(".json") {
            Ok(Self::Json)
        } else if key.ends_with(".csv") {
            Ok(Self::Csv)
        } else {
            Err(IngestError::UnsupportedFormat { key: key.to_string() })
        }
    }
}

impl fmt::Display for IngestionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Csv => f.write_str("csv"),
        }
    }
}

/// A stream of parsed records, one per source row/object.
pub type RecordStream<'a> = Box<dyn Iterator<Item = IngestResult<Record>> + 'a>;

/// Decode a fetched payload as UTF-8 text.
pub fn decode_payload(bytes: Vec<u8>) -> IngestResult<String> {
    String::from_utf8(bytes).map_err(|e| IngestError::MalformedPayload {
        message: format!("payload is not valid utf-8: {e}"),
    })
}

/// Start parsing `payload` in the given format.
///
/// Errors that concern the whole payload (malformed JSON, non-array top level, unreadable CSV
/// header) are returned here; per-record errors surface as the stream is consumed.
pub fn parse_records<'a>(
    format: IngestionFormat,
    payload: &'a str,
    keys: &'a KeySchema,
) -> IngestResult<RecordStream<'a>> {
    match format {
        IngestionFormat::Json => Ok(Box::new(json::json_records(payload, keys)?)),
        IngestionFormat::Csv => Ok(Box::new(csv::csv_records(payload.as_bytes())?)),
    }
}

/// Parse `payload` completely, collecting every record.
pub fn parse_all(format: IngestionFormat, payload: &str, keys: &KeySchema) -> IngestResult<Vec<Record>> {
    parse_records(format, payload, keys)?.collect()
}
