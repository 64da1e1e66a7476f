//! Parsing and normalization stages.
//!
//! - [`unified`]: format detection from the blob key and parser dispatch
//! - [`csv`] / [`json`]: format-specific record parsers
//! - [`normalize`]: partition-key validation and sort-key completion
//! - [`observability`]: outcome observers (success/failure/alert)

pub mod csv;
pub mod json;
pub mod normalize;
pub mod observability;
pub mod unified;

pub use normalize::{SortKeyOrigin, generate_sort_key, normalize_record};
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    LogObserver, StdErrObserver,
};
pub use unified::{IngestionFormat, RecordStream, decode_payload, parse_all, parse_records};
