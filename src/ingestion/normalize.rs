//! Record normalization: partition-key validation and sort-key completion.

use uuid::Uuid;

use crate::error::{IngestError, IngestResult};
use crate::types::{KeySchema, Record};

/// Where a normalized record's sort key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKeyOrigin {
    /// The input carried a non-blank sort key; it was left unchanged.
    Supplied,
    /// A fresh identifier was generated and written into the record.
    Generated,
}

/// Validate and complete the key fields of one record, in place.
///
/// `record_no` is the 1-based position of the record in its blob and is only used for error
/// reporting.
///
/// - A partition key that is absent, empty, or whitespace-only fails with
///   [`IngestError::MissingRequiredField`].
/// - A sort key that is absent, empty, or whitespace-only is replaced with
///   [`generate_sort_key`].
pub fn normalize_record(record: &mut Record, keys: &KeySchema, record_no: usize) -> IngestResult<SortKeyOrigin> {
    if is_blank(record.get(&keys.partition_key)) {
        return Err(IngestError::MissingRequiredField {
            field: keys.partition_key.clone(),
            record: record_no,
        });
    }

    if !is_blank(record.get(&keys.sort_key)) {
        return Ok(SortKeyOrigin::Supplied);
    }

    let generated = generate_sort_key();
    log::debug!("record {record_no}: generated {}={generated}", keys.sort_key);
    record.insert(keys.sort_key.as_str(), generated);
    Ok(SortKeyOrigin::Generated)
}

/// A random (v4) UUID in canonical hyphenated form.
pub fn generate_sort_key() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detection() {
        assert!(is_blank(None));
        assert!(is_blank(Some("")));
        assert!(is_blank(Some(" \t\n")));
        assert!(!is_blank(Some(" x ")));
    }

    #[test]
    fn generated_key_is_canonical_v4() {
        let key = generate_sort_key();
        assert_eq!(key.len(), 36);
        let parsed = Uuid::parse_str(&key).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(parsed.hyphenated().to_string(), key);
    }
}
