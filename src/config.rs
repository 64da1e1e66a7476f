//! Process-wide configuration, resolved once at startup and passed into the driver.

use thiserror::Error;

use crate::types::{DEFAULT_PARTITION_KEY, DEFAULT_SORT_KEY, KeySchema};

/// Store table identifier (required).
pub const TABLE_NAME_VAR: &str = "TABLE_NAME";
/// Partition key field name override.
pub const PARTITION_KEY_VAR: &str = "PARTITION_KEY";
/// Sort key field name override.
pub const SORT_KEY_VAR: &str = "SORT_KEY";
/// Which notification entries to process: `first` or `all`.
pub const EVENT_RECORDS_VAR: &str = "EVENT_RECORDS";

/// Startup configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("{var} must be provided")]
    Missing { var: &'static str },

    /// A variable is set to a value that cannot be interpreted.
    #[error("invalid value '{value}' for {var}: {message}")]
    Invalid {
        var: &'static str,
        value: String,
        message: String,
    },
}

/// Which entries of a multi-record trigger event are ingested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordSelection {
    /// Only `Records[0]`; any further entries are logged and ignored.
    #[default]
    First,
    /// Every entry, in order, stopping at the first failure.
    All,
}

impl RecordSelection {
    /// Parse a selection name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "first" => Some(Self::First),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Resolved ingestion configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Store table identifier every item is written to.
    pub table_name: String,
    /// Partition/sort key field names.
    pub keys: KeySchema,
    /// Which event entries to process.
    pub record_selection: RecordSelection,
}

impl IngestConfig {
    /// Configuration for `table_name` with default key names and first-record selection.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            keys: KeySchema::default(),
            record_selection: RecordSelection::default(),
        }
    }

    /// Override the key schema.
    pub fn with_keys(mut self, keys: KeySchema) -> Self {
        self.keys = keys;
        self
    }

    /// Override the event record selection.
    pub fn with_record_selection(mut self, selection: RecordSelection) -> Self {
        self.record_selection = selection;
        self
    }

    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Resolve configuration from an arbitrary variable lookup.
    ///
    /// Blank values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let table_name = get(TABLE_NAME_VAR).ok_or(ConfigError::Missing {
            var: TABLE_NAME_VAR,
        })?;
        let partition_key = get(PARTITION_KEY_VAR).unwrap_or_else(|| DEFAULT_PARTITION_KEY.to_string());
        let sort_key = get(SORT_KEY_VAR).unwrap_or_else(|| DEFAULT_SORT_KEY.to_string());

        if partition_key == sort_key {
            return Err(ConfigError::Invalid {
                var: SORT_KEY_VAR,
                value: sort_key,
                message: "sort key must differ from the partition key".to_string(),
            });
        }

        let record_selection = match get(EVENT_RECORDS_VAR) {
            None => RecordSelection::default(),
            Some(raw) => RecordSelection::from_name(&raw).ok_or_else(|| ConfigError::Invalid {
                var: EVENT_RECORDS_VAR,
                value: raw.clone(),
                message: "expected 'first' or 'all'".to_string(),
            })?,
        };

        Ok(Self {
            table_name,
            keys: KeySchema::new(partition_key, sort_key),
            record_selection,
        })
    }
}
