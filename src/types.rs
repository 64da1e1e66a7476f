//! Core data model types for ingestion.
//!
//! A blob is addressed by a [`BlobLocator`], decoded into a sequence of [`Record`]s, and each
//! record is keyed in the store by the two field names of a [`KeySchema`].

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Default partition key field name.
pub const DEFAULT_PARTITION_KEY: &str = "LocationAbbr";
/// Default sort key field name.
pub const DEFAULT_SORT_KEY: &str = "SortKey";

/// Identifies one blob in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobLocator {
    /// Container (bucket) name.
    pub container: String,
    /// Object key / path inside the container.
    pub key: String,
}

impl BlobLocator {
    /// Create a new locator.
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for BlobLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

/// Names of the structurally significant key fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    /// Mandatory partition key field.
    pub partition_key: String,
    /// Sort key field; generated when a record does not supply it.
    pub sort_key: String,
}

impl KeySchema {
    /// Create a key schema from explicit field names.
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }

    /// Returns `true` if `name` is either key field.
    pub fn is_key_field(&self, name: &str) -> bool {
        name == self.partition_key || name == self.sort_key
    }
}

impl Default for KeySchema {
    fn default() -> Self {
        Self::new(DEFAULT_PARTITION_KEY, DEFAULT_SORT_KEY)
    }
}

/// One logical row/object: an ordered mapping from field name to string value.
///
/// Field order follows the source (CSV header order, JSON object order). Inserting an existing
/// name replaces the value in place and keeps the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the field is present (even if empty).
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }

    /// Set a field, returning the previous value if it was present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Iterate `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
