//! Store interface: full-item upserts keyed by (partition key, sort key).

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use crate::types::{KeySchema, Record};

/// Reasons the store refuses an item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The item itself is invalid for the table (e.g. missing key attribute).
    #[error("item rejected: {0}")]
    Rejected(String),

    /// The store could not be reached or throttled the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Blocking item store.
///
/// `put_item` is an upsert: an existing item with the same composite key is overwritten
/// without a prior read.
pub trait ItemStore: Send + Sync {
    fn put_item(&self, table: &str, item: &Record) -> Result<(), StoreError>;
}

type CompositeKey = (String, String);

/// In-process store with last-write-wins upserts per table.
#[derive(Debug)]
pub struct InMemoryStore {
    keys: KeySchema,
    tables: Mutex<HashMap<String, BTreeMap<CompositeKey, Record>>>,
    puts: AtomicUsize,
}

impl InMemoryStore {
    /// Create a store whose tables are keyed by `keys`.
    pub fn new(keys: KeySchema) -> Self {
        Self {
            keys,
            tables: Mutex::new(HashMap::new()),
            puts: AtomicUsize::new(0),
        }
    }

    /// Number of distinct items in `table`.
    pub fn len(&self, table: &str) -> usize {
        self.tables
            .lock()
            .map(|t| t.get(table).map_or(0, BTreeMap::len))
            .unwrap_or_default()
    }

    /// Returns `true` if `table` holds no items.
    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    /// Snapshot of all items in `table`, ordered by composite key.
    pub fn items(&self, table: &str) -> Vec<Record> {
        self.tables
            .lock()
            .map(|t| {
                t.get(table)
                    .map(|items| items.values().cloned().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Look up one item by composite key.
    pub fn get(&self, table: &str, partition: &str, sort: &str) -> Option<Record> {
        let tables = self.tables.lock().ok()?;
        tables
            .get(table)?
            .get(&(partition.to_string(), sort.to_string()))
            .cloned()
    }

    /// Total accepted `put_item` calls, including overwrites.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    fn key_of(&self, item: &Record) -> Result<CompositeKey, StoreError> {
        let attr = |name: &str| {
            item.get(name)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| StoreError::Rejected(format!("missing key attribute '{name}'")))
        };
        Ok((attr(&self.keys.partition_key)?, attr(&self.keys.sort_key)?))
    }
}

impl ItemStore for InMemoryStore {
    fn put_item(&self, table: &str, item: &Record) -> Result<(), StoreError> {
        let key = self.key_of(item)?;
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| StoreError::Unavailable("table lock poisoned".to_string()))?;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(key, item.clone());
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
