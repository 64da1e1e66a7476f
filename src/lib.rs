//! `blob-record-ingest` ingests one object-storage blob (CSV or JSON) per trigger event and
//! writes every record as an item into a key-indexed store.
//!
//! The primary entrypoint is [`driver::Ingestor::handle_event`], which runs four stages in
//! strict sequence:
//!
//! 1. **Detect** the format from the key suffix ([`ingestion::IngestionFormat::from_key`]).
//!    Unsupported keys fail here, before anything is fetched.
//! 2. **Fetch** the blob through a [`source::BlobSource`].
//! 3. **Parse** the payload into [`types::Record`]s ([`ingestion::csv`], [`ingestion::json`]).
//! 4. **Normalize** each record ([`ingestion::normalize_record`]) and **write** it through an
//!    [`store::ItemStore`].
//!
//! ## What you can ingest
//!
//! - **CSV**: keys ending in `.csv`, header row plus data rows. Short rows are padded with `""`;
//!   extra cells are ignored.
//! - **JSON**: keys ending in `.json`, a top-level array of objects.
//!
//! Every record value is a string. JSON numbers/booleans become their JSON text, `null` becomes
//! `""`, nested values become compact JSON text.
//!
//! ## Keys
//!
//! Each record must carry a non-blank partition key (default field `LocationAbbr`); a blank or
//! missing one aborts the invocation. A blank or missing sort key (default field `SortKey`) is
//! filled with a fresh UUIDv4.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use blob_record_ingest::config::IngestConfig;
//! use blob_record_ingest::driver::Ingestor;
//! use blob_record_ingest::event::S3Event;
//! use blob_record_ingest::source::InMemoryBlobSource;
//! use blob_record_ingest::store::InMemoryStore;
//!
//! # fn main() -> Result<(), blob_record_ingest::IngestError> {
//! let config = IngestConfig::new("locations");
//! let source = Arc::new(
//!     InMemoryBlobSource::new().with_blob("uploads", "day1.json", r#"[{"LocationAbbr":"NY","SortKey":"s1"}]"#),
//! );
//! let store = Arc::new(InMemoryStore::new(config.keys.clone()));
//!
//! let ingestor = Ingestor::new(config, source, store.clone());
//! let response = ingestor.handle_event(&S3Event::for_objects([("uploads", "day1.json")]))?;
//!
//! assert_eq!(response.status_code, 200);
//! assert_eq!(store.get("locations", "NY", "s1").unwrap().get("SortKey"), Some("s1"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`driver`]: invocation orchestration
//! - [`ingestion`]: format detection, parsers, normalization, observers
//! - [`source`] / [`store`]: fetch and store interfaces plus in-process implementations
//! - [`config`]: startup configuration
//! - [`event`]: trigger event and response shapes
//! - [`types`]: records, key schema, blob locators
//! - [`error`]: error types used across ingestion

pub mod config;
pub mod driver;
pub mod error;
pub mod event;
pub mod ingestion;
pub mod logger;
pub mod source;
pub mod store;
pub mod types;

pub use error::{IngestError, IngestResult};
