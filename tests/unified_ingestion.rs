use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use blob_record_ingest::IngestError;
use blob_record_ingest::config::{IngestConfig, RecordSelection};
use blob_record_ingest::driver::Ingestor;
use blob_record_ingest::event::{InvocationResponse, S3Event};
use blob_record_ingest::ingestion::IngestionFormat;
use blob_record_ingest::source::{FetchError, FsBlobSource, InMemoryBlobSource};
use blob_record_ingest::store::{InMemoryStore, ItemStore, StoreError};
use blob_record_ingest::types::{BlobLocator, Record};
use uuid::Uuid;

const TABLE: &str = "locations";
const BUCKET: &str = "uploads";

fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(format!("tests/fixtures/{name}")).unwrap()
}

struct Harness {
    source: Arc<InMemoryBlobSource>,
    store: Arc<InMemoryStore>,
    ingestor: Ingestor,
}

fn harness(config: IngestConfig, blobs: &[(&str, Vec<u8>)]) -> Harness {
    let source = Arc::new(InMemoryBlobSource::new());
    for (key, content) in blobs {
        source.put(BlobLocator::new(BUCKET, *key), content.clone());
    }
    let store = Arc::new(InMemoryStore::new(config.keys.clone()));
    let ingestor = Ingestor::new(config, source.clone(), store.clone());
    Harness { source, store, ingestor }
}

fn event(keys: &[&str]) -> S3Event {
    S3Event::for_objects(keys.iter().map(|k| (BUCKET, *k)))
}

/// Store that accepts `limit` items and fails every write after that.
struct FailingStore {
    inner: InMemoryStore,
    limit: usize,
    attempts: AtomicUsize,
}

impl ItemStore for FailingStore {
    fn put_item(&self, table: &str, item: &Record) -> Result<(), StoreError> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) >= self.limit {
            return Err(StoreError::Unavailable("throttled".to_string()));
        }
        self.inner.put_item(table, item)
    }
}

#[test]
fn unified_csv_end_to_end_stops_at_missing_partition_key() {
    let h = harness(IngestConfig::new(TABLE), &[("batch.csv", fixture("missing_partition.csv"))]);

    let err = h.ingestor.handle_event(&event(&["batch.csv"])).unwrap_err();
    match err {
        IngestError::MissingRequiredField { field, record } => {
            assert_eq!(field, "LocationAbbr");
            assert_eq!(record, 2);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Row 1 was persisted before the failure; row 3 never was.
    let items = h.store.items(TABLE);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].get("LocationAbbr"), Some("CA"));
    assert_eq!(items[0].get("Value"), Some("100"));
    assert!(Uuid::parse_str(items[0].get("SortKey").unwrap()).is_ok());
    assert_eq!(h.store.put_count(), 1);
}

#[test]
fn unified_json_end_to_end_keeps_supplied_sort_key() {
    let h = harness(
        IngestConfig::new(TABLE),
        &[("one.json", br#"[{"LocationAbbr":"NY","SortKey":"s1"}]"#.to_vec())],
    );

    let response = h.ingestor.handle_event(&event(&["one.json"])).unwrap();
    assert_eq!(response, InvocationResponse::success());

    let item = h.store.get(TABLE, "NY", "s1").unwrap();
    assert_eq!(item, [("LocationAbbr", "NY"), ("SortKey", "s1")].into_iter().collect::<Record>());
    assert_eq!(h.store.len(TABLE), 1);
}

#[test]
fn unified_json_fixture_writes_every_object() {
    let h = harness(IngestConfig::new(TABLE), &[("locations.json", fixture("locations.json"))]);

    let stats = h.ingestor.ingest_blob(&BlobLocator::new(BUCKET, "locations.json")).unwrap();
    assert_eq!(stats.records_written, 2);
    assert_eq!(stats.sort_keys_generated, 1);

    let ny = h.store.get(TABLE, "NY", "s1").unwrap();
    assert_eq!(ny.get("LocationDesc"), Some("New York"));
    assert_eq!(ny.get("Year"), Some("2020"));
}

#[test]
fn unified_csv_fixture_writes_every_row() {
    let h = harness(IngestConfig::new(TABLE), &[("locations.csv", fixture("locations.csv"))]);

    let stats = h.ingestor.ingest_blob(&BlobLocator::new(BUCKET, "locations.csv")).unwrap();
    assert_eq!(stats.records_written, 3);
    assert_eq!(stats.sort_keys_generated, 3);
    assert_eq!(h.store.len(TABLE), 3);
    assert!(h.store.items(TABLE).iter().all(|item| item.len() == 5));
}

#[test]
fn unified_unsupported_suffix_fails_before_fetch() {
    let h = harness(IngestConfig::new(TABLE), &[("data.txt", b"LocationAbbr\nCA\n".to_vec())]);

    let err = h.ingestor.handle_event(&event(&["data.txt"])).unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedFormat { ref key } if key == "data.txt"));
    assert_eq!(h.source.fetch_count(), 0);
    assert!(h.store.is_empty(TABLE));
}

#[test]
fn unified_format_detection_is_suffix_based() {
    assert_eq!(IngestionFormat::from_key("a/b/c.json").unwrap(), IngestionFormat::Json);
    assert_eq!(IngestionFormat::from_key("c.csv").unwrap(), IngestionFormat::Csv);
    for key in ["data.txt", "noext", "data.CSV", "data.json.gz", "json"] {
        assert!(matches!(
            IngestionFormat::from_key(key),
            Err(IngestError::UnsupportedFormat { .. })
        ));
    }
}

#[test]
fn unified_malformed_json_fails_at_parse_time() {
    let h = harness(IngestConfig::new(TABLE), &[("bad.json", b"LocationAbbr,Value\nCA,1\n".to_vec())]);

    let err = h.ingestor.handle_event(&event(&["bad.json"])).unwrap_err();
    assert!(err.is_parse_error());
    assert_eq!(h.source.fetch_count(), 1);
    assert!(h.store.is_empty(TABLE));
}

#[test]
fn unified_non_utf8_payload_is_malformed() {
    let h = harness(IngestConfig::new(TABLE), &[("bin.csv", vec![0xff, 0xfe, b'\n'])]);
    let err = h.ingestor.handle_event(&event(&["bin.csv"])).unwrap_err();
    assert!(matches!(err, IngestError::MalformedPayload { .. }));
}

#[test]
fn unified_missing_object_is_fetch_failure() {
    let h = harness(IngestConfig::new(TABLE), &[]);
    let err = h.ingestor.handle_event(&event(&["gone.csv"])).unwrap_err();
    match err {
        IngestError::FetchFailed { locator, source } => {
            assert_eq!(locator, "uploads/gone.csv");
            assert!(matches!(source, FetchError::NotFound));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unified_write_failure_aborts_remaining_records() {
    let config = IngestConfig::new(TABLE);
    let source = Arc::new(InMemoryBlobSource::new().with_blob(BUCKET, "locations.csv", fixture("locations.csv")));
    let store = Arc::new(FailingStore {
        inner: InMemoryStore::new(config.keys.clone()),
        limit: 1,
        attempts: AtomicUsize::new(0),
    });
    let ingestor = Ingestor::new(config, source, store.clone());

    let err = ingestor.handle_event(&event(&["locations.csv"])).unwrap_err();
    match err {
        IngestError::WriteFailed { record, source } => {
            assert_eq!(record, 2);
            assert_eq!(source, StoreError::Unavailable("throttled".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.attempts.load(Ordering::SeqCst), 2);
    assert_eq!(store.inner.len(TABLE), 1);
}

#[test]
fn unified_reingest_with_explicit_sort_keys_is_idempotent() {
    let payload = br#"[{"LocationAbbr":"CA","SortKey":"a","v":"1"},{"LocationAbbr":"CA","SortKey":"b","v":"2"}]"#;
    let h = harness(IngestConfig::new(TABLE), &[("keys.json", payload.to_vec())]);

    h.ingestor.handle_event(&event(&["keys.json"])).unwrap();
    let first = h.store.items(TABLE);
    h.ingestor.handle_event(&event(&["keys.json"])).unwrap();

    assert_eq!(h.store.len(TABLE), 2);
    assert_eq!(h.store.items(TABLE), first);
    assert_eq!(h.store.put_count(), 4);
}

#[test]
fn unified_reingest_with_generated_sort_keys_duplicates_items() {
    let h = harness(IngestConfig::new(TABLE), &[("nokeys.csv", b"LocationAbbr,v\nCA,1\nNY,2\n".to_vec())]);

    h.ingestor.handle_event(&event(&["nokeys.csv"])).unwrap();
    h.ingestor.handle_event(&event(&["nokeys.csv"])).unwrap();

    // Each retry mints new sort keys, so the same rows land twice.
    assert_eq!(h.store.len(TABLE), 4);
}

#[test]
fn unified_first_record_selection_ignores_later_entries() {
    let h = harness(
        IngestConfig::new(TABLE),
        &[
            ("a.json", br#"[{"LocationAbbr":"CA","SortKey":"1"}]"#.to_vec()),
            ("b.json", br#"[{"LocationAbbr":"NY","SortKey":"1"}]"#.to_vec()),
        ],
    );

    h.ingestor.handle_event(&event(&["a.json", "b.json"])).unwrap();
    assert_eq!(h.source.fetch_count(), 1);
    assert!(h.store.get(TABLE, "CA", "1").is_some());
    assert!(h.store.get(TABLE, "NY", "1").is_none());
}

#[test]
fn unified_all_record_selection_processes_every_entry() {
    let h = harness(
        IngestConfig::new(TABLE).with_record_selection(RecordSelection::All),
        &[
            ("a.json", br#"[{"LocationAbbr":"CA","SortKey":"1"}]"#.to_vec()),
            ("b.csv", b"LocationAbbr,SortKey\nNY,1\n".to_vec()),
        ],
    );

    h.ingestor.handle_event(&event(&["a.json", "b.csv"])).unwrap();
    assert_eq!(h.store.len(TABLE), 2);
    assert!(h.store.get(TABLE, "NY", "1").is_some());
}

#[test]
fn unified_empty_event_is_invalid() {
    let h = harness(IngestConfig::new(TABLE), &[]);
    let err = h.ingestor.handle_event(&S3Event::default()).unwrap_err();
    assert!(matches!(err, IngestError::InvalidEvent { .. }));
}

#[test]
fn unified_fs_source_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join(BUCKET)).unwrap();
    std::fs::write(dir.path().join(BUCKET).join("locations.csv"), fixture("locations.csv")).unwrap();

    let config = IngestConfig::new(TABLE);
    let store = Arc::new(InMemoryStore::new(config.keys.clone()));
    let ingestor = Ingestor::new(config, Arc::new(FsBlobSource::new(dir.path())), store.clone());

    let event: S3Event = serde_json::from_str(
        r#"{"Records":[{"s3":{"bucket":{"name":"uploads"},"object":{"key":"locations.csv"}}}]}"#,
    )
    .unwrap();
    ingestor.handle_event(&event).unwrap();
    assert_eq!(store.len(TABLE), 3);
}
