//! Trigger event and invocation response shapes.
//!
//! The event mirrors the object-store notification payload (`{"Records": [{"s3": {...}}]}`).
//! Only the fields needed to build a [`BlobLocator`] are modelled; everything else is
//! ignored on deserialization.

use serde::{Deserialize, Serialize};

use crate::config::RecordSelection;
use crate::error::{IngestError, IngestResult};
use crate::types::BlobLocator;

/// Object-store notification event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

/// One notification entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3EventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,
    #[serde(default)]
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Entity {
    #[serde(default)]
    pub bucket: S3Bucket,
    #[serde(default)]
    pub object: S3Object,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Bucket {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Object {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
}

impl S3Event {
    /// Build an event with one entry per `(bucket, key)` pair.
    pub fn for_objects<'a>(objects: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let records = objects
            .into_iter()
            .map(|(bucket, key)| S3EventRecord {
                s3: S3Entity {
                    bucket: S3Bucket {
                        name: Some(bucket.to_string()),
                    },
                    object: S3Object {
                        key: Some(key.to_string()),
                        ..Default::default()
                    },
                },
                ..Default::default()
            })
            .collect();
        Self { records }
    }

    /// Extract the blob locators to ingest.
    ///
    /// With [`RecordSelection::First`] only `Records[0]` is returned and any further entries
    /// are logged as skipped. Object keys are used verbatim.
    pub fn locators(&self, selection: RecordSelection) -> IngestResult<Vec<BlobLocator>> {
        if self.records.is_empty() {
            return Err(IngestError::InvalidEvent {
                message: "event has no records".to_string(),
            });
        }

        let take = match selection {
            RecordSelection::First => {
                if self.records.len() > 1 {
                    log::warn!(
                        "event carries {} records; only the first is processed",
                        self.records.len()
                    );
                }
                1
            }
            RecordSelection::All => self.records.len(),
        };

        self.records
            .iter()
            .take(take)
            .enumerate()
            .map(|(idx, record)| record.locator(idx))
            .collect()
    }
}

impl S3EventRecord {
    fn locator(&self, idx: usize) -> IngestResult<BlobLocator> {
        let missing = |what: &str| IngestError::InvalidEvent {
            message: format!("record {idx} has no {what}"),
        };
        let bucket = self
            .s3
            .bucket
            .name
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing("bucket name"))?;
        let key = self
            .s3
            .object
            .key
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing("object key"))?;
        Ok(BlobLocator::new(bucket, key))
    }
}

/// Result returned to the hosting runtime on full success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    /// The fixed success response.
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: "Success".to_string(),
        }
    }
}
