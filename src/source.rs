//! Fetch interface: resolves a [`BlobLocator`] to raw bytes.
//!
//! The object store itself is an external collaborator. [`InMemoryBlobSource`] and
//! [`FsBlobSource`] cover tests and local runs.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use crate::types::BlobLocator;

/// Reasons a blob cannot be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No object exists at the locator.
    #[error("object not found")]
    NotFound,

    /// The caller may not read the object.
    #[error("access denied")]
    AccessDenied,

    /// Any other transport failure.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Blocking blob retrieval.
pub trait BlobSource: Send + Sync {
    /// Fetch the full content of one blob.
    fn fetch(&self, locator: &BlobLocator) -> Result<Vec<u8>, FetchError>;
}

/// Blob source backed by a map; used by tests and benches.
#[derive(Debug, Default)]
pub struct InMemoryBlobSource {
    blobs: RwLock<HashMap<BlobLocator, Vec<u8>>>,
    fetches: AtomicUsize,
}

impl InMemoryBlobSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a blob.
    pub fn put(&self, locator: BlobLocator, content: impl Into<Vec<u8>>) {
        if let Ok(mut blobs) = self.blobs.write() {
            blobs.insert(locator, content.into());
        }
    }

    /// Builder form of [`Self::put`].
    pub fn with_blob(self, container: &str, key: &str, content: impl Into<Vec<u8>>) -> Self {
        self.put(BlobLocator::new(container, key), content);
        self
    }

    /// Number of `fetch` calls served so far (successful or not).
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl BlobSource for InMemoryBlobSource {
    fn fetch(&self, locator: &BlobLocator) -> Result<Vec<u8>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let blobs = self
            .blobs
            .read()
            .map_err(|_| FetchError::Io(io::Error::other("blob map lock poisoned")))?;
        blobs.get(locator).cloned().ok_or(FetchError::NotFound)
    }
}

/// Blob source rooted at a local directory: `{root}/{container}/{key}`.
#[derive(Debug, Clone)]
pub struct FsBlobSource {
    root: PathBuf,
}

impl FsBlobSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Resolve a locator to a path under the root.
    ///
    /// Containers and keys must be relative and may not climb out of the root.
    pub fn resolve(&self, locator: &BlobLocator) -> Result<PathBuf, FetchError> {
        let mut path = self.root.clone();
        for part in [locator.container.as_str(), locator.key.as_str()] {
            let rel = Path::new(part);
            if part.is_empty() || !rel.components().all(|c| matches!(c, Component::Normal(_))) {
                return Err(FetchError::AccessDenied);
            }
            path.push(rel);
        }
        Ok(path)
    }
}

impl BlobSource for FsBlobSource {
    fn fetch(&self, locator: &BlobLocator) -> Result<Vec<u8>, FetchError> {
        let path = self.resolve(locator)?;
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound,
            io::ErrorKind::PermissionDenied => FetchError::AccessDenied,
            _ => FetchError::Io(e),
        })
    }
}
