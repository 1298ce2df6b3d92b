//! Shared test utilities for integration tests
//!
//! Provides an in-memory host that serves a fixed file set and counts every
//! manifest and content fetch, so tests can assert on cache behavior.

use async_trait::async_trait;
use bytes::Bytes;
use emsync::error::SyncError;
use emsync::host::{ByteStream, Host};
use emsync::manifest::{Manifest, ManifestEntry};
use futures::stream;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory host serving a fixed path-to-content mapping
pub struct InMemoryHost {
    files: BTreeMap<String, Vec<u8>>,
    manifest_fetches: AtomicUsize,
    file_fetches: Mutex<HashMap<String, usize>>,
}

impl InMemoryHost {
    pub fn new(files: &[(&str, &[u8])]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(path, content)| (path.to_string(), content.to_vec()))
                .collect(),
            manifest_fetches: AtomicUsize::new(0),
            file_fetches: Mutex::new(HashMap::new()),
        }
    }

    /// Raw content hash the host reports for given bytes
    pub fn raw_hash(content: &[u8]) -> String {
        hex::encode(blake3::hash(content).as_bytes())
    }

    pub fn manifest_fetch_count(&self) -> usize {
        self.manifest_fetches.load(Ordering::SeqCst)
    }

    pub fn file_fetch_count(&self, path: &str) -> usize {
        self.file_fetches.lock().get(path).copied().unwrap_or(0)
    }

    pub fn file_fetch_total(&self) -> usize {
        self.file_fetches.lock().values().sum()
    }
}

#[async_trait]
impl Host for InMemoryHost {
    async fn fetch_manifest(&self) -> Result<Manifest, SyncError> {
        self.manifest_fetches.fetch_add(1, Ordering::SeqCst);

        let entries = self
            .files
            .iter()
            .map(|(path, content)| ManifestEntry {
                path: path.clone(),
                content_hash: Self::raw_hash(content),
            })
            .collect();
        Manifest::from_entries(entries)
    }

    async fn fetch_file(&self, path: &str) -> Result<ByteStream, SyncError> {
        *self.file_fetches.lock().entry(path.to_string()).or_insert(0) += 1;

        let content = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| SyncError::BlobDownload {
                path: path.to_string(),
                reason: "not served by test host".to_string(),
            })?;

        // Split into two chunks to exercise streaming writes
        let mid = content.len() / 2;
        let chunks = vec![
            Ok(Bytes::from(content[..mid].to_vec())),
            Ok(Bytes::from(content[mid..].to_vec())),
        ];
        Ok(stream::iter(chunks).boxed())
    }
}
