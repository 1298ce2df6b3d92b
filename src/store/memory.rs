//! In-memory object store for tests.
//!
//! Same contract as the filesystem store, with everything held in maps
//! behind a mutex so tests can inspect what was written.

use crate::error::SyncError;
use crate::host::ByteStream;
use crate::store::{encode_tree, tree_hash, ObjectStore, TreeEntry};
use crate::types::Hash;
use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct Inner {
    objects: HashMap<Hash, Vec<u8>>,
    refs: HashMap<String, Hash>,
}

/// In-memory fake store, substitutable anywhere an `ObjectStore` is expected
#[derive(Default)]
pub struct MemoryObjectStore {
    inner: Mutex<Inner>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bytes for an object hash, if present
    pub fn object(&self, hash: &Hash) -> Option<Vec<u8>> {
        self.inner.lock().objects.get(hash).cloned()
    }

    /// Number of stored objects
    pub fn object_count(&self) -> usize {
        self.inner.lock().objects.len()
    }

    /// Snapshot of the reference namespace
    pub fn refs(&self) -> HashMap<String, Hash> {
        self.inner.lock().refs.clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn write_blob(&self, mut stream: ByteStream) -> Result<Hash, SyncError> {
        let mut hasher = crate::store::blob_hasher();
        let mut content = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            hasher.update(&chunk);
            content.extend_from_slice(&chunk);
        }

        let hash = *hasher.finalize().as_bytes();
        self.inner.lock().objects.insert(hash, content);
        Ok(hash)
    }

    fn write_tree(&self, entries: &[TreeEntry]) -> Result<Hash, SyncError> {
        let payload = encode_tree(entries);
        let hash = tree_hash(&payload);
        self.inner.lock().objects.insert(hash, payload);
        Ok(hash)
    }

    fn read_ref(&self, name: &str) -> Result<Option<Hash>, SyncError> {
        Ok(self.inner.lock().refs.get(name).copied())
    }

    fn write_ref(&self, name: &str, hash: &Hash) -> Result<(), SyncError> {
        self.inner.lock().refs.insert(name.to_string(), *hash);
        Ok(())
    }
}
