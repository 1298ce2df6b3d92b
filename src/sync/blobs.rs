//! Blob resolution and caching.
//!
//! Resolves a reported raw content hash to a store blob hash through the
//! `blobs/<aa>/<rest>` reference namespace. A hit costs nothing; a miss
//! streams the file content from the host into the store and persists the
//! mapping, so identical content across any number of paths and runs is
//! fetched at most once.

use crate::error::SyncError;
use crate::host::Host;
use crate::manifest::ManifestEntry;
use crate::store::{blob_ref_name, ObjectStore};
use crate::types::Hash;
use tracing::info;

pub struct BlobResolver<'a> {
    store: &'a dyn ObjectStore,
    host: &'a dyn Host,
    total: usize,
    seen: usize,
}

impl<'a> BlobResolver<'a> {
    pub fn new(store: &'a dyn ObjectStore, host: &'a dyn Host, total: usize) -> Self {
        Self {
            store,
            host,
            total,
            seen: 0,
        }
    }

    /// Resolve one manifest entry to its store blob hash, downloading the
    /// content only if no mapping exists yet.
    pub async fn resolve(&mut self, entry: &ManifestEntry) -> Result<Hash, SyncError> {
        self.seen += 1;
        let reference = blob_ref_name(&entry.content_hash);

        if let Some(hash) = self.store.read_ref(&reference)? {
            info!(
                progress = %format!("{}/{}", self.seen, self.total),
                path = %entry.path,
                blob = %hex::encode(hash),
                "Existing blob"
            );
            return Ok(hash);
        }

        info!(
            progress = %format!("{}/{}", self.seen, self.total),
            path = %entry.path,
            "Downloading"
        );

        let stream = self.host.fetch_file(&entry.path).await?;
        let hash = self.store.write_blob(stream).await?;
        self.store.write_ref(&reference, &hash)?;

        Ok(hash)
    }
}
