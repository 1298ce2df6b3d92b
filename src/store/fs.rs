//! Filesystem-backed object store.
//!
//! Objects are loose files under `objects/<aa>/<rest>`, written through a
//! temp file and renamed into place so a partially written object is never
//! visible under its hash. References live in a sled database, which is
//! safe under concurrent writers for distinct keys.

use crate::error::SyncError;
use crate::host::ByteStream;
use crate::store::{encode_tree, tree_hash, ObjectStore, TreeEntry};
use crate::types::{Hash, HASH_LEN};
use async_trait::async_trait;
use futures::StreamExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Sled-backed reference namespace plus loose object files
pub struct FsObjectStore {
    objects_dir: PathBuf,
    refs: sled::Db,
}

impl FsObjectStore {
    /// Open (creating if needed) an object store rooted at the given path
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, SyncError> {
        let root = root.as_ref();
        let objects_dir = root.join("objects");
        std::fs::create_dir_all(&objects_dir)?;

        let refs = sled::open(root.join("refs"))?;
        debug!(root = %root.display(), "Opened object store");

        Ok(Self { objects_dir, refs })
    }

    fn object_path(&self, hash: &Hash) -> PathBuf {
        let hex = hex::encode(hash);
        self.objects_dir.join(&hex[..2]).join(&hex[2..])
    }

    /// Read a stored object's bytes
    pub fn read_object(&self, hash: &Hash) -> Result<Option<Vec<u8>>, SyncError> {
        match std::fs::read(self.object_path(hash)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SyncError::Io(e)),
        }
    }

    fn persist_object(&self, hash: &Hash, mut tmp: tempfile::NamedTempFile) -> Result<(), SyncError> {
        let path = self.object_path(hash);
        if path.exists() {
            // Content-addressed: an existing object already holds these bytes
            trace!(hash = %hex::encode(hash), "Object already present");
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        tmp.flush()?;
        tmp.persist(&path).map_err(|e| SyncError::Io(e.error))?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn write_blob(&self, mut stream: ByteStream) -> Result<Hash, SyncError> {
        let mut hasher = crate::store::blob_hasher();
        let mut tmp = tempfile::NamedTempFile::new_in(&self.objects_dir)?;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            hasher.update(&chunk);
            tmp.write_all(&chunk)?;
        }

        let hash = *hasher.finalize().as_bytes();
        self.persist_object(&hash, tmp)?;
        trace!(hash = %hex::encode(hash), "Wrote blob");
        Ok(hash)
    }

    fn write_tree(&self, entries: &[TreeEntry]) -> Result<Hash, SyncError> {
        let payload = encode_tree(entries);
        let hash = tree_hash(&payload);

        let mut tmp = tempfile::NamedTempFile::new_in(&self.objects_dir)?;
        tmp.write_all(&payload)?;
        self.persist_object(&hash, tmp)?;
        trace!(hash = %hex::encode(hash), entry_count = entries.len(), "Wrote tree");
        Ok(hash)
    }

    fn read_ref(&self, name: &str) -> Result<Option<Hash>, SyncError> {
        match self.refs.get(name.as_bytes())? {
            Some(value) => {
                if value.len() != HASH_LEN {
                    return Err(SyncError::Store(format!(
                        "corrupt reference {:?}: expected {} bytes, found {}",
                        name,
                        HASH_LEN,
                        value.len()
                    )));
                }
                let mut hash = [0u8; HASH_LEN];
                hash.copy_from_slice(&value);
                Ok(Some(hash))
            }
            None => Ok(None),
        }
    }

    fn write_ref(&self, name: &str, hash: &Hash) -> Result<(), SyncError> {
        self.refs.insert(name.as_bytes(), hash.as_slice())?;
        self.refs.flush()?;
        Ok(())
    }
}
