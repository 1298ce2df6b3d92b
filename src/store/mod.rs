//! Content-addressable object store.
//!
//! Objects (blobs and trees) are keyed by the BLAKE3 hash of their content
//! under a type domain prefix, so identical content always resolves to the
//! same store hash. Alongside the objects, the store keeps an append-only
//! reference namespace used for memoization: `blobs/<aa>/<rest>` maps a raw
//! content hash to a store blob hash, and `trees/<aa>/<rest>` maps a
//! manifest hash to a store root tree hash. A given reference, once mapped,
//! never changes value.

use crate::error::SyncError;
use crate::host::ByteStream;
use crate::types::Hash;
use async_trait::async_trait;
use blake3::Hasher;

mod fs;
mod memory;

pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;

const BLOB_DOMAIN: &[u8] = b"blob\0";
const TREE_DOMAIN: &[u8] = b"tree\0";

/// Kind of a tree child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Blob,
    Tree,
}

/// One (name, kind, hash) triple in a serialized directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub kind: EntryKind,
    pub hash: Hash,
}

/// Object store capability, passed explicitly into every component that
/// needs it so tests can substitute an in-memory implementation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write a content blob from a byte stream, without buffering the whole
    /// stream in memory, and return its store hash.
    async fn write_blob(&self, stream: ByteStream) -> Result<Hash, SyncError>;

    /// Serialize one directory level (entries sorted by name) into the
    /// store and return its hash.
    fn write_tree(&self, entries: &[TreeEntry]) -> Result<Hash, SyncError>;

    /// Look up a persisted reference. A miss is `None`, not an error.
    fn read_ref(&self, name: &str) -> Result<Option<Hash>, SyncError>;

    /// Persist a reference mapping. Idempotent: rewriting a key with the
    /// identical value is a no-op.
    fn write_ref(&self, name: &str, hash: &Hash) -> Result<(), SyncError>;
}

/// Deterministic length-prefixed encoding of a directory level.
///
/// Entries must already be sorted by name; the encoding is what gets
/// hashed, so any ordering change would change the tree hash.
pub fn encode_tree(entries: &[TreeEntry]) -> Vec<u8> {
    let mut buf = Vec::new();
    for entry in entries {
        let name = entry.name.as_bytes();
        buf.extend_from_slice(&(name.len() as u64).to_be_bytes());
        buf.extend_from_slice(name);
        buf.push(match entry.kind {
            EntryKind::Blob => b'b',
            EntryKind::Tree => b't',
        });
        buf.extend_from_slice(&entry.hash);
    }
    buf
}

/// Decode a serialized directory level back into entries
pub fn decode_tree(bytes: &[u8]) -> Result<Vec<TreeEntry>, SyncError> {
    let mut entries = Vec::new();
    let mut rest = bytes;

    while !rest.is_empty() {
        if rest.len() < 8 {
            return Err(SyncError::Store("truncated tree object".to_string()));
        }
        let name_len = u64::from_be_bytes(rest[..8].try_into().unwrap()) as usize;
        rest = &rest[8..];

        if rest.len() < name_len + 1 + 32 {
            return Err(SyncError::Store("truncated tree object".to_string()));
        }
        let name = std::str::from_utf8(&rest[..name_len])
            .map_err(|_| SyncError::Store("non-utf8 name in tree object".to_string()))?
            .to_string();
        rest = &rest[name_len..];

        let kind = match rest[0] {
            b'b' => EntryKind::Blob,
            b't' => EntryKind::Tree,
            other => {
                return Err(SyncError::Store(format!(
                    "unknown tree entry kind {:#x}",
                    other
                )))
            }
        };
        rest = &rest[1..];

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&rest[..32]);
        rest = &rest[32..];

        entries.push(TreeEntry { name, kind, hash });
    }

    Ok(entries)
}

/// Hash of a serialized tree payload
pub fn tree_hash(payload: &[u8]) -> Hash {
    let mut hasher = Hasher::new();
    hasher.update(TREE_DOMAIN);
    hasher.update(payload);
    *hasher.finalize().as_bytes()
}

/// Canonical hash of the empty tree, the root hash of an empty manifest
pub fn empty_tree_hash() -> Hash {
    tree_hash(&[])
}

/// Incremental blob hasher fed chunk by chunk while streaming
pub(crate) fn blob_hasher() -> Hasher {
    let mut hasher = Hasher::new();
    hasher.update(BLOB_DOMAIN);
    hasher
}

/// Reference name mapping a raw content hash to a store blob hash, sharded
/// by the first two hex characters to bound directory fan-out.
pub fn blob_ref_name(raw_hash: &str) -> String {
    format!("blobs/{}/{}", &raw_hash[..2], &raw_hash[2..])
}

/// Reference name mapping a manifest hash to a store root tree hash
pub fn tree_ref_name(manifest_hash: &Hash) -> String {
    let hex = hex::encode(manifest_hash);
    format!("trees/{}/{}", &hex[..2], &hex[2..])
}
