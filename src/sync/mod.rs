//! Sync orchestration.
//!
//! One invocation runs the pipeline:
//! fetch manifest → canonicalize & hash → memo lookup (hit returns the
//! cached root) → build tree, resolving every blob → write tree → record
//! memo → return root hash. Any failure aborts the whole invocation;
//! blobs and references already written stay in place and are reused on
//! retry because they are content-addressed.

use crate::error::SyncError;
use crate::host::Host;
use crate::store::ObjectStore;
use crate::types::Hash;
use tracing::{debug, info};

pub mod blobs;
pub mod memo;
pub mod tree;

pub use blobs::BlobResolver;
pub use tree::TreeNode;

/// Synchronize the host's reported file tree into the store and return the
/// root tree hash.
pub async fn sync(store: &dyn ObjectStore, host: &dyn Host) -> Result<Hash, SyncError> {
    info!("Downloading site manifest");
    let manifest = host.fetch_manifest().await?;

    let manifest_hash = manifest.hash();
    debug!(
        manifest_hash = %hex::encode(manifest_hash),
        entry_count = manifest.len(),
        "Canonicalized manifest"
    );

    if let Some(root) = memo::lookup_root(store, &manifest_hash)? {
        info!(root = %hex::encode(root), "Manifest unchanged, reusing existing tree");
        return Ok(root);
    }

    let mut resolver = BlobResolver::new(store, host, manifest.len());
    let root_node = tree::build_tree(&manifest, &mut resolver).await?;

    let root = tree::write_tree(store, &root_node)?;
    memo::record_root(store, &manifest_hash, &root)?;

    info!(root = %hex::encode(root), "Sync complete");
    Ok(root)
}
