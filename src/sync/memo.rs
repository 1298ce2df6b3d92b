//! Manifest memoization over the store's reference namespace.
//!
//! Once a manifest has been fully synchronized, its hash maps to the root
//! tree hash under `trees/<aa>/<rest>`. A later sync of an identical
//! manifest resolves entirely from this mapping.

use crate::error::SyncError;
use crate::store::{tree_ref_name, ObjectStore};
use crate::types::Hash;
use tracing::debug;

/// Root tree hash already recorded for this manifest hash, if any
pub fn lookup_root(
    store: &dyn ObjectStore,
    manifest_hash: &Hash,
) -> Result<Option<Hash>, SyncError> {
    let name = tree_ref_name(manifest_hash);
    let found = store.read_ref(&name)?;
    debug!(reference = %name, hit = found.is_some(), "Manifest memo lookup");
    Ok(found)
}

/// Record the manifest-hash to root-hash mapping after a successful build
pub fn record_root(
    store: &dyn ObjectStore,
    manifest_hash: &Hash,
    root: &Hash,
) -> Result<(), SyncError> {
    store.write_ref(&tree_ref_name(manifest_hash), root)
}
