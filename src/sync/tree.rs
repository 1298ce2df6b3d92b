//! Tree construction and serialization.
//!
//! The builder converts the sorted flat path list into a nested directory
//! structure with resolved blobs at the leaves; the writer serializes it
//! into the store bottom-up. Construction is a pure function of the sorted
//! manifest: the same entry set always yields an isomorphic tree and an
//! identical root hash, because each directory's children are held in a
//! name-ordered map regardless of insertion order.

use crate::error::SyncError;
use crate::manifest::Manifest;
use crate::store::{EntryKind, ObjectStore, TreeEntry};
use crate::sync::blobs::BlobResolver;
use crate::types::Hash;
use std::collections::{BTreeMap, BTreeSet};

/// A node in the in-memory tree being assembled.
///
/// Directories own their children exclusively; blobs hold an opaque store
/// hash, not content. The whole graph is transient work state, discarded
/// after writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Directory(BTreeMap<String, TreeNode>),
    Blob(Hash),
}

/// Assemble the nested tree for a manifest, resolving every blob.
///
/// Name collisions (a path that implies both a file and a directory at the
/// same name) are rejected before any content is fetched.
pub async fn build_tree(
    manifest: &Manifest,
    resolver: &mut BlobResolver<'_>,
) -> Result<TreeNode, SyncError> {
    check_collisions(manifest)?;

    let mut root = BTreeMap::new();
    for entry in manifest.entries() {
        let blob = resolver.resolve(entry).await?;
        insert_blob(&mut root, &entry.path, blob)?;
    }

    Ok(TreeNode::Directory(root))
}

/// Serialize a tree into the store bottom-up and return its hash.
///
/// Blobs are already store hashes; each directory is written as its sorted
/// (name, kind, hash) triple list after all children.
pub fn write_tree(store: &dyn ObjectStore, node: &TreeNode) -> Result<Hash, SyncError> {
    match node {
        TreeNode::Blob(hash) => Ok(*hash),
        TreeNode::Directory(children) => {
            let mut entries = Vec::with_capacity(children.len());
            for (name, child) in children {
                let kind = match child {
                    TreeNode::Blob(_) => EntryKind::Blob,
                    TreeNode::Directory(_) => EntryKind::Tree,
                };
                let hash = write_tree(store, child)?;
                entries.push(TreeEntry {
                    name: name.clone(),
                    kind,
                    hash,
                });
            }
            store.write_tree(&entries)
        }
    }
}

/// Reject manifests where one name is used as both a file and a directory.
///
/// Sorted order does not make such pairs adjacent (`x!` sorts between `x`
/// and `x/y`), so this walks every path's directory prefixes.
fn check_collisions(manifest: &Manifest) -> Result<(), SyncError> {
    let mut files: BTreeSet<&str> = BTreeSet::new();
    let mut directories: BTreeSet<&str> = BTreeSet::new();

    for entry in manifest.entries() {
        let path = entry.path.as_str();

        let mut end = 0;
        while let Some(offset) = path[end..].find('/') {
            end += offset;
            let prefix = &path[..end];
            if files.contains(prefix) {
                return Err(SyncError::InvalidManifest(format!(
                    "{:?} is both a file and a directory",
                    prefix
                )));
            }
            directories.insert(prefix);
            end += 1;
        }

        if directories.contains(path) {
            return Err(SyncError::InvalidManifest(format!(
                "{:?} is both a file and a directory",
                path
            )));
        }
        files.insert(path);
    }

    Ok(())
}

fn insert_blob(
    root: &mut BTreeMap<String, TreeNode>,
    path: &str,
    blob: Hash,
) -> Result<(), SyncError> {
    let mut dir = root;
    let mut segments = path.split('/').peekable();

    while let Some(segment) = segments.next() {
        if segments.peek().is_some() {
            let node = dir
                .entry(segment.to_string())
                .or_insert_with(|| TreeNode::Directory(BTreeMap::new()));
            dir = match node {
                TreeNode::Directory(children) => children,
                TreeNode::Blob(_) => {
                    return Err(SyncError::InvalidManifest(format!(
                        "{:?} is both a file and a directory",
                        segment
                    )))
                }
            };
        } else {
            if dir.contains_key(segment) {
                return Err(SyncError::InvalidManifest(format!(
                    "{:?} is both a file and a directory",
                    path
                )));
            }
            dir.insert(segment.to_string(), TreeNode::Blob(blob));
        }
    }

    Ok(())
}
