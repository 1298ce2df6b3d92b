//! End-to-end sync pipeline behavior: memoization, dedup, and rejection.

use super::test_utils::InMemoryHost;
use emsync::error::SyncError;
use emsync::store::{blob_ref_name, empty_tree_hash, tree_ref_name, MemoryObjectStore, ObjectStore};
use emsync::sync::{memo, sync};

#[tokio::test]
async fn test_empty_manifest_yields_canonical_empty_tree() {
    let store = MemoryObjectStore::new();
    let host = InMemoryHost::new(&[]);

    let root = sync(&store, &host).await.unwrap();

    assert_eq!(root, empty_tree_hash());
    assert_eq!(host.file_fetch_total(), 0);
}

#[tokio::test]
async fn test_identical_content_downloaded_once() {
    let store = MemoryObjectStore::new();
    let host = InMemoryHost::new(&[
        ("a/copy1.txt", b"same bytes"),
        ("b/copy2.txt", b"same bytes"),
        ("b/other.txt", b"different bytes"),
    ]);

    sync(&store, &host).await.unwrap();

    // Two distinct raw hashes, so two downloads total across three paths
    assert_eq!(host.file_fetch_total(), 2);
    assert_eq!(
        host.file_fetch_count("a/copy1.txt") + host.file_fetch_count("b/copy2.txt"),
        1
    );
}

#[tokio::test]
async fn test_rerun_is_pure_cache_hit() {
    let store = MemoryObjectStore::new();
    let host = InMemoryHost::new(&[("a/file.txt", b"content"), ("b/file.txt", b"more")]);

    let first = sync(&store, &host).await.unwrap();
    let fetched_after_first = host.file_fetch_total();

    let second = sync(&store, &host).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(host.manifest_fetch_count(), 2);
    assert_eq!(
        host.file_fetch_total(),
        fetched_after_first,
        "second run must not download any content"
    );
}

#[tokio::test]
async fn test_preseeded_memo_short_circuits_build() {
    let store = MemoryObjectStore::new();
    let host = InMemoryHost::new(&[("a/file.txt", b"content")]);

    let manifest = {
        use emsync::host::Host;
        host.fetch_manifest().await.unwrap()
    };
    let cached_root = [7u8; 32];
    memo::record_root(&store, &manifest.hash(), &cached_root).unwrap();

    let root = sync(&store, &host).await.unwrap();

    assert_eq!(root, cached_root);
    assert_eq!(host.file_fetch_total(), 0);
    assert_eq!(store.object_count(), 0, "no objects should be written");
}

#[tokio::test]
async fn test_memo_recorded_after_build() {
    let store = MemoryObjectStore::new();
    let host = InMemoryHost::new(&[("file.txt", b"content")]);

    let root = sync(&store, &host).await.unwrap();

    let manifest = {
        use emsync::host::Host;
        host.fetch_manifest().await.unwrap()
    };
    assert_eq!(
        store.read_ref(&tree_ref_name(&manifest.hash())).unwrap(),
        Some(root)
    );
}

#[tokio::test]
async fn test_blob_mappings_recorded() {
    let store = MemoryObjectStore::new();
    let content: &[u8] = b"content";
    let host = InMemoryHost::new(&[("file.txt", content)]);

    sync(&store, &host).await.unwrap();

    let raw = InMemoryHost::raw_hash(content);
    let mapped = store.read_ref(&blob_ref_name(&raw)).unwrap().unwrap();
    assert_eq!(store.object(&mapped).unwrap(), content);
}

#[tokio::test]
async fn test_file_directory_collision_rejected_before_download() {
    let store = MemoryObjectStore::new();
    let host = InMemoryHost::new(&[("x", b"file body"), ("x/y", b"nested body")]);

    let result = sync(&store, &host).await;

    assert!(matches!(result, Err(SyncError::InvalidManifest(_))));
    assert_eq!(host.file_fetch_total(), 0);
}

#[tokio::test]
async fn test_changed_manifest_rebuilds() {
    let store = MemoryObjectStore::new();

    let before = InMemoryHost::new(&[("file.txt", b"v1")]);
    let after = InMemoryHost::new(&[("file.txt", b"v2")]);

    let first = sync(&store, &before).await.unwrap();
    let second = sync(&store, &after).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(after.file_fetch_total(), 1);
}
