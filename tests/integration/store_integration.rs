//! Full sync against the filesystem-backed store.

use super::test_utils::InMemoryHost;
use emsync::store::{decode_tree, FsObjectStore};
use emsync::sync::sync;
use tempfile::TempDir;

#[tokio::test]
async fn test_sync_writes_loose_objects_and_refs() {
    let temp_dir = TempDir::new().unwrap();
    let store = FsObjectStore::open(temp_dir.path()).unwrap();
    let host = InMemoryHost::new(&[("a/file.txt", b"file body")]);

    let root = sync(&store, &host).await.unwrap();

    let root_bytes = store.read_object(&root).unwrap().unwrap();
    let entries = decode_tree(&root_bytes).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "a");

    let hex = hex::encode(root);
    let object_file = temp_dir
        .path()
        .join("objects")
        .join(&hex[..2])
        .join(&hex[2..]);
    assert!(object_file.is_file());
}

#[tokio::test]
async fn test_cache_survives_store_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let host = InMemoryHost::new(&[("a/file.txt", b"file body"), ("b.txt", b"other")]);

    let first = {
        let store = FsObjectStore::open(temp_dir.path()).unwrap();
        sync(&store, &host).await.unwrap()
    };
    let fetched_after_first = host.file_fetch_total();

    // Fresh process, same store directory
    let store = FsObjectStore::open(temp_dir.path()).unwrap();
    let second = sync(&store, &host).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(host.file_fetch_total(), fetched_after_first);
}

#[tokio::test]
async fn test_memory_and_fs_stores_agree_on_root() {
    let temp_dir = TempDir::new().unwrap();
    let fs_store = FsObjectStore::open(temp_dir.path()).unwrap();
    let memory_store = emsync::store::MemoryObjectStore::new();

    let files: [(&str, &[u8]); 2] = [("a/file2", b"file2 body"), ("a/b/file1", b"file1 body")];

    let from_fs = sync(&fs_store, &InMemoryHost::new(&files)).await.unwrap();
    let from_memory = sync(&memory_store, &InMemoryHost::new(&files))
        .await
        .unwrap();

    assert_eq!(from_fs, from_memory);
}
