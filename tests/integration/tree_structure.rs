//! Structural correctness of the built tree objects.

use super::test_utils::InMemoryHost;
use emsync::store::{
    blob_ref_name, decode_tree, EntryKind, MemoryObjectStore, ObjectStore, TreeEntry,
};
use emsync::sync::sync;
use emsync::types::Hash;

fn child<'a>(entries: &'a [TreeEntry], name: &str) -> &'a TreeEntry {
    entries
        .iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("missing child {:?}", name))
}

fn read_tree(store: &MemoryObjectStore, hash: &Hash) -> Vec<TreeEntry> {
    decode_tree(&store.object(hash).expect("tree object must exist")).unwrap()
}

#[tokio::test]
async fn test_nested_structure_and_child_ordering() {
    let store = MemoryObjectStore::new();
    let host = InMemoryHost::new(&[
        ("a/file2", b"file2 body"),
        ("a/b/file1", b"file1 body"),
    ]);

    let root = sync(&store, &host).await.unwrap();

    let root_entries = read_tree(&store, &root);
    assert_eq!(root_entries.len(), 1);
    assert_eq!(root_entries[0].name, "a");
    assert_eq!(root_entries[0].kind, EntryKind::Tree);

    let a_entries = read_tree(&store, &root_entries[0].hash);
    let names: Vec<_> = a_entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["b", "file2"], "children sorted by name");
    assert_eq!(child(&a_entries, "b").kind, EntryKind::Tree);
    assert_eq!(child(&a_entries, "file2").kind, EntryKind::Blob);

    let b_entries = read_tree(&store, &child(&a_entries, "b").hash);
    assert_eq!(b_entries.len(), 1);
    assert_eq!(b_entries[0].name, "file1");
    assert_eq!(b_entries[0].kind, EntryKind::Blob);
}

#[tokio::test]
async fn test_leaf_blobs_hold_resolved_store_hashes() {
    let store = MemoryObjectStore::new();
    let host = InMemoryHost::new(&[("a/b/file1", b"file1 body"), ("a/file2", b"file2 body")]);

    let root = sync(&store, &host).await.unwrap();

    let root_entries = read_tree(&store, &root);
    let a_entries = read_tree(&store, &child(&root_entries, "a").hash);
    let file2 = child(&a_entries, "file2");

    let raw = InMemoryHost::raw_hash(b"file2 body");
    let mapped = store.read_ref(&blob_ref_name(&raw)).unwrap().unwrap();
    assert_eq!(file2.hash, mapped);
    assert_eq!(store.object(&file2.hash).unwrap(), b"file2 body");
}

#[tokio::test]
async fn test_root_hash_independent_of_manifest_order() {
    // Same file set served twice; the host's manifest is sorted either way,
    // so both runs against fresh stores must agree on the root hash.
    let first_store = MemoryObjectStore::new();
    let second_store = MemoryObjectStore::new();

    let files: [(&str, &[u8]); 3] = [
        ("z/last", b"z body"),
        ("a/first", b"a body"),
        ("middle", b"m body"),
    ];
    let host = InMemoryHost::new(&files);

    let first = sync(&first_store, &host).await.unwrap();
    let second = sync(&second_store, &host).await.unwrap();

    assert_eq!(first, second);
}
