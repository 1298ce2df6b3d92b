//! Emsync: Remote File Tree Synchronization
//!
//! Synchronizes a remote host's reported file tree into a local
//! content-addressable object store. Unchanged content is never
//! re-transferred and unchanged directory structures are never rebuilt:
//! raw content hashes are mapped to store blob hashes through a persistent
//! reference namespace, and whole manifests are memoized by their canonical
//! hash so a sync against an unchanged host is a pure cache hit.

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod manifest;
pub mod store;
pub mod sync;
pub mod types;
