//! Integration tests for the remote file tree synchronizer

mod store_integration;
mod sync_flow;
mod test_utils;
mod tree_structure;
