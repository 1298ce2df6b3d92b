//! Core hash types shared across the store and sync layers.

/// Store hash: 32-byte BLAKE3 output identifying a blob or tree object.
pub type Hash = [u8; 32];

/// Length in bytes of a store hash.
pub const HASH_LEN: usize = 32;
