//! Manifest model and canonicalization.
//!
//! A manifest is the host's flat mapping of relative file paths to reported
//! content hashes at a point in time. Canonicalization produces a stable
//! byte representation (sorted `"<hash> <path>\n"` lines) whose BLAKE3 hash
//! identifies the manifest for memoization: two manifests with identical
//! entry sets hash identically regardless of source ordering.

use crate::error::SyncError;
use crate::types::Hash;
use blake3::Hasher;
use std::collections::BTreeMap;

/// One file reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// `/`-delimited relative path, no leading slash
    pub path: String,
    /// Lowercase hex digest of the raw content, as reported by the host
    pub content_hash: String,
}

/// Ordered-by-path set of manifest entries, paths unique
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Build a manifest from the host's `files` object.
    ///
    /// Each path maps to a set of digests keyed by algorithm name; the
    /// `SHA1` digest is preferred, otherwise the first algorithm entry is
    /// taken. Digest values are lowercased and validated as hex.
    pub fn from_files(
        files: BTreeMap<String, BTreeMap<String, String>>,
    ) -> Result<Self, SyncError> {
        let mut entries = Vec::with_capacity(files.len());

        for (path, digests) in files {
            validate_path(&path)?;

            let digest = digests
                .get("SHA1")
                .or_else(|| digests.values().next())
                .ok_or_else(|| {
                    SyncError::InvalidManifest(format!("no content digest for path {:?}", path))
                })?;
            let content_hash = validate_digest(&path, digest)?;

            entries.push(ManifestEntry { path, content_hash });
        }

        // BTreeMap iteration yields paths in byte-lexicographic order already
        Ok(Self { entries })
    }

    /// Build a manifest from pre-resolved entries in any order.
    ///
    /// Entries are sorted by path; a duplicate path is a contract violation
    /// of the source and is rejected.
    pub fn from_entries(mut entries: Vec<ManifestEntry>) -> Result<Self, SyncError> {
        for entry in &mut entries {
            validate_path(&entry.path)?;
            entry.content_hash = validate_digest(&entry.path, &entry.content_hash)?;
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));

        for pair in entries.windows(2) {
            if pair[0].path == pair[1].path {
                return Err(SyncError::InvalidManifest(format!(
                    "duplicate path {:?}",
                    pair[0].path
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Entries sorted by path
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deterministic byte representation: sorted `"<hash> <path>\n"` lines
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        for entry in &self.entries {
            bytes.extend_from_slice(entry.content_hash.as_bytes());
            bytes.push(b' ');
            bytes.extend_from_slice(entry.path.as_bytes());
            bytes.push(b'\n');
        }
        bytes
    }

    /// BLAKE3 hash of the canonical byte representation
    pub fn hash(&self) -> Hash {
        let mut hasher = Hasher::new();
        hasher.update(&self.canonical_bytes());
        *hasher.finalize().as_bytes()
    }
}

fn validate_path(path: &str) -> Result<(), SyncError> {
    if path.is_empty() {
        return Err(SyncError::InvalidManifest("empty path".to_string()));
    }
    if path.starts_with('/') || path.ends_with('/') {
        return Err(SyncError::InvalidManifest(format!(
            "path {:?} must be relative with no trailing slash",
            path
        )));
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(SyncError::InvalidManifest(format!(
                "path {:?} contains an empty segment",
                path
            )));
        }
    }
    Ok(())
}

fn validate_digest(path: &str, digest: &str) -> Result<String, SyncError> {
    let digest = digest.to_ascii_lowercase();
    if digest.len() < 4 || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(SyncError::InvalidManifest(format!(
            "invalid content digest {:?} for path {:?}",
            digest, path
        )));
    }
    Ok(digest)
}
