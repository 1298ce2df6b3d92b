//! Error types for the remote file tree synchronizer.
//!
//! A missing reference is not represented here: lookups return
//! `Option::None` on miss, which the orchestrator interprets as "must
//! build". Every variant below is fatal for the whole sync.

use thiserror::Error;

/// Failures that abort a sync invocation
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to download manifest from {host}: {reason}")]
    ManifestFetch { host: String, reason: String },

    #[error("Failed to download {path}: {reason}")]
    BlobDownload { path: String, reason: String },

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("No authentication provided: supply a token, an access key, or a username and password")]
    AuthenticationMissing,

    #[error("Object store error: {0}")]
    Store(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<sled::Error> for SyncError {
    fn from(err: sled::Error) -> Self {
        SyncError::Store(err.to_string())
    }
}

impl From<config::ConfigError> for SyncError {
    fn from(err: config::ConfigError) -> Self {
        SyncError::Config(err.to_string())
    }
}
