//! Configuration System
//!
//! Optional `emsync.toml` file plus `EMSYNC_*` environment variable
//! overrides. The core receives already-resolved values; this layer only
//! supplies defaults the CLI can fall back to.

use crate::error::SyncError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmsyncConfig {
    /// Default host to pull from when none is given on the command line
    #[serde(default)]
    pub host: Option<String>,

    /// Object store directory
    #[serde(default = "default_store_path")]
    pub store: PathBuf,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".emsync")
}

impl Default for EmsyncConfig {
    fn default() -> Self {
        Self {
            host: None,
            store: default_store_path(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EmsyncConfig {
    /// Load configuration from an explicit file, or from `emsync.toml` in
    /// the working directory when present, with environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, SyncError> {
        let mut builder = config::Config::builder();

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path)),
            None => builder.add_source(config::File::with_name("emsync").required(false)),
        };
        builder = builder.add_source(
            config::Environment::with_prefix("EMSYNC").separator("__"),
        );

        let loaded = builder.build()?;
        Ok(loaded.try_deserialize()?)
    }
}
