//! CLI definitions and credential resolution.
//!
//! Argument parsing and interactive prompting live here; the sync core
//! only ever receives already-resolved credentials and configuration.

use crate::error::SyncError;
use crate::host::Credentials;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Emsync CLI - pull a remote file tree into a content-addressable store
#[derive(Parser)]
#[command(name = "emsync")]
#[command(about = "Pull a remote host's file tree into a local content-addressable object store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull filesystem state from an emergence host
    Pull {
        /// Host to pull from (hostname or full URL)
        host: Option<String>,

        /// Developer username to authenticate with
        #[arg(long)]
        username: Option<String>,

        /// Developer password to authenticate with
        #[arg(long)]
        password: Option<String>,

        /// Inheritance key to authenticate with instead of a developer user
        #[arg(long)]
        key: Option<String>,

        /// Developer session token instead of username+password
        #[arg(long)]
        token: Option<String>,

        /// Object store directory
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

/// Exit code for a failed invocation.
///
/// A manifest fetch failure is distinguishable from every other failure;
/// everything else exits with the generic code.
pub fn exit_code(err: &SyncError) -> i32 {
    match err {
        SyncError::ManifestFetch { .. } => 2,
        _ => 1,
    }
}

/// Resolve credentials from CLI flags, prompting interactively for a
/// missing username or password when no token or key was given.
///
/// Priority order: token, then access key, then username+password.
pub fn resolve_credentials(
    token: Option<String>,
    key: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Result<Credentials, SyncError> {
    if let Some(token) = token {
        return Ok(Credentials::Token(token));
    }
    if let Some(key) = key {
        return Ok(Credentials::AccessKey(key));
    }

    let needs_prompt = username.is_none() || password.is_none();
    if needs_prompt && !std::io::stdin().is_terminal() {
        return Err(SyncError::AuthenticationMissing);
    }

    let username = match username {
        Some(username) => username,
        None => dialoguer::Input::<String>::new()
            .with_prompt("Developer username")
            .interact_text()
            .map_err(|_| SyncError::AuthenticationMissing)?,
    };
    let password = match password {
        Some(password) => password,
        None => dialoguer::Password::new()
            .with_prompt("Developer password")
            .interact()
            .map_err(|_| SyncError::AuthenticationMissing)?,
    };

    Ok(Credentials::Login { username, password })
}
