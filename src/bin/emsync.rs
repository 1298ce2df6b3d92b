//! Emsync CLI Binary
//!
//! Parses arguments, resolves configuration and credentials, then runs the
//! sync pipeline. On success the root tree hash is the only stdout output.

use clap::Parser;
use emsync::cli::{exit_code, resolve_credentials, Cli, Commands};
use emsync::config::EmsyncConfig;
use emsync::error::SyncError;
use emsync::host::HttpHost;
use emsync::logging::{init_logging, LoggingConfig};
use emsync::store::FsObjectStore;
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match EmsyncConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let logging_config = build_logging_config(&cli, &config);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    match run(cli, config).await {
        Ok(root) => {
            println!("{}", hex::encode(root));
        }
        Err(e) => {
            error!("Pull failed: {}", e);
            eprintln!("Failed to pull: {}", e);
            process::exit(exit_code(&e));
        }
    }
}

async fn run(cli: Cli, config: EmsyncConfig) -> Result<emsync::types::Hash, SyncError> {
    match cli.command {
        Commands::Pull {
            host,
            username,
            password,
            key,
            token,
            store,
        } => {
            let host = host.or(config.host).ok_or_else(|| {
                SyncError::Config(
                    "no host given on the command line or in configuration".to_string(),
                )
            })?;
            let store_path = store.unwrap_or(config.store);

            let credentials = resolve_credentials(token, key, username, password)?;

            let store = FsObjectStore::open(&store_path)?;
            let host_client = HttpHost::new(&host, credentials)?;

            info!(host = %host, store = %store_path.display(), "Starting pull");
            emsync::sync::sync(&store, &host_client).await
        }
    }
}

/// Merge logging settings. Precedence: CLI flags over config file over
/// defaults.
fn build_logging_config(cli: &Cli, config: &EmsyncConfig) -> LoggingConfig {
    let mut logging = config.logging.clone();

    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        logging.format = format.clone();
    }

    logging
}
