//! Server binary for the Tally point service.
//!
//! Wires the ledger engine to the HTTP API: loads configuration,
//! initializes structured logging, and serves until terminated.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `tally-config.yaml` (defaults when absent),
//!    with `TALLY_HOST` / `TALLY_PORT` / `TALLY_API_KEY` overrides
//! 3. Construct the ledger engine and shared application state
//! 4. Serve the API until the process is terminated
//!
//! The server refuses to start without a configured API key: every route
//! requires one, so an empty key would lock callers out (or, worse, invite
//! running without authentication at all).

mod config;

use std::path::Path;
use std::sync::Arc;

use tally_api::{AppState, ServerConfig};
use tally_engine::LedgerEngine;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, ServiceConfig};

/// Application entry point for the Tally server.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the server fails to
/// bind or serve.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("tally-server starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    if config.auth.api_key.trim().is_empty() {
        return Err(
            "no API key configured: set auth.api_key in tally-config.yaml or TALLY_API_KEY"
                .into(),
        );
    }

    // 3. Construct the engine and shared state.
    let engine = Arc::new(LedgerEngine::new());
    let state = Arc::new(AppState::new(engine, config.auth.api_key.clone()));
    info!("Ledger engine initialized");

    // 4. Serve until terminated.
    let server_config = ServerConfig {
        host: config.server.host,
        port: config.server.port,
    };
    tally_api::start_server(&server_config, state).await?;

    info!("tally-server shutdown complete");
    Ok(())
}

/// Load the service configuration from `tally-config.yaml`.
///
/// Looks for the config file relative to the current working directory;
/// falls back to defaults (plus environment overrides) when it is absent.
fn load_config() -> Result<ServiceConfig, ConfigError> {
    let config_path = Path::new("tally-config.yaml");
    if config_path.exists() {
        ServiceConfig::from_file(config_path)
    } else {
        info!("Config file not found, using defaults");
        let mut config = ServiceConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}
