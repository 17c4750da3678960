//! Configuration loading and typed config structures for the Tally server.
//!
//! The canonical configuration lives in `tally-config.yaml` next to the
//! binary's working directory. This module defines strongly-typed structs
//! that mirror the YAML structure and provides a loader that reads the file
//! and applies environment overrides.
//!
//! Environment variables override YAML values:
//! - `TALLY_HOST` overrides `server.host`
//! - `TALLY_PORT` overrides `server.port`
//! - `TALLY_API_KEY` overrides `auth.api_key`

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Network settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthSection,
}

impl ServiceConfig {
    /// Load configuration from a YAML file at the given path, then apply
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string (no environment overrides).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply environment variable overrides in place.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("TALLY_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("TALLY_PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(e) => warn!(%port, error = %e, "ignoring invalid TALLY_PORT"),
            }
        }
        if let Ok(api_key) = std::env::var("TALLY_API_KEY") {
            self.auth.api_key = api_key;
        }
    }
}

/// Network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// The host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthSection {
    /// The pre-shared API key every request must present. The server
    /// refuses to start while this is empty.
    #[serde(default)]
    pub api_key: String,
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    3000
}
