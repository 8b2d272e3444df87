//! Application settings loaded from `config.toml`.
//!
//! The file configures the HTTP listener, how long upload download links stay
//! valid, and the grant statuses seeded into the database on start-up.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload link settings
    #[serde(default)]
    pub uploads: UploadsConfig,
    /// Grant statuses to seed
    #[serde(default)]
    pub statuses: Vec<StatusConfig>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the API binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

/// Upload link settings
#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    /// Base URL stored files are served from
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Lifetime of a download link, in seconds
    #[serde(default = "default_link_ttl_seconds")]
    pub link_ttl_seconds: u64,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            link_ttl_seconds: default_link_ttl_seconds(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000/files".to_string()
}

const fn default_link_ttl_seconds() -> u64 {
    10
}

/// A grant status to seed
#[derive(Debug, Clone, Deserialize)]
pub struct StatusConfig {
    /// Status label
    pub description: String,
    /// Whether new grants start in this status
    #[serde(default)]
    pub initial: bool,
}

/// Loads the configuration from a TOML file. The status list is checked when
/// it is seeded.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    Ok(toml::from_str(&contents)?)
}

/// Loads the configuration from `GRANT_TRACKER_CONFIG`, or `./config.toml`.
pub fn load_default_config() -> Result<AppConfig> {
    let path =
        std::env::var("GRANT_TRACKER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}
