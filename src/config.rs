use crate::common::constants::{BROWSER_USER_AGENT, DHL_BASE_URL, DPD_BASE_URL, HERMES_BASE_URL};
use crate::common::error::{Result, TrackerError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Where the carrier adapters send their requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub user_agent: String,
    pub dpd_base_url: String,
    pub dhl_base_url: String,
    pub hermes_base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            dpd_base_url: DPD_BASE_URL.to_string(),
            dhl_base_url: DHL_BASE_URL.to_string(),
            hermes_base_url: HERMES_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: String,
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "logs".to_string(),
            file_name: "parcel-track.log".to_string(),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads the given TOML file if it exists, then applies environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("PARCEL_TRACK_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PARCEL_TRACK_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| TrackerError::Config(format!("PARCEL_TRACK_PORT '{}': {}", port, e)))?;
        }
        Ok(())
    }
}
