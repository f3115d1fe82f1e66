//! Configuration management for Devtools-Bridge

use crate::{Error, Result};
use serde::Deserialize;
use std::env;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Host address the bridge listens on for debugger clients
    pub host: String,

    /// Port the bridge listens on for debugger clients
    pub port: u16,

    /// Base URL of the target's remote-debugging endpoint
    pub target_url: String,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6080,
            target_url: "http://localhost:9222".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(host) = env::var("BRIDGE_HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("BRIDGE_PORT") {
            config.port = port
                .parse()
                .map_err(|_| Error::configuration("Invalid BRIDGE_PORT"))?;
        }

        if let Ok(target_url) = env::var("BRIDGE_TARGET_URL") {
            config.target_url = target_url;
        }

        if let Ok(log_level) = env::var("BRIDGE_LOG_LEVEL") {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }
}
