//! Configuration loading for the chat-sync engine.
//!
//! Configuration is loaded from a TOML file (default: `chat.toml`).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Address of the remote chat server.
    #[serde(default = "default_server_address")]
    pub server_address: String,
    /// Display identity used for locally composed messages.
    #[serde(default = "default_sender")]
    pub sender: String,
    /// Path to the SQLite message database.
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_address: default_server_address(),
            sender: default_sender(),
            database: default_database(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// The config file could not be parsed.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

// Default value functions
fn default_server_address() -> String {
    "ws://127.0.0.1:8080/chat".to_string()
}

fn default_sender() -> String {
    "You".to_string()
}

fn default_database() -> PathBuf {
    PathBuf::from("chat.db")
}
