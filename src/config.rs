//! Runtime configuration
//!
//! All settings come from environment variables with project-relative defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid HMS_BIND_ADDR '{value}': {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub report_dir: PathBuf,
}

impl Config {
    /// Load configuration from `HMS_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = default_data_dir();

        let database_path = std::env::var("HMS_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("hms.db"));

        let report_dir = std::env::var("HMS_REPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("reports"));

        let bind_value =
            std::env::var("HMS_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_value
            .parse()
            .map_err(|source| ConfigError::BindAddr {
                value: bind_value.clone(),
                source,
            })?;

        Ok(Self {
            database_path,
            bind_addr,
            report_dir,
        })
    }
}

/// `<project>/data`, found by walking up from `target/{debug,release}`
fn default_data_dir() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path
}
