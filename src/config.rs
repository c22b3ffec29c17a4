//! Configuration handling for table_forge

use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::{Error, Result};

/// Load configuration from a TOML file
pub fn load_from_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

    Ok(config)
}

/// Represents the complete table_forge configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    pub output: Option<OutputConfig>,
    pub logging: Option<LoggingConfig>,
}

/// Database connection configuration
///
/// Supplied once at startup and read-only for the life of the run.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub driver: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub db_name: String,
    /// Schema (PostgreSQL) or owner (Oracle); falls back per product.
    #[serde(default)]
    pub schema: Option<String>,
    /// Unix socket path, PostgreSQL only.
    #[serde(default)]
    pub socket: Option<String>,
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
    #[serde(default)]
    pub verbose: bool,
}

/// Code generation behavior configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Explicit table-name filter; empty means all base tables.
    #[serde(default)]
    pub tables: Vec<String>,
    /// Active tag generators, applied in the configured order.
    #[serde(default = "default_taggers")]
    pub taggers: Vec<String>,
    #[serde(default = "default_struct_style")]
    pub struct_style: String,
    #[serde(default = "default_field_style")]
    pub field_style: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            tables: Vec::new(),
            taggers: default_taggers(),
            struct_style: default_struct_style(),
            field_style: default_field_style(),
        }
    }
}

/// Output generation configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub path: Option<String>,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_ssl_mode() -> String {
    "disable".to_string()
}

fn default_taggers() -> Vec<String> {
    vec!["db".to_string()]
}

fn default_struct_style() -> String {
    "pascal_case".to_string()
}

fn default_field_style() -> String {
    "snake_case".to_string()
}
