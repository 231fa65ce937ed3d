//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `WHARF_CONFIG`
//! environment variable. A missing file is not an error: every field has a default.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `WHARF_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database.url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `WHARF_FILES__ROOT=/srv/uploads` sets the `files.root` field.
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding configuration
//! - **Database**: `database.url`, `database.pool` - SQLite connection settings
//! - **Files**: `files.root`, `files.max_upload_bytes` - Storage root and upload limit
//! - **Auth**: `auth.api_tokens` - Tokens accepted by the write-route gate
//! - **CORS**: `cors.allowed_origins` - Origins allowed to call the API from a browser
//! - **Logging**: `log_filter` - Default tracing filter, overridden by `RUST_LOG`
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! WHARF_PORT=8080
//! DATABASE_URL="sqlite:///var/lib/wharf/wharf.db"
//! WHARF_FILES__ROOT=/var/lib/wharf/uploads
//! WHARF_AUTH__API_TOKENS='[dashboard-token]'
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// A configuration that parsed but cannot be used.
#[derive(Debug, thiserror::Error)]
#[error("Invalid configuration: {0}")]
pub struct ConfigError(pub String);

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "WHARF_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Shortcut for `database.url`, usually set through `DATABASE_URL`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Record store configuration
    pub database: DatabaseConfig,
    /// Upload storage configuration
    pub files: FilesConfig,
    /// Write-route gate configuration
    pub auth: AuthConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Default tracing filter directive, used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database_url: None,
            database: DatabaseConfig::default(),
            files: FilesConfig::default(),
            auth: AuthConfig::default(),
            cors: CorsConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

/// SQLite record store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite connection URL. The database file is created when missing.
    pub url: String,
    /// Connection pool settings
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://wharf.db".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

/// Connection pool settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection
    #[serde(with = "humantime_serde")]
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilesConfig {
    /// Directory all stored paths are relative to
    pub root: PathBuf,
    /// Maximum size of an upload request body in bytes
    pub max_upload_bytes: usize,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("uploads"),
            max_upload_bytes: 25 * 1024 * 1024, // 25 MB
        }
    }
}

/// Write-route gate configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Bearer tokens accepted on write routes. Empty disables the gate.
    pub api_tokens: Vec<String>,
}

/// CORS configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins. `*` allows any origin; empty disables CORS headers.
    pub allowed_origins: Vec<String>,
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        if let Some(url) = config.database_url.take() {
            config.database.url = url;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.files.root.as_os_str().is_empty() {
            return Err(ConfigError("files.root cannot be empty".to_string()));
        }

        if self.files.max_upload_bytes == 0 {
            return Err(ConfigError("files.max_upload_bytes must be greater than zero".to_string()));
        }

        if self.database.pool.max_connections == 0 || self.database.pool.min_connections > self.database.pool.max_connections {
            return Err(ConfigError(format!(
                "invalid pool size (min_connections {}, max_connections {})",
                self.database.pool.min_connections, self.database.pool.max_connections
            )));
        }

        if self.auth.api_tokens.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError("auth.api_tokens cannot contain empty tokens".to_string()));
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("WHARF_").split("__").ignore(&["CONFIG"]))
            // Common DATABASE_URL pattern
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
