//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Secret shipped in the defaults; a running service should override it
const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Longest accepted token lifetime (ten years)
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub path: String,
}

/// Session token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token lifetime; tokens never expire when unset
    #[serde(default)]
    pub token_ttl_hours: Option<i64>,
}

/// Profile listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_users_per_page")]
    pub users_per_page: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "./data/accounts.db".to_string()
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_users_per_page() -> i64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: None,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            users_per_page: default_users_per_page(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            anyhow::bail!("auth.jwt_secret must not be empty");
        }
        if self.pagination.users_per_page < 1 {
            anyhow::bail!(
                "pagination.users_per_page must be at least 1, got {}",
                self.pagination.users_per_page
            );
        }
        if let Some(hours) = self.auth.token_ttl_hours
            && !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours)
        {
            anyhow::bail!(
                "auth.token_ttl_hours must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_HOURS,
                hours
            );
        }
        Ok(())
    }

    /// Warn about settings that are only fit for development
    pub fn warn_insecure_defaults(&self) {
        if self.auth.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("auth.jwt_secret is the built-in default; set a real secret before deploying");
        }
    }

    /// sqlx connection URL for the configured database file
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.database.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.pagination.users_per_page, 10);
        assert!(config.auth.token_ttl_hours.is_none());
        assert_eq!(config.database_url(), "sqlite:./data/accounts.db?mode=rwc");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/account-service.toml").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.auth.jwt_secret, DEFAULT_JWT_SECRET);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8080

[auth]
jwt_secret = "s3cret"
token_ttl_hours = 12

[pagination]
users_per_page = 25
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.token_ttl_hours, Some(12));
        assert_eq!(config.pagination.users_per_page, 25);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_token_ttl_upper_bound() {
        let config = Config::parse("[auth]\ntoken_ttl_hours = 87600\n").unwrap();
        assert_eq!(config.auth.token_ttl_hours, Some(MAX_TOKEN_TTL_HOURS));

        let err = Config::parse("[auth]\ntoken_ttl_hours = 87601\n").unwrap_err();
        assert!(err.to_string().contains("auth.token_ttl_hours"));
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Config::parse("[pagination]\nusers_per_page = 0\n").is_err());
        assert!(Config::parse("[auth]\njwt_secret = \"\"\n").is_err());
        assert!(Config::parse("[auth]\ntoken_ttl_hours = 0\n").is_err());
        assert!(Config::parse("[auth]\ntoken_ttl_hours = 10000000000\n").is_err());
        assert!(Config::parse("[server]\nport = \"not a port\"\n").is_err());
    }
}
