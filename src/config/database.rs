use std::time::Duration;

use sea_orm::ConnectOptions;
use serde::{Deserialize, Serialize};

use super::{ConfigError, Validate};

/// Database configuration
///
/// Reads and the single insert path use separate credentials. In Postgres
/// deployments `read_url` should authenticate as a role holding only
/// `SELECT` on `users`, and `write_url` as a role holding only `INSERT`
/// (plus `USAGE` on the id sequence).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL of the low-privilege read pool
    #[serde(default = "default_url")]
    pub read_url: String,
    /// Connection URL of the insert-only write pool
    #[serde(default = "default_url")]
    pub write_url: String,
    /// Maximum connections per pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum idle connections per pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Apply migrations through the write pool at startup
    #[serde(default)]
    pub run_migrations: bool,
}

fn default_url() -> String {
    "sqlite://sqlshield.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    8
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            read_url: default_url(),
            write_url: default_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout: default_connect_timeout(),
            run_migrations: false,
        }
    }
}

impl DatabaseConfig {
    fn options(&self, url: &str) -> ConnectOptions {
        let mut options = ConnectOptions::new(url.to_owned());
        options
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout))
            .sqlx_logging(false);

        options
    }

    pub fn read_options(&self) -> ConnectOptions {
        self.options(&self.read_url)
    }

    pub fn write_options(&self) -> ConnectOptions {
        self.options(&self.write_url)
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.read_url.is_empty() {
            return Err(ConfigError::ValidationError("database.read_url cannot be empty".to_string()));
        }
        if self.write_url.is_empty() {
            return Err(ConfigError::ValidationError("database.write_url cannot be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::ValidationError("database.max_connections must be > 0".to_string()));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError(
                "database.min_connections cannot exceed database.max_connections".to_string(),
            ));
        }
        if self.connect_timeout == 0 {
            return Err(ConfigError::ValidationError("database.connect_timeout must be > 0".to_string()));
        }
        Ok(())
    }
}
