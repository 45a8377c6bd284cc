pub mod app;
pub mod auth;
pub mod database;
pub mod security;

use thiserror::Error;

pub use app::{AppConfig, AppMetadata, LogFormat, ObservabilityConfig, ServerConfig};
pub use auth::{Argon2Config, AuthConfig};
pub use database::DatabaseConfig;
pub use security::{GuardPolicy, RateLimitConfig, RateLimitsConfig, SecurityConfig};

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Semantic checks that serde cannot express
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Load the application configuration from files and environment variables
pub fn load() -> Result<AppConfig, ConfigError> {
    app::load_config()
}
