use serde::{Deserialize, Serialize};

use super::{ConfigError, Validate};

/// Security configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Input guard policy
    #[serde(default)]
    pub input_guard: GuardPolicy,
    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitsConfig,
}

/// Validation strategy applied to request fields before they reach handlers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardPolicy {
    /// Positive validation of format and length per field
    #[default]
    AllowList,
    /// Rejects values containing SQL/script fragments. Rejects legitimate
    /// input and is trivially incomplete; kept for comparison only.
    BlockList,
}

/// The two limiters stacked on the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitsConfig {
    /// Every route under the API prefix
    #[serde(default = "RateLimitConfig::general")]
    pub general: RateLimitConfig,
    /// Routes under `/auth`
    #[serde(default = "RateLimitConfig::auth")]
    pub auth: RateLimitConfig,
}

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    /// Number of requests allowed per window
    #[serde(default = "default_rate_limit_requests")]
    pub requests: u32,
    /// Time window in seconds
    #[serde(default = "default_rate_limit_window")]
    pub window: u64,
    /// Only responses with status >= 400 count against the limit
    #[serde(default)]
    pub skip_successful: bool,
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_rate_limit_requests() -> u32 {
    100
}

fn default_rate_limit_window() -> u64 {
    900 // 15 minutes
}

impl RateLimitConfig {
    pub fn general() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            requests: default_rate_limit_requests(),
            window: default_rate_limit_window(),
            skip_successful: false,
        }
    }

    pub fn auth() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            requests: 5,
            window: default_rate_limit_window(),
            skip_successful: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::general()
        }
    }
}

impl Default for RateLimitsConfig {
    fn default() -> Self {
        Self {
            general: RateLimitConfig::general(),
            auth: RateLimitConfig::auth(),
        }
    }
}

impl Validate for SecurityConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.rate_limit.general.validate()?;
        self.rate_limit.auth.validate()?;
        Ok(())
    }
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.requests == 0 {
            return Err(ConfigError::ValidationError(
                "security.rate_limit.requests must be > 0 when rate limiting is enabled".to_string(),
            ));
        }
        if self.enabled && self.window == 0 {
            return Err(ConfigError::ValidationError(
                "security.rate_limit.window must be > 0 when rate limiting is enabled".to_string(),
            ));
        }
        Ok(())
    }
}
