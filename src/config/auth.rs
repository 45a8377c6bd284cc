use serde::{Deserialize, Serialize};

use super::{ConfigError, Validate};

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session lifetime in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl: u64,
    /// Interval of the expired-session sweep in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: u64,
    /// Name of the session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Force the `Secure` cookie flag on or off; unset follows `app.environment`
    #[serde(default)]
    pub cookie_secure: Option<bool>,
    /// Accept rows whose password column holds plaintext
    #[serde(default = "default_allow_legacy_passwords")]
    pub allow_legacy_passwords: bool,
    /// Argon2 configuration
    #[serde(default = "Argon2Config::default")]
    pub argon2: Argon2Config,
}

/// Argon2 password hashing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argon2Config {
    /// Memory cost in KiB (19 MiB = 19456 KiB)
    #[serde(default = "default_argon2_memory_cost")]
    pub memory_cost: u32,
    /// Time cost (iterations)
    #[serde(default = "default_argon2_time_cost")]
    pub time_cost: u32,
    /// Parallelism (number of lanes)
    #[serde(default = "default_argon2_parallelism")]
    pub parallelism: u32,
    /// Hash length in bytes
    #[serde(default = "default_argon2_hash_length")]
    pub hash_length: u32,
}

fn default_session_ttl() -> u64 {
    86400 // 24 hours
}

fn default_sweep_interval() -> u64 {
    3600 // 1 hour
}

fn default_cookie_name() -> String {
    "sessionId".to_string()
}

fn default_allow_legacy_passwords() -> bool {
    true
}

// OWASP minimum for Argon2id: m=19 MiB, t=2, p=1
fn default_argon2_memory_cost() -> u32 {
    19456
}

fn default_argon2_time_cost() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}

fn default_argon2_hash_length() -> u32 {
    32
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: default_session_ttl(),
            sweep_interval: default_sweep_interval(),
            cookie_name: default_cookie_name(),
            cookie_secure: None,
            allow_legacy_passwords: default_allow_legacy_passwords(),
            argon2: Argon2Config::default(),
        }
    }
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: default_argon2_memory_cost(),
            time_cost: default_argon2_time_cost(),
            parallelism: default_argon2_parallelism(),
            hash_length: default_argon2_hash_length(),
        }
    }
}

impl Validate for AuthConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.session_ttl == 0 {
            return Err(ConfigError::ValidationError("auth.session_ttl must be > 0".to_string()));
        }
        if self.sweep_interval == 0 {
            return Err(ConfigError::ValidationError("auth.sweep_interval must be > 0".to_string()));
        }
        if self.cookie_name.is_empty() {
            return Err(ConfigError::ValidationError("auth.cookie_name cannot be empty".to_string()));
        }
        self.argon2.validate()?;
        Ok(())
    }
}

impl Validate for Argon2Config {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_cost < 8 * self.parallelism.max(1) {
            return Err(ConfigError::ValidationError(
                "auth.argon2.memory_cost must be at least 8 * parallelism".to_string(),
            ));
        }
        if self.time_cost == 0 {
            return Err(ConfigError::ValidationError("auth.argon2.time_cost must be > 0".to_string()));
        }
        if self.parallelism == 0 {
            return Err(ConfigError::ValidationError("auth.argon2.parallelism must be > 0".to_string()));
        }
        if self.hash_length < 4 {
            return Err(ConfigError::ValidationError("auth.argon2.hash_length must be >= 4".to_string()));
        }
        Ok(())
    }
}
