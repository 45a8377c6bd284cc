//! Unit tests for configuration loading
//!
//! Sources are built in memory so the tests never touch the process
//! environment and can run in parallel.

use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use sqlshield::config::app::from_builder;
use sqlshield::config::{AppConfig, GuardPolicy, LogFormat};

fn toml(content: &str) -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from_str(content, FileFormat::Toml))
}

// =============================================================================
// LOADING
// =============================================================================

#[test]
fn test_empty_source_yields_defaults() {
    let config = from_builder(toml("")).expect("Defaults should be valid");

    assert_eq!(config.app.name, "sqlshield");
    assert_eq!(config.app.prefix, "/api");
    assert_eq!(config.server.port, 3001);
    assert_eq!(config.auth.cookie_name, "sessionId");
    assert_eq!(config.auth.session_ttl, 86400);
    assert_eq!(config.security.input_guard, GuardPolicy::AllowList);
    assert_eq!(config.security.rate_limit.general.requests, 100);
    assert_eq!(config.security.rate_limit.auth.requests, 5);
    assert!(config.security.rate_limit.auth.skip_successful);
    assert_eq!(config.observability.log_format, LogFormat::Pretty);
}

#[test]
fn test_shipped_default_file_is_valid() {
    let builder = Config::builder().add_source(File::with_name("config/default"));
    let config = from_builder(builder).expect("config/default.toml should load");

    let defaults = AppConfig::default();
    assert_eq!(config.server.port, defaults.server.port);
    assert_eq!(config.auth.argon2.memory_cost, defaults.auth.argon2.memory_cost);
    assert_eq!(config.security.rate_limit.general, defaults.security.rate_limit.general);
    assert_eq!(config.security.rate_limit.auth, defaults.security.rate_limit.auth);
    assert!(config.database.run_migrations);
}

#[test]
fn test_shipped_production_file_hardens_defaults() {
    let builder = Config::builder()
        .add_source(File::with_name("config/default"))
        .add_source(File::with_name("config/production"));
    let config = from_builder(builder).expect("config/production.toml should load");

    assert!(config.app.is_production());
    assert!(config.cookie_secure());
    assert!(!config.auth.allow_legacy_passwords);
    assert_eq!(config.observability.log_format, LogFormat::Json);
}

#[test]
fn test_later_sources_override_earlier_ones() {
    let builder = toml("[server]\nport = 4000\n[auth]\ncookie_name = \"sid\"")
        .add_source(File::from_str("[server]\nport = 5000", FileFormat::Toml));
    let config = from_builder(builder).unwrap();

    assert_eq!(config.server.port, 5000);
    assert_eq!(config.auth.cookie_name, "sid");
}

#[test]
fn test_block_list_policy_parses() {
    let config = from_builder(toml("[security]\ninput_guard = \"block_list\"")).unwrap();

    assert_eq!(config.security.input_guard, GuardPolicy::BlockList);
}

#[test]
fn test_partial_rate_limit_section_keeps_other_defaults() {
    let config = from_builder(toml("[security.rate_limit.auth]\nrequests = 10")).unwrap();

    assert_eq!(config.security.rate_limit.auth.requests, 10);
    assert_eq!(config.security.rate_limit.auth.window, 900);
    assert!(config.security.rate_limit.auth.enabled);
    assert_eq!(config.security.rate_limit.general.requests, 100);
}

#[test]
fn test_separate_read_and_write_urls() {
    let config = from_builder(toml(
        "[database]\nread_url = \"postgres://reader@db/app\"\nwrite_url = \"postgres://writer@db/app\"",
    ))
    .unwrap();

    assert_ne!(config.database.read_url, config.database.write_url);
    assert_eq!(config.database.read_options().get_url(), "postgres://reader@db/app");
    assert_eq!(config.database.write_options().get_url(), "postgres://writer@db/app");
}

// =============================================================================
// VALIDATION
// =============================================================================

#[test]
fn test_unknown_guard_policy_is_rejected() {
    assert!(from_builder(toml("[security]\ninput_guard = \"deny_everything\"")).is_err());
}

#[test]
fn test_validation_invalid_port() {
    assert!(from_builder(toml("[server]\nport = 0")).is_err());
}

#[test]
fn test_validation_bad_prefix() {
    assert!(from_builder(toml("[app]\nprefix = \"api\"")).is_err());
    assert!(from_builder(toml("[app]\nprefix = \"/api/\"")).is_err());
}

#[test]
fn test_validation_zero_session_ttl() {
    assert!(from_builder(toml("[auth]\nsession_ttl = 0")).is_err());
}

#[test]
fn test_validation_argon2_zero_time_cost() {
    assert!(from_builder(toml("[auth.argon2]\ntime_cost = 0")).is_err());
}

#[test]
fn test_validation_rate_limit_zero_requests() {
    assert!(from_builder(toml("[security.rate_limit.general]\nrequests = 0")).is_err());
}

#[test]
fn test_validation_disabled_rate_limit_allows_zero_requests() {
    let config = from_builder(toml(
        "[security.rate_limit.general]\nenabled = false\nrequests = 0",
    ));

    assert!(config.is_ok());
}

#[test]
fn test_validation_empty_database_url() {
    assert!(from_builder(toml("[database]\nwrite_url = \"\"")).is_err());
}

#[test]
fn test_validation_min_connections_above_max() {
    assert!(from_builder(toml("[database]\nmax_connections = 2\nmin_connections = 5")).is_err());
}
