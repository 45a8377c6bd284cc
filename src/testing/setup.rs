use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, Set};
use sqlshield_migration::{Migrator, MigratorTrait};

use crate::config::{AppConfig, Argon2Config, RateLimitConfig};
use crate::database::DatabasePools;
use crate::entities::v1::users;
use crate::metrics::AppMetrics;
use crate::security::PasswordHasher;
use crate::state::AppState;

/// Returns an in-memory SQLite database with all migrations applied
///
/// Every call opens a new database, so tests never see each other's rows.
/// The pool is pinned to one connection because each SQLite memory
/// connection is its own database.
///
/// # Panics
/// Panics if the connection or a migration fails.
pub async fn database() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Argon2 parameters cheap enough for a test run
pub fn argon2_config() -> Argon2Config {
    Argon2Config {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
        hash_length: 32,
    }
}

pub fn password_hasher() -> Result<PasswordHasher, argon2::password_hash::Error> {
    PasswordHasher::from_config(&argon2_config())
}

/// Default configuration with fast hashing and both limiters off
pub fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.argon2 = argon2_config();
    config.security.rate_limit.general = RateLimitConfig::disabled();
    config.security.rate_limit.auth = RateLimitConfig::disabled();

    config
}

/// Shared state over one connection used for both pools
///
/// # Panics
/// Panics if the configured Argon2 parameters are invalid.
pub fn state_with_config(config: AppConfig, db: DatabaseConnection) -> AppState {
    AppState::with_pools(config, DatabasePools::shared(db), AppMetrics::new())
        .expect("Failed to build application state")
}

pub fn state(db: DatabaseConnection) -> AppState {
    state_with_config(config(), db)
}

/// Insert a user whose password is stored as an Argon2id hash
pub async fn create_user(
    db: &DatabaseConnection,
    hasher: &PasswordHasher,
    username: &str,
    password: &str,
) -> Result<users::Model, DbErr> {
    let hash = hasher
        .hash(password)
        .map_err(|e| DbErr::Custom(e.to_string()))?;

    insert(db, username, hash, None).await
}

/// Insert a user whose password column still holds plaintext
pub async fn create_legacy_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<users::Model, DbErr> {
    insert(db, username, password.to_string(), None).await
}

/// Insert a user whose password column holds a bcrypt digest
pub async fn create_bcrypt_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<users::Model, DbErr> {
    let hash = bcrypt::hash(password, 4).map_err(|e| DbErr::Custom(e.to_string()))?;

    insert(db, username, hash, None).await
}

/// Insert a user carrying a sensitive note
pub async fn create_user_with_note(
    db: &DatabaseConnection,
    hasher: &PasswordHasher,
    username: &str,
    password: &str,
    note: &str,
) -> Result<users::Model, DbErr> {
    let hash = hasher
        .hash(password)
        .map_err(|e| DbErr::Custom(e.to_string()))?;

    insert(db, username, hash, Some(note.to_string())).await
}

async fn insert(
    db: &DatabaseConnection,
    username: &str,
    password: String,
    note: Option<String>,
) -> Result<users::Model, DbErr> {
    let user = users::ActiveModel {
        username: Set(username.to_string()),
        password: Set(password),
        sensitive_note: Set(note),
        role: Set("user".to_string()),
        ..Default::default()
    };

    user.insert(db).await
}
