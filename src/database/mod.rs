//! Credential store access
//!
//! Handlers never hold a raw connection. Reads go through [`Reader`], backed
//! by the low-privilege read pool, and the single insert path goes through
//! [`Writer`], backed by the insert-only write pool. Every statement is built
//! with the SeaORM query builder, so user input only ever travels as a bound
//! parameter.

mod pool;
mod reader;
mod writer;

use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::models::v1::user::{Credential, NewUser, Profile, SearchPattern, UserSummary};

pub use pool::{DatabasePools, connect};
pub use reader::SeaReader;
pub use writer::SeaWriter;

/// Upper bound on rows returned by a username search
pub const SEARCH_LIMIT: u64 = 50;

/// Repository error
#[derive(Error, Debug)]
pub enum StoreError {
    /// Unique constraint on `users.username` rejected the insert
    #[error("username already exists")]
    Conflict,

    #[error("database operation failed: {0}")]
    Database(DbErr),
}

impl From<DbErr> for StoreError {
    fn from(error: DbErr) -> Self {
        match error.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Conflict,
            _ => StoreError::Database(error),
        }
    }
}

/// Read capability over `users`
#[async_trait]
pub trait Reader: Send + Sync {
    /// Exact, case-sensitive lookup used by login
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError>;

    /// `username` and `sensitive_note` of one user
    async fn find_profile(&self, id: i32) -> Result<Option<Profile>, StoreError>;

    /// Users whose name matches `pattern`, ordered by id
    async fn search(
        &self,
        pattern: &SearchPattern,
        limit: u64,
    ) -> Result<Vec<UserSummary>, StoreError>;
}

/// Insert capability over `users`
#[async_trait]
pub trait Writer: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<(), StoreError>;
}
