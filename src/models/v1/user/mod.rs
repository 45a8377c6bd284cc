use std::fmt;

use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::security::password::StoredPassword;

/// Row read at login. Never serialized.
#[derive(Clone, FromQueryResult)]
pub struct Credential {
    pub id: i32,
    pub username: String,
    pub password: String,
    pub role: String,
}

impl Credential {
    pub fn stored_password(&self) -> StoredPassword {
        StoredPassword::parse(&self.password)
    }

    pub fn into_session_user(self) -> SessionUser {
        SessionUser {
            id: self.id,
            username: self.username,
            role: self.role,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("role", &self.role)
            .finish()
    }
}

/// Snapshot of a user held by a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub username: String,
    pub sensitive_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
}

/// Row written at registration
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub sensitive_note: Option<String>,
    pub role: String,
}

impl NewUser {
    pub const DEFAULT_ROLE: &'static str = "user";

    /// Empty or whitespace notes are stored as NULL
    pub fn new(username: String, password_hash: String, sensitive_note: Option<String>) -> Self {
        Self {
            username,
            password: password_hash,
            sensitive_note: sensitive_note.filter(|note| !note.trim().is_empty()),
            role: Self::DEFAULT_ROLE.to_string(),
        }
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("has_note", &self.sensitive_note.is_some())
            .field("role", &self.role)
            .finish()
    }
}

/// A `LIKE` pattern that matches `term` literally anywhere in a value.
/// `\`, `%` and `_` are escaped with `\`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPattern(String);

impl SearchPattern {
    pub const ESCAPE: char = '\\';

    pub fn contains(term: &str) -> Self {
        let mut pattern = String::with_capacity(term.len() + 2);
        pattern.push('%');
        for c in term.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push(Self::ESCAPE);
            }
            pattern.push(c);
        }
        pattern.push('%');

        Self(pattern)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
