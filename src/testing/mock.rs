//! In-process stand-ins for [`Reader`] and [`Writer`]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sea_orm::DbErr;

use crate::database::{Reader, StoreError, Writer};
use crate::models::v1::user::{Credential, NewUser, Profile, SearchPattern, UserSummary};

fn unavailable() -> StoreError {
    StoreError::Database(DbErr::Custom("store unavailable".to_string()))
}

/// Reader over a fixed list of credentials that counts every call
#[derive(Default)]
pub struct StubReader {
    users: Vec<Credential>,
    notes: Vec<(i32, Option<String>)>,
    failing: bool,
    calls: AtomicUsize,
    last_pattern: Mutex<Option<String>>,
}

impl StubReader {
    pub fn with_users(users: Vec<Credential>) -> Self {
        Self {
            users,
            ..Self::default()
        }
    }

    /// Every call fails with a database error
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_note(mut self, id: i32, note: Option<&str>) -> Self {
        self.notes.push((id, note.map(str::to_string)));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Pattern handed to the most recent `search`
    pub fn last_pattern(&self) -> Option<String> {
        self.last_pattern.lock().ok().and_then(|pattern| pattern.clone())
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing { Err(unavailable()) } else { Ok(()) }
    }
}

#[async_trait]
impl Reader for StubReader {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        self.enter()?;
        Ok(self.users.iter().find(|user| user.username == username).cloned())
    }

    async fn find_profile(&self, id: i32) -> Result<Option<Profile>, StoreError> {
        self.enter()?;
        Ok(self.users.iter().find(|user| user.id == id).map(|user| Profile {
            username: user.username.clone(),
            sensitive_note: self
                .notes
                .iter()
                .find(|(note_id, _)| *note_id == id)
                .and_then(|(_, note)| note.clone()),
        }))
    }

    async fn search(
        &self,
        pattern: &SearchPattern,
        limit: u64,
    ) -> Result<Vec<UserSummary>, StoreError> {
        self.enter()?;
        if let Ok(mut last) = self.last_pattern.lock() {
            *last = Some(pattern.as_str().to_string());
        }

        Ok(self
            .users
            .iter()
            .take(limit as usize)
            .map(|user| UserSummary {
                id: user.id,
                username: user.username.clone(),
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum WriterMode {
    #[default]
    Accept,
    Conflict,
    Fail,
}

/// Writer that records inserted rows instead of storing them
#[derive(Default)]
pub struct RecordingWriter {
    mode: WriterMode,
    inserted: Mutex<Vec<NewUser>>,
}

impl RecordingWriter {
    /// Every insert hits the unique constraint
    pub fn conflicting() -> Self {
        Self {
            mode: WriterMode::Conflict,
            ..Self::default()
        }
    }

    /// Every insert fails with a database error
    pub fn failing() -> Self {
        Self {
            mode: WriterMode::Fail,
            ..Self::default()
        }
    }

    /// `(username, password, sensitive_note, role)` of every accepted insert
    pub fn inserted(&self) -> Vec<(String, String, Option<String>, String)> {
        self.inserted
            .lock()
            .map(|rows| {
                rows.iter()
                    .map(|row| {
                        (
                            row.username.clone(),
                            row.password.clone(),
                            row.sensitive_note.clone(),
                            row.role.clone(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Writer for RecordingWriter {
    async fn insert(&self, user: NewUser) -> Result<(), StoreError> {
        match self.mode {
            WriterMode::Accept => {
                if let Ok(mut rows) = self.inserted.lock() {
                    rows.push(user);
                }
                Ok(())
            }
            WriterMode::Conflict => Err(StoreError::Conflict),
            WriterMode::Fail => Err(unavailable()),
        }
    }
}
