use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::security::{Field, Rule, Screened};

#[derive(Clone, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
pub struct RegisterRequest {
    #[schema(example = "john_doe")]
    pub username: String,
    #[schema(example = "password123")]
    pub password: String,
    #[schema(example = "My secret note")]
    #[serde(default)]
    pub sensitive_note: Option<String>,
}

#[derive(Clone, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
pub struct LoginRequest {
    #[schema(example = "john_doe")]
    pub username: String,
    #[schema(example = "password123")]
    pub password: String,
}

impl Screened for RegisterRequest {
    fn fields(&self) -> Vec<Field<'_>> {
        let mut fields = vec![
            Field::new("username", &self.username, Rule::Username),
            Field::secret("password", &self.password, Rule::Password),
        ];
        if let Some(note) = &self.sensitive_note {
            fields.push(Field::new("sensitive_note", note, Rule::Note));
        }
        fields
    }
}

impl Screened for LoginRequest {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("username", &self.username, Rule::Username),
            Field::secret("password", &self.password, Rule::Password),
        ]
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("has_note", &self.sensitive_note.is_some())
            .finish()
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}
