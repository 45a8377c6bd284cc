//! HTTP error taxonomy
//!
//! Every failure leaves a handler as an [`ApiError`] and reaches the client as
//! `{"error": "<message>"}`. Store errors are logged in full here and then
//! collapsed into the caller's generic message.

use actix_web::http::StatusCode;
use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::database::StoreError;

pub const INVALID_INPUT: &str = "Invalid input detected.";
pub const INVALID_REQUEST: &str = "Invalid request.";
pub const USERNAME_TAKEN: &str = "Username already exists.";
pub const REGISTRATION_FAILED: &str = "Registration failed.";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const AUTHENTICATION_FAILED: &str = "Authentication failed.";
pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";
pub const USER_NOT_FOUND: &str = "User not found.";
pub const PROFILE_FAILED: &str = "Failed to retrieve profile.";
pub const SEARCH_FAILED: &str = "Search operation failed.";
pub const TOO_MANY_REQUESTS: &str = "Too many requests, please try again later.";
pub const INTERNAL: &str = "Internal server error.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{}", TOO_MANY_REQUESTS)]
    TooManyRequests { retry_after: u64 },

    #[error("{0}")]
    Internal(&'static str),
}

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    /// Map a store failure to `message`, logging the detail server-side.
    /// A unique-constraint conflict keeps its own 409.
    pub fn store(error: StoreError, message: &'static str) -> Self {
        match error {
            StoreError::Conflict => ApiError::Conflict(USERNAME_TAKEN),
            StoreError::Database(e) => {
                tracing::error!(error = %e, "{}", message);
                ApiError::Internal(message)
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());

        if let ApiError::TooManyRequests { retry_after } = self {
            response.insert_header((header::RETRY_AFTER, HeaderValue::from(*retry_after)));
        }

        response.json(ErrorBody {
            error: self.to_string(),
        })
    }
}
