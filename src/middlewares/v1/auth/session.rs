use std::future::{Ready, ready};
use std::time::Duration;

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::web::Data;
use actix_web::{FromRequest, HttpRequest};
use chrono::{DateTime, Utc};

use super::SessionRegistry;
use crate::config::AppConfig;
use crate::errors::{ApiError, AUTHENTICATION_REQUIRED, INTERNAL};
use crate::models::v1::user::SessionUser;

/// Attributes of the session cookie
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
    max_age: Duration,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool, max_age: Duration) -> Self {
        Self {
            name: name.into(),
            secure,
            max_age,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.auth.cookie_name.clone(),
            config.cookie_secure(),
            Duration::from_secs(config.auth.session_ttl),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, value: String, max_age: CookieDuration) -> Cookie<'static> {
        Cookie::build(self.name.clone(), value)
            .http_only(true)
            .same_site(SameSite::Strict)
            .path("/")
            .secure(self.secure)
            .max_age(max_age)
            .finish()
    }

    /// Cookie carrying `token` for the session lifetime
    pub fn issue(&self, token: &str) -> Cookie<'static> {
        let secs = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        self.build(token.to_string(), CookieDuration::seconds(secs))
    }

    /// Empty cookie that makes the browser drop the session
    pub fn clear(&self) -> Cookie<'static> {
        self.build(String::new(), CookieDuration::ZERO)
    }

    /// Token from the request cookie, if any
    pub fn token(&self, req: &HttpRequest) -> Option<String> {
        req.cookie(&self.name)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    }
}

fn session_cookie(req: &HttpRequest) -> Result<&Data<SessionCookie>, ApiError> {
    req.app_data::<Data<SessionCookie>>().ok_or_else(|| {
        tracing::error!("Session cookie settings are not registered");
        ApiError::Internal(INTERNAL)
    })
}

/// A live session, resolved from the request cookie
///
/// Missing cookie, unknown token and expired token all reject with the
/// same 401.
#[derive(Debug, Clone)]
pub struct Auth {
    pub token: String,
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
}

impl Auth {
    fn authenticate(req: &HttpRequest) -> Result<Self, ApiError> {
        let Some(registry) = req.app_data::<Data<SessionRegistry>>() else {
            tracing::error!("Session registry is not registered");
            return Err(ApiError::Internal(INTERNAL));
        };

        let unauthorized = ApiError::Unauthorized(AUTHENTICATION_REQUIRED);
        let token = session_cookie(req)?.token(req).ok_or(unauthorized.clone())?;

        let Some(session) = registry.get(&token) else {
            tracing::debug!(path = %req.path(), "Unknown or expired session token");
            return Err(unauthorized);
        };

        Ok(Self {
            token,
            user: session.user,
            expires_at: session.expires_at,
        })
    }
}

impl FromRequest for Auth {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::authenticate(req))
    }
}

/// The session token, if the request carries one. Never rejects on a
/// missing or unknown token.
#[derive(Debug, Clone)]
pub struct SessionToken(pub Option<String>);

impl FromRequest for SessionToken {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(session_cookie(req).map(|cookie| SessionToken(cookie.token(req))))
    }
}
