//! Input Guard
//!
//! Screens request fields before they reach a handler. [`GuardedJson`] and
//! [`GuardedQuery`] deserialize like `web::Json` / `web::Query` and then run
//! every field reported by [`Screened`] through the deployment's
//! [`GuardPolicy`]. Under the block list every query-string pair is screened
//! as well, declared or not. A rejection is logged under the `security`
//! target and answered with a 400.

use std::future::{Ready, ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::web::{Data, Json, Query};
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::client_ip;
use super::validation::{Rule, contains_blocked_pattern};
use crate::config::GuardPolicy;
use crate::errors::{ApiError, INTERNAL, INVALID_INPUT, INVALID_REQUEST};
use crate::metrics::AppMetrics;

/// One screened request field
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub name: &'static str,
    pub value: &'a str,
    pub rule: Rule,
    /// Never written to logs
    pub secret: bool,
}

impl<'a> Field<'a> {
    pub fn new(name: &'static str, value: &'a str, rule: Rule) -> Self {
        Self {
            name,
            value,
            rule,
            secret: false,
        }
    }

    pub fn secret(name: &'static str, value: &'a str, rule: Rule) -> Self {
        Self {
            secret: true,
            ..Self::new(name, value, rule)
        }
    }

    fn logged_value(&self) -> &'a str {
        if self.secret { "[redacted]" } else { self.value }
    }
}

/// Requests whose fields pass through the Input Guard
pub trait Screened {
    fn fields(&self) -> Vec<Field<'_>>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardRejection {
    #[error("{}", INVALID_INPUT)]
    Blocked { field: &'static str },

    #[error("{message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },
}

impl GuardRejection {
    pub fn field(&self) -> &'static str {
        match self {
            GuardRejection::Blocked { field } | GuardRejection::Invalid { field, .. } => field,
        }
    }
}

impl From<GuardRejection> for ApiError {
    fn from(rejection: GuardRejection) -> Self {
        ApiError::Validation(rejection.to_string())
    }
}

/// The configured screening policy
#[derive(Debug, Clone, Copy, Default)]
pub struct InputGuard {
    policy: GuardPolicy,
}

impl InputGuard {
    pub fn new(policy: GuardPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> GuardPolicy {
        self.policy
    }

    /// First failing field, in declaration order
    pub fn screen<T: Screened + ?Sized>(&self, request: &T) -> Result<(), GuardRejection> {
        for field in request.fields() {
            self.check(&field)?;
        }
        Ok(())
    }

    fn check(&self, field: &Field<'_>) -> Result<(), GuardRejection> {
        match self.policy {
            GuardPolicy::BlockList if contains_blocked_pattern(field.value) => {
                Err(GuardRejection::Blocked { field: field.name })
            }
            GuardPolicy::BlockList => Ok(()),
            GuardPolicy::AllowList => field
                .rule
                .check(field.value)
                .map_err(|message| GuardRejection::Invalid {
                    field: field.name,
                    message,
                }),
        }
    }
}

fn screen_request<T: Screened>(req: &HttpRequest, request: &T) -> Result<(), ApiError> {
    let Some(guard) = req.app_data::<Data<InputGuard>>() else {
        tracing::error!("Input guard is not registered");
        return Err(ApiError::Internal(INTERNAL));
    };

    if guard.policy() == GuardPolicy::BlockList {
        screen_query_string(req, guard)?;
    }

    let fields = request.fields();
    for field in &fields {
        if let Err(rejection) = guard.check(field) {
            return Err(reject(req, guard, field.name, field.logged_value(), rejection));
        }
    }

    Ok(())
}

fn screen_query_string(req: &HttpRequest, guard: &InputGuard) -> Result<(), ApiError> {
    if req.query_string().is_empty() {
        return Ok(());
    }

    let Query(pairs) =
        Query::<Vec<(String, String)>>::from_query(req.query_string()).map_err(malformed)?;
    for (name, value) in &pairs {
        if contains_blocked_pattern(name) || contains_blocked_pattern(value) {
            let rejection = GuardRejection::Blocked { field: "query" };
            return Err(reject(req, guard, "query", &format!("{name}={value}"), rejection));
        }
    }

    Ok(())
}

fn reject(
    req: &HttpRequest,
    guard: &InputGuard,
    field: &'static str,
    value: &str,
    rejection: GuardRejection,
) -> ApiError {
    tracing::warn!(
        target: "security",
        ip = %client_ip(req),
        field,
        value = ?value,
        path = %req.path(),
        method = %req.method(),
        policy = ?guard.policy(),
        "Suspicious input detected"
    );

    if let Some(metrics) = req.app_data::<Data<AppMetrics>>() {
        metrics.record_suspicious_input(rejection.field());
    }

    rejection.into()
}

fn malformed(error: impl std::fmt::Display) -> ApiError {
    tracing::debug!(error = %error, "Rejected malformed request");
    ApiError::Validation(INVALID_REQUEST.to_string())
}

/// JSON body that has passed the Input Guard
#[derive(Debug)]
pub struct GuardedJson<T>(pub T);

impl<T> GuardedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for GuardedJson<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromRequest for GuardedJson<T>
where
    T: DeserializeOwned + Screened + 'static,
{
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = Json::<T>::from_request(req, payload);
        let req = req.clone();

        Box::pin(async move {
            let Json(body) = body.await.map_err(malformed)?;
            screen_request(&req, &body)?;

            Ok(GuardedJson(body))
        })
    }
}

/// Query string that has passed the Input Guard
#[derive(Debug)]
pub struct GuardedQuery<T>(pub T);

impl<T> GuardedQuery<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for GuardedQuery<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromRequest for GuardedQuery<T>
where
    T: DeserializeOwned + Screened,
{
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = Query::<T>::from_query(req.query_string())
            .map_err(malformed)
            .and_then(|Query(query)| {
                screen_request(req, &query)?;
                Ok(GuardedQuery(query))
            });

        ready(result)
    }
}
