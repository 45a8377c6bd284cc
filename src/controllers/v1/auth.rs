use actix_web::web::Data;
use actix_web::{HttpResponse, Responder};

use crate::config::AppConfig;
use crate::database::{Reader, Writer};
use crate::errors::{ApiError, ErrorBody};
use crate::metrics::AppMetrics;
use crate::middlewares::v1::auth::{Auth, SessionCookie, SessionRegistry, SessionToken};
use crate::requests::v1::auth::{LoginRequest, RegisterRequest};
use crate::responses::v1::auth::{Authenticated, Me, Registered, Success};
use crate::security::{GuardedJson, PasswordHasher};
use crate::services;

/// Create an account
///
/// Fail if:
/// - a field fails the input guard
/// - username already exists
#[utoipa::path(
    tag = "Auth",
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        Registered,
        (status = 400, description = "Rejected by the input guard", body = ErrorBody),
        (status = 409, description = "Username already exists", body = ErrorBody),
        (status = 429, description = "Rate limited", body = ErrorBody),
        (status = 500, description = "Registration failed", body = ErrorBody),
    )
)]
#[post("/register")]
pub async fn register(
    writer: Data<dyn Writer>,
    hasher: Data<PasswordHasher>,
    metrics: Data<AppMetrics>,
    GuardedJson(request): GuardedJson<RegisterRequest>,
) -> Result<impl Responder, ApiError> {
    services::v1::auth::register::register(writer.get_ref(), &hasher, &metrics, request).await
}

/// Create a new session
///
/// Sets the `HttpOnly` session cookie. Unknown username and wrong password
/// fail identically.
#[utoipa::path(
    tag = "Auth",
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        Authenticated,
        (status = 400, description = "Rejected by the input guard", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 429, description = "Too many failed attempts", body = ErrorBody),
        (status = 500, description = "Authentication failed", body = ErrorBody),
    )
)]
#[post("/login")]
pub async fn login(
    reader: Data<dyn Reader>,
    hasher: Data<PasswordHasher>,
    sessions: Data<SessionRegistry>,
    cookie: Data<SessionCookie>,
    config: Data<AppConfig>,
    metrics: Data<AppMetrics>,
    GuardedJson(request): GuardedJson<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let logged_in = services::v1::auth::login::login(
        reader.get_ref(),
        &hasher,
        &sessions,
        &metrics,
        config.auth.allow_legacy_passwords,
        request,
    )
    .await?;

    Ok(HttpResponse::Ok()
        .cookie(cookie.issue(&logged_in.token))
        .json(logged_in.body))
}

/// Get current session
///
/// Fail if:
/// - cookie missing
/// - token unknown or expired
#[utoipa::path(
    tag = "Auth",
    path = "/auth/me",
    responses(
        Me,
        (status = 401, description = "Authentication required", body = ErrorBody),
    )
)]
#[get("/me")]
pub async fn me(auth: Auth) -> impl Responder {
    services::v1::auth::authenticated::authenticated(auth)
}

/// Destroy current session
///
/// Always succeeds and always clears the cookie.
#[utoipa::path(
    tag = "Auth",
    path = "/auth/logout",
    responses(Success)
)]
#[post("/logout")]
pub async fn logout(
    sessions: Data<SessionRegistry>,
    cookie: Data<SessionCookie>,
    metrics: Data<AppMetrics>,
    SessionToken(token): SessionToken,
) -> HttpResponse {
    let body = services::v1::auth::logout::logout(&sessions, &metrics, token.as_deref());

    HttpResponse::Ok().cookie(cookie.clear()).json(body)
}
