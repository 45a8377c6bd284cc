use actix_web::web;

use crate::database::Reader;
use crate::errors::{AUTHENTICATION_FAILED, ApiError, INVALID_CREDENTIALS};
use crate::metrics::AppMetrics;
use crate::middlewares::v1::auth::SessionRegistry;
use crate::requests::v1::auth::LoginRequest;
use crate::responses::v1::auth::Authenticated;
use crate::security::PasswordHasher;

/// Outcome of a successful login: the new session token and the response body
pub struct LoggedIn {
    pub token: String,
    pub body: Authenticated,
}

/// Verify credentials and open a session
///
/// Fail if:
/// - username not found (after a dummy verification, so timing matches)
/// - password does not match the stored variant
///
/// Both failures return the same error.
#[tracing::instrument(skip_all, fields(username = %request.username))]
pub async fn login(
    reader: &dyn Reader,
    hasher: &PasswordHasher,
    sessions: &SessionRegistry,
    metrics: &AppMetrics,
    allow_legacy: bool,
    request: LoginRequest,
) -> Result<LoggedIn, ApiError> {
    let credential = reader
        .find_by_username(&request.username)
        .await
        .map_err(|e| ApiError::store(e, AUTHENTICATION_FAILED))?;

    let hasher = hasher.clone();
    let password = request.password;
    let verified = web::block(move || match credential {
        Some(credential) => credential
            .stored_password()
            .verify(&hasher, &password, allow_legacy)
            .then_some(credential),
        None => {
            hasher.verify_dummy(&password);
            None
        }
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Password verification task failed");
        ApiError::Internal(AUTHENTICATION_FAILED)
    })?;

    let Some(credential) = verified else {
        metrics.record_login_attempt(false);
        tracing::warn!(target: "security", username = %request.username, "Failed login attempt");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
    };

    let user = credential.into_session_user();
    let token = sessions.create(user.clone());

    metrics.record_login_attempt(true);
    metrics.set_active_sessions(sessions.len());
    tracing::info!(user_id = user.id, "User logged in");

    Ok(LoggedIn {
        token,
        body: Authenticated {
            success: true,
            user: user.into(),
        },
    })
}
