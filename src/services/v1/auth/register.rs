use actix_web::web;

use crate::database::{StoreError, Writer};
use crate::errors::{ApiError, REGISTRATION_FAILED, USERNAME_TAKEN};
use crate::metrics::AppMetrics;
use crate::models::v1::user::NewUser;
use crate::requests::v1::auth::RegisterRequest;
use crate::responses::v1::auth::Registered;
use crate::security::PasswordHasher;

/// Hash the password off the request worker and insert the row with role `user`
#[tracing::instrument(skip_all, fields(username = %request.username))]
pub async fn register(
    writer: &dyn Writer,
    hasher: &PasswordHasher,
    metrics: &AppMetrics,
    request: RegisterRequest,
) -> Result<Registered, ApiError> {
    let RegisterRequest {
        username,
        password,
        sensitive_note,
    } = request;

    let hasher = hasher.clone();
    let hash = match web::block(move || hasher.hash(&password)).await {
        Ok(Ok(hash)) => hash,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to hash password");
            metrics.record_registration("error");
            return Err(ApiError::Internal(REGISTRATION_FAILED));
        }
        Err(e) => {
            tracing::error!(error = %e, "Password hashing task failed");
            metrics.record_registration("error");
            return Err(ApiError::Internal(REGISTRATION_FAILED));
        }
    };

    match writer.insert(NewUser::new(username, hash, sensitive_note)).await {
        Ok(()) => {
            metrics.record_registration("created");
            tracing::info!("User registered");
            Ok(Registered::default())
        }
        Err(StoreError::Conflict) => {
            metrics.record_registration("conflict");
            tracing::warn!("Registration rejected, username already exists");
            Err(ApiError::Conflict(USERNAME_TAKEN))
        }
        Err(e) => {
            metrics.record_registration("error");
            Err(ApiError::store(e, REGISTRATION_FAILED))
        }
    }
}
