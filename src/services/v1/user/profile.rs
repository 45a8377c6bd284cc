use crate::database::Reader;
use crate::errors::{ApiError, PROFILE_FAILED, USER_NOT_FOUND};
use crate::middlewares::v1::auth::Auth;
use crate::responses::v1::user::ProfileResponse;

/// Profile of the session's own user. No client-supplied id is involved.
#[tracing::instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn show(reader: &dyn Reader, auth: &Auth) -> Result<ProfileResponse, ApiError> {
    let profile = reader
        .find_profile(auth.user.id)
        .await
        .map_err(|e| ApiError::store(e, PROFILE_FAILED))?;

    match profile {
        Some(profile) => Ok(ProfileResponse { profile }),
        None => {
            tracing::warn!("Session user no longer exists");
            Err(ApiError::NotFound(USER_NOT_FOUND))
        }
    }
}
