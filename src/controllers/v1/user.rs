use actix_web::Responder;
use actix_web::web::Data;

use crate::database::Reader;
use crate::errors::{ApiError, ErrorBody};
use crate::middlewares::v1::auth::Auth;
use crate::requests::v1::search::SearchQuery;
use crate::responses::v1::user::{ProfileResponse, SearchResponse};
use crate::security::GuardedQuery;
use crate::services;

/// Own profile, including the sensitive note
#[utoipa::path(
    tag = "User",
    path = "/profile",
    responses(
        ProfileResponse,
        (status = 401, description = "Authentication required", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Failed to retrieve profile", body = ErrorBody),
    )
)]
#[get("/profile")]
pub async fn profile(reader: Data<dyn Reader>, auth: Auth) -> Result<impl Responder, ApiError> {
    services::v1::user::profile::show(reader.get_ref(), &auth).await
}

/// Search users by username substring
///
/// `%`, `_` and `\` in `q` match literally. At most 50 results, ordered by id.
#[utoipa::path(
    tag = "User",
    path = "/search",
    params(SearchQuery),
    responses(
        SearchResponse,
        (status = 400, description = "Rejected by the input guard", body = ErrorBody),
        (status = 401, description = "Authentication required", body = ErrorBody),
        (status = 500, description = "Search operation failed", body = ErrorBody),
    )
)]
#[get("/search")]
pub async fn search(
    reader: Data<dyn Reader>,
    _auth: Auth,
    GuardedQuery(query): GuardedQuery<SearchQuery>,
) -> Result<impl Responder, ApiError> {
    services::v1::user::search::search(reader.get_ref(), &query).await
}
