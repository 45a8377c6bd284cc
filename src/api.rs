use actix_web::{Responder, web};
use utoipa::OpenApi;

use crate::{controllers, errors, models, requests, responses};

#[derive(OpenApi)]
#[openapi(
    info(title = "sqlshield", description = "Hardened user registration, login, profile and search API"),
    servers((url = "/api")),
    tags(
        (name = "Auth"),
        (name = "User"),
    ),
    paths(
        controllers::v1::auth::register,
        controllers::v1::auth::login,
        controllers::v1::auth::me,
        controllers::v1::auth::logout,

        controllers::v1::user::profile,
        controllers::v1::user::search,
    ),
    components(schemas(
        requests::v1::auth::RegisterRequest,
        requests::v1::auth::LoginRequest,

        responses::v1::auth::User,
        responses::v1::auth::Registered,
        responses::v1::auth::Success,
        responses::v1::auth::Authenticated,
        responses::v1::auth::Me,
        responses::v1::user::ProfileResponse,
        responses::v1::user::SearchResponse,

        models::v1::user::Profile,
        models::v1::user::UserSummary,

        errors::ErrorBody,
    )),
)]
pub struct Definition;

/// OpenAPI document
#[get("/api.json")]
pub async fn document() -> impl Responder {
    web::Json(Definition::openapi())
}
