use actix_web::body::BoxBody;
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::{IntoResponses, ToSchema};

use crate::models::v1::user::SessionUser;

/// `{ "id", "username" }` of the signed-in user
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
}

impl From<SessionUser> for User {
    fn from(user: SessionUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, ToSchema, IntoResponses, PartialEq, Eq)]
#[response(status = 201, description = "Registered")]
pub struct Registered {
    pub success: bool,
}

impl Default for Registered {
    fn default() -> Self {
        Self { success: true }
    }
}

impl Responder for Registered {
    type Body = BoxBody;

    fn respond_to(self, _: &HttpRequest) -> HttpResponse<Self::Body> {
        HttpResponse::Created().json(self)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, ToSchema, IntoResponses, PartialEq, Eq)]
#[response(status = 200, description = "Success")]
pub struct Success {
    pub success: bool,
}

impl Default for Success {
    fn default() -> Self {
        Self { success: true }
    }
}

impl Responder for Success {
    type Body = BoxBody;

    fn respond_to(self, _: &HttpRequest) -> HttpResponse<Self::Body> {
        HttpResponse::Ok().json(self)
    }
}

/// Body of a successful login. The session token travels only in the cookie.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema, IntoResponses, PartialEq, Eq)]
#[response(status = 200, description = "Authenticated, session cookie set")]
pub struct Authenticated {
    pub success: bool,
    pub user: User,
}

#[derive(Clone, Debug, Deserialize, Serialize, ToSchema, IntoResponses, PartialEq, Eq)]
#[response(status = 200, description = "Current session")]
pub struct Me {
    pub user: User,
}

impl Responder for Me {
    type Body = BoxBody;

    fn respond_to(self, _: &HttpRequest) -> HttpResponse<Self::Body> {
        HttpResponse::Ok().json(self)
    }
}
