use actix_web::web::{self, ServiceConfig};

use crate::api;
use crate::controllers;
use crate::security::RateLimitMiddleware;
use crate::state::AppState;

/// Mount every route. The general limiter covers the whole API prefix and
/// the auth limiter is stacked on `/auth`.
pub fn route(app: &mut ServiceConfig, state: &AppState) {
    state.configure(app);

    // Metrics endpoint
    app.service(controllers::metrics::metrics);
    // OpenAPI document
    app.service(api::document);

    let auth = web::scope("/auth")
        .wrap(RateLimitMiddleware::with_limiter(state.auth_limiter.clone()))
        .service(controllers::v1::auth::register)
        .service(controllers::v1::auth::login)
        .service(controllers::v1::auth::me)
        .service(controllers::v1::auth::logout);

    app.service(
        web::scope(&state.config.app.prefix)
            .wrap(RateLimitMiddleware::with_limiter(state.general_limiter.clone()))
            .service(auth)
            .service(controllers::v1::user::profile)
            .service(controllers::v1::user::search),
    );
}
