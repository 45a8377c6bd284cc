#[macro_use(get, post)]
extern crate actix_web;

pub mod api;
pub mod config;
pub mod controllers;
pub mod database;
pub mod entities;
pub mod errors;
pub mod logging;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod requests;
pub mod responses;
pub mod router;
pub mod security;
pub mod services;
pub mod state;

// Testing utilities (always available for integration tests)
pub mod testing;

// Re-export commonly used types for convenience
pub use database::{Reader, StoreError, Writer};
pub use errors::ApiError;
pub use metrics::{AppMetrics, MetricsMiddleware};
pub use middlewares::v1::auth::{Auth, SessionRegistry, SessionSweeper};
pub use security::{InputGuard, PasswordHasher, RateLimitMiddleware};
pub use state::AppState;
