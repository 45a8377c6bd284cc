//! Fixtures shared by unit tests and the `tests/` harnesses

pub mod mock;
pub mod setup;

/// Build the full application over a fresh in-memory database
///
/// Yields `(service, db, state)`. Rate limits are disabled unless an
/// [`crate::config::AppConfig`] is passed explicitly.
#[macro_export]
macro_rules! service {
    () => {
        $crate::service!($crate::testing::setup::config())
    };
    ($config:expr) => {{
        let db = $crate::testing::setup::database().await;
        let state = $crate::testing::setup::state_with_config($config, db.clone());
        let routes = state.clone();
        let app = ::actix_web::App::new().configure(move |app| $crate::router::route(app, &routes));

        let service = ::actix_web::test::init_service(app).await;

        (service, db, state)
    }};
}
