//! Integration tests for the general and auth limiters

use std::net::SocketAddr;

use actix_web::http::StatusCode;
use actix_web::http::header::RETRY_AFTER;
use actix_web::test::{TestRequest, call_service, read_body_json};
use serde_json::{Value, json};
use sqlshield::config::{AppConfig, RateLimitConfig};
use sqlshield::testing::setup;

fn limited(requests: u32, skip_successful: bool) -> RateLimitConfig {
    RateLimitConfig {
        enabled: true,
        requests,
        window: 60,
        skip_successful,
    }
}

fn auth_limited(requests: u32) -> AppConfig {
    let mut config = setup::config();
    config.security.rate_limit.auth = limited(requests, true);
    config
}

fn login(password: &str, peer: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/auth/login")
        .peer_addr(peer.parse::<SocketAddr>().unwrap())
        .set_json(json!({ "username": "alice", "password": password }))
}

#[actix_web::test]
async fn test_failed_logins_exhaust_auth_limit() {
    let (service, db, state) = sqlshield::service!(auth_limited(2));
    setup::create_user(&db, &state.hasher, "alice", "secret1").await.unwrap();

    for attempt in 1..=2 {
        let resp = call_service(&service, login("wrong-1", "10.0.0.1:4000").to_request()).await;
        assert_eq!(
            resp.status(),
            StatusCode::UNAUTHORIZED,
            "Attempt {} should reach the handler",
            attempt
        );
    }

    // Blocked now, even with the right password
    let resp = call_service(&service, login("secret1", "10.0.0.1:4000").to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = resp
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .expect("429 should carry Retry-After");
    assert!(retry_after >= 1);

    let body: Value = read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "error": "Too many requests, please try again later." })
    );
}

#[actix_web::test]
async fn test_successful_logins_do_not_count() {
    let (service, db, state) = sqlshield::service!(auth_limited(2));
    setup::create_user(&db, &state.hasher, "alice", "secret1").await.unwrap();

    for attempt in 1..=5 {
        let resp = call_service(&service, login("secret1", "10.0.0.1:4000").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "Login {} should succeed", attempt);
    }
}

#[actix_web::test]
async fn test_auth_limit_is_per_ip() {
    let (service, db, state) = sqlshield::service!(auth_limited(2));
    setup::create_user(&db, &state.hasher, "alice", "secret1").await.unwrap();

    for _ in 0..2 {
        call_service(&service, login("wrong-1", "10.0.0.1:4000").to_request()).await;
    }

    let resp = call_service(&service, login("secret1", "10.0.0.1:4000").to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let resp = call_service(&service, login("secret1", "10.0.0.2:4000").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK, "Other clients are unaffected");
}

#[actix_web::test]
async fn test_guard_rejections_count_as_failures() {
    let (service, _db, _state) = sqlshield::service!(auth_limited(2));

    for _ in 0..2 {
        let req = TestRequest::post()
            .uri("/api/auth/register")
            .peer_addr("10.0.0.3:4000".parse().unwrap())
            .set_json(json!({ "username": "x", "password": "secret1" }))
            .to_request();
        let resp = call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    let req = TestRequest::post()
        .uri("/api/auth/register")
        .peer_addr("10.0.0.3:4000".parse().unwrap())
        .set_json(json!({ "username": "valid_name", "password": "secret1" }))
        .to_request();
    let resp = call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[actix_web::test]
async fn test_auth_failures_do_not_limit_other_routes() {
    let (service, _db, state) = sqlshield::service!(auth_limited(1));

    call_service(&service, login("wrong-1", "10.0.0.4:4000").to_request()).await;
    let resp = call_service(&service, login("wrong-1", "10.0.0.4:4000").to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let token = state.sessions.create(sqlshield::models::v1::user::SessionUser {
        id: 1,
        username: "alice".to_string(),
        role: "user".to_string(),
    });
    let req = TestRequest::get()
        .uri("/api/search?q=a")
        .peer_addr("10.0.0.4:4000".parse().unwrap())
        .cookie(actix_web::cookie::Cookie::new("sessionId", token))
        .to_request();
    let resp = call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_general_limit_counts_every_request() {
    let mut config = setup::config();
    config.security.rate_limit.general = limited(3, false);
    let (service, _db, _state) = sqlshield::service!(config);

    for i in 1..=3 {
        let req = TestRequest::get()
            .uri("/api/auth/me")
            .peer_addr("10.0.0.5:4000".parse().unwrap())
            .to_request();
        let resp = call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "Request {} should pass", i);
    }

    let req = TestRequest::get()
        .uri("/api/auth/me")
        .peer_addr("10.0.0.5:4000".parse().unwrap())
        .to_request();
    let resp = call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key(RETRY_AFTER));
}

#[actix_web::test]
async fn test_metrics_endpoint_is_outside_the_limit() {
    let mut config = setup::config();
    config.security.rate_limit.general = limited(1, false);
    let (service, _db, _state) = sqlshield::service!(config);

    for _ in 0..3 {
        let req = TestRequest::get()
            .uri("/metrics")
            .peer_addr("10.0.0.6:4000".parse().unwrap())
            .to_request();
        let resp = call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
