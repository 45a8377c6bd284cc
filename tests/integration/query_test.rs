//! Integration tests for the profile and search endpoints

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test::{TestRequest, call_service, read_body_json};
use serde_json::{Value, json};
use sqlshield::models::v1::user::SessionUser;
use sqlshield::state::AppState;
use sqlshield::testing::setup;

/// Session cookie for a user that exists only in the registry
fn signed_in(state: &AppState) -> Cookie<'static> {
    let token = state.sessions.create(SessionUser {
        id: 1,
        username: "searcher".to_string(),
        role: "user".to_string(),
    });

    Cookie::new("sessionId", token)
}

fn usernames(body: &Value) -> Vec<String> {
    body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|user| user["username"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn test_search_matches_substring_in_id_order() {
    let (service, db, state) = sqlshield::service!();
    for username in ["bob", "alice", "malice", "carol"] {
        setup::create_legacy_user(&db, username, "secret1").await.unwrap();
    }

    let req = TestRequest::get()
        .uri("/api/search?q=lic")
        .cookie(signed_in(&state))
        .to_request();
    let resp = call_service(&service, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    assert_eq!(usernames(&body), vec!["alice", "malice"]);
}

#[actix_web::test]
async fn test_search_percent_matches_literally() {
    let (service, db, state) = sqlshield::service!();
    setup::create_legacy_user(&db, "100%_off", "secret1").await.unwrap();
    setup::create_legacy_user(&db, "100x_off", "secret1").await.unwrap();
    setup::create_legacy_user(&db, "1000", "secret1").await.unwrap();

    // q=100%
    let req = TestRequest::get()
        .uri("/api/search?q=100%25")
        .cookie(signed_in(&state))
        .to_request();
    let body: Value = read_body_json(call_service(&service, req).await).await;

    assert_eq!(usernames(&body), vec!["100%_off"]);
}

#[actix_web::test]
async fn test_search_underscore_matches_literally() {
    let (service, db, state) = sqlshield::service!();
    setup::create_legacy_user(&db, "a_b", "secret1").await.unwrap();
    setup::create_legacy_user(&db, "axb", "secret1").await.unwrap();

    let req = TestRequest::get()
        .uri("/api/search?q=a_b")
        .cookie(signed_in(&state))
        .to_request();
    let body: Value = read_body_json(call_service(&service, req).await).await;

    assert_eq!(usernames(&body), vec!["a_b"]);
}

#[actix_web::test]
async fn test_search_backslash_matches_literally() {
    let (service, db, state) = sqlshield::service!();
    setup::create_legacy_user(&db, "back\\slash", "secret1").await.unwrap();
    setup::create_legacy_user(&db, "backslash", "secret1").await.unwrap();

    // q=k\s
    let req = TestRequest::get()
        .uri("/api/search?q=k%5Cs")
        .cookie(signed_in(&state))
        .to_request();
    let body: Value = read_body_json(call_service(&service, req).await).await;

    assert_eq!(usernames(&body), vec!["back\\slash"]);
}

#[actix_web::test]
async fn test_search_is_capped_at_fifty() {
    let (service, db, state) = sqlshield::service!();
    for i in 0..60 {
        setup::create_legacy_user(&db, &format!("member_{:02}", i), "secret1")
            .await
            .unwrap();
    }

    let req = TestRequest::get()
        .uri("/api/search?q=member")
        .cookie(signed_in(&state))
        .to_request();
    let body: Value = read_body_json(call_service(&service, req).await).await;

    let names = usernames(&body);
    assert_eq!(names.len(), 50);
    assert_eq!(names.first().map(String::as_str), Some("member_00"));
    assert_eq!(names.last().map(String::as_str), Some("member_49"));
}

#[actix_web::test]
async fn test_blank_search_returns_empty_list() {
    let (service, db, state) = sqlshield::service!();
    setup::create_legacy_user(&db, "alice", "secret1").await.unwrap();

    for uri in ["/api/search", "/api/search?q=", "/api/search?q=%20%20"] {
        let req = TestRequest::get()
            .uri(uri)
            .cookie(signed_in(&state))
            .to_request();
        let resp = call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::OK, "{} should succeed", uri);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body, json!({ "users": [] }), "{} should match nothing", uri);
    }
}

#[actix_web::test]
async fn test_search_results_carry_only_id_and_username() {
    let (service, db, state) = sqlshield::service!();
    let hasher = setup::password_hasher().unwrap();
    setup::create_user_with_note(&db, &hasher, "alice", "secret1", "private")
        .await
        .unwrap();

    let req = TestRequest::get()
        .uri("/api/search?q=alice")
        .cookie(signed_in(&state))
        .to_request();
    let body: Value = read_body_json(call_service(&service, req).await).await;

    let user = body["users"][0].as_object().unwrap();
    let mut keys: Vec<&str> = user.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["id", "username"]);
}

#[actix_web::test]
async fn test_search_requires_session_before_validation() {
    let (service, _db, _state) = sqlshield::service!();

    // Over-long query without a cookie still answers 401, not 400
    let req = TestRequest::get()
        .uri(&format!("/api/search?q={}", "q".repeat(101)))
        .to_request();
    let resp = call_service(&service, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_search_rejects_long_query() {
    let (service, _db, state) = sqlshield::service!();

    let req = TestRequest::get()
        .uri(&format!("/api/search?q={}", "q".repeat(101)))
        .cookie(signed_in(&state))
        .to_request();
    let resp = call_service(&service, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "error": "Search query must be at most 100 characters long." })
    );
}

#[actix_web::test]
async fn test_profile_requires_session() {
    let (service, _db, _state) = sqlshield::service!();

    let req = TestRequest::get().uri("/api/profile").to_request();
    let resp = call_service(&service, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_profile_ignores_client_supplied_id() {
    let (service, db, state) = sqlshield::service!();
    let hasher = setup::password_hasher().unwrap();
    let alice = setup::create_user_with_note(&db, &hasher, "alice", "secret1", "alice note")
        .await
        .unwrap();
    let bob = setup::create_user_with_note(&db, &hasher, "bob_b", "secret1", "bob note")
        .await
        .unwrap();

    let token = state.sessions.create(SessionUser {
        id: alice.id,
        username: alice.username.clone(),
        role: alice.role.clone(),
    });

    let req = TestRequest::get()
        .uri(&format!("/api/profile?id={}&user_id={}", bob.id, bob.id))
        .cookie(Cookie::new("sessionId", token))
        .to_request();
    let body: Value = read_body_json(call_service(&service, req).await).await;

    assert_eq!(body["profile"]["username"], json!("alice"));
    assert_eq!(body["profile"]["sensitive_note"], json!("alice note"));
}

#[actix_web::test]
async fn test_openapi_document_lists_every_route() {
    let (service, _db, _state) = sqlshield::service!();

    let req = TestRequest::get().uri("/api.json").to_request();
    let resp = call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = read_body_json(resp).await;
    for path in [
        "/auth/register",
        "/auth/login",
        "/auth/me",
        "/auth/logout",
        "/profile",
        "/search",
    ] {
        assert!(body["paths"].get(path).is_some(), "{} should be documented", path);
    }
}
