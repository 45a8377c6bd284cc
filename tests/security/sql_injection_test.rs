//! SQL injection tests
//!
//! Every statement is built by SeaORM with bound parameters, so hostile
//! input must come back as literal data. Rows with hostile usernames are
//! inserted directly, bypassing the Input Guard, to exercise the queries
//! themselves.
//!
//! Each test verifies that:
//! 1. The hostile value is matched literally or not at all
//! 2. The `users` table is intact afterwards
//! 3. No other user's row leaks

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test::{TestRequest, call_service, read_body_json};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde_json::{Value, json};
use sqlshield::config::GuardPolicy;
use sqlshield::database::{Reader, SeaReader};
use sqlshield::entities::v1::users;
use sqlshield::models::v1::user::{SearchPattern, SessionUser};
use sqlshield::state::AppState;
use sqlshield::testing::setup;

const HOSTILE_USERNAMES: [&str; 6] = [
    "admin'--",
    "' OR '1'='1",
    "x'; DROP TABLE users; --",
    "a\"b;c",
    "1 UNION SELECT password FROM users",
    "/* comment */",
];

async fn user_count(db: &DatabaseConnection) -> u64 {
    users::Entity::find()
        .count(db)
        .await
        .expect("users table should still exist")
}

fn signed_in(state: &AppState) -> Cookie<'static> {
    let token = state.sessions.create(SessionUser {
        id: 1,
        username: "searcher".to_string(),
        role: "user".to_string(),
    });

    Cookie::new("sessionId", token)
}

fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|byte| match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (byte as char).to_string()
            }
            _ => format!("%{:02X}", byte),
        })
        .collect()
}

// =============================================================================
// REPOSITORY QUERIES
// =============================================================================

#[tokio::test]
async fn test_hostile_usernames_are_looked_up_literally() {
    let db = setup::database().await;
    setup::create_legacy_user(&db, "admin", "secret1").await.unwrap();
    for username in HOSTILE_USERNAMES {
        setup::create_legacy_user(&db, username, "secret1").await.unwrap();
    }
    let reader = SeaReader::new(db.clone());

    for username in HOSTILE_USERNAMES {
        let credential = reader
            .find_by_username(username)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("{} should be found", username));
        assert_eq!(credential.username, username);
    }

    assert!(reader.find_by_username("admin' OR 1=1 --").await.unwrap().is_none());
    assert_eq!(user_count(&db).await, 1 + HOSTILE_USERNAMES.len() as u64);
}

#[tokio::test]
async fn test_search_pattern_with_sql_matches_literally() {
    let db = setup::database().await;
    setup::create_legacy_user(&db, "alice", "secret1").await.unwrap();
    setup::create_legacy_user(&db, "x'; DROP TABLE users; --", "secret1").await.unwrap();
    let reader = SeaReader::new(db.clone());

    let found = reader
        .search(&SearchPattern::contains("'; DROP TABLE users; --"), 50)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username, "x'; DROP TABLE users; --");

    let found = reader
        .search(&SearchPattern::contains("' OR 1=1 --"), 50)
        .await
        .unwrap();
    assert!(found.is_empty());

    assert_eq!(user_count(&db).await, 2);
}

// =============================================================================
// HTTP SURFACE
// =============================================================================

#[actix_web::test]
async fn test_login_with_tautology_is_rejected() {
    let (service, db, _state) = sqlshield::service!();
    setup::create_legacy_user(&db, "admin", "secret1").await.unwrap();

    let req = TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "admin' OR '1'='1", "password": "' OR '1'='1" }))
        .to_request();
    let resp = call_service(&service, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "Allow-list rejects the username");
    assert_eq!(user_count(&db).await, 1);
}

#[actix_web::test]
async fn test_password_with_sql_is_plain_data() {
    let (service, db, _state) = sqlshield::service!();
    let password = "'; DROP TABLE users; --";

    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": "mallory", "password": password }))
        .to_request();
    let resp = call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "mallory", "password": password }))
        .to_request();
    let resp = call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(user_count(&db).await, 1);
}

#[actix_web::test]
async fn test_note_with_sql_is_stored_verbatim() {
    let (service, db, _state) = sqlshield::service!();
    let note = "Robert'); DROP TABLE users;--";

    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": "bobby", "password": "secret1", "sensitive_note": note }))
        .to_request();
    assert_eq!(call_service(&service, req).await.status(), StatusCode::CREATED);

    let req = TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "bobby", "password": "secret1" }))
        .to_request();
    let resp = call_service(&service, req).await;
    let cookie = resp
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "sessionId")
        .map(Cookie::into_owned)
        .unwrap();

    let req = TestRequest::get().uri("/api/profile").cookie(cookie).to_request();
    let body: Value = read_body_json(call_service(&service, req).await).await;
    assert_eq!(body["profile"]["sensitive_note"], json!(note));
    assert_eq!(user_count(&db).await, 1);
}

#[actix_web::test]
async fn test_search_with_sql_returns_literal_matches_only() {
    let (service, db, state) = sqlshield::service!();
    setup::create_legacy_user(&db, "alice", "secret1").await.unwrap();
    setup::create_legacy_user(&db, "bob_b", "secret1").await.unwrap();

    for q in [
        "' OR 1=1 --",
        "' OR '1'='1",
        "%' OR username LIKE '%",
        "'; DROP TABLE users; --",
        "' UNION SELECT password, username FROM users --",
    ] {
        let req = TestRequest::get()
            .uri(&format!("/api/search?q={}", encode(q)))
            .cookie(signed_in(&state))
            .to_request();
        let resp = call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::OK, "{} should be a plain search", q);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body, json!({ "users": [] }), "{} should match nothing", q);
    }

    assert_eq!(user_count(&db).await, 2);
}

#[actix_web::test]
async fn test_block_list_rejects_sql_fragments_in_search() {
    let mut config = setup::config();
    config.security.input_guard = GuardPolicy::BlockList;
    let (service, db, state) = sqlshield::service!(config);
    setup::create_legacy_user(&db, "alice", "secret1").await.unwrap();

    let req = TestRequest::get()
        .uri(&format!("/api/search?q={}", encode("' OR 1=1 --")))
        .cookie(signed_in(&state))
        .to_request();
    let resp = call_service(&service, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Invalid input detected." }));
}
