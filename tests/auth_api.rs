//! Integration tests for login, token refresh, and the access gate.

mod common;

use axum::http::{Method, StatusCode};
use civita::{
    auth::TokenService,
    config::AuthConfig,
    domain::{Role, UserId},
};
use common::{
    login, read_json, register_user, send_request, setup_test_app, test_auth_config, TEST_PASSWORD,
};
use serde_json::{json, Value};

#[tokio::test]
async fn register_then_login_yields_decodable_token_pair() {
    let app = setup_test_app().await;
    let user_id = register_user(&app, "a@x.com", "independent", None).await;

    // The stored record holds a bcrypt hash, never the plaintext
    let stored_hash = sqlx::query_scalar::<_, String>(
        "SELECT password_hash FROM users WHERE email = $1",
    )
    .bind("a@x.com")
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_ne!(stored_hash, TEST_PASSWORD);
    assert!(stored_hash.starts_with("$2"));

    let response = send_request(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;

    // Both tokens decode with their respective signing keys and carry the
    // claims unchanged
    let access = app
        .token_service
        .validate_access(body["accessToken"].as_str().unwrap())
        .expect("valid access token");
    assert_eq!(access.sub, user_id);
    assert_eq!(access.role, Role::Independent);

    let refresh = app
        .token_service
        .validate_refresh(body["refreshToken"].as_str().unwrap())
        .expect("valid refresh token");
    assert_eq!(refresh.sub, user_id);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = setup_test_app().await;
    register_user(&app, "user@example.com", "independent", None).await;

    let response = send_request(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "user@example.com", "password": "wrong-password" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "You provided wrong set of credentials.");
}

#[tokio::test]
async fn login_with_unknown_email_is_unauthorized() {
    let app = setup_test_app().await;

    let response = send_request(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": TEST_PASSWORD })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_route_requires_token() {
    let app = setup_test_app().await;

    let response = send_request(&app, Method::GET, "/users", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send_request(&app, Method::GET, "/ngos", Some("not-a-jwt"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_access_token_is_rejected() {
    let app = setup_test_app().await;
    register_user(&app, "expired@example.com", "independent", None).await;

    // Same signing keys as the app, but a lifetime already in the past
    let expired_issuer = TokenService::new(&AuthConfig {
        access_token_ttl_hours: -2,
        ..test_auth_config()
    });
    let pair = expired_issuer.issue(&UserId::new(), Role::Independent).unwrap();

    let response =
        send_request(&app, Method::GET, "/users", Some(&pair.access_token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = read_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("expired"));
}

#[tokio::test]
async fn token_signed_with_foreign_key_is_rejected() {
    let app = setup_test_app().await;

    let foreign = TokenService::new(&AuthConfig {
        access_token_key: "some-other-access-key-000000000000000".to_string(),
        refresh_token_key: "some-other-refresh-key-00000000000000".to_string(),
        ..test_auth_config()
    });
    let pair = foreign.issue(&UserId::new(), Role::Admin).unwrap();

    let response =
        send_request(&app, Method::GET, "/users", Some(&pair.access_token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_exchanges_token_for_new_pair() {
    let app = setup_test_app().await;
    let user_id = register_user(&app, "refresh@example.com", "org-affiliated", None).await;

    let response = send_request(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "refresh@example.com", "password": TEST_PASSWORD })),
    )
    .await;
    let body: Value = read_json(response).await;
    let refresh_token = body["refreshToken"].as_str().unwrap().to_string();

    let response = send_request(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": refresh_token })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;

    let claims = app
        .token_service
        .validate_access(body["accessToken"].as_str().unwrap())
        .expect("valid refreshed access token");
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.role, Role::OrgAffiliated);
}

#[tokio::test]
async fn access_token_is_not_a_valid_refresh_token() {
    let app = setup_test_app().await;
    register_user(&app, "cross@example.com", "independent", None).await;
    let access = login(&app, "cross@example.com").await;

    let response = send_request(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": access })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn role_allow_list_forbids_non_admin_update() {
    let app = setup_test_app().await;
    let user_id = register_user(&app, "plain@example.com", "independent", None).await;
    let token = login(&app, "plain@example.com").await;

    let response = send_request(
        &app,
        Method::PUT,
        &format!("/users/{}", user_id),
        Some(&token),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn refresh_for_deleted_user_is_unauthorized() {
    let app = setup_test_app().await;

    // Valid refresh token for a user id that has no record
    let pair = app.token_service.issue(&UserId::new(), Role::Independent).unwrap();

    let response = send_request(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": pair.refresh_token })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
