//! Shared support for API integration tests.
//!
//! `setup_test_app` builds the full router against a private in-memory SQLite
//! database (one per test, migrated like production) and a temp-dir blob
//! store; requests are driven through `tower::ServiceExt::oneshot`.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use civita::{
    api::{build_router, ApiState},
    auth::TokenService,
    blobs::FsBlobStore,
    config::AuthConfig,
    domain::organization::{ContactInfo, CreateOrganizationRequest},
    services::OrganizationService,
    storage::{run_migrations, DbPool},
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "password-123";

pub struct TestApp {
    pub pool: DbPool,
    pub state: ApiState,
    pub token_service: Arc<TokenService>,
    blob_dir: tempfile::TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn blob_root(&self) -> &std::path::Path {
        self.blob_dir.path()
    }
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        access_token_key: "access-signing-key-for-tests-0123456789".to_string(),
        refresh_token_key: "refresh-signing-key-for-tests-0123456789".to_string(),
        bcrypt_cost: 4,
        ..AuthConfig::default()
    }
}

pub async fn setup_test_app() -> TestApp {
    // A named in-memory database keeps every pool connection on the same
    // schema while staying private to this test.
    let url = format!("sqlite://testdb-{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    // A single connection keeps the shared-cache in-memory database alive for
    // the whole test: if the pool ever churns every connection closed at once,
    // SQLite discards the in-memory schema and later queries see no tables.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .expect("create sqlite pool");

    run_migrations(&pool).await.expect("run migrations for tests");

    let blob_dir = tempfile::tempdir().expect("create blob dir");
    let auth_config = test_auth_config();
    let token_service = Arc::new(TokenService::new(&auth_config));

    let state = ApiState {
        pool: pool.clone(),
        token_service: token_service.clone(),
        blob_store: Arc::new(FsBlobStore::new(blob_dir.path())),
        bcrypt_cost: auth_config.bcrypt_cost,
        max_upload_bytes: 1024 * 1024,
    };

    TestApp { pool, state, token_service, blob_dir }
}

pub async fn send_request(
    app: &TestApp,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = if let Some(json) = body {
        let bytes = serde_json::to_vec(&json).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("build request")
    } else {
        builder.body(Body::empty()).expect("build request")
    };

    app.router().oneshot(request).await.expect("request")
}

pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

/// Register a user through the public endpoint and return its id.
pub async fn register_user(
    app: &TestApp,
    email: &str,
    role: &str,
    affiliated_org: Option<&str>,
) -> String {
    let mut body = json!({ "email": email, "password": TEST_PASSWORD, "role": role });
    if let Some(org) = affiliated_org {
        body["affiliatedOrg"] = json!(org);
    }

    let response = send_request(app, Method::POST, "/users", None, Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED, "register {} failed", email);
    let value: Value = read_json(response).await;
    value["user"]["id"].as_str().expect("user id").to_string()
}

/// Log in and return the access token.
pub async fn login(app: &TestApp, email: &str) -> String {
    let response = send_request(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "login {} failed", email);
    let value: Value = read_json(response).await;
    value["accessToken"].as_str().expect("access token").to_string()
}

/// Create an organization directly through the service layer.
pub async fn create_organization(app: &TestApp, name: &str) -> String {
    let service = OrganizationService::with_sqlx(app.pool.clone());
    let organization = service
        .create(CreateOrganizationRequest {
            name: name.to_string(),
            image: "logo.png".to_string(),
            webpage: Some("https://example.org".to_string()),
            description: format!("{} description", name),
            main_representative: "Jordan Doe".to_string(),
            affinities: vec!["education".to_string()],
            contact: ContactInfo {
                address: "1 Main St".to_string(),
                phone: "555-0100".to_string(),
                hours: "9-17".to_string(),
            },
        })
        .await
        .expect("create organization");
    organization.id.into_string()
}

fn multipart_body(
    field: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> (String, Vec<u8>) {
    let boundary = "civita-test-boundary-1689";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    (format!("multipart/form-data; boundary={}", boundary), body)
}

/// POST a multipart upload with a single `file` field.
pub async fn send_upload(
    app: &TestApp,
    path: &str,
    token: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> Response<Body> {
    let (header_value, body) = multipart_body("file", filename, content_type, bytes);
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, header_value)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .expect("build request");

    app.router().oneshot(request).await.expect("request")
}
