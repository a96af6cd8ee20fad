#![allow(dead_code)] // helpers are shared across test binaries

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use devicegate_api::auth::jwt::JwtConfig;
use devicegate_api::auth::password::hash_password;
use devicegate_api::config::ServerConfig;
use devicegate_api::engine::account_store::DbAccountStore;
use devicegate_api::router::build_app_router;
use devicegate_api::state::AppState;
use devicegate_core::violation::SeverityPolicy;
use devicegate_db::models::user::{CreateUser, User};
use devicegate_db::repositories::{RoleRepo, UserRepo};

/// Build a test `ServerConfig` with safe defaults and a known JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        fingerprint_headers: vec!["accept-language".to_string()],
        severity: SeverityPolicy::default(),
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool. Mirrors the construction in `main.rs` so
/// integration tests exercise the same stack production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        account_store: Arc::new(DbAccountStore::new(pool)),
    };
    build_app_router(state, &config)
}

/// Send one request through the router.
///
/// `headers` carries the device-identifying headers a browser would
/// send (`x-forwarded-for`, `user-agent`, ...), which is how tests
/// simulate distinct physical devices.
pub async fn request(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    headers: &[(&str, &str)],
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// Collect and parse a JSON response body.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be valid JSON")
}

/// Create a user directly in the database with the given role name.
pub async fn create_user(pool: &PgPool, username: &str, role: &str, password: &str) -> User {
    let role_id = RoleRepo::find_id_by_name(pool, role)
        .await
        .expect("role lookup should succeed")
        .expect("role should be seeded");
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: hash_password(password).expect("hashing should succeed"),
        role_id,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Log in via the API and return the access token.
pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let body = serde_json::json!({ "username": username, "password": password });
    let response = request(app, Method::POST, "/api/v1/auth/login", None, &[], Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    body_json(response).await["access_token"]
        .as_str()
        .expect("login response must contain access_token")
        .to_string()
}
