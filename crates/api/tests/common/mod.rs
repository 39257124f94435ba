//! Shared helpers for the HTTP integration tests.
//!
//! Requests go straight to the router through `tower::ServiceExt::oneshot`,
//! without a TCP listener.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use talent_api::auth::identity_cache::IdentityCacheConfig;
use talent_api::auth::jwt::{generate_access_token, JwtConfig};
use talent_api::auth::password::hash_password;
use talent_api::config::ServerConfig;
use talent_api::router::build_app_router;
use talent_api::state::AppState;
use talent_core::roles::{ROLE_AGENT, ROLE_CLIENT};
use talent_db::models::user::{CreateUser, User};
use talent_db::repositories::UserRepo;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Test `ServerConfig` with local defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        client_url: "http://localhost:8081".to_string(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_mins: 60,
        },
        identity_cache: IdentityCacheConfig::default(),
    }
}

/// The production router and middleware stack over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    build_app_router(AppState::new(pool, config.clone()), &config)
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, username: &str, role: &str, name: &str) -> User {
    let (first_name, last_name) = talent_core::invitation::split_display_name(name);
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            password_hash: Some(hash_password(TEST_PASSWORD).expect("hashing should succeed")),
            role: role.to_string(),
            first_name,
            last_name,
        },
    )
    .await
    .expect("user creation should succeed")
}

pub async fn create_agent(pool: &PgPool, username: &str) -> User {
    create_user(pool, username, ROLE_AGENT, "Ari Gold").await
}

pub async fn create_client(pool: &PgPool, username: &str, name: &str) -> User {
    create_user(pool, username, ROLE_CLIENT, name).await
}

/// A bearer token for `user`, signed with the test secret.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.role, &user.username, &test_config().jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");
    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
