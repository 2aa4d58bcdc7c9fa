#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use classifieds_api::auth::jwt::{generate_access_token, JwtConfig};
use classifieds_api::auth::password::hash_password;
use classifieds_api::config::{LogFormat, ServerConfig};
use classifieds_api::router::build_app_router;
use classifieds_api::state::AppState;
use classifieds_core::location::Placement;
use classifieds_core::user::DEFAULT_USER_TYPE;
use classifieds_db::models::user::{CreateUser, User};
use classifieds_db::repositories::UserRepo;

/// Password given to every user created through [`create_user`].
pub const PASSWORD: &str = "StrongPassword1!";

static NEXT_PHONE: AtomicU64 = AtomicU64::new(700_000_001);

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        log_format: LogFormat::Text,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 60,
        },
        bootstrap_staff: None,
    }
}

/// Build the full application router, with the production middleware stack,
/// over the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Insert a user directly, bypassing registration checks.
pub async fn create_user(pool: &PgPool, username: &str, is_staff: bool) -> User {
    create_user_at(pool, username, is_staff, Placement::default()).await
}

/// Like [`create_user`], with the location pointers set to `placement`.
pub async fn create_user_at(
    pool: &PgPool,
    username: &str,
    is_staff: bool,
    placement: Placement,
) -> User {
    let phone_number = NEXT_PHONE.fetch_add(1, Ordering::Relaxed).to_string();
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        phone_number,
        password_hash: hash_password(PASSWORD).expect("hashing should succeed"),
        user_type: DEFAULT_USER_TYPE.to_string(),
        is_staff,
        placement,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Bearer token for `user`, signed with the test secret.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &test_config().jwt).expect("token generation should succeed")
}

/// Send a request with an optional JSON body and optional bearer token.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body), Some(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, Some(token)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}
