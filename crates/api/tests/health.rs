//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_needs_no_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health/").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn response_contains_x_request_id_header(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("response must carry x-request-id");
    assert!(!request_id.to_str().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cors_preflight_allows_configured_origin(pool: PgPool) {
    let app = common::build_test_app(pool);
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/countries/")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "PATCH")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://localhost:5173"
    );
}
