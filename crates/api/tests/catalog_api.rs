//! HTTP-level integration tests for categories, characteristics and the
//! category-characteristic declarations.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_user, delete_auth, get_auth, post_json_auth, token_for};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create(pool: &PgPool, token: &str, uri: &str, body: Value) -> Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, uri, body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED, "POST {uri}");
    body_json(response).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_names_are_unique(pool: PgPool) {
    let staff = create_user(&pool, "admin", true).await;
    let token = token_for(&staff);
    create(&pool, &token, "/api/v1/categories/", json!({"name": "Cars"})).await;

    let app = common::build_test_app(pool);
    let response =
        post_json_auth(app, "/api/v1/categories/", json!({"name": "Cars"}), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["name"], json!(["category with this name already exists."]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_characteristic_name_limits(pool: PgPool) {
    let staff = create_user(&pool, "admin", true).await;
    let token = token_for(&staff);
    create(&pool, &token, "/api/v1/characteristics/", json!({"name": "Color"})).await;

    let app = common::build_test_app(pool.clone());
    let response =
        post_json_auth(app, "/api/v1/characteristics/", json!({"name": "Color"}), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["name"],
        json!(["characteristic with this name already exists."])
    );

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/characteristics/",
        json!({"name": "x".repeat(41)}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["name"],
        json!(["Ensure this field has no more than 40 characters."])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_declaration_pair_is_unique(pool: PgPool) {
    let staff = create_user(&pool, "admin", true).await;
    let token = token_for(&staff);
    let category = create(&pool, &token, "/api/v1/categories/", json!({"name": "Cars"})).await;
    let color = create(&pool, &token, "/api/v1/characteristics/", json!({"name": "Color"})).await;
    let body = json!({"category": category["id"], "characteristic": color["id"]});

    let declared = create(&pool, &token, "/api/v1/category-characteristics/", body.clone()).await;
    assert_eq!(declared["category"]["name"], "Cars");
    assert_eq!(declared["characteristic"]["name"], "Color");

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/category-characteristics/", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["non_field_errors"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_declarations_filter_by_category(pool: PgPool) {
    let staff = create_user(&pool, "admin", true).await;
    let token = token_for(&staff);
    let cars = create(&pool, &token, "/api/v1/categories/", json!({"name": "Cars"})).await;
    let flats = create(&pool, &token, "/api/v1/categories/", json!({"name": "Flats"})).await;
    let color = create(&pool, &token, "/api/v1/characteristics/", json!({"name": "Color"})).await;
    for category in [&cars, &flats] {
        create(
            &pool,
            &token,
            "/api/v1/category-characteristics/",
            json!({"category": category["id"], "characteristic": color["id"]}),
        )
        .await;
    }

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/category-characteristics/?category={}", flats["id"]);
    let response = get_auth(app, &uri, &token).await;
    let json = body_json(response).await;
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["category"]["id"], flats["id"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_staff_cannot_delete_category(pool: PgPool) {
    let staff = create_user(&pool, "admin", true).await;
    let user = create_user(&pool, "regular", false).await;
    let category =
        create(&pool, &token_for(&staff), "/api/v1/categories/", json!({"name": "Cars"})).await;

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/categories/{}/", category["id"]);
    let response = delete_auth(app, &uri, &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = delete_auth(app, &uri, &token_for(&staff)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
