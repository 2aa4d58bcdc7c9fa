//! HTTP-level integration tests for registration, profile updates and the
//! user access rules.

mod common;

use axum::http::StatusCode;
use classifieds_core::location::Placement;
use classifieds_db::models::location::{CreateCity, CreateStreet};
use classifieds_db::repositories::{CityRepo, CountryRepo, StreetRepo, UserRepo};
use common::{
    body_json, create_user, create_user_at, delete_auth, get, get_auth, patch_json_auth,
    post_json, token_for, PASSWORD,
};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn registration(username: &str) -> Value {
    json!({
        "username": username,
        "email": format!("{username}@test.ru"),
        "phone_number": "987654321",
        "password": PASSWORD,
        "repeat_password": PASSWORD,
    })
}

/// A country with one city and one street. Returns their ids.
async fn seed_chain(pool: &PgPool, country: &str) -> (i64, i64, i64) {
    let country = CountryRepo::create(pool, country).await.unwrap();
    let city = CityRepo::create(
        pool,
        &CreateCity {
            name: format!("{} city", country.name),
            country_id: country.id,
        },
    )
    .await
    .unwrap();
    let street = StreetRepo::create(
        pool,
        &CreateStreet {
            name: format!("{} street", country.name),
            city_id: city.id,
        },
    )
    .await
    .unwrap();
    (country.id, city.id, street.id)
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_returns_user_without_password(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/v1/users/", registration("test")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["username"], "test");
    assert_eq!(json["email"], "test@test.ru");
    assert_eq!(json["type"], "private entity");
    assert_eq!(json["is_staff"], false);
    assert!(json.get("password").is_none());
    assert!(json.get("password_hash").is_none());
    assert!(json["street"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_password_mismatch(pool: PgPool) {
    let app = common::build_test_app(pool);
    let mut body = registration("test");
    body["repeat_password"] = json!("DifferentPassword1!");

    let response = post_json(app, "/api/v1/users", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["password"], json!(["Password fields do not match."]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_weak_passwords(pool: PgPool) {
    let cases = [
        (
            "93825647895217321596227862362245821005",
            "This password is entirely numeric.",
        ),
        (
            "strpas1",
            "This password is too short. It must contain at least 8 characters.",
        ),
        ("password", "This password is too common."),
    ];
    for (password, message) in cases {
        let app = common::build_test_app(pool.clone());
        let mut body = registration("test");
        body["password"] = json!(password);
        body["repeat_password"] = json!(password);

        let response = post_json(app, "/api/v1/users/", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{password}");
        let json = body_json(response).await;
        let messages = json["password"].as_array().unwrap();
        assert!(messages.contains(&json!(message)), "{password}: {json}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_password_with_null_character(pool: PgPool) {
    let app = common::build_test_app(pool);
    let mut body = registration("test");
    body["password"] = json!("Strong\0Password1!");
    body["repeat_password"] = json!("Strong\0Password1!");

    let response = post_json(app, "/api/v1/users/", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["password"], json!(["Null characters are not allowed."]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_reports_every_missing_field(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/v1/users/", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    for field in ["username", "email", "phone_number", "password", "repeat_password"] {
        assert_eq!(json[field], json!(["This field is required."]), "{field}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_invalid_email_and_type(pool: PgPool) {
    let app = common::build_test_app(pool);
    let mut body = registration("test");
    body["email"] = json!("email");
    body["type"] = json!("invalid");

    let response = post_json(app, "/api/v1/users/", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["email"], json!(["Enter a valid email address."]));
    assert_eq!(json["type"], json!(["\"invalid\" is not a valid choice."]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_duplicate_contact_fields(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/users/", registration("test")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/users/", registration("test")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["username"],
        json!(["user with this username already exists."])
    );
    assert_eq!(json["email"], json!(["A user with that email already exists."]));
    assert_eq!(
        json["phone_number"],
        json!(["A user with that phone number already exists."])
    );
}

// ---------------------------------------------------------------------------
// Location reconciliation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_with_street_fills_ancestors(pool: PgPool) {
    let (country, city, street) = seed_chain(&pool, "Russia").await;
    let app = common::build_test_app(pool);
    let mut body = registration("test");
    body["street"] = json!(street);

    let response = post_json(app, "/api/v1/users/", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["street"], street);
    assert_eq!(json["city"], city);
    assert_eq!(json["country"], country);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_street_ancestry_overrides_conflicting_country(pool: PgPool) {
    let (country, city, street) = seed_chain(&pool, "Russia").await;
    let (other_country, other_city, _) = seed_chain(&pool, "France").await;
    let app = common::build_test_app(pool);
    let mut body = registration("test");
    body["street"] = json!(street);
    body["city"] = json!(other_city);
    body["country"] = json!(other_country);

    let response = post_json(app, "/api/v1/users/", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["city"], city);
    assert_eq!(json["country"], country);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_unknown_street_is_field_error(pool: PgPool) {
    let app = common::build_test_app(pool);
    let mut body = registration("test");
    body["street"] = json!(999);

    let response = post_json(app, "/api/v1/users/", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["street"],
        json!(["Invalid pk \"999\" - object does not exist."])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_country_drops_city_of_other_country(pool: PgPool) {
    let (country, city, street) = seed_chain(&pool, "Russia").await;
    let (other_country, _, _) = seed_chain(&pool, "France").await;
    let placement = Placement {
        country_id: Some(country),
        city_id: Some(city),
        street_id: Some(street),
    };
    let user = create_user_at(&pool, "mover", false, placement).await;
    let token = token_for(&user);
    let app = common::build_test_app(pool);

    let response = patch_json_auth(
        app,
        &format!("/api/v1/users/{}/", user.id),
        json!({"country": other_country}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["country"], other_country);
    assert!(json["city"].is_null());
    assert!(json["street"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_null_city_clears_street(pool: PgPool) {
    let (country, city, street) = seed_chain(&pool, "Russia").await;
    let placement = Placement {
        country_id: Some(country),
        city_id: Some(city),
        street_id: Some(street),
    };
    let user = create_user_at(&pool, "clearer", false, placement).await;
    let token = token_for(&user);
    let app = common::build_test_app(pool);

    let response = patch_json_auth(
        app,
        &format!("/api/v1/users/{}", user.id),
        json!({"city": null}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["country"], country);
    assert!(json["city"].is_null());
    assert!(json["street"].is_null());
}

// ---------------------------------------------------------------------------
// Access rules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_users_requires_staff(pool: PgPool) {
    let user = create_user(&pool, "regular", false).await;
    let staff = create_user(&pool, "admin", true).await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/users/").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get("www-authenticate").unwrap(),
        "Bearer realm=\"api\""
    );

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/users/", &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/users/", &token_for(&staff)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_retrieve_is_self_or_staff(pool: PgPool) {
    let alice = create_user(&pool, "alice", false).await;
    let bob = create_user(&pool, "bob", false).await;
    let staff = create_user(&pool, "admin", true).await;
    let uri = format!("/api/v1/users/{}/", alice.id);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &uri, &token_for(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &uri, &token_for(&bob)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &uri, &token_for(&staff)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_returns_caller(pool: PgPool) {
    let user = create_user(&pool, "myself", false).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/users/me/", &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], user.id);
    assert_eq!(json["username"], "myself");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_and_delete_other_user_forbidden(pool: PgPool) {
    let alice = create_user(&pool, "alice", false).await;
    let bob = create_user(&pool, "bob", false).await;
    let uri = format!("/api/v1/users/{}/", alice.id);

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(app, &uri, json!({"type": "legal entity"}), &token_for(&bob)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &uri, &token_for(&bob)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response =
        patch_json_auth(app, &uri, json!({"type": "legal entity"}), &token_for(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["type"], "legal entity");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_deactivates_and_locks_out(pool: PgPool) {
    let user = create_user(&pool, "leaver", false).await;
    let token = token_for(&user);
    let uri = format!("/api/v1/users/{}/", user.id);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(!stored.is_active);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/users/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["detail"], "User inactive or deleted.");
}

// ---------------------------------------------------------------------------
// Password change
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_password_change_requires_current_password(pool: PgPool) {
    let user = create_user(&pool, "changer", false).await;
    let app = common::build_test_app(pool);

    let response = patch_json_auth(
        app,
        &format!("/api/v1/users/{}/", user.id),
        json!({"password": "AnotherStrong1!", "repeat_password": "AnotherStrong1!"}),
        &token_for(&user),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["current_password"], json!(["This field is required."]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_password_change_rejects_wrong_and_same_password(pool: PgPool) {
    let user = create_user(&pool, "changer", false).await;
    let token = token_for(&user);
    let uri = format!("/api/v1/users/{}/", user.id);

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &uri,
        json!({
            "current_password": "NotMyPassword1!",
            "password": "AnotherStrong1!",
            "repeat_password": "AnotherStrong1!",
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["current_password"], json!(["Invalid password."]));

    let app = common::build_test_app(pool);
    let response = patch_json_auth(
        app,
        &uri,
        json!({
            "current_password": PASSWORD,
            "password": PASSWORD,
            "repeat_password": PASSWORD,
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["password"],
        json!(["New password should differ from the current one."])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_password_change_allows_login_with_new_password(pool: PgPool) {
    let user = create_user(&pool, "changer", false).await;

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &format!("/api/v1/users/{}/", user.id),
        json!({
            "current_password": PASSWORD,
            "password": "AnotherStrong1!",
            "repeat_password": "AnotherStrong1!",
        }),
        &token_for(&user),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/token/",
        json!({"username": "changer", "password": "AnotherStrong1!"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
