//! Integration tests for the Country -> City -> Street hierarchy:
//! cascade delete, set-null on user pointers, and re-parenting.

use classifieds_core::location::Placement;
use classifieds_db::models::location::{CreateCity, CreateStreet, UpdateCity, UpdateStreet};
use classifieds_db::models::user::{CreateUser, User};
use classifieds_db::repositories::{CityRepo, CountryRepo, StreetRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Chain {
    country_id: i64,
    city_id: i64,
    street_id: i64,
}

async fn seed_chain(pool: &PgPool, country: &str) -> Chain {
    let country = CountryRepo::create(pool, country).await.unwrap();
    let city = CityRepo::create(
        pool,
        &CreateCity {
            name: "Capital".to_string(),
            country_id: country.id,
        },
    )
    .await
    .unwrap();
    let street = StreetRepo::create(
        pool,
        &CreateStreet {
            name: "Main".to_string(),
            city_id: city.id,
        },
    )
    .await
    .unwrap();
    Chain {
        country_id: country.id,
        city_id: city.id,
        street_id: street.id,
    }
}

async fn placed_user(pool: &PgPool, username: &str, chain: &Chain) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            phone_number: format!("+1555{:06}", username.len()),
            password_hash: "hash".to_string(),
            user_type: "private entity".to_string(),
            is_staff: false,
            placement: Placement {
                country_id: Some(chain.country_id),
                city_id: Some(chain.city_id),
                street_id: Some(chain.street_id),
            },
        },
    )
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_joined_reads_nest_ancestors(pool: PgPool) {
    let chain = seed_chain(&pool, "France").await;

    let street = StreetRepo::find_by_id(&pool, chain.street_id)
        .await
        .unwrap()
        .expect("street should exist");
    assert_eq!(street.city_id, chain.city_id);
    assert_eq!(street.country_id, chain.country_id);
    assert_eq!(street.country_name, "France");

    let cities = CityRepo::list(&pool, Some(chain.country_id), None, None)
        .await
        .unwrap();
    assert_eq!(cities.len(), 1);
    assert_eq!(cities[0].country_name, "France");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_country_delete_cascades(pool: PgPool) {
    let chain = seed_chain(&pool, "Spain").await;

    assert!(CountryRepo::delete(&pool, chain.country_id).await.unwrap());

    assert!(CityRepo::find_by_id(&pool, chain.city_id).await.unwrap().is_none());
    assert!(StreetRepo::find_by_id(&pool, chain.street_id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_location_nulls_user_pointers(pool: PgPool) {
    let chain = seed_chain(&pool, "Italy").await;
    let user = placed_user(&pool, "resident", &chain).await;

    StreetRepo::delete(&pool, chain.street_id).await.unwrap();
    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(user.street_id, None);
    assert_eq!(user.city_id, Some(chain.city_id));

    CountryRepo::delete(&pool, chain.country_id).await.unwrap();
    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(user.placement(), Placement::default());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_country_name_is_unique(pool: PgPool) {
    CountryRepo::create(&pool, "Peru").await.unwrap();
    let err = CountryRepo::create(&pool, "Peru").await.unwrap_err();

    let db_err = err.as_database_error().expect("should be a database error");
    assert_eq!(db_err.constraint(), Some("uq_countries_name"));
    assert!(CountryRepo::name_taken(&pool, "Peru", None).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_moving_city_moves_users_country(pool: PgPool) {
    let chain = seed_chain(&pool, "Austria").await;
    let other = CountryRepo::create(&pool, "Germany").await.unwrap();
    let user = placed_user(&pool, "mover", &chain).await;

    let city = CityRepo::update(
        &pool,
        chain.city_id,
        &UpdateCity {
            name: None,
            country_id: Some(other.id),
        },
    )
    .await
    .unwrap()
    .expect("city should exist");
    assert_eq!(city.country_id, other.id);
    assert_eq!(city.country_name, "Germany");

    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(user.country_id, Some(other.id));
    assert_eq!(user.city_id, Some(chain.city_id));
    assert_eq!(user.street_id, Some(chain.street_id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_moving_street_moves_users_city_and_country(pool: PgPool) {
    let chain = seed_chain(&pool, "Norway").await;
    let target = seed_chain(&pool, "Sweden").await;
    let user = placed_user(&pool, "walker", &chain).await;

    StreetRepo::update(
        &pool,
        chain.street_id,
        &UpdateStreet {
            name: Some("Renamed".to_string()),
            city_id: Some(target.city_id),
        },
    )
    .await
    .unwrap()
    .expect("street should exist");

    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(user.street_id, Some(chain.street_id));
    assert_eq!(user.city_id, Some(target.city_id));
    assert_eq!(user.country_id, Some(target.country_id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_missing_city_returns_none(pool: PgPool) {
    let result = CityRepo::update(&pool, 999_999, &UpdateCity::default())
        .await
        .unwrap();
    assert!(result.is_none());
}
