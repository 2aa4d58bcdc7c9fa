//! Integration tests for advertisements, their characteristic rows, and the
//! catalog associations they depend on.

use std::str::FromStr;

use classifieds_core::advertisement::CharacteristicValue;
use classifieds_core::location::Placement;
use classifieds_core::payload::Patch;
use classifieds_db::models::advertisement::{
    AdvertisementFilter, AdvertisementResponse, CreateAdvertisement,
    CreateAdvertisementCharacteristic, UpdateAdvertisement,
};
use classifieds_db::models::user::CreateUser;
use classifieds_db::repositories::{
    AdvertisementCharacteristicRepo, AdvertisementRepo, CategoryCharacteristicRepo, CategoryRepo,
    CharacteristicRepo, UserRepo,
};
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_author(pool: &PgPool, username: &str, phone: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            phone_number: phone.to_string(),
            password_hash: "hash".to_string(),
            user_type: "private entity".to_string(),
            is_staff: false,
            placement: Placement::default(),
        },
    )
    .await
    .unwrap()
    .id
}

fn value(characteristic_id: i64, value: &str) -> CharacteristicValue {
    CharacteristicValue {
        characteristic_id,
        value: value.to_string(),
    }
}

fn new_ad(author_id: i64, category_id: i64, values: Vec<CharacteristicValue>) -> CreateAdvertisement {
    CreateAdvertisement {
        name: "Bike".to_string(),
        description: Some("Barely used".to_string()),
        author_id,
        category_id,
        price: Decimal::from_str("150.50").unwrap(),
        characteristics: values,
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_characteristic_pair_is_unique(pool: PgPool) {
    let category = CategoryRepo::create(&pool, "Vehicles").await.unwrap();
    let color = CharacteristicRepo::create(&pool, "Color").await.unwrap();

    let row = CategoryCharacteristicRepo::create(&pool, category.id, color.id)
        .await
        .unwrap();
    assert_eq!(row.category_name, "Vehicles");
    assert_eq!(row.characteristic_name, "Color");

    let err = CategoryCharacteristicRepo::create(&pool, category.id, color.id)
        .await
        .unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("uq_category_characteristics_category_characteristic")
    );
    assert!(CategoryCharacteristicRepo::pair_exists(&pool, category.id, color.id, None)
        .await
        .unwrap());
    assert!(!CategoryCharacteristicRepo::pair_exists(&pool, category.id, color.id, Some(row.id))
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_declared_and_existing_characteristics(pool: PgPool) {
    let category = CategoryRepo::create(&pool, "Phones").await.unwrap();
    let brand = CharacteristicRepo::create(&pool, "Brand").await.unwrap();
    let size = CharacteristicRepo::create(&pool, "Size").await.unwrap();
    CategoryCharacteristicRepo::create(&pool, category.id, brand.id)
        .await
        .unwrap();

    let ids = [brand.id, size.id, 999_999];
    let existing = CharacteristicRepo::existing_ids(&pool, &ids).await.unwrap();
    let declared = CategoryCharacteristicRepo::declared_for(&pool, category.id, &ids)
        .await
        .unwrap();

    assert_eq!(existing.len(), 2);
    assert!(declared.contains(&brand.id));
    assert!(!declared.contains(&size.id));
}

// ---------------------------------------------------------------------------
// Advertisements
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_inserts_characteristics_in_batch(pool: PgPool) {
    let author = seed_author(&pool, "seller", "+100000001").await;
    let category = CategoryRepo::create(&pool, "Bikes").await.unwrap();
    let color = CharacteristicRepo::create(&pool, "Color").await.unwrap();
    let wheel = CharacteristicRepo::create(&pool, "Wheel").await.unwrap();

    let ad = AdvertisementRepo::create(
        &pool,
        &new_ad(author, category.id, vec![value(color.id, "red"), value(wheel.id, "28")]),
    )
    .await
    .unwrap();
    assert_eq!(ad.viewed_count, 0);
    assert_eq!(ad.price.to_string(), "150.50");

    let rows = AdvertisementRepo::characteristics_for(&pool, &[ad.id]).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].characteristic_name, "Color");
    assert_eq!(rows[1].value, "28");

    let response = AdvertisementResponse::assemble(ad, &rows);
    assert_eq!(response.characteristics.len(), 2);
    assert_eq!(response.author, author);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_characteristic_insert_rolls_back(pool: PgPool) {
    let author = seed_author(&pool, "seller", "+100000001").await;
    let category = CategoryRepo::create(&pool, "Bikes").await.unwrap();
    let color = CharacteristicRepo::create(&pool, "Color").await.unwrap();

    let result = AdvertisementRepo::create(
        &pool,
        &new_ad(author, category.id, vec![value(color.id, "red"), value(color.id, "blue")]),
    )
    .await;
    assert!(result.is_err(), "duplicate characteristic must fail");

    let ads = AdvertisementRepo::list(&pool, &AdvertisementFilter::default())
        .await
        .unwrap();
    assert!(ads.is_empty(), "advertisement row must be rolled back");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_negative_price_rejected_by_store(pool: PgPool) {
    let author = seed_author(&pool, "seller", "+100000001").await;
    let category = CategoryRepo::create(&pool, "Bikes").await.unwrap();

    let mut input = new_ad(author, category.id, vec![]);
    input.price = Decimal::from_str("-1").unwrap();
    let err = AdvertisementRepo::create(&pool, &input).await.unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("ck_advertisements_price")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_replaces_characteristic_set(pool: PgPool) {
    let author = seed_author(&pool, "seller", "+100000001").await;
    let category = CategoryRepo::create(&pool, "Bikes").await.unwrap();
    let color = CharacteristicRepo::create(&pool, "Color").await.unwrap();
    let wheel = CharacteristicRepo::create(&pool, "Wheel").await.unwrap();

    let ad = AdvertisementRepo::create(&pool, &new_ad(author, category.id, vec![value(color.id, "red")]))
        .await
        .unwrap();

    let updated = AdvertisementRepo::update(
        &pool,
        ad.id,
        &UpdateAdvertisement {
            description: Patch::Clear,
            characteristics: Some(vec![value(wheel.id, "26")]),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .expect("advertisement should exist");
    assert_eq!(updated.description, None);
    assert_eq!(updated.name, "Bike");

    let rows = AdvertisementRepo::characteristics_for(&pool, &[ad.id]).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].characteristic_id, wheel.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_by_author_and_category(pool: PgPool) {
    let alice = seed_author(&pool, "alice", "+100000001").await;
    let bob = seed_author(&pool, "bob", "+100000002").await;
    let bikes = CategoryRepo::create(&pool, "Bikes").await.unwrap();
    let cars = CategoryRepo::create(&pool, "Cars").await.unwrap();

    AdvertisementRepo::create(&pool, &new_ad(alice, bikes.id, vec![])).await.unwrap();
    AdvertisementRepo::create(&pool, &new_ad(alice, cars.id, vec![])).await.unwrap();
    AdvertisementRepo::create(&pool, &new_ad(bob, bikes.id, vec![])).await.unwrap();

    let by_alice = AdvertisementRepo::list(
        &pool,
        &AdvertisementFilter {
            author_id: Some(alice),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_alice.len(), 2);

    let alice_bikes = AdvertisementRepo::list(
        &pool,
        &AdvertisementFilter {
            author_id: Some(alice),
            category_id: Some(bikes.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(alice_bikes.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_characteristic_cascades_to_rows(pool: PgPool) {
    let author = seed_author(&pool, "seller", "+100000001").await;
    let category = CategoryRepo::create(&pool, "Bikes").await.unwrap();
    let color = CharacteristicRepo::create(&pool, "Color").await.unwrap();
    let ad = AdvertisementRepo::create(&pool, &new_ad(author, category.id, vec![]))
        .await
        .unwrap();

    let row = AdvertisementCharacteristicRepo::create(
        &pool,
        &CreateAdvertisementCharacteristic {
            advertisement_id: ad.id,
            characteristic_id: color.id,
            value: "green".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(row.author_id, author);

    CharacteristicRepo::delete(&pool, color.id).await.unwrap();
    assert!(AdvertisementCharacteristicRepo::find_by_id(&pool, row.id)
        .await
        .unwrap()
        .is_none());
}
