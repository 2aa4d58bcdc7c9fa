//! Repository for the `users` table.

use classifieds_core::pagination::{clamp_limit, clamp_offset};
use classifieds_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, TakenFields, UpdateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, phone_number, password_hash, type, is_staff, \
                       is_active, date_joined, last_login_at, street_id, city_id, country_id";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users
                (username, email, phone_number, password_hash, type, is_staff,
                 street_id, city_id, country_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.phone_number)
            .bind(&input.password_hash)
            .bind(&input.user_type)
            .bind(input.is_staff)
            .bind(input.placement.street_id)
            .bind(input.placement.city_id)
            .bind(input.placement.country_id)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// List users in id order.
    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, User>(&query)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Report which of the given contact values already belong to a user
    /// other than `exclude_id`. `None` values are never reported as taken.
    pub async fn find_taken(
        pool: &PgPool,
        username: Option<&str>,
        email: Option<&str>,
        phone_number: Option<&str>,
        exclude_id: Option<DbId>,
    ) -> Result<TakenFields, sqlx::Error> {
        sqlx::query_as::<_, TakenFields>(
            "SELECT
                EXISTS (SELECT 1 FROM users
                        WHERE username = $1 AND id IS DISTINCT FROM $4) AS username,
                EXISTS (SELECT 1 FROM users
                        WHERE email = $2 AND id IS DISTINCT FROM $4) AS email,
                EXISTS (SELECT 1 FROM users
                        WHERE phone_number = $3 AND id IS DISTINCT FROM $4) AS phone_number",
        )
        .bind(username)
        .bind(email)
        .bind(phone_number)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let placement = input.placement.unwrap_or_default();
        let query = format!(
            "UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                phone_number = COALESCE($4, phone_number),
                type = COALESCE($5, type),
                password_hash = COALESCE($6, password_hash),
                street_id = CASE WHEN $7 THEN $8 ELSE street_id END,
                city_id = CASE WHEN $7 THEN $9 ELSE city_id END,
                country_id = CASE WHEN $7 THEN $10 ELSE country_id END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.phone_number)
            .bind(&input.user_type)
            .bind(&input.password_hash)
            .bind(input.placement.is_some())
            .bind(placement.street_id)
            .bind(placement.city_id)
            .bind(placement.country_id)
            .fetch_optional(pool)
            .await
    }

    /// Soft-deactivate a user by setting `is_active = false`.
    ///
    /// Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set `last_login_at` to now.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
