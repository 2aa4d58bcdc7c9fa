//! User entity model and DTOs.

use classifieds_core::location::Placement;
use classifieds_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    #[sqlx(rename = "type")]
    pub user_type: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: Timestamp,
    pub last_login_at: Option<Timestamp>,
    pub street_id: Option<DbId>,
    pub city_id: Option<DbId>,
    pub country_id: Option<DbId>,
}

impl User {
    /// The stored location pointers.
    pub fn placement(&self) -> Placement {
        Placement {
            country_id: self.country_id,
            city_id: self.city_id,
            street_id: self.street_id,
        }
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    #[serde(rename = "type")]
    pub user_type: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: Timestamp,
    pub last_login_at: Option<Timestamp>,
    pub street: Option<DbId>,
    pub city: Option<DbId>,
    pub country: Option<DbId>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            user_type: user.user_type,
            is_staff: user.is_staff,
            is_active: user.is_active,
            date_joined: user.date_joined,
            last_login_at: user.last_login_at,
            street: user.street_id,
            city: user.city_id,
            country: user.country_id,
        }
    }
}

/// DTO for creating a new user. The placement must already be reconciled.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub user_type: String,
    pub is_staff: bool,
    pub placement: Placement,
}

/// DTO for updating an existing user. `None` fields are left unchanged.
///
/// `placement`, when present, overwrites all three location pointers.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub user_type: Option<String>,
    pub password_hash: Option<String>,
    pub placement: Option<Placement>,
}

/// Which of the unique contact fields are already held by another user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct TakenFields {
    pub username: bool,
    pub email: bool,
    pub phone_number: bool,
}
