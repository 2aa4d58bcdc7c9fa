//! Handlers for the `/users` resource.
//!
//! Registration is the only anonymous endpoint. Every write runs the location
//! reconciliation before the row is stored, so the `street`, `city` and
//! `country` pointers of a user always describe one chain.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use classifieds_core::access::{Action, Resource};
use classifieds_core::error::CoreError;
use classifieds_core::location::{reconcile, Placement, PlacementChange};
use classifieds_core::password_policy::{check_strength, MISMATCH, SAME_AS_CURRENT, WRONG_CURRENT};
use classifieds_core::payload::{Mode, Patch, Payload, TextRule};
use classifieds_core::types::DbId;
use classifieds_core::user::{
    ContactFields, DEFAULT_USER_TYPE, EMAIL_MAX_LENGTH, EMAIL_TAKEN, PHONE_NUMBER_MAX_LENGTH,
    PHONE_NUMBER_TAKEN, USERNAME_MAX_LENGTH, USERNAME_TAKEN, USER_TYPES,
};
use classifieds_core::validation::{does_not_exist, FieldErrors, REQUIRED};
use classifieds_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use classifieds_db::repositories::{CityRepo, CountryRepo, StreetRepo, UserRepo};

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::{IdPath, JsonBody, ListQuery};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

async fn find(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// The contact fields read from one request.
struct Contact {
    username: Option<String>,
    email: Option<String>,
    phone_number: Option<String>,
}

fn well_formed<'a>(
    formats: &FieldErrors,
    field: &str,
    value: &'a Option<String>,
) -> Option<&'a str> {
    value.as_deref().filter(|_| !formats.contains(field))
}

/// Read `username`, `email` and `phone_number`, check their formats and make
/// sure no other user holds them.
async fn read_contact(
    state: &AppState,
    payload: &mut Payload<'_>,
    exclude_id: Option<DbId>,
) -> AppResult<Contact> {
    let contact = Contact {
        username: payload.text("username", TextRule::max(USERNAME_MAX_LENGTH)),
        email: payload.text("email", TextRule::max(EMAIL_MAX_LENGTH)),
        phone_number: payload.text("phone_number", TextRule::max(PHONE_NUMBER_MAX_LENGTH)),
    };

    let formats = ContactFields {
        username: contact.username.clone(),
        email: contact.email.clone(),
        phone_number: contact.phone_number.clone(),
    }
    .check();
    // Badly formatted values are not looked up.
    let username = well_formed(&formats, "username", &contact.username);
    let email = well_formed(&formats, "email", &contact.email);
    let phone_number = well_formed(&formats, "phone_number", &contact.phone_number);

    if username.is_some() || email.is_some() || phone_number.is_some() {
        let taken =
            UserRepo::find_taken(&state.pool, username, email, phone_number, exclude_id).await?;
        if taken.username {
            payload.reject("username", USERNAME_TAKEN);
        }
        if taken.email {
            payload.reject("email", EMAIL_TAKEN);
        }
        if taken.phone_number {
            payload.reject("phone_number", PHONE_NUMBER_TAKEN);
        }
    }
    payload.absorb(formats);
    Ok(contact)
}

/// Read `password` and `repeat_password`: both must match and pass every
/// strength rule.
fn read_new_password(payload: &mut Payload<'_>) -> Option<String> {
    let password = payload.secret("password");
    let repeat_password = payload.secret("repeat_password");
    let (password, repeat_password) = password.zip(repeat_password)?;

    if password != repeat_password {
        payload.reject("password", MISMATCH);
        return None;
    }
    let failures = check_strength(&password);
    if failures.is_empty() {
        return Some(password);
    }
    for message in failures {
        payload.reject("password", message);
    }
    None
}

/// Read the location references and resolve each to its full ancestry.
///
/// Unknown ids are field errors and leave that level unchanged.
async fn read_placement(
    state: &AppState,
    payload: &mut Payload<'_>,
) -> AppResult<PlacementChange> {
    let mut country = payload.nullable_reference("country");
    if let Patch::Set(id) = country {
        if !CountryRepo::exists(&state.pool, id).await? {
            payload.reject("country", does_not_exist(id));
            country = Patch::Keep;
        }
    }

    let city = match payload.nullable_reference("city") {
        Patch::Set(id) => match CityRepo::find_by_id(&state.pool, id).await? {
            Some(city) => Patch::Set(city.link()),
            None => {
                payload.reject("city", does_not_exist(id));
                Patch::Keep
            }
        },
        Patch::Clear => Patch::Clear,
        Patch::Keep => Patch::Keep,
    };

    let street = match payload.nullable_reference("street") {
        Patch::Set(id) => match StreetRepo::find_by_id(&state.pool, id).await? {
            Some(street) => Patch::Set(street.link()),
            None => {
                payload.reject("street", does_not_exist(id));
                Patch::Keep
            }
        },
        Patch::Clear => Patch::Clear,
        Patch::Keep => Patch::Keep,
    };

    Ok(PlacementChange {
        country,
        city,
        street,
    })
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

/// POST /api/v1/users
///
/// Anonymous registration.
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let mut payload = Payload::new(&body, Mode::Create);
    let contact = read_contact(&state, &mut payload, None).await?;
    let password = read_new_password(&mut payload);
    let user_type = payload.choice("type", USER_TYPES).unwrap_or(DEFAULT_USER_TYPE);
    let change = read_placement(&state, &mut payload).await?;

    let ((username, email), (phone_number, password)) = payload.finish_with(
        contact
            .username
            .zip(contact.email)
            .zip(contact.phone_number.zip(password)),
    )?;

    let input = CreateUser {
        username,
        email,
        phone_number,
        password_hash: hash(&password)?,
        user_type: user_type.to_string(),
        is_staff: false,
        placement: reconcile(Placement::default(), change),
    };
    let user = UserRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/v1/users
///
/// Staff only.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    ListQuery(params): ListQuery<PaginationParams>,
) -> AppResult<Json<Vec<UserResponse>>> {
    user.authorize(Resource::User, Action::List, None)?;

    let users = UserRepo::list(&state.pool, params.limit, params.offset).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<UserResponse>> {
    let target = find(&state, id).await?;
    user.authorize(Resource::User, Action::Retrieve, Some(target.id))?;
    Ok(Json(target.into()))
}

/// GET /api/v1/users/me
pub async fn me(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<UserResponse>> {
    let current = find(&state, user.user_id).await?;
    Ok(Json(current.into()))
}

/// PATCH /api/v1/users/{id}
///
/// Owner only. Changing the password needs `current_password`, `password`
/// and `repeat_password` together.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody,
) -> AppResult<Json<UserResponse>> {
    let target = find(&state, id).await?;
    user.authorize(Resource::User, Action::Update, Some(target.id))?;

    let mut payload = Payload::new(&body, Mode::Patch);
    let contact = read_contact(&state, &mut payload, Some(id)).await?;
    let user_type = payload.choice("type", USER_TYPES);
    let password = read_password_change(&mut payload, &target)?;
    let change = read_placement(&state, &mut payload).await?;
    payload.finish()?;

    let input = UpdateUser {
        username: contact.username,
        email: contact.email,
        phone_number: contact.phone_number,
        user_type: user_type.map(str::to_string),
        password_hash: password.as_deref().map(hash).transpose()?,
        placement: (!change.is_empty()).then(|| reconcile(target.placement(), change)),
    };
    let updated = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        user_id = id,
        password_changed = input.password_hash.is_some(),
        "User updated"
    );
    Ok(Json(updated.into()))
}

/// Read a password change from a PATCH body.
///
/// Returns the new plaintext password, or `None` when the body does not
/// touch the password or the change was rejected.
fn read_password_change(payload: &mut Payload<'_>, target: &User) -> AppResult<Option<String>> {
    const FIELDS: [&str; 3] = ["current_password", "password", "repeat_password"];
    if !FIELDS.iter().any(|field| payload.has(field)) {
        return Ok(None);
    }
    for field in FIELDS {
        if !payload.has(field) {
            payload.reject(field, REQUIRED);
        }
    }

    let current = payload.secret("current_password");
    let new_password = read_new_password(payload);
    let Some(current) = current else {
        return Ok(None);
    };
    let verified = verify_password(&current, &target.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !verified {
        payload.reject("current_password", WRONG_CURRENT);
        return Ok(None);
    }
    match new_password {
        Some(password) if password == current => {
            payload.reject("password", SAME_AS_CURRENT);
            Ok(None)
        }
        other => Ok(other),
    }
}

/// DELETE /api/v1/users/{id}
///
/// Deactivates the account; the row is kept.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    let target = find(&state, id).await?;
    user.authorize(Resource::User, Action::Delete, Some(target.id))?;

    UserRepo::deactivate(&state.pool, id).await?;
    tracing::info!(user_id = id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}
