//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

use super::{method_not_allowed, resource};

/// ```text
/// GET, POST               /users          list (staff), register (public)
/// GET                     /users/me       caller's own record
/// GET, PATCH, DELETE      /users/{id}     get (self or staff), update, deactivate (self)
/// ```
pub fn router() -> Router<AppState> {
    let me = get(user::me).fallback(method_not_allowed);
    Router::new()
        .route("/users/me", me.clone())
        .route("/users/me/", me)
        .merge(resource(
            "/users",
            get(user::list).post(user::create),
            get(user::get_by_id).patch(user::update).delete(user::delete),
        ))
}
