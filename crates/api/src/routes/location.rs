//! Route definitions for the location hierarchy.

use axum::routing::get;
use axum::Router;

use crate::handlers::{city, country, street};
use crate::state::AppState;

use super::resource;

/// ```text
/// GET, POST               /countries      list, create (create: staff)
/// GET, PATCH, DELETE      /countries/{id} get, update, delete (writes: staff)
/// ```
///
/// `/cities` and `/streets` follow the same shape.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(resource(
            "/countries",
            get(country::list).post(country::create),
            get(country::get_by_id)
                .patch(country::update)
                .delete(country::delete),
        ))
        .merge(resource(
            "/cities",
            get(city::list).post(city::create),
            get(city::get_by_id).patch(city::update).delete(city::delete),
        ))
        .merge(resource(
            "/streets",
            get(street::list).post(street::create),
            get(street::get_by_id)
                .patch(street::update)
                .delete(street::delete),
        ))
}
