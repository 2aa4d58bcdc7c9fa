//! Route definitions for advertisements and their characteristic rows.

use axum::routing::get;
use axum::Router;

use crate::handlers::{advertisement, advertisement_characteristic};
use crate::state::AppState;

use super::resource;

/// ```text
/// GET, POST               /advertisements                    list (scoped), create
/// GET, PATCH, DELETE      /advertisements/{id}               owner or staff
/// GET, POST               /advertisement-characteristics     list (scoped), create
/// GET, PATCH, DELETE      /advertisement-characteristics/{id} owner or staff
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(resource(
            "/advertisements",
            get(advertisement::list).post(advertisement::create),
            get(advertisement::get_by_id)
                .patch(advertisement::update)
                .delete(advertisement::delete),
        ))
        .merge(resource(
            "/advertisement-characteristics",
            get(advertisement_characteristic::list).post(advertisement_characteristic::create),
            get(advertisement_characteristic::get_by_id)
                .patch(advertisement_characteristic::update)
                .delete(advertisement_characteristic::delete),
        ))
}
