//! Request handlers, one submodule per API resource.
//!
//! Each submodule provides async handler functions (create, list, get_by_id,
//! update, delete) for a single resource. Request bodies are read field by
//! field through `classifieds_core::payload::Payload` so every problem is
//! reported at once; handlers then delegate to the corresponding repository
//! in `classifieds_db` and map errors via [`AppError`](crate::error::AppError).

pub mod advertisement;
pub mod advertisement_characteristic;
pub mod auth;
pub mod category;
pub mod category_characteristic;
pub mod characteristic;
pub mod city;
pub mod country;
pub mod street;
pub mod user;
