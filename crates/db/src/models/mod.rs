//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` row structs matching a table (or a table joined with its parents)
//! - `Serialize` response shapes with ancestors nested
//! - Create and update DTOs consumed by the repositories

pub mod advertisement;
pub mod catalog;
pub mod location;
pub mod user;
