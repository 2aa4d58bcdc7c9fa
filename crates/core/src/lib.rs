//! Domain types and pure logic for the classifieds backend.
//!
//! Nothing in this crate performs I/O. The database and HTTP layers call into
//! these functions for validation, access decisions, and the location
//! normalization that runs before a user row is written.

pub mod access;
pub mod advertisement;
pub mod error;
pub mod location;
pub mod pagination;
pub mod password_policy;
pub mod payload;
pub mod types;
pub mod user;
pub mod validation;
