//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated, active user behind a Bearer token.
//! - [`rbac::RequireStaff`] -- requires a staff account.

pub mod auth;
pub mod rbac;
