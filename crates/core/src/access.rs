//! Access policy for every API resource.
//!
//! Permission is a pure function of the resource kind, the action, the caller
//! (or its absence), and the owner of the targeted row. Handlers resolve the
//! owner first, then ask [`authorize`].

use crate::error::{CoreError, NOT_AUTHENTICATED, PERMISSION_DENIED};
use crate::types::DbId;

/// What the request does to the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Create,
    Retrieve,
    Update,
    Delete,
}

/// Resource families sharing one policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// User accounts. The owner of a user row is the user itself.
    User,
    /// Countries, cities, streets, categories, characteristics and their
    /// associations.
    ReferenceData,
    /// Advertisements and their characteristic rows, owned by the author.
    Listing,
}

/// The authenticated identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: DbId,
    pub is_staff: bool,
}

impl Caller {
    pub fn owns(&self, owner: Option<DbId>) -> bool {
        owner == Some(self.user_id)
    }
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No credentials were presented (HTTP 401).
    NotAuthenticated,
    /// Credentials were valid but insufficient (HTTP 403).
    PermissionDenied,
}

impl From<Denial> for CoreError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::NotAuthenticated => CoreError::Unauthorized(NOT_AUTHENTICATED.into()),
            Denial::PermissionDenied => CoreError::Forbidden(PERMISSION_DENIED.into()),
        }
    }
}

/// Decide whether `caller` may perform `action` on a `resource` row owned by
/// `owner`.
///
/// `owner` is ignored for collection-level actions (list, create).
pub fn authorize(
    resource: Resource,
    action: Action,
    caller: Option<Caller>,
    owner: Option<DbId>,
) -> Result<(), Denial> {
    // Registration is the only anonymous operation.
    if resource == Resource::User && action == Action::Create {
        return Ok(());
    }

    let caller = caller.ok_or(Denial::NotAuthenticated)?;

    let allowed = match (resource, action) {
        (Resource::User, Action::List) => caller.is_staff,
        (Resource::User, Action::Retrieve) => caller.owns(owner) || caller.is_staff,
        (Resource::User, Action::Update | Action::Delete) => caller.owns(owner),
        (Resource::User, Action::Create) => true,

        (Resource::ReferenceData, Action::List | Action::Retrieve) => true,
        (Resource::ReferenceData, _) => caller.is_staff,

        (Resource::Listing, Action::List | Action::Create) => true,
        (Resource::Listing, _) => caller.owns(owner) || caller.is_staff,
    };

    if allowed {
        Ok(())
    } else {
        Err(Denial::PermissionDenied)
    }
}

/// Author filter to apply when listing advertisements.
///
/// Staff may filter by any author (or none); everyone else is pinned to
/// their own listings regardless of the requested filter.
pub fn listing_scope(caller: Caller, requested_author: Option<DbId>) -> Option<DbId> {
    if caller.is_staff {
        requested_author
    } else {
        Some(caller.user_id)
    }
}
