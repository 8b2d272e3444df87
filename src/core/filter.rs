//! Grant visibility filters.
//!
//! A [`GrantFilter`] is a plain value holding the equality predicates a grant
//! listing is narrowed by. Filters compose by method chaining, applying an absent
//! value leaves the filter untouched, and nothing touches the database until
//! [`GrantFilter::apply`] turns the value into query predicates.

use crate::entities::{grant, user};
use sea_orm::{ColumnTrait, QueryFilter, Select};
use serde::{Deserialize, Deserializer};

/// How much of the grant table a requester is trusted to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerRole {
    /// Sees every grant and may filter freely
    Admin,
    /// Sees every grant in their own agency
    ApprovedWorker,
    /// Sees only the grants they own
    Worker,
}

/// The requesting user, reduced to what visibility decisions need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    /// Requesting user's id
    pub id: i64,
    /// Requesting user's agency, if assigned
    pub agency_id: Option<i64>,
    /// Administrator flag
    pub admin: bool,
    /// Approval flag
    pub approved: bool,
}

impl Viewer {
    /// Resolves the viewer's role. An approved worker without an agency has no
    /// agency to widen to and stays at [`ViewerRole::Worker`].
    #[must_use]
    pub const fn role(&self) -> ViewerRole {
        if self.admin {
            ViewerRole::Admin
        } else if self.approved && self.agency_id.is_some() {
            ViewerRole::ApprovedWorker
        } else {
            ViewerRole::Worker
        }
    }
}

impl From<&user::Model> for Viewer {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            agency_id: user.agency_id,
            admin: user.admin,
            approved: user.approved,
        }
    }
}

/// Optional narrowing requested by the caller, typically from query parameters.
///
/// Blank query values (`?user_id=`) deserialize to `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ListOptions {
    /// Only grants owned by this user
    #[serde(default, deserialize_with = "blank_as_none")]
    pub user_id: Option<i64>,
    /// Only grants whose owner works for this agency
    #[serde(default, deserialize_with = "blank_as_none")]
    pub agency_id: Option<i64>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Equality predicates narrowing a grant listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrantFilter {
    /// Owning user id
    pub user_id: Option<i64>,
    /// Owning user's agency id
    pub agency_id: Option<i64>,
}

impl GrantFilter {
    /// Only grants owned by `user_id`.
    #[must_use]
    pub const fn owned_by(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            agency_id: None,
        }
    }

    /// Narrows to one owner; `None` is a no-op.
    #[must_use]
    pub const fn by_user_id(self, user_id: Option<i64>) -> Self {
        match user_id {
            Some(id) => Self {
                user_id: Some(id),
                ..self
            },
            None => self,
        }
    }

    /// Narrows to one agency; `None` is a no-op.
    #[must_use]
    pub const fn by_agency_id(self, agency_id: Option<i64>) -> Self {
        match agency_id {
            Some(id) => Self {
                agency_id: Some(id),
                ..self
            },
            None => self,
        }
    }

    /// Builds the filter a viewer is allowed, honoring only the options their
    /// role permits:
    ///
    /// * admins get exactly the requested `user_id` / `agency_id`;
    /// * approved workers are pinned to their own agency and may narrow by `user_id`;
    /// * everyone else sees their own grants and the options are ignored.
    #[must_use]
    pub const fn for_viewer(viewer: &Viewer, options: &ListOptions) -> Self {
        match (viewer.role(), viewer.agency_id) {
            (ViewerRole::Admin, _) => Self {
                user_id: None,
                agency_id: None,
            }
            .by_user_id(options.user_id)
            .by_agency_id(options.agency_id),
            (ViewerRole::ApprovedWorker, Some(agency_id)) => Self {
                user_id: None,
                agency_id: Some(agency_id),
            }
            .by_user_id(options.user_id),
            _ => Self::owned_by(viewer.id),
        }
    }

    /// Adds the predicates to a grant query. The query must already be joined to
    /// `users` when an agency predicate is present.
    #[must_use]
    pub fn apply(self, select: Select<grant::Entity>) -> Select<grant::Entity> {
        let select = match self.user_id {
            Some(id) => select.filter(grant::Column::UserId.eq(id)),
            None => select,
        };
        match self.agency_id {
            Some(id) => select.filter(user::Column::AgencyId.eq(id)),
            None => select,
        }
    }
}
