//! Requesting-user extractor.
//!
//! Sessions are handled upstream; the session layer forwards the signed-in
//! user's id in the `x-user-id` header.

use super::AppState;
use crate::{
    core::{filter::Viewer, user},
    entities,
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};

/// Header carrying the signed-in user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The signed-in user making the request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub entities::user::Model);

impl CurrentUser {
    /// The user as a grant viewer.
    #[must_use]
    pub fn viewer(&self) -> Viewer {
        Viewer::from(&self.0)
    }
}

fn user_id_from(parts: &Parts) -> Option<i64> {
    parts
        .headers
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let Some(user_id) = user_id_from(parts) else {
            trace!("Missing or malformed user id header");
            return Err(Error::Unauthenticated);
        };

        let user = user::get_user_by_id(&state.db, user_id)
            .await?
            .ok_or(Error::Unauthenticated)?;
        Ok(Self(user))
    }
}
