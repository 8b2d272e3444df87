//! User handlers.

use super::{AppState, CurrentUser};
use crate::{
    core::user::{self, UserUpdate},
    entities,
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// `GET /users`
pub async fn index(
    State(state): State<AppState>,
    _current: CurrentUser,
) -> Result<Json<Vec<entities::user::Model>>> {
    Ok(Json(user::list_users(&state.db).await?))
}

/// `PATCH /users/{id}`
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i64>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<entities::user::Model>> {
    Ok(Json(user::update_user(&state.db, &actor, id, update).await?))
}

/// `DELETE /users/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    user::destroy_user(&state.db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
