//! Upload handlers.

use super::{AppState, CurrentUser};
use crate::{
    core::upload::{self, NewUpload},
    entities,
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
};
use tracing::debug;

/// `GET /uploads/new`
pub async fn new_upload(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<(StatusCode, Json<entities::upload::Model>)> {
    let upload = upload::new_upload_for(&state.db, user.id).await?;
    Ok((StatusCode::CREATED, Json(upload)))
}

/// `POST /uploads`
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(new_upload): Json<NewUpload>,
) -> Result<(StatusCode, Json<entities::upload::Model>)> {
    upload::authorize_new(
        &state.db,
        &current.viewer(),
        new_upload.owner,
        new_upload.grant_id,
    )
    .await?;
    let upload = upload::create_upload(&state.db, new_upload).await?;
    Ok((StatusCode::CREATED, Json(upload)))
}

/// `GET /uploads/{id}/download` - redirects to a short-lived file link.
pub async fn download(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Redirect> {
    let upload = upload::find_accessible(&state.db, &current.viewer(), id).await?;
    let url = upload::download_url(state.files.as_ref(), &upload, state.link_ttl()).await?;
    debug!(upload_id = id, "Issued download link");
    Ok(Redirect::temporary(&url))
}
