//! Grant handlers.

use super::{AppState, CurrentUser, error::FormRejection};
use crate::{
    core::{
        filter::{ListOptions, Viewer},
        grant::{self, GrantDetail, GrantRow},
        grant_form::{self, GrantForm},
        upload,
    },
    entities::{coverage_type, grant_reason_type, payee, person, residence, upload as upload_entity},
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::info;

/// A grant with its listing fields and nested components
#[derive(Debug, Serialize)]
pub struct GrantDetailResponse {
    /// Listing fields
    #[serde(flatten)]
    pub row: GrantRow,
    /// Owning case worker
    pub user_id: Option<i64>,
    /// Status id
    pub grant_status_id: Option<i64>,
    /// Applicants, primary applicant first
    pub people: Vec<person::Model>,
    /// Linked payees
    pub payees: Vec<payee::Model>,
    /// Current residence
    pub residence: Option<residence::Model>,
    /// Recorded reasons
    pub reason_types: Vec<grant_reason_type::Model>,
    /// Linked coverage types
    pub coverage_types: Vec<coverage_type::Model>,
}

impl From<GrantDetail> for GrantDetailResponse {
    fn from(detail: GrantDetail) -> Self {
        Self {
            row: GrantRow::from(&detail.summary),
            user_id: detail.summary.grant.user_id,
            grant_status_id: detail.summary.grant.grant_status_id,
            people: detail.summary.people,
            payees: detail.payees,
            residence: detail.residence,
            reason_types: detail.reason_types,
            coverage_types: detail.coverage_types,
        }
    }
}

/// `GET /grants`
pub async fn index(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(options): Query<ListOptions>,
) -> Result<Json<Vec<GrantRow>>> {
    let grants = grant::list(&state.db, &current.viewer(), &options).await?;
    Ok(Json(grants.iter().map(GrantRow::from).collect()))
}

/// `GET /grants/new`
pub async fn new_form(CurrentUser(user): CurrentUser) -> Json<GrantForm> {
    let mut form = GrantForm::default();
    form.initialize_defaults(Some(user.id));
    Json(form)
}

/// `POST /grants`
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mut form): Json<GrantForm>,
) -> std::result::Result<(StatusCode, Json<GrantDetailResponse>), FormRejection> {
    form.id = None;
    if !user.admin {
        form.user_id = None;
    }
    form.initialize_defaults(Some(user.id));

    let saved = grant_form::save_grant(&state.db, form.clone())
        .await
        .map_err(|error| FormRejection::with_form(error, form))?;
    info!(grant_id = saved.id, user_id = user.id, "Grant created");

    // Non-admins own what they create and admins see everything.
    let summary = grant::find_visible(&state.db, &Viewer::from(&user), saved.id).await?;
    let detail = grant::load_detail(&state.db, summary).await?;
    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// `GET /grants/{id}`
pub async fn show(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<GrantDetailResponse>> {
    let summary = grant::find_visible(&state.db, &current.viewer(), id).await?;
    let detail = grant::load_detail(&state.db, summary).await?;
    Ok(Json(detail.into()))
}

/// `GET /grants/{id}/edit`
pub async fn edit(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<GrantForm>> {
    grant::find_visible(&state.db, &current.viewer(), id).await?;
    let mut form = grant_form::load_form(&state.db, id).await?;
    form.initialize_defaults(None);
    Ok(Json(form))
}

/// `PUT /grants/{id}`
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(mut form): Json<GrantForm>,
) -> std::result::Result<Json<GrantDetailResponse>, FormRejection> {
    let viewer = current.viewer();
    grant::find_visible(&state.db, &viewer, id)
        .await
        .map_err(|error| FormRejection::with_form(error, form.clone()))?;

    form.id = Some(id);
    if !current.0.admin {
        form.user_id = None;
    }
    grant_form::save_grant(&state.db, form.clone())
        .await
        .map_err(|error| FormRejection::with_form(error, form))?;
    info!(grant_id = id, user_id = current.0.id, "Grant updated");

    let summary = grant::find_visible(&state.db, &viewer, id).await?;
    let detail = grant::load_detail(&state.db, summary).await?;
    Ok(Json(detail.into()))
}

/// `GET /grants/{id}/uploads`
pub async fn uploads(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<upload_entity::Model>>> {
    grant::find_visible(&state.db, &current.viewer(), id).await?;
    Ok(Json(upload::uploads_for_grant(&state.db, id).await?))
}
