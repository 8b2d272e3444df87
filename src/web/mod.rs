//! HTTP interface - axum router, shared state and request handlers.
//!
//! Handlers stay thin: they extract the requesting user and the payload, call
//! into [`crate::core`], and serialize the result. Error responses come from
//! the [`axum::response::IntoResponse`] impl in [`error`].

pub mod current_user;
pub mod error;
pub mod grants;
pub mod uploads;
pub mod users;

use crate::{config::AppConfig, storage::FileStore};
use axum::{
    Router,
    routing::{get, patch, post},
};
use sea_orm::DatabaseConnection;
use std::{sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;

pub use current_user::CurrentUser;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Backend that issues download links
    pub files: Arc<dyn FileStore>,
    /// Loaded application settings
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// How long upload download links stay valid.
    #[must_use]
    pub fn link_ttl(&self) -> Duration {
        Duration::from_secs(self.config.uploads.link_ttl_seconds)
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/grants", get(grants::index).post(grants::create))
        .route("/grants/new", get(grants::new_form))
        .route("/grants/{id}", get(grants::show).put(grants::update))
        .route("/grants/{id}/edit", get(grants::edit))
        .route("/grants/{id}/uploads", get(grants::uploads))
        .route("/users", get(users::index))
        .route("/users/{id}", patch(users::update).delete(users::destroy))
        .route("/uploads", post(uploads::create))
        .route("/uploads/new", get(uploads::new_upload))
        .route("/uploads/{id}/download", get(uploads::download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
