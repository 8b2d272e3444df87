#![allow(dead_code, clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use grant_tracker::{
    config::{AppConfig, ServerConfig, StatusConfig, UploadsConfig, database},
    core::{
        agency, status,
        user::{self, NewUser},
    },
    entities,
    storage::UrlFileStore,
    web::{self, AppState, current_user::USER_ID_HEADER},
};
use sea_orm::Database;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const FILES_BASE_URL: &str = "https://files.example.org";

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        uploads: UploadsConfig {
            base_url: FILES_BASE_URL.to_string(),
            link_ttl_seconds: 10,
        },
        statuses: vec![
            StatusConfig {
                description: "Pending".to_string(),
                initial: true,
            },
            StatusConfig {
                description: "Approved".to_string(),
                initial: false,
            },
        ],
    }
}

/// Builds application state over a fresh in-memory database with statuses seeded.
pub async fn create_test_app_state() -> AppState {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::create_tables(&db).await.unwrap();

    let config = test_config();
    status::seed_statuses(&db, &config.statuses).await.unwrap();

    AppState {
        db,
        files: Arc::new(UrlFileStore::new(FILES_BASE_URL)),
        config: Arc::new(config),
    }
}

pub async fn build_test_app() -> (AppState, Router) {
    let state = create_test_app_state().await;
    let router = web::router(state.clone());
    (state, router)
}

pub async fn create_agency(state: &AppState, name: &str) -> entities::agency::Model {
    agency::create_agency(&state.db, name).await.unwrap()
}

pub async fn create_user(
    state: &AppState,
    first_name: &str,
    agency_id: Option<i64>,
    admin: bool,
    approved: bool,
) -> entities::user::Model {
    user::create_user(
        &state.db,
        NewUser {
            first_name: first_name.to_string(),
            last_name: "Worker".to_string(),
            email: format!("{}@example.org", first_name.to_lowercase()),
            agency_id,
            admin,
            approved,
        },
    )
    .await
    .unwrap()
}

pub fn request(method: Method, uri: &str, user_id: Option<i64>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user_id {
        builder = builder.header(USER_ID_HEADER, id.to_string());
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send_raw(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

/// Sends a request and returns the status with the parsed JSON body
/// (`Value::Null` when the body is empty).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = send_raw(router, request).await;
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}
