#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use grant_tracker::{
    config::{self, database},
    core::status,
    errors::Result,
    storage::UrlFileStore,
    web::{self, AppState},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the main application configuration
    let app_config = config::settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. Connect and create any missing tables
    let db = database::create_connection().await?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed grant statuses
    status::seed_statuses(&db, &app_config.statuses)
        .await
        .inspect_err(|e| error!("Failed to seed grant statuses: {}", e))?;

    // 6. Serve the API
    let files = UrlFileStore::new(app_config.uploads.base_url.clone());
    let bind_address = app_config.server.bind_address.clone();
    let state = AppState {
        db,
        files: Arc::new(files),
        config: Arc::new(app_config),
    };

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, web::router(state)).await?;

    Ok(())
}
