//! Database configuration module for the grant tracker.
//!
//! This module handles database connections and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL.

use crate::entities::{
    Agency, CoverageType, Grant, GrantCoverageType, GrantPayee, GrantReasonType, GrantStatus,
    Payee, Person, ReasonType, Residence, Upload, User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/grant_tracker.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable,
/// falling back to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::info!("Connecting to database...");
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table the application uses, skipping tables that already exist.
///
/// Referenced tables are created before the tables that point at them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Agency).await?;
    create_table(db, &schema, User).await?;
    create_table(db, &schema, GrantStatus).await?;
    create_table(db, &schema, Residence).await?;
    create_table(db, &schema, Grant).await?;
    create_table(db, &schema, Person).await?;
    create_table(db, &schema, Payee).await?;
    create_table(db, &schema, GrantPayee).await?;
    create_table(db, &schema, ReasonType).await?;
    create_table(db, &schema, GrantReasonType).await?;
    create_table(db, &schema, CoverageType).await?;
    create_table(db, &schema, GrantCoverageType).await?;
    create_table(db, &schema, Upload).await?;

    Ok(())
}
