//! Shared test utilities for the grant tracker.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::{StatusConfig, database},
    core::{
        agency, status,
        grant_form::{GrantForm, Nested, PersonInput, save_grant},
        user::{self, NewUser},
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables but no statuses.
pub async fn setup_empty_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an in-memory `SQLite` database with all tables initialized and the
/// statuses "Pending" (initial) and "Approved" seeded.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = setup_empty_db().await?;
    status::seed_statuses(
        &db,
        &[
            StatusConfig {
                description: "Pending".to_string(),
                initial: true,
            },
            StatusConfig {
                description: "Approved".to_string(),
                initial: false,
            },
        ],
    )
    .await?;
    Ok(db)
}

/// Creates a test agency.
pub async fn create_test_agency(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::agency::Model> {
    agency::create_agency(db, name).await
}

/// Creates a test user.
///
/// # Defaults
/// * `last_name`: "Worker"
/// * `email`: `<first_name>@example.org`, lowercased
pub async fn create_test_user(
    db: &DatabaseConnection,
    first_name: &str,
    agency_id: Option<i64>,
    admin: bool,
    approved: bool,
) -> Result<entities::user::Model> {
    user::create_user(
        db,
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
}

/// Sets up an agency with one unapproved, non-admin case worker.
pub async fn setup_worker(db: &DatabaseConnection) -> Result<entities::user::Model> {
    let agency = create_test_agency(db, "Test Agency").await?;
    create_test_user(db, "Casey", Some(agency.id), false, false).await
}

/// Creates a grant dated `application_date` owned by `user_id`, with one
/// applicant named "Jane Applicant". `None` lets the grant default to today.
pub async fn create_dated_grant(
    db: &DatabaseConnection,
    user_id: i64,
    application_date: Option<NaiveDate>,
) -> Result<entities::grant::Model> {
    save_grant(
        db,
        GrantForm {
            user_id: Some(user_id),
            application_date,
            grant_amount: Some("$500".to_string()),
            people: vec![Nested::Keep(PersonInput {
                first_name: "Jane".to_string(),
                last_name: "Applicant".to_string(),
                ..Default::default()
            })],
            ..Default::default()
        },
    )
    .await
}

/// Creates a test grant with sensible defaults.
///
/// # Defaults
/// * `application_date`: today
/// * `grant_amount`: "500"
/// * one applicant, "Jane Applicant"
pub async fn create_test_grant(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<entities::grant::Model> {
    create_dated_grant(db, user_id, None).await
}

/// Creates a reason type.
pub async fn create_test_reason_type(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::reason_type::Model> {
    entities::reason_type::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a coverage type.
pub async fn create_test_coverage_type(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::coverage_type::Model> {
    entities::coverage_type::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}
