//! Grant status business logic - Seeding and initial-status lookup.
//!
//! Statuses come from `config.toml` and are inserted on start-up when missing.
//! Exactly one of them is the initial status new grants start in.

use crate::{
    config::StatusConfig,
    entities::{GrantStatus, grant_status},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// The status newly created grants are assigned.
///
/// # Errors
/// [`Error::InitialStatusMissing`] when no status is flagged initial.
pub async fn initial_status<C>(db: &C) -> Result<grant_status::Model>
where
    C: ConnectionTrait,
{
    GrantStatus::find()
        .filter(grant_status::Column::Initial.eq(true))
        .one(db)
        .await?
        .ok_or(Error::InitialStatusMissing)
}

/// All statuses in creation order.
pub async fn get_all_statuses(db: &DatabaseConnection) -> Result<Vec<grant_status::Model>> {
    GrantStatus::find()
        .order_by_asc(grant_status::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a status, validating the description.
pub async fn create_status(
    db: &DatabaseConnection,
    description: &str,
    initial: bool,
) -> Result<grant_status::Model> {
    if description.trim().is_empty() {
        return Err(Error::validation("description", "can't be blank"));
    }

    grant_status::ActiveModel {
        description: Set(description.trim().to_string()),
        initial: Set(initial),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Inserts every configured status whose description is not stored yet and
/// returns how many were added. Running it again adds nothing.
///
/// # Errors
/// [`Error::Config`] when the list does not name exactly one initial status, or
/// would add a second initial status to the database.
#[instrument(skip(db, statuses))]
pub async fn seed_statuses(db: &DatabaseConnection, statuses: &[StatusConfig]) -> Result<usize> {
    let configured_initial = statuses.iter().filter(|s| s.initial).count();
    if !statuses.is_empty() && configured_initial != 1 {
        return Err(Error::Config {
            message: format!("Exactly one status must be marked initial, found {configured_initial}"),
        });
    }

    let existing = get_all_statuses(db).await?;
    let has_initial = existing.iter().any(|s| s.initial);

    let missing: Vec<&StatusConfig> = statuses
        .iter()
        .filter(|config| !existing.iter().any(|s| s.description == config.description))
        .collect();

    if has_initial && missing.iter().any(|config| config.initial) {
        return Err(Error::Config {
            message: "Only one grant status may be marked initial".to_string(),
        });
    }

    for config in &missing {
        create_status(db, &config.description, config.initial).await?;
    }

    if !missing.is_empty() {
        info!(count = missing.len(), "Seeded grant statuses");
    }
    Ok(missing.len())
}
