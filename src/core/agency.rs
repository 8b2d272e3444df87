//! Agency business logic - Creating and looking up agencies.

use crate::{
    entities::{Agency, agency},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Creates an agency with a trimmed, non-blank name.
pub async fn create_agency(db: &DatabaseConnection, name: &str) -> Result<agency::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("name", "agency name can't be blank"));
    }

    agency::ActiveModel {
        name: Set(name.trim().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds an agency by id.
pub async fn get_agency_by_id(
    db: &DatabaseConnection,
    agency_id: i64,
) -> Result<Option<agency::Model>> {
    Agency::find_by_id(agency_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All agencies ordered by name.
pub async fn list_agencies(db: &DatabaseConnection) -> Result<Vec<agency::Model>> {
    Agency::find()
        .order_by_asc(agency::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}
