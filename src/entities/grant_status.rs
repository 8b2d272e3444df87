//! Grant status entity - The workflow states a grant moves through.
//!
//! Exactly one status carries `initial = true`; new grants start there.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Grant status database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grant_statuses")]
pub struct Model {
    /// Unique identifier for the status
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable label (e.g., "Pending", "Approved")
    #[sea_orm(unique)]
    pub description: String,
    /// Whether newly created grants are assigned this status
    pub initial: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::grant::Entity")]
    Grants,
}

impl Related<super::grant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
