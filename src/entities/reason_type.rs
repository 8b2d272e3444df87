//! Reason type entity - Catalogue of reasons a household applies for help.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reason type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reason_types")]
pub struct Model {
    /// Unique identifier for the reason type
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Label shown to case workers (e.g., "Job loss")
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::grant_reason_type::Entity")]
    GrantReasonTypes,
}

impl Related<super::grant_reason_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GrantReasonTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
