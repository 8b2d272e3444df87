//! Agency entity - An organizational unit that case workers belong to.
//!
//! Grants reach their agency through the user who owns them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Agency database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "agencies")]
pub struct Model {
    /// Unique identifier for the agency
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the agency
    pub name: String,
}

/// Defines relationships between Agency and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One agency has many case workers
    #[sea_orm(has_many = "super::user::Entity")]
    Users,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
