//! Person entity - Applicants and household members listed on a grant.
//!
//! The person with the lowest id is the grant's primary applicant.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Person database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "people")]
pub struct Model {
    /// Unique identifier for the person
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Grant this person is listed on
    pub grant_id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Relationship to the primary applicant (e.g., "spouse")
    pub relationship: Option<String>,
}

impl Model {
    /// First and last name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Defines relationships between Person and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each person belongs to one grant
    #[sea_orm(
        belongs_to = "super::grant::Entity",
        from = "Column::GrantId",
        to = "super::grant::Column::Id"
    )]
    Grant,
}

impl Related<super::grant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
