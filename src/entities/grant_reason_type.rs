//! Grant reason type entity - A reason recorded against a grant, with notes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Grant reason type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grants_reason_types")]
pub struct Model {
    /// Unique identifier for the row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Grant the reason is recorded against
    pub grant_id: i64,
    /// Catalogue entry this row refers to
    pub reason_type_id: i64,
    /// Free-form case worker notes
    pub notes: Option<String>,
}

/// Defines relationships between `GrantReasonType` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one grant
    #[sea_orm(
        belongs_to = "super::grant::Entity",
        from = "Column::GrantId",
        to = "super::grant::Column::Id"
    )]
    Grant,
    /// Each row refers to one reason type
    #[sea_orm(
        belongs_to = "super::reason_type::Entity",
        from = "Column::ReasonTypeId",
        to = "super::reason_type::Column::Id"
    )]
    ReasonType,
}

impl Related<super::grant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grant.def()
    }
}

impl Related<super::reason_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReasonType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
