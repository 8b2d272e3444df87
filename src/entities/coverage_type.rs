//! Coverage type entity - What a grant pays for (rent, utilities, deposit).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Coverage type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coverage_types")]
pub struct Model {
    /// Unique identifier for the coverage type
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::grant_coverage_type::Entity")]
    GrantCoverageTypes,
}

impl Related<super::grant_coverage_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GrantCoverageTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
