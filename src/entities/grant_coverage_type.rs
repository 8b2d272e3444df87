//! Join table linking grants and coverage types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grants_coverage_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub grant_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub coverage_type_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::grant::Entity",
        from = "Column::GrantId",
        to = "super::grant::Column::Id"
    )]
    Grant,
    #[sea_orm(
        belongs_to = "super::coverage_type::Entity",
        from = "Column::CoverageTypeId",
        to = "super::coverage_type::Column::Id"
    )]
    CoverageType,
}

impl Related<super::grant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grant.def()
    }
}

impl Related<super::coverage_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CoverageType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
