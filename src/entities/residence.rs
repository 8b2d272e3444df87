//! Residence entity - Where the applicant household lives.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Residence database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "residences")]
pub struct Model {
    /// Unique identifier for the residence
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Street address
    pub address: String,
    /// City
    pub city: Option<String>,
    /// Postal code
    pub zip: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
