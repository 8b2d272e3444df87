//! User entity - Case workers and administrators.
//!
//! `admin` grants global visibility over grants; `approved` promotes a case
//! worker from seeing only their own grants to seeing their whole agency's.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Given name
    pub first_name: String,
    /// Family name, used for ordering user listings
    pub last_name: String,
    /// Login e-mail address
    #[sea_orm(unique)]
    pub email: String,
    /// Agency this user works for, if assigned
    pub agency_id: Option<i64>,
    /// Administrators see and filter every grant
    pub admin: bool,
    /// Approved case workers see every grant in their agency
    pub approved: bool,
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

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each user may belong to one agency
    #[sea_orm(
        belongs_to = "super::agency::Entity",
        from = "Column::AgencyId",
        to = "super::agency::Column::Id"
    )]
    Agency,
    /// One user owns many grants
    #[sea_orm(has_many = "super::grant::Entity")]
    Grants,
}

impl Related<super::agency::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agency.def()
    }
}

impl Related<super::grant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
