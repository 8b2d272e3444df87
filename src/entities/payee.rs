//! Payee entity - Landlords, utilities and other parties a grant pays out to.
//!
//! Payees are shared between grants through the `grants_payees` join table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payee database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payees")]
pub struct Model {
    /// Unique identifier for the payee
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name the payment is made out to
    pub name: String,
    /// Mailing address
    pub address: Option<String>,
    /// Contact phone number
    pub phone: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::grant_payee::Entity")]
    GrantPayees,
}

impl Related<super::grant_payee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GrantPayees.def()
    }
}

impl Related<super::grant::Entity> for Entity {
    fn to() -> RelationDef {
        super::grant_payee::Relation::Grant.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::grant_payee::Relation::Payee.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
