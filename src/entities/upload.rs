//! Upload entity - Supporting documents attached to grants.
//!
//! An upload is owned by either a user or an agency. The owner is stored as an
//! `owner_type` + `owner_id` pair but only ever handled in code as [`UploadOwner`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kinds of record that can own an upload
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum OwnerType {
    /// Owned by a case worker or administrator
    #[sea_orm(string_value = "User")]
    User,
    /// Owned by an agency
    #[sea_orm(string_value = "Agency")]
    Agency,
}

/// The record an upload belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum UploadOwner {
    /// A user, by id
    User(i64),
    /// An agency, by id
    Agency(i64),
}

impl UploadOwner {
    /// Splits the owner into its stored column values.
    #[must_use]
    pub const fn into_parts(self) -> (OwnerType, i64) {
        match self {
            Self::User(id) => (OwnerType::User, id),
            Self::Agency(id) => (OwnerType::Agency, id),
        }
    }

    /// Rebuilds an owner from its stored column values.
    #[must_use]
    pub const fn from_parts(owner_type: OwnerType, owner_id: i64) -> Self {
        match owner_type {
            OwnerType::User => Self::User(owner_id),
            OwnerType::Agency => Self::Agency(owner_id),
        }
    }
}

/// Upload database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "uploads")]
pub struct Model {
    /// Unique identifier for the upload
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Grant the document supports, once attached
    pub grant_id: Option<i64>,
    /// Owner kind
    pub owner_type: OwnerType,
    /// Owner id, interpreted according to `owner_type`
    pub owner_id: i64,
    /// Original file name as uploaded
    pub file_name: Option<String>,
    /// Key of the stored file in the file store
    pub storage_key: Option<String>,
    /// When the upload record was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// The record this upload belongs to.
    #[must_use]
    pub const fn owner(&self) -> UploadOwner {
        UploadOwner::from_parts(self.owner_type, self.owner_id)
    }
}

/// Defines relationships between Upload and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each upload may support one grant
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
