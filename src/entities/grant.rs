//! Grant entity - A financial-assistance case tracked through statuses.
//!
//! Saving a grant fills in two defaults at the persistence boundary rather than at
//! construction: a blank `application_date` becomes today's local date on every
//! save, and a grant inserted without a status is assigned the initial status.
//! In-memory models built by hand may therefore still lack both until saved.

use sea_orm::{ActiveValue, Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Grant database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grants")]
pub struct Model {
    /// Unique identifier for the grant
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Case worker who owns the grant
    pub user_id: Option<i64>,
    /// Day the household applied; never blank once saved
    pub application_date: Option<Date>,
    /// Requested amount as a plain numeric string (no `$` or `,`)
    pub grant_amount: Option<String>,
    /// Current workflow status; never blank once created
    pub grant_status_id: Option<i64>,
    /// Subsidy programme the grant is drawn from
    pub subsidy_type_id: Option<i64>,
    /// Current residence of the household
    pub residence_id: Option<i64>,
    /// Residence before the current one
    pub previous_residence_id: Option<i64>,
    /// Budget snapshot for last month
    pub last_month_budget_id: Option<i64>,
    /// Budget snapshot for this month
    pub current_month_budget_id: Option<i64>,
    /// Budget projection for next month
    pub next_month_budget_id: Option<i64>,
}

/// Defines relationships between Grant and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each grant belongs to one case worker
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each grant has one status
    #[sea_orm(
        belongs_to = "super::grant_status::Entity",
        from = "Column::GrantStatusId",
        to = "super::grant_status::Column::Id"
    )]
    Status,
    /// Current residence
    #[sea_orm(
        belongs_to = "super::residence::Entity",
        from = "Column::ResidenceId",
        to = "super::residence::Column::Id"
    )]
    Residence,
    /// Previous residence
    #[sea_orm(
        belongs_to = "super::residence::Entity",
        from = "Column::PreviousResidenceId",
        to = "super::residence::Column::Id"
    )]
    PreviousResidence,
    /// Applicants listed on the grant
    #[sea_orm(has_many = "super::person::Entity")]
    People,
    /// Links to payees
    #[sea_orm(has_many = "super::grant_payee::Entity")]
    GrantPayees,
    /// Links to coverage types
    #[sea_orm(has_many = "super::grant_coverage_type::Entity")]
    GrantCoverageTypes,
    /// Reasons recorded against the grant
    #[sea_orm(has_many = "super::grant_reason_type::Entity")]
    GrantReasonTypes,
    /// Supporting documents
    #[sea_orm(has_many = "super::upload::Entity")]
    Uploads,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::grant_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl Related<super::residence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Residence.def()
    }
}

impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::People.def()
    }
}

impl Related<super::grant_payee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GrantPayees.def()
    }
}

impl Related<super::payee::Entity> for Entity {
    fn to() -> RelationDef {
        super::grant_payee::Relation::Payee.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::grant_payee::Relation::Grant.def().rev())
    }
}

impl Related<super::grant_coverage_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GrantCoverageTypes.def()
    }
}

impl Related<super::coverage_type::Entity> for Entity {
    fn to() -> RelationDef {
        super::grant_coverage_type::Relation::CoverageType.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::grant_coverage_type::Relation::Grant.def().rev())
    }
}

impl Related<super::grant_reason_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GrantReasonTypes.def()
    }
}

impl Related<super::upload::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uploads.def()
    }
}

/// Strips `$` and `,` from a user-typed amount, so `"$1,200"` is stored as `"1200"`.
#[must_use]
pub fn normalize_grant_amount(value: &str) -> String {
    value.chars().filter(|c| !matches!(c, '$' | ',')).collect()
}

impl ActiveModel {
    /// Assigns `grant_amount` from the value's string form, normalized.
    pub fn set_grant_amount<T: ToString>(&mut self, value: T) {
        self.grant_amount = Set(Some(normalize_grant_amount(&value.to_string())));
    }
}

fn is_present<V>(value: &ActiveValue<Option<V>>) -> bool
where
    Option<V>: Into<Value>,
{
    matches!(
        value,
        ActiveValue::Set(Some(_)) | ActiveValue::Unchanged(Some(_))
    )
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !is_present(&self.application_date) {
            self.application_date = Set(Some(chrono::Local::now().date_naive()));
        }

        if insert && !is_present(&self.grant_status_id) {
            let initial = super::grant_status::Entity::find()
                .filter(super::grant_status::Column::Initial.eq(true))
                .one(db)
                .await?
                .ok_or_else(|| {
                    DbErr::Custom(crate::errors::Error::InitialStatusMissing.to_string())
                })?;
            tracing::debug!(status_id = initial.id, "Assigning initial status to new grant");
            self.grant_status_id = Set(Some(initial.id));
        }

        Ok(self)
    }
}
