//! Grant business logic - Listing, lookup and display fields.
//!
//! Every query here takes its ordering explicitly through [`GrantOrder`]; there is
//! no ambient default ordering to remember to override. Listings join grants
//! through their owning user to that user's agency and load people, statuses,
//! owners and agencies for the whole page in bulk.

use crate::{
    core::filter::{GrantFilter, ListOptions, Viewer},
    entities::{
        Agency, CoverageType, Grant, GrantReasonType, GrantStatus, Payee, Person, Residence, User,
        agency, coverage_type, grant, grant_coverage_type, grant_payee, grant_reason_type,
        grant_status, payee, person, residence, user,
    },
    errors::{Error, Result},
};
use sea_orm::{JoinType, LoaderTrait, QueryOrder, QuerySelect, RelationTrait, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

pub use crate::entities::grant::normalize_grant_amount;

/// Sort order for grant queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOrder {
    /// Newest application first
    ApplicationDateDesc,
    /// Most recently created grant first; used by list views
    IdDesc,
}

impl GrantOrder {
    fn apply(self, select: Select<grant::Entity>) -> Select<grant::Entity> {
        match self {
            Self::ApplicationDateDesc => select
                .order_by_desc(grant::Column::ApplicationDate)
                .order_by_desc(grant::Column::Id),
            Self::IdDesc => select.order_by_desc(grant::Column::Id),
        }
    }
}

/// A grant together with everything a listing row displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantSummary {
    /// The grant itself
    pub grant: grant::Model,
    /// Current status, if assigned
    pub status: Option<grant_status::Model>,
    /// People on the grant, primary applicant first
    pub people: Vec<person::Model>,
    /// Owning case worker
    pub user: Option<user::Model>,
    /// Owning case worker's agency
    pub agency: Option<agency::Model>,
}

impl GrantSummary {
    /// Description of the grant's status.
    ///
    /// # Errors
    /// [`Error::BlankStatus`] when the grant has no status.
    pub fn status_name(&self) -> Result<&str> {
        status_name(self.status.as_ref())
    }

    /// The first person listed on the grant.
    #[must_use]
    pub fn primary_applicant(&self) -> Option<&person::Model> {
        self.people.first()
    }

    /// Full name of the primary applicant, if anyone is listed.
    #[must_use]
    pub fn primary_applicant_name(&self) -> Option<String> {
        self.primary_applicant().map(person::Model::full_name)
    }

    /// Agency name, or an empty string when the owner or agency is missing.
    #[must_use]
    pub fn agency_name(&self) -> String {
        agency_name(self.user.as_ref(), self.agency.as_ref())
    }

    /// Case worker name, or an empty string when the owner is missing.
    #[must_use]
    pub fn case_worker_name(&self) -> String {
        case_worker_name(self.user.as_ref())
    }
}

/// Full view of one grant, including its nested components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantDetail {
    /// Listing fields
    pub summary: GrantSummary,
    /// Linked payees
    pub payees: Vec<payee::Model>,
    /// Current residence
    pub residence: Option<residence::Model>,
    /// Recorded reasons
    pub reason_types: Vec<grant_reason_type::Model>,
    /// Linked coverage types
    pub coverage_types: Vec<coverage_type::Model>,
}

/// Serializable listing row for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantRow {
    /// Grant id
    pub id: i64,
    /// Day the household applied
    pub application_date: Option<Date>,
    /// Normalized amount
    pub grant_amount: Option<String>,
    /// Status description, absent only for unsaved grants
    pub status_name: Option<String>,
    /// Primary applicant's full name
    pub primary_applicant_name: Option<String>,
    /// Owning case worker's name, or empty
    pub case_worker_name: String,
    /// Owning agency's name, or empty
    pub agency_name: String,
}

impl From<&GrantSummary> for GrantRow {
    fn from(summary: &GrantSummary) -> Self {
        Self {
            id: summary.grant.id,
            application_date: summary.grant.application_date,
            grant_amount: summary.grant.grant_amount.clone(),
            status_name: summary.status_name().ok().map(str::to_string),
            primary_applicant_name: summary.primary_applicant_name(),
            case_worker_name: summary.case_worker_name(),
            agency_name: summary.agency_name(),
        }
    }
}

/// Description of `status`.
///
/// # Errors
/// [`Error::BlankStatus`] when `status` is `None`. Grants read back from the
/// database always carry a status; only hand-built models can trip this.
pub fn status_name(status: Option<&grant_status::Model>) -> Result<&str> {
    status
        .map(|s| s.description.as_str())
        .ok_or(Error::BlankStatus)
}

/// Agency name, or `""` unless both the owner and the agency are present.
#[must_use]
pub fn agency_name(user: Option<&user::Model>, agency: Option<&agency::Model>) -> String {
    match (user, agency) {
        (Some(_), Some(agency)) => agency.name.clone(),
        _ => String::new(),
    }
}

/// Owner's full name, or `""` when there is no owner.
#[must_use]
pub fn case_worker_name(user: Option<&user::Model>) -> String {
    user.map(user::Model::full_name).unwrap_or_default()
}

/// Grants joined through their owner to the owner's agency. Both joins are
/// outer so grants whose owner has no agency are still returned.
fn base_query(order: GrantOrder) -> Select<grant::Entity> {
    order.apply(
        Grant::find()
            .join(JoinType::LeftJoin, grant::Relation::User.def())
            .join(JoinType::LeftJoin, user::Relation::Agency.def()),
    )
}

/// Lists the grants `viewer` may see, newest grant first.
///
/// Admins see every grant, narrowed by whichever of `options.user_id` and
/// `options.agency_id` are given. Approved workers see their own agency, narrowed
/// only by `options.user_id`. Unapproved workers see their own grants and the
/// options are ignored.
#[instrument(skip(db))]
pub async fn list<C>(db: &C, viewer: &Viewer, options: &ListOptions) -> Result<Vec<GrantSummary>>
where
    C: ConnectionTrait,
{
    let filter = GrantFilter::for_viewer(viewer, options);
    debug!(role = ?viewer.role(), ?filter, "Listing grants");

    let grants = filter.apply(base_query(GrantOrder::IdDesc)).all(db).await?;
    summarize(db, grants).await
}

/// Finds one grant if `viewer`'s visibility policy admits it.
///
/// # Errors
/// [`Error::GrantNotFound`] when the grant does not exist or is not visible.
#[instrument(skip(db))]
pub async fn find_visible<C>(db: &C, viewer: &Viewer, grant_id: i64) -> Result<GrantSummary>
where
    C: ConnectionTrait,
{
    let grant = GrantFilter::for_viewer(viewer, &ListOptions::default())
        .apply(base_query(GrantOrder::IdDesc))
        .filter(grant::Column::Id.eq(grant_id))
        .one(db)
        .await?
        .ok_or(Error::GrantNotFound { id: grant_id })?;

    summarize(db, vec![grant])
        .await?
        .pop()
        .ok_or(Error::GrantNotFound { id: grant_id })
}

/// Finds a grant by id without any visibility check.
pub async fn get_grant_by_id<C>(db: &C, grant_id: i64) -> Result<Option<grant::Model>>
where
    C: ConnectionTrait,
{
    Grant::find_by_id(grant_id).one(db).await.map_err(Into::into)
}

/// All grants owned by `user_id`, in the requested order.
pub async fn get_grants_for_user<C>(
    db: &C,
    user_id: i64,
    order: GrantOrder,
) -> Result<Vec<grant::Model>>
where
    C: ConnectionTrait,
{
    order
        .apply(Grant::find().filter(grant::Column::UserId.eq(user_id)))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads a grant with its owner and the owner's agency, without a visibility check.
pub async fn load_grant_with_user_and_agency<C>(
    db: &C,
    grant_id: i64,
) -> Result<Option<(grant::Model, Option<user::Model>, Option<agency::Model>)>>
where
    C: ConnectionTrait,
{
    let Some((grant, user)) = Grant::find_by_id(grant_id)
        .find_also_related(User)
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let agency = match user.as_ref().and_then(|u| u.agency_id) {
        Some(agency_id) => Agency::find_by_id(agency_id).one(db).await?,
        None => None,
    };

    Ok(Some((grant, user, agency)))
}

/// People on a grant, primary applicant first.
pub async fn load_people_for<C>(db: &C, grant_id: i64) -> Result<Vec<person::Model>>
where
    C: ConnectionTrait,
{
    Person::find()
        .filter(person::Column::GrantId.eq(grant_id))
        .order_by_asc(person::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Payees linked to a grant, oldest first.
pub async fn load_payees_for<C>(db: &C, grant_id: i64) -> Result<Vec<payee::Model>>
where
    C: ConnectionTrait,
{
    Payee::find()
        .join(JoinType::InnerJoin, payee::Relation::GrantPayees.def())
        .filter(grant_payee::Column::GrantId.eq(grant_id))
        .order_by_asc(payee::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Reason rows recorded against a grant.
pub async fn load_reason_types_for<C>(db: &C, grant_id: i64) -> Result<Vec<grant_reason_type::Model>>
where
    C: ConnectionTrait,
{
    GrantReasonType::find()
        .filter(grant_reason_type::Column::GrantId.eq(grant_id))
        .order_by_asc(grant_reason_type::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Coverage types linked to a grant.
pub async fn load_coverage_types_for<C>(db: &C, grant_id: i64) -> Result<Vec<coverage_type::Model>>
where
    C: ConnectionTrait,
{
    CoverageType::find()
        .join(
            JoinType::InnerJoin,
            coverage_type::Relation::GrantCoverageTypes.def(),
        )
        .filter(grant_coverage_type::Column::GrantId.eq(grant_id))
        .order_by_asc(coverage_type::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Expands a summary into the full grant view.
pub async fn load_detail<C>(db: &C, summary: GrantSummary) -> Result<GrantDetail>
where
    C: ConnectionTrait,
{
    let grant_id = summary.grant.id;
    let residence = match summary.grant.residence_id {
        Some(id) => Residence::find_by_id(id).one(db).await?,
        None => None,
    };

    Ok(GrantDetail {
        payees: load_payees_for(db, grant_id).await?,
        reason_types: load_reason_types_for(db, grant_id).await?,
        coverage_types: load_coverage_types_for(db, grant_id).await?,
        residence,
        summary,
    })
}

fn index_by_id<M>(models: Vec<M>, id: impl Fn(&M) -> i64) -> HashMap<i64, M> {
    models.into_iter().map(|m| (id(&m), m)).collect()
}

/// Attaches people, statuses, owners and agencies to a page of grants using one
/// query per association.
async fn summarize<C>(db: &C, grants: Vec<grant::Model>) -> Result<Vec<GrantSummary>>
where
    C: ConnectionTrait,
{
    if grants.is_empty() {
        return Ok(Vec::new());
    }

    let people = grants
        .load_many(Person::find().order_by_asc(person::Column::Id), db)
        .await?;

    let status_ids: Vec<i64> = grants.iter().filter_map(|g| g.grant_status_id).collect();
    let statuses = index_by_id(
        GrantStatus::find()
            .filter(grant_status::Column::Id.is_in(status_ids))
            .all(db)
            .await?,
        |s| s.id,
    );

    let user_ids: Vec<i64> = grants.iter().filter_map(|g| g.user_id).collect();
    let users = index_by_id(
        User::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(db)
            .await?,
        |u| u.id,
    );

    let agency_ids: Vec<i64> = users.values().filter_map(|u| u.agency_id).collect();
    let agencies = index_by_id(
        Agency::find()
            .filter(agency::Column::Id.is_in(agency_ids))
            .all(db)
            .await?,
        |a| a.id,
    );

    Ok(grants
        .into_iter()
        .zip(people)
        .map(|(grant, people)| {
            let status = grant
                .grant_status_id
                .and_then(|id| statuses.get(&id).cloned());
            let user = grant.user_id.and_then(|id| users.get(&id).cloned());
            let agency = user
                .as_ref()
                .and_then(|u| u.agency_id)
                .and_then(|id| agencies.get(&id).cloned());
            GrantSummary {
                grant,
                status,
                people,
                user,
                agency,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::NaiveDate;

    fn pending() -> grant_status::Model {
        grant_status::Model {
            id: 1,
            description: "Pending".to_string(),
            initial: true,
        }
    }

    fn bare_summary() -> GrantSummary {
        GrantSummary {
            grant: grant::Model {
                id: 1,
                user_id: None,
                application_date: None,
                grant_amount: None,
                grant_status_id: None,
                subsidy_type_id: None,
                residence_id: None,
                previous_residence_id: None,
                last_month_budget_id: None,
                current_month_budget_id: None,
                next_month_budget_id: None,
            },
            status: None,
            people: Vec::new(),
            user: None,
            agency: None,
        }
    }

    #[test]
    fn test_status_name() {
        let mut summary = bare_summary();
        let err = summary.status_name().unwrap_err();
        assert!(matches!(err, Error::BlankStatus));
        assert_eq!(err.to_string(), "Grant can not have blank grant status");

        summary.status = Some(pending());
        assert_eq!(summary.status_name().unwrap(), "Pending");
    }

    #[test]
    fn test_names_are_empty_without_owner() {
        let mut summary = bare_summary();
        assert_eq!(summary.agency_name(), "");
        assert_eq!(summary.case_worker_name(), "");
        assert_eq!(summary.primary_applicant_name(), None);

        summary.agency = Some(agency::Model {
            id: 1,
            name: "North Office".to_string(),
        });
        // An agency without an owner is still not shown.
        assert_eq!(summary.agency_name(), "");
    }

    #[tokio::test]
    async fn test_admin_sees_everything_newest_id_first() -> Result<()> {
        let db = setup_test_db().await?;
        let north = create_test_agency(&db, "North").await?;
        let south = create_test_agency(&db, "South").await?;
        let admin = create_test_user(&db, "Ada", Some(north.id), true, true).await?;
        let alice = create_test_user(&db, "Alice", Some(north.id), false, true).await?;
        let bob = create_test_user(&db, "Bob", Some(south.id), false, false).await?;

        // Older application dates on newer grants must not change the order.
        let first = create_dated_grant(&db, alice.id, NaiveDate::from_ymd_opt(2024, 6, 1)).await?;
        let second = create_dated_grant(&db, bob.id, NaiveDate::from_ymd_opt(2024, 1, 1)).await?;
        let third = create_dated_grant(&db, alice.id, NaiveDate::from_ymd_opt(2023, 1, 1)).await?;

        let rows = list(&db, &Viewer::from(&admin), &ListOptions::default()).await?;
        let ids: Vec<i64> = rows.iter().map(|r| r.grant.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);

        let by_agency = list(
            &db,
            &Viewer::from(&admin),
            &ListOptions {
                user_id: None,
                agency_id: Some(south.id),
            },
        )
        .await?;
        assert_eq!(by_agency.len(), 1);
        assert_eq!(by_agency[0].grant.id, second.id);
        assert_eq!(by_agency[0].agency_name(), "South");

        let both = list(
            &db,
            &Viewer::from(&admin),
            &ListOptions {
                user_id: Some(bob.id),
                agency_id: Some(north.id),
            },
        )
        .await?;
        assert!(both.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_approved_worker_sees_own_agency_only() -> Result<()> {
        let db = setup_test_db().await?;
        let north = create_test_agency(&db, "North").await?;
        let south = create_test_agency(&db, "South").await?;
        let alice = create_test_user(&db, "Alice", Some(north.id), false, true).await?;
        let carol = create_test_user(&db, "Carol", Some(north.id), false, false).await?;
        let bob = create_test_user(&db, "Bob", Some(south.id), false, false).await?;

        let alices = create_test_grant(&db, alice.id).await?;
        let carols = create_test_grant(&db, carol.id).await?;
        create_test_grant(&db, bob.id).await?;

        let viewer = Viewer::from(&alice);
        let unfiltered = list(&db, &viewer, &ListOptions::default()).await?;
        let ids: Vec<i64> = unfiltered.iter().map(|r| r.grant.id).collect();
        assert_eq!(ids, vec![carols.id, alices.id]);

        let other_agency = list(
            &db,
            &viewer,
            &ListOptions {
                user_id: None,
                agency_id: Some(south.id),
            },
        )
        .await?;
        assert_eq!(other_agency, unfiltered);

        let by_user = list(
            &db,
            &viewer,
            &ListOptions {
                user_id: Some(carol.id),
                agency_id: None,
            },
        )
        .await?;
        assert_eq!(by_user.len(), 1);
        assert_eq!(by_user[0].grant.id, carols.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_worker_without_agency_sees_own_grants() -> Result<()> {
        let db = setup_test_db().await?;
        let north = create_test_agency(&db, "North").await?;
        let admin = create_test_user(&db, "Ada", Some(north.id), true, true).await?;
        let drifter = create_test_user(&db, "Dana", None, false, true).await?;
        let grant = create_test_grant(&db, drifter.id).await?;

        let own = list(&db, &Viewer::from(&drifter), &ListOptions::default()).await?;
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].grant.id, grant.id);
        assert_eq!(own[0].agency_name(), "");
        assert_eq!(own[0].case_worker_name(), "Dana Worker");

        let found = find_visible(&db, &Viewer::from(&drifter), grant.id).await?;
        assert_eq!(found.grant.id, grant.id);

        let everything = list(&db, &Viewer::from(&admin), &ListOptions::default()).await?;
        assert_eq!(everything.len(), 1);

        let by_agency = list(
            &db,
            &Viewer::from(&admin),
            &ListOptions {
                user_id: None,
                agency_id: Some(north.id),
            },
        )
        .await?;
        assert!(by_agency.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unapproved_worker_sees_only_own_grants() -> Result<()> {
        let db = setup_test_db().await?;
        let north = create_test_agency(&db, "North").await?;
        let carol = create_test_user(&db, "Carol", Some(north.id), false, false).await?;
        let alice = create_test_user(&db, "Alice", Some(north.id), false, true).await?;

        let carols = create_test_grant(&db, carol.id).await?;
        create_test_grant(&db, alice.id).await?;

        let viewer = Viewer::from(&carol);
        for options in [
            ListOptions::default(),
            ListOptions {
                user_id: Some(alice.id),
                agency_id: Some(north.id),
            },
        ] {
            let rows = list(&db, &viewer, &options).await?;
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].grant.id, carols.id);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_fields_loaded_in_bulk() -> Result<()> {
        let db = setup_test_db().await?;
        let north = create_test_agency(&db, "North").await?;
        let alice = create_test_user(&db, "Alice", Some(north.id), false, false).await?;
        create_test_grant(&db, alice.id).await?;

        let rows = list(&db, &Viewer::from(&alice), &ListOptions::default()).await?;
        let row = GrantRow::from(&rows[0]);
        assert_eq!(row.status_name.as_deref(), Some("Pending"));
        assert_eq!(row.primary_applicant_name.as_deref(), Some("Jane Applicant"));
        assert_eq!(row.case_worker_name, "Alice Worker");
        assert_eq!(row.agency_name, "North");
        Ok(())
    }

    #[tokio::test]
    async fn test_find_visible_applies_policy() -> Result<()> {
        let db = setup_test_db().await?;
        let north = create_test_agency(&db, "North").await?;
        let alice = create_test_user(&db, "Alice", Some(north.id), false, false).await?;
        let carol = create_test_user(&db, "Carol", Some(north.id), false, false).await?;
        let grant = create_test_grant(&db, alice.id).await?;

        let found = find_visible(&db, &Viewer::from(&alice), grant.id).await?;
        assert_eq!(found.grant.id, grant.id);

        let hidden = find_visible(&db, &Viewer::from(&carol), grant.id).await;
        assert!(matches!(hidden, Err(Error::GrantNotFound { id }) if id == grant.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_grant_with_user_and_agency() -> Result<()> {
        let db = setup_test_db().await?;
        let north = create_test_agency(&db, "North").await?;
        let alice = create_test_user(&db, "Alice", Some(north.id), false, false).await?;
        let grant = create_test_grant(&db, alice.id).await?;

        let (loaded, user, agency) = load_grant_with_user_and_agency(&db, grant.id).await?.unwrap();
        assert_eq!(loaded.id, grant.id);
        assert_eq!(user.unwrap().id, alice.id);
        assert_eq!(agency.unwrap().name, "North");

        assert!(load_grant_with_user_and_agency(&db, 999).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_get_grants_for_user_orders_by_application_date() -> Result<()> {
        let db = setup_test_db().await?;
        let north = create_test_agency(&db, "North").await?;
        let alice = create_test_user(&db, "Alice", Some(north.id), false, false).await?;
        let older = create_dated_grant(&db, alice.id, NaiveDate::from_ymd_opt(2023, 3, 1)).await?;
        let newer = create_dated_grant(&db, alice.id, NaiveDate::from_ymd_opt(2024, 3, 1)).await?;

        let grants = get_grants_for_user(&db, alice.id, GrantOrder::ApplicationDateDesc).await?;
        let ids: Vec<i64> = grants.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        Ok(())
    }
}
