//! Nested grant forms - A grant and its people, payees, residence and reasons,
//! submitted and saved together.
//!
//! Each nested block is either [`Nested::Keep`] (insert, or update when it carries
//! an id) or [`Nested::Delete`]. Blocks whose fields are all blank are dropped
//! before validation so empty placeholders never reach the database. Everything
//! is validated up front, then written inside one transaction: the grant and all
//! of its components persist together or not at all.

use crate::{
    entities::{
        Grant, GrantCoverageType, GrantPayee, GrantReasonType, Payee, Person, Residence, grant,
        grant_coverage_type, grant_payee, grant_reason_type, payee, person, residence,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseTransaction, IntoActiveModel, PaginatorTrait, Set,
    TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// A nested block in a grant form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nested<T> {
    /// Insert the block, or update it when it carries an id
    Keep(T),
    /// Remove the record with this id from the grant
    Delete(i64),
}

/// Shared behaviour of nested form blocks.
pub trait NestedInput {
    /// Id of the existing record this block edits
    fn id(&self) -> Option<i64>;
    /// True when every field is empty and the block edits nothing
    fn is_blank(&self) -> bool;
    /// Checks the block before anything is written
    fn validate(&self) -> Result<()>;
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn blank_opt(value: Option<&String>) -> bool {
    value.is_none_or(|v| blank(v))
}

/// Person block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonInput {
    /// Existing person id
    pub id: Option<i64>,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Relationship to the primary applicant
    pub relationship: Option<String>,
}

impl NestedInput for PersonInput {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn is_blank(&self) -> bool {
        self.id.is_none()
            && blank(&self.first_name)
            && blank(&self.last_name)
            && blank_opt(self.relationship.as_ref())
    }

    fn validate(&self) -> Result<()> {
        if blank(&self.last_name) {
            return Err(Error::validation("people", "last name can't be blank"));
        }
        Ok(())
    }
}

/// Payee block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayeeInput {
    /// Existing payee id
    pub id: Option<i64>,
    /// Name the payment is made out to
    pub name: String,
    /// Mailing address
    pub address: Option<String>,
    /// Contact phone number
    pub phone: Option<String>,
}

impl NestedInput for PayeeInput {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn is_blank(&self) -> bool {
        self.id.is_none()
            && blank(&self.name)
            && blank_opt(self.address.as_ref())
            && blank_opt(self.phone.as_ref())
    }

    fn validate(&self) -> Result<()> {
        if blank(&self.name) {
            return Err(Error::validation("payees", "name can't be blank"));
        }
        Ok(())
    }
}

/// Residence block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidenceInput {
    /// Existing residence id
    pub id: Option<i64>,
    /// Street address
    pub address: String,
    /// City
    pub city: Option<String>,
    /// Postal code
    pub zip: Option<String>,
}

impl NestedInput for ResidenceInput {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn is_blank(&self) -> bool {
        self.id.is_none()
            && blank(&self.address)
            && blank_opt(self.city.as_ref())
            && blank_opt(self.zip.as_ref())
    }

    fn validate(&self) -> Result<()> {
        if blank(&self.address) {
            return Err(Error::validation("residence", "address can't be blank"));
        }
        Ok(())
    }
}

/// Reason block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonTypeInput {
    /// Existing `grants_reason_types` row id
    pub id: Option<i64>,
    /// Reason type recorded
    pub reason_type_id: Option<i64>,
    /// Case worker notes
    pub notes: Option<String>,
}

impl NestedInput for ReasonTypeInput {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn is_blank(&self) -> bool {
        self.id.is_none() && self.reason_type_id.is_none() && blank_opt(self.notes.as_ref())
    }

    fn validate(&self) -> Result<()> {
        if self.reason_type_id.is_none() {
            return Err(Error::validation("reason_types", "reason type must be chosen"));
        }
        Ok(())
    }
}

/// A grant and its nested components as submitted by a case worker.
///
/// Scalar fields left as `None` keep their stored value on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrantForm {
    /// Grant being edited; `None` creates a new grant
    pub id: Option<i64>,
    /// Owning case worker
    pub user_id: Option<i64>,
    /// Day the household applied; defaults to today on save
    pub application_date: Option<NaiveDate>,
    /// Amount as typed, e.g. `"$1,200"`
    pub grant_amount: Option<String>,
    /// Status; defaults to the initial status on create
    pub grant_status_id: Option<i64>,
    /// Subsidy programme
    pub subsidy_type_id: Option<i64>,
    /// Previous residence
    pub previous_residence_id: Option<i64>,
    /// Budget snapshot for last month
    pub last_month_budget_id: Option<i64>,
    /// Budget snapshot for this month
    pub current_month_budget_id: Option<i64>,
    /// Budget projection for next month
    pub next_month_budget_id: Option<i64>,
    /// Replaces the linked coverage types when present
    pub coverage_type_ids: Option<Vec<i64>>,
    /// Applicants
    pub people: Vec<Nested<PersonInput>>,
    /// Payees
    pub payees: Vec<Nested<PayeeInput>>,
    /// Current residence
    pub residence: Option<Nested<ResidenceInput>>,
    /// Recorded reasons
    pub reason_types: Vec<Nested<ReasonTypeInput>>,
}

impl GrantForm {
    /// Seeds a form for editing: adopts `user_id` when the form has no owner and
    /// adds one blank person, payee and residence block where none exist.
    /// Repeated calls add nothing further.
    pub fn initialize_defaults(&mut self, user_id: Option<i64>) {
        if self.user_id.is_none() {
            self.user_id = user_id;
        }
        if self.people.is_empty() {
            self.people.push(Nested::Keep(PersonInput::default()));
        }
        if self.payees.is_empty() {
            self.payees.push(Nested::Keep(PayeeInput::default()));
        }
        if self.residence.is_none() {
            self.residence = Some(Nested::Keep(ResidenceInput::default()));
        }
    }
}

/// Drops blank `Keep` blocks and validates the rest.
fn prepare<T: NestedInput>(blocks: Vec<Nested<T>>) -> Result<Vec<Nested<T>>> {
    let kept: Vec<Nested<T>> = blocks
        .into_iter()
        .filter(|block| !matches!(block, Nested::Keep(input) if input.is_blank()))
        .collect();

    for block in &kept {
        if let Nested::Keep(input) = block {
            input.validate()?;
        }
    }
    Ok(kept)
}

fn not_on_grant(field: &str, id: i64) -> Error {
    Error::validation(field, format!("record {id} does not belong to this grant"))
}

/// Builds an edit form from a stored grant and its components.
///
/// # Errors
/// [`Error::GrantNotFound`] when the grant does not exist.
pub async fn load_form<C>(db: &C, grant_id: i64) -> Result<GrantForm>
where
    C: ConnectionTrait,
{
    let grant = Grant::find_by_id(grant_id)
        .one(db)
        .await?
        .ok_or(Error::GrantNotFound { id: grant_id })?;

    let people = crate::core::grant::load_people_for(db, grant_id).await?;
    let payees = crate::core::grant::load_payees_for(db, grant_id).await?;
    let reasons = crate::core::grant::load_reason_types_for(db, grant_id).await?;
    let coverage = crate::core::grant::load_coverage_types_for(db, grant_id).await?;
    let residence = match grant.residence_id {
        Some(id) => Residence::find_by_id(id).one(db).await?,
        None => None,
    };

    Ok(GrantForm {
        id: Some(grant.id),
        user_id: grant.user_id,
        application_date: grant.application_date,
        grant_amount: grant.grant_amount,
        grant_status_id: grant.grant_status_id,
        subsidy_type_id: grant.subsidy_type_id,
        previous_residence_id: grant.previous_residence_id,
        last_month_budget_id: grant.last_month_budget_id,
        current_month_budget_id: grant.current_month_budget_id,
        next_month_budget_id: grant.next_month_budget_id,
        coverage_type_ids: Some(coverage.into_iter().map(|c| c.id).collect()),
        people: people
            .into_iter()
            .map(|p| {
                Nested::Keep(PersonInput {
                    id: Some(p.id),
                    first_name: p.first_name,
                    last_name: p.last_name,
                    relationship: p.relationship,
                })
            })
            .collect(),
        payees: payees
            .into_iter()
            .map(|p| {
                Nested::Keep(PayeeInput {
                    id: Some(p.id),
                    name: p.name,
                    address: p.address,
                    phone: p.phone,
                })
            })
            .collect(),
        residence: residence.map(|r| {
            Nested::Keep(ResidenceInput {
                id: Some(r.id),
                address: r.address,
                city: r.city,
                zip: r.zip,
            })
        }),
        reason_types: reasons
            .into_iter()
            .map(|r| {
                Nested::Keep(ReasonTypeInput {
                    id: Some(r.id),
                    reason_type_id: Some(r.reason_type_id),
                    notes: r.notes,
                })
            })
            .collect(),
    })
}

fn assign_scalars(active: &mut grant::ActiveModel, form: &GrantForm) {
    fn assign(field: &mut ActiveValue<Option<i64>>, value: Option<i64>) {
        if value.is_some() {
            *field = Set(value);
        }
    }

    assign(&mut active.user_id, form.user_id);
    assign(&mut active.grant_status_id, form.grant_status_id);
    assign(&mut active.subsidy_type_id, form.subsidy_type_id);
    assign(&mut active.previous_residence_id, form.previous_residence_id);
    assign(&mut active.last_month_budget_id, form.last_month_budget_id);
    assign(&mut active.current_month_budget_id, form.current_month_budget_id);
    assign(&mut active.next_month_budget_id, form.next_month_budget_id);

    if let Some(date) = form.application_date {
        active.application_date = Set(Some(date));
    }
    if let Some(amount) = &form.grant_amount {
        active.set_grant_amount(amount);
    }
}

/// Validates and persists a grant form in one transaction.
///
/// Creates a grant when `form.id` is `None`, otherwise updates that grant.
/// Blank nested blocks are ignored. On any error nothing is written.
///
/// # Errors
/// * [`Error::Validation`] for invalid blocks, a missing owner on create, or
///   nested ids that do not belong to the grant
/// * [`Error::GrantNotFound`] when updating a grant that does not exist
/// * [`Error::Database`] for persistence failures, including a missing initial status
#[instrument(skip(db, form), fields(grant_id = ?form.id))]
pub async fn save_grant(db: &DatabaseConnection, form: GrantForm) -> Result<grant::Model> {
    let people = prepare(form.people.clone())?;
    let payees = prepare(form.payees.clone())?;
    let reason_types = prepare(form.reason_types.clone())?;
    let residence = prepare(form.residence.clone().into_iter().collect())?.pop();

    if form.id.is_none() && form.user_id.is_none() {
        return Err(Error::validation("user_id", "a grant needs an owning case worker"));
    }

    let txn = db.begin().await?;

    let (mut active, current_residence) = match form.id {
        Some(id) => {
            let existing = Grant::find_by_id(id)
                .one(&txn)
                .await?
                .ok_or(Error::GrantNotFound { id })?;
            let current_residence = existing.residence_id;
            (existing.into_active_model(), current_residence)
        }
        None => (grant::ActiveModel::new(), None),
    };
    assign_scalars(&mut active, &form);

    let mut residence_to_remove = None;
    match residence {
        Some(Nested::Keep(input)) => {
            let saved = save_residence(&txn, current_residence, input).await?;
            active.residence_id = Set(Some(saved.id));
        }
        Some(Nested::Delete(id)) => {
            if current_residence != Some(id) {
                return Err(not_on_grant("residence", id));
            }
            active.residence_id = Set(None);
            residence_to_remove = Some(id);
        }
        None => {}
    }

    let grant = if form.id.is_some() {
        active.update(&txn).await?
    } else {
        active.insert(&txn).await?
    };

    if let Some(id) = residence_to_remove {
        Residence::delete_by_id(id).exec(&txn).await?;
    }

    save_people(&txn, grant.id, people).await?;
    save_payees(&txn, grant.id, payees).await?;
    save_reason_types(&txn, grant.id, reason_types).await?;
    if let Some(ids) = &form.coverage_type_ids {
        replace_coverage_types(&txn, grant.id, ids).await?;
    }

    txn.commit().await?;

    info!(grant_id = grant.id, created = form.id.is_none(), "Grant saved");
    Ok(grant)
}

/// A grant has at most one residence, so a block without an id edits the
/// current residence in place when there is one.
async fn save_residence(
    txn: &DatabaseTransaction,
    current: Option<i64>,
    input: ResidenceInput,
) -> Result<residence::Model> {
    if let Some(id) = input.id {
        if current != Some(id) {
            return Err(not_on_grant("residence", id));
        }
    }
    let mut active = residence::ActiveModel {
        address: Set(input.address),
        city: Set(input.city),
        zip: Set(input.zip),
        ..Default::default()
    };
    match input.id.or(current) {
        Some(id) => {
            active.id = ActiveValue::Unchanged(id);
            active.update(txn).await.map_err(Into::into)
        }
        None => active.insert(txn).await.map_err(Into::into),
    }
}

async fn save_people(
    txn: &DatabaseTransaction,
    grant_id: i64,
    blocks: Vec<Nested<PersonInput>>,
) -> Result<()> {
    for block in blocks {
        match block {
            Nested::Keep(input) => {
                let mut active = match input.id {
                    Some(id) => Person::find_by_id(id)
                        .filter(person::Column::GrantId.eq(grant_id))
                        .one(txn)
                        .await?
                        .ok_or_else(|| not_on_grant("people", id))?
                        .into_active_model(),
                    None => person::ActiveModel {
                        grant_id: Set(grant_id),
                        ..Default::default()
                    },
                };
                active.first_name = Set(input.first_name);
                active.last_name = Set(input.last_name);
                active.relationship = Set(input.relationship);
                active.save(txn).await?;
            }
            Nested::Delete(id) => {
                let result = Person::delete_many()
                    .filter(person::Column::Id.eq(id))
                    .filter(person::Column::GrantId.eq(grant_id))
                    .exec(txn)
                    .await?;
                if result.rows_affected == 0 {
                    return Err(not_on_grant("people", id));
                }
                debug!(grant_id, person_id = id, "Removed person from grant");
            }
        }
    }
    Ok(())
}

async fn is_payee_linked(txn: &DatabaseTransaction, grant_id: i64, payee_id: i64) -> Result<bool> {
    Ok(GrantPayee::find_by_id((grant_id, payee_id))
        .one(txn)
        .await?
        .is_some())
}

async fn save_payees(
    txn: &DatabaseTransaction,
    grant_id: i64,
    blocks: Vec<Nested<PayeeInput>>,
) -> Result<()> {
    for block in blocks {
        match block {
            Nested::Keep(input) => match input.id {
                Some(id) => {
                    if !is_payee_linked(txn, grant_id, id).await? {
                        return Err(not_on_grant("payees", id));
                    }
                    let mut active = payee::ActiveModel {
                        id: ActiveValue::Unchanged(id),
                        ..Default::default()
                    };
                    active.name = Set(input.name);
                    active.address = Set(input.address);
                    active.phone = Set(input.phone);
                    active.update(txn).await?;
                }
                None => {
                    let payee = payee::ActiveModel {
                        name: Set(input.name),
                        address: Set(input.address),
                        phone: Set(input.phone),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    grant_payee::ActiveModel {
                        grant_id: Set(grant_id),
                        payee_id: Set(payee.id),
                    }
                    .insert(txn)
                    .await?;
                }
            },
            Nested::Delete(id) => {
                if !is_payee_linked(txn, grant_id, id).await? {
                    return Err(not_on_grant("payees", id));
                }
                GrantPayee::delete_by_id((grant_id, id)).exec(txn).await?;

                // Payees shared with other grants stay for those grants.
                let remaining = GrantPayee::find()
                    .filter(grant_payee::Column::PayeeId.eq(id))
                    .count(txn)
                    .await?;
                if remaining == 0 {
                    Payee::delete_by_id(id).exec(txn).await?;
                }
            }
        }
    }
    Ok(())
}

async fn save_reason_types(
    txn: &DatabaseTransaction,
    grant_id: i64,
    blocks: Vec<Nested<ReasonTypeInput>>,
) -> Result<()> {
    for block in blocks {
        match block {
            Nested::Keep(input) => {
                let mut active = match input.id {
                    Some(id) => GrantReasonType::find_by_id(id)
                        .filter(grant_reason_type::Column::GrantId.eq(grant_id))
                        .one(txn)
                        .await?
                        .ok_or_else(|| not_on_grant("reason_types", id))?
                        .into_active_model(),
                    None => grant_reason_type::ActiveModel {
                        grant_id: Set(grant_id),
                        ..Default::default()
                    },
                };
                if let Some(reason_type_id) = input.reason_type_id {
                    active.reason_type_id = Set(reason_type_id);
                }
                active.notes = Set(input.notes);
                active.save(txn).await?;
            }
            Nested::Delete(id) => {
                let result = GrantReasonType::delete_many()
                    .filter(grant_reason_type::Column::Id.eq(id))
                    .filter(grant_reason_type::Column::GrantId.eq(grant_id))
                    .exec(txn)
                    .await?;
                if result.rows_affected == 0 {
                    return Err(not_on_grant("reason_types", id));
                }
            }
        }
    }
    Ok(())
}

async fn replace_coverage_types(
    txn: &DatabaseTransaction,
    grant_id: i64,
    coverage_type_ids: &[i64],
) -> Result<()> {
    GrantCoverageType::delete_many()
        .filter(grant_coverage_type::Column::GrantId.eq(grant_id))
        .exec(txn)
        .await?;

    let mut ids = coverage_type_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    for coverage_type_id in ids {
        grant_coverage_type::ActiveModel {
            grant_id: Set(grant_id),
            coverage_type_id: Set(coverage_type_id),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}
