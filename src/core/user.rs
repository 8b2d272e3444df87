//! User business logic - Account listing, updates and removal.
//!
//! Only administrators may approve accounts or remove them. Case workers may
//! edit their own profile details.

use crate::{
    entities::{Grant, User, grant, user},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Fields for a new account
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Login e-mail address
    pub email: String,
    /// Agency the user works for
    pub agency_id: Option<i64>,
    /// Administrator flag
    #[serde(default)]
    pub admin: bool,
    /// Approval flag
    #[serde(default)]
    pub approved: bool,
}

/// Editable account fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Login e-mail address
    pub email: Option<String>,
    /// Agency the user works for, honored only for administrators
    pub agency_id: Option<i64>,
    /// Approval flag, honored only for administrators
    pub approved: Option<bool>,
}

fn require(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "can't be blank"));
    }
    Ok(trimmed.to_string())
}

/// Creates an account after checking the names and e-mail are present.
pub async fn create_user(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
    user::ActiveModel {
        first_name: Set(require("first_name", &new_user.first_name)?),
        last_name: Set(require("last_name", &new_user.last_name)?),
        email: Set(require("email", &new_user.email)?),
        agency_id: Set(new_user.agency_id),
        admin: Set(new_user.admin),
        approved: Set(new_user.approved),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds a user by id, returning None if not found.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by id.
///
/// # Errors
/// [`Error::UserNotFound`] when no such user exists.
pub async fn find_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    get_user_by_id(db, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

/// All users ordered by last name, then first name.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::LastName)
        .order_by_asc(user::Column::FirstName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Updates a user's profile on behalf of `actor`.
///
/// Non-admins may only edit themselves. `approved` and `agency_id` are applied
/// only when the actor is an administrator and are otherwise dropped with a
/// warning.
#[instrument(skip(db, actor, update), fields(actor_id = actor.id))]
pub async fn update_user(
    db: &DatabaseConnection,
    actor: &user::Model,
    user_id: i64,
    update: UserUpdate,
) -> Result<user::Model> {
    if !actor.admin && actor.id != user_id {
        return Err(Error::Forbidden {
            action: "update another user".to_string(),
        });
    }

    let existing = find_user(db, user_id).await?;
    let mut active: user::ActiveModel = existing.into();

    if let Some(first_name) = update.first_name {
        active.first_name = Set(require("first_name", &first_name)?);
    }
    if let Some(last_name) = update.last_name {
        active.last_name = Set(require("last_name", &last_name)?);
    }
    if let Some(email) = update.email {
        active.email = Set(require("email", &email)?);
    }
    match update.agency_id {
        Some(agency_id) if actor.admin => active.agency_id = Set(Some(agency_id)),
        Some(_) => warn!(user_id, "Ignoring agency change from non-admin"),
        None => {}
    }
    match update.approved {
        Some(approved) if actor.admin => active.approved = Set(approved),
        Some(_) => warn!(user_id, "Ignoring approval change from non-admin"),
        None => {}
    }

    let updated = active.update(db).await?;
    info!(user_id, "User updated");
    Ok(updated)
}

/// Removes a user account. Only administrators may do this, and only for users
/// who no longer own grants.
#[instrument(skip(db, actor), fields(actor_id = actor.id))]
pub async fn destroy_user(db: &DatabaseConnection, actor: &user::Model, user_id: i64) -> Result<()> {
    if !actor.admin {
        return Err(Error::Forbidden {
            action: "remove users".to_string(),
        });
    }

    let existing = find_user(db, user_id).await?;
    let owned = Grant::find()
        .filter(grant::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    if owned > 0 {
        return Err(Error::UserHasGrants { id: user_id });
    }

    existing.delete(db).await?;
    info!(user_id, "User removed");
    Ok(())
}
