//! Upload business logic - Supporting documents and their download links.

use crate::{
    core::{filter::Viewer, grant},
    entities::{Upload, upload, upload::UploadOwner},
    errors::{Error, Result},
    storage::FileStore,
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Fields for a new upload record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUpload {
    /// Owning user or agency
    pub owner: UploadOwner,
    /// Grant the document supports
    #[serde(default)]
    pub grant_id: Option<i64>,
    /// Original file name
    pub file_name: String,
    /// Key of the stored file
    #[serde(default)]
    pub storage_key: Option<String>,
}

fn active_for(owner: UploadOwner) -> upload::ActiveModel {
    let (owner_type, owner_id) = owner.into_parts();
    upload::ActiveModel {
        owner_type: Set(owner_type),
        owner_id: Set(owner_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
}

/// Persists an empty upload owned by `user_id`, ready for a file to be attached.
pub async fn new_upload_for(db: &DatabaseConnection, user_id: i64) -> Result<upload::Model> {
    let upload = active_for(UploadOwner::User(user_id)).insert(db).await?;
    debug!(upload_id = upload.id, user_id, "Started new upload");
    Ok(upload)
}

/// Stores an upload record.
///
/// # Errors
/// [`Error::Validation`] when the file name is blank.
#[instrument(skip(db, new_upload), fields(owner = ?new_upload.owner))]
pub async fn create_upload(db: &DatabaseConnection, new_upload: NewUpload) -> Result<upload::Model> {
    let file_name = new_upload.file_name.trim();
    if file_name.is_empty() {
        return Err(Error::validation("file_name", "can't be blank"));
    }

    let mut active = active_for(new_upload.owner);
    active.grant_id = Set(new_upload.grant_id);
    active.file_name = Set(Some(file_name.to_string()));
    active.storage_key = Set(new_upload.storage_key);
    active.insert(db).await.map_err(Into::into)
}

/// Whether `viewer` may act for `owner`: admins for anyone, everyone else for
/// themselves and their own agency.
#[must_use]
pub fn may_act_for(viewer: &Viewer, owner: UploadOwner) -> bool {
    viewer.admin
        || match owner {
            UploadOwner::User(id) => id == viewer.id,
            UploadOwner::Agency(id) => viewer.agency_id == Some(id),
        }
}

/// Checks that `viewer` may file a document for `owner`, attached to `grant_id`.
///
/// # Errors
/// * [`Error::Forbidden`] when the owner is another user or agency
/// * [`Error::GrantNotFound`] when the grant is not visible to `viewer`
pub async fn authorize_new<C>(
    db: &C,
    viewer: &Viewer,
    owner: UploadOwner,
    grant_id: Option<i64>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    if !may_act_for(viewer, owner) {
        return Err(Error::Forbidden {
            action: "file documents for another owner".to_string(),
        });
    }
    if let Some(grant_id) = grant_id {
        grant::find_visible(db, viewer, grant_id).await?;
    }
    Ok(())
}

/// Finds an upload `viewer` may read. Documents attached to a grant follow the
/// grant's visibility; unattached ones are limited to their owner.
///
/// # Errors
/// * [`Error::UploadNotFound`] when no such upload exists
/// * [`Error::GrantNotFound`] when the attached grant is not visible
/// * [`Error::Forbidden`] when an unattached upload belongs to someone else
pub async fn find_accessible(
    db: &DatabaseConnection,
    viewer: &Viewer,
    upload_id: i64,
) -> Result<upload::Model> {
    let upload = find_upload(db, upload_id).await?;
    match upload.grant_id {
        Some(grant_id) => {
            grant::find_visible(db, viewer, grant_id).await?;
        }
        None if !may_act_for(viewer, upload.owner()) => {
            return Err(Error::Forbidden {
                action: "read another owner's documents".to_string(),
            });
        }
        None => {}
    }
    Ok(upload)
}

/// Finds an upload by id.
///
/// # Errors
/// [`Error::UploadNotFound`] when no such upload exists.
pub async fn find_upload(db: &DatabaseConnection, upload_id: i64) -> Result<upload::Model> {
    Upload::find_by_id(upload_id)
        .one(db)
        .await?
        .ok_or(Error::UploadNotFound { id: upload_id })
}

/// Uploads attached to a grant, oldest first.
pub async fn uploads_for_grant<C>(db: &C, grant_id: i64) -> Result<Vec<upload::Model>>
where
    C: ConnectionTrait,
{
    Upload::find()
        .filter(upload::Column::GrantId.eq(grant_id))
        .order_by_asc(upload::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// A time-limited link to the stored file.
///
/// # Errors
/// [`Error::Validation`] when no file has been stored for the upload yet.
pub async fn download_url(
    store: &dyn FileStore,
    upload: &upload::Model,
    ttl: Duration,
) -> Result<String> {
    let key = upload
        .storage_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| Error::validation("storage_key", "no file has been stored for this upload"))?;
    store.expiring_url(key, ttl).await
}
