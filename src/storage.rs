//! File storage seam for uploaded documents.
//!
//! The database only records a storage key per upload. Turning that key into a
//! short-lived download link is the job of a [`FileStore`] backend.

use crate::errors::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;

/// Trait for file storage backends
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Returns a URL for `storage_key` that stops working after `ttl`.
    async fn expiring_url(&self, storage_key: &str, ttl: Duration) -> Result<String>;
}

/// Backend for files served from a static base URL; links carry their expiry
/// time as a unix timestamp query parameter.
#[derive(Debug, Clone)]
pub struct UrlFileStore {
    base_url: String,
}

impl UrlFileStore {
    /// Creates a store rooted at `base_url`. A trailing slash is ignored.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl FileStore for UrlFileStore {
    async fn expiring_url(&self, storage_key: &str, ttl: Duration) -> Result<String> {
        let key = storage_key.trim_start_matches('/');
        if key.is_empty() {
            return Err(Error::validation("storage_key", "can't be blank"));
        }

        let ttl = chrono::Duration::from_std(ttl).map_err(|_| Error::Config {
            message: "Download link lifetime is out of range".to_string(),
        })?;
        let expires = (Utc::now() + ttl).timestamp();
        Ok(format!("{}/{key}?expires={expires}", self.base_url))
    }
}
