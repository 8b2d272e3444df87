use thiserror::Error;

/// Every failure the grant tracker can surface, from configuration loading
/// through persistence to request authorization.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure (config file, socket bind)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// TOML parse failure
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Submitted data failed validation; nothing was persisted
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Field or nested block that failed
        field: String,
        /// Human readable reason
        message: String,
    },

    /// Grant does not exist or is not visible to the requester
    #[error("Grant not found: {id}")]
    GrantNotFound {
        /// Requested grant id
        id: i64,
    },

    /// User does not exist
    #[error("User not found: {id}")]
    UserNotFound {
        /// Requested user id
        id: i64,
    },

    /// Upload does not exist
    #[error("Upload not found: {id}")]
    UploadNotFound {
        /// Requested upload id
        id: i64,
    },

    /// A grant was asked for its status name before it had a status
    #[error("Grant can not have blank grant status")]
    BlankStatus,

    /// No grant status is flagged as the initial one
    #[error("No initial grant status has been configured")]
    InitialStatusMissing,

    /// The user still owns grants and cannot be removed
    #[error("User {id} still owns grants")]
    UserHasGrants {
        /// User id
        id: i64,
    },

    /// No requesting user could be identified
    #[error("Authentication required")]
    Unauthenticated,

    /// The requesting user may not perform this action
    #[error("Not permitted to {action}")]
    Forbidden {
        /// Attempted action
        action: String,
    },
}

impl Error {
    /// Shorthand for a [`Error::Validation`] failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
