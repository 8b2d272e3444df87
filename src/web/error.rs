//! Mapping of [`Error`] onto HTTP responses.

use crate::{core::grant_form::GrantForm, errors::Error};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

impl Error {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::GrantNotFound { .. } | Self::UserNotFound { .. } | Self::UploadNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::Validation { .. } | Self::UserHasGrants { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Toml(_)
            | Self::BlankStatus
            | Self::InitialStatusMissing => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden { .. } => "forbidden",
            Self::GrantNotFound { .. } | Self::UserNotFound { .. } | Self::UploadNotFound { .. } => {
                "not_found"
            }
            Self::Validation { .. } => "validation",
            Self::UserHasGrants { .. } => "user_has_grants",
            _ => "internal",
        }
    }

    /// Message safe to show a client; internal failures are not described.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.status_code().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }

    fn log(&self) {
        match self {
            Self::Unauthenticated | Self::Forbidden { .. } => {
                tracing::info!("Authorization error: {self}");
            }
            _ if self.status_code().is_server_error() => tracing::error!("Internal error: {self}"),
            _ => tracing::debug!("Client error: {self}"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.log();
        let body = json!({
            "error": self.user_message(),
            "code": self.code(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

/// A failed grant write. Validation failures echo the submitted form back so
/// the client can re-render it.
#[derive(Debug)]
pub struct FormRejection {
    /// What went wrong
    pub error: Error,
    /// The form as submitted, when there was one
    pub form: Option<GrantForm>,
}

impl FormRejection {
    /// Pairs an error with the form that caused it.
    #[must_use]
    pub const fn with_form(error: Error, form: GrantForm) -> Self {
        Self {
            error,
            form: Some(form),
        }
    }
}

impl From<Error> for FormRejection {
    fn from(error: Error) -> Self {
        Self { error, form: None }
    }
}

impl IntoResponse for FormRejection {
    fn into_response(self) -> Response {
        match (self.error, self.form) {
            (error @ Error::Validation { .. }, Some(form)) => {
                error.log();
                let body = json!({
                    "error": error.user_message(),
                    "code": error.code(),
                    "form": form,
                });
                (error.status_code(), Json(body)).into_response()
            }
            (error, _) => error.into_response(),
        }
    }
}
