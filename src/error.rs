use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::credentials::CredentialError;
use crate::registry::StoreError;
use crate::validation::FieldErrors;

/// Failures visible to API callers. Messages never carry storage details
/// or internal identifiers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("not authenticated")]
    Unauthenticated,

    /// Missing, or owned by another user. Both look the same to the caller.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    /// A create referenced an entity the caller does not own.
    #[error("{0} not found")]
    ReferentialViolation(&'static str),

    #[error("internal server error")]
    Infrastructure(#[source] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) | AppError::ReferentialViolation(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => {
                AppError::Conflict(format!("{field} already registered"))
            }
            StoreError::Database(err) => AppError::Infrastructure(err.into()),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidCredential => AppError::Unauthenticated,
            other => AppError::Infrastructure(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation(errors) => json!({ "detail": errors.errors() }),
            AppError::Infrastructure(err) => {
                tracing::error!(error = ?err, "request failed");
                json!({ "detail": capitalize(&self.to_string()) })
            }
            _ => json!({ "detail": capitalize(&self.to_string()) }),
        };

        (status, Json(body)).into_response()
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
