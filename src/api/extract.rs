use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::{FieldErrors, Validate};

/// JSON body that has been deserialized and checked with [`Validate`].
/// Malformed bodies are reported as validation errors.
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| {
                AppError::Validation(FieldErrors::single("body", rejection.body_text()))
            })?;

        value.validate()?;
        Ok(Self(value))
    }
}

/// Path ids that are not UUIDs cannot name anything the caller owns.
/// Handlers parse the id before looking at the body so the answer is 404
/// whatever the body holds.
pub fn parse_id(raw: &str, entity: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(entity))
}
