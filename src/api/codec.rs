use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;

/// Field name to problem description, reported to clients on a `400`.
pub type FieldProblems = BTreeMap<String, String>;

/// Problem code for a missing or whitespace-only field.
pub const EMPTY: &str = "empty";

/// Custom `validator` rule rejecting blank strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(EMPTY));
    }
    Ok(())
}

/// Collapse `validator` errors to one problem per field; a blank field reports `"empty"`.
pub fn field_problems(errors: &ValidationErrors) -> FieldProblems {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errors)| {
            let code = errors
                .iter()
                .find(|e| e.code == EMPTY)
                .or_else(|| errors.first())?
                .code
                .to_string();
            Some((field.to_string(), code))
        })
        .collect()
}

/// JSON body extractor that rejects undecodable or invalid payloads.
///
/// The `Content-Type` header is not checked.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|_| AppError::BadRequest("failed to decode json".to_string()))?;

        let value: T = serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(error = %e, "rejected request body");
            AppError::BadRequest("failed to decode json".to_string())
        })?;

        value
            .validate()
            .map_err(|errors| AppError::Validation(field_problems(&errors)))?;

        Ok(ValidatedJson(value))
    }
}
