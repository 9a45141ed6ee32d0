use axum::http::StatusCode;
use thiserror::Error;

use crate::api::codec::FieldProblems;
use crate::db::DirectoryError;

/// Message returned for every login failure, whichever half of the credential was wrong.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "user or password not found";
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized";
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";
pub const TIMEOUT_MESSAGE: &str = "request timed out";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0:?}")]
    Validation(FieldProblems),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Request timed out")]
    Timeout,

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Crypto(_)
            | AppError::Database(_)
            | AppError::Directory(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Internal(format!("Migration failed: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Blocking task failed: {}", err))
    }
}

// Server-side failures are logged here and replaced by a generic body so no
// internal detail crosses the HTTP boundary.
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        let error = match self {
            AppError::Validation(problems) => serde_json::json!(problems),
            AppError::BadRequest(msg) | AppError::NotFound(msg) => serde_json::json!(msg),
            AppError::InvalidCredentials => serde_json::json!(INVALID_CREDENTIALS_MESSAGE),
            AppError::Unauthorized => serde_json::json!(UNAUTHORIZED_MESSAGE),
            AppError::Timeout => serde_json::json!(TIMEOUT_MESSAGE),
            other => {
                tracing::error!(error = %other, "request failed");
                serde_json::json!(INTERNAL_ERROR_MESSAGE)
            }
        };

        let body = serde_json::json!({
            "error": error,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_internal_errors_hide_cause() {
        let (status, body) =
            body_json(AppError::Internal("disk on fire at /var/db".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_directory_errors_are_internal() {
        let err = AppError::from(DirectoryError::Database(sqlx::Error::PoolClosed));
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_validation_problems_are_a_map() {
        let mut problems = FieldProblems::new();
        problems.insert("email".to_string(), "invalid email".to_string());

        let (status, body) = body_json(AppError::Validation(problems)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["email"], "invalid email");
    }

    #[tokio::test]
    async fn test_invalid_credentials_message() {
        let (status, body) = body_json(AppError::InvalidCredentials).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], INVALID_CREDENTIALS_MESSAGE);
    }
}
