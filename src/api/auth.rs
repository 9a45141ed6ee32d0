use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::codec::{not_blank, ValidatedJson};
use crate::api::state::AppState;
use crate::crypto::{hash_blocking, verify_blocking, verify_dummy_blocking};
use crate::db::{DirectoryError, NewUser};
use crate::error::AppError;

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank"), email(code = "invalid email"))]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = "not_blank"))]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: String,
    pub token: String,
}

fn email_taken() -> AppError {
    AppError::BadRequest("email already in use".to_string())
}

/// POST /user/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    tracing::debug!(request = ?req, "received register");

    if state.directory.email_exists(&req.email).await? {
        tracing::info!(email = %req.email, "email already in use");
        return Err(email_taken());
    }

    let password_hash = hash_blocking(&state.hasher, req.password).await?;

    let id = state
        .directory
        .create(NewUser {
            name: req.name,
            email: req.email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            DirectoryError::EmailTaken => email_taken(),
            other => AppError::from(other),
        })?;

    tracing::info!(user_id = %id, "user registered");

    Ok((StatusCode::CREATED, Json(RegisterResponse { id })))
}

/// POST /user/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    tracing::debug!(request = ?req, "received login");

    let Some(credentials) = state
        .directory
        .lookup_credentials_by_email(&req.email)
        .await?
    else {
        verify_dummy_blocking(&state.hasher, req.password).await?;
        return Err(AppError::InvalidCredentials);
    };

    let valid = verify_blocking(&state.hasher, credentials.password_hash, req.password).await?;
    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(&credentials.id)?;

    tracing::info!(user_id = %credentials.id, "user logged in");

    Ok(Json(LoginResponse {
        id: credentials.id,
        token,
    }))
}
