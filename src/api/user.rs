use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::middleware::AuthenticatedIdentity;
use crate::api::state::AppState;
use crate::db::User;
use crate::error::AppError;

/// A caller may only read the profile whose id matches their token subject.
pub fn authorize_own_profile(identity: &AuthenticatedIdentity, requested_id: &str) -> Result<(), AppError> {
    if identity.subject != requested_id {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

/// GET /user/details/{id} (requires auth via middleware)
pub async fn details(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    if let Err(e) = authorize_own_profile(&identity, &id) {
        tracing::info!(subject = %identity.subject, requested = %id, "profile access denied");
        return Err(e);
    }

    let user = state
        .directory
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(Json(user))
}
