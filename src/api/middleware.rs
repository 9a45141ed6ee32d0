use std::time::Duration;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::api::state::AppState;
use crate::error::AppError;

/// Subject of a validated bearer token, available to handlers behind [`auth_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub subject: String,
}

/// Authentication middleware - validates bearer tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let subject = state.tokens.validate(auth_header)?;

    request
        .extensions_mut()
        .insert(AuthenticatedIdentity { subject });

    Ok(next.run(request).await)
}

/// Bounds each request to `limit`, answering `408` in the usual error envelope.
pub async fn timeout_middleware(
    State(limit): State<Duration>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    tokio::time::timeout(limit, next.run(request))
        .await
        .map_err(|_| {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "request timed out");
            AppError::Timeout
        })
}

impl<S> FromRequestParts<S> for AuthenticatedIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedIdentity>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use chrono::Duration;
    use tower::ServiceExt;

    use super::*;
    use crate::crypto::{CredentialHasher, TokenService};
    use crate::db::InMemoryUserDirectory;

    fn test_state() -> AppState {
        AppState {
            directory: Arc::new(InMemoryUserDirectory::new()),
            hasher: Arc::new(CredentialHasher::new(4).unwrap()),
            tokens: Arc::new(TokenService::new(
                b"test-secret-key-that-is-at-least-32-chars",
                Duration::hours(24),
            )),
        }
    }

    async fn whoami(identity: AuthenticatedIdentity) -> String {
        identity.subject
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    async fn call(state: AppState, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let response = app(state)
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let state = test_state();
        let token = state.tokens.issue("5").unwrap();

        let (status, body) = call(state, Some(token.as_str())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "5");
    }

    #[tokio::test]
    async fn test_rejections_are_identical() {
        let missing = call(test_state(), None).await;
        let blank = call(test_state(), Some("   ")).await;
        let malformed = call(test_state(), Some("Bearer: garbage")).await;

        assert_eq!(missing.0, StatusCode::UNAUTHORIZED);
        assert_eq!(missing, blank);
        assert_eq!(missing, malformed);
        assert_eq!(missing.1, r#"{"error":"unauthorized"}"#);
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_is_unauthorized() {
        let state = test_state();
        let app = Router::new().route("/whoami", get(whoami)).with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
