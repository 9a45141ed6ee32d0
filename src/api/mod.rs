pub mod auth;
pub mod codec;
pub mod middleware;
pub mod state;
pub mod user;

pub use middleware::AuthenticatedIdentity;
pub use state::AppState;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let protected = Router::new()
        .route("/user/details/{id}", get(user::details))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        // Health check
        .route("/health", get(health))

        // Account endpoints
        .route("/user/register", post(auth::register))
        .route("/user/login", post(auth::login))
        .merge(protected)

        // Add request timeout
        .layer(axum_middleware::from_fn_with_state(
            request_timeout,
            middleware::timeout_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}
