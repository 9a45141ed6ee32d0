use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_accounts::{
    api::{create_router, AppState},
    config::Config,
    crypto::{CredentialHasher, TokenService},
    db::SqliteUserDirectory,
    error::AppError,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,user_accounts=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting user-accounts server v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    // Setup database with proper connection pooling
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true);
    let db = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect_with(connect_options)
        .await?;

    tracing::info!("Database connected: {}", config.database_url);

    // Run migrations
    sqlx::migrate!("./migrations").run(&db).await?;

    tracing::info!("Database migrations completed");

    let hasher = CredentialHasher::new(config.password_hash_cost)?;
    tracing::info!(cost = hasher.cost(), "Password hasher configured");

    let tokens = TokenService::new(
        config.jwt_secret.as_bytes(),
        chrono::Duration::hours(config.token_expiry_hours),
    );
    tracing::info!(ttl_hours = tokens.ttl().num_hours(), "Token service configured");

    // Create shared application state
    let state = AppState {
        directory: Arc::new(SqliteUserDirectory::new(db.clone())),
        hasher: Arc::new(hasher),
        tokens: Arc::new(tokens),
    };

    // Build router
    let app = create_router(state, Duration::from_secs(config.request_timeout_secs));

    // Bind and serve
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("  GET  /health");
    tracing::info!("  POST /user/register");
    tracing::info!("  POST /user/login");
    tracing::info!("  GET  /user/details/{{id}} (requires auth)");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    db.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
