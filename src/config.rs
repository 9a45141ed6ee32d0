use crate::crypto::password::{COST_RANGE, DEFAULT_COST};
use crate::error::AppError;

const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime, ten years.
pub const MAX_TOKEN_EXPIRY_HOURS: i64 = 87_600;

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub jwt_secret: String,
    pub token_expiry_hours: i64,
    pub password_hash_cost: u32,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("database_url", &self.database_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("jwt_secret", &"[redacted]")
            .field("token_expiry_hours", &self.token_expiry_hours)
            .field("password_hash_cost", &self.password_hash_cost)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| AppError::Config("JWT_SECRET must be set".to_string()))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Config(format!(
                "JWT_SECRET must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        let config = Config {
            server_host: var("SERVER_HOST", "127.0.0.1"),
            server_port: var("SERVER_PORT", "8080")
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?,
            database_url: var("DATABASE_URL", "sqlite://user_accounts.db"),
            db_max_connections: var("DB_MAX_CONNECTIONS", "20")
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid DB_MAX_CONNECTIONS: {}", e)))?,
            db_min_connections: var("DB_MIN_CONNECTIONS", "1")
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid DB_MIN_CONNECTIONS: {}", e)))?,
            jwt_secret,
            token_expiry_hours: var("TOKEN_EXPIRY_HOURS", "24")
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid TOKEN_EXPIRY_HOURS: {}", e)))?,
            password_hash_cost: var("PASSWORD_HASH_COST", &DEFAULT_COST.to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid PASSWORD_HASH_COST: {}", e)))?,
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS", "30")
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid REQUEST_TIMEOUT_SECS: {}", e)))?,
        };

        if !(1..=MAX_TOKEN_EXPIRY_HOURS).contains(&config.token_expiry_hours) {
            return Err(AppError::Config(format!(
                "TOKEN_EXPIRY_HOURS must be within 1..={}",
                MAX_TOKEN_EXPIRY_HOURS
            )));
        }
        if !COST_RANGE.contains(&config.password_hash_cost) {
            return Err(AppError::Config(format!(
                "PASSWORD_HASH_COST must be within {:?}",
                COST_RANGE
            )));
        }

        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
