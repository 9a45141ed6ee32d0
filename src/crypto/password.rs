use std::ops::RangeInclusive;
use std::sync::Arc;

use argon2::password_hash::{
    Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::error::AppError;

/// Default work factor: 2^14 KiB (16 MiB) of memory per hash.
pub const DEFAULT_COST: u32 = 14;

/// Accepted work factors on the log2 scale.
pub const COST_RANGE: RangeInclusive<u32> = 3..=20;

const PASSES: u32 = 2;
const LANES: u32 = 1;

/// Salted Argon2id hashing with a fixed, logarithmic work factor.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    cost: u32,
    dummy_hash: Arc<str>,
}

impl CredentialHasher {
    pub fn new(cost: u32) -> Result<Self, AppError> {
        if !COST_RANGE.contains(&cost) {
            return Err(AppError::Config(format!(
                "Password hash cost {} outside {:?}",
                cost, COST_RANGE
            )));
        }

        let params = Params::new(1 << cost, PASSES, LANES, None)
            .map_err(|e| AppError::Config(format!("Invalid Argon2 parameters: {}", e)))?;

        let mut hasher = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            cost,
            dummy_hash: Arc::from(""),
        };
        // Computed up front so the first unknown-email login costs one verify, like the rest.
        hasher.dummy_hash = Arc::from(hasher.hash("dummy-password-never-matches")?);

        Ok(hasher)
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt, returning a PHC string.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Crypto(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a stored PHC hash.
    ///
    /// A wrong password is `Ok(false)`; only an unparseable hash is an error.
    pub fn verify(&self, stored_hash: &str, password: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| AppError::Crypto(format!("Invalid password hash: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(e) => Err(AppError::Crypto(format!("Password verification failed: {}", e))),
        }
    }

    /// Spend the same effort as a real verification when there is nothing to verify against.
    pub fn verify_dummy(&self, password: &str) -> bool {
        self.verify(&self.dummy_hash, password).unwrap_or(false)
    }
}

/// Hash on the blocking pool so the async workers stay responsive.
pub async fn hash_blocking(hasher: &CredentialHasher, password: String) -> Result<String, AppError> {
    let hasher = hasher.clone();
    tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
}

pub async fn verify_blocking(
    hasher: &CredentialHasher,
    stored_hash: String,
    password: String,
) -> Result<bool, AppError> {
    let hasher = hasher.clone();
    tokio::task::spawn_blocking(move || hasher.verify(&stored_hash, &password)).await?
}

pub async fn verify_dummy_blocking(hasher: &CredentialHasher, password: String) -> Result<(), AppError> {
    let hasher = hasher.clone();
    tokio::task::spawn_blocking(move || hasher.verify_dummy(&password)).await?;
    Ok(())
}
