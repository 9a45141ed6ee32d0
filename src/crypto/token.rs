use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Scheme label prepended to issued tokens, ready for an `Authorization` header.
pub const TOKEN_PREFIX: &str = "Bearer: ";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Issues and validates HS256 bearer tokens carrying a user id.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `subject`, returned with the `Bearer: ` label.
    pub fn issue(&self, subject: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Crypto("Token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Crypto(format!("Failed to generate token: {}", e)))?;

        Ok(format!("{}{}", TOKEN_PREFIX, token))
    }

    /// Validate a header value and return the token's subject.
    ///
    /// Every failure maps to [`AppError::Unauthorized`]; the cause is only logged.
    pub fn validate(&self, header_value: &str) -> Result<String, AppError> {
        let token = strip_scheme(header_value);
        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                AppError::Unauthorized
            })
    }
}

// Accepts both the `Bearer: ` label this service issues and the standard `Bearer `.
fn strip_scheme(value: &str) -> &str {
    let value = value.trim();
    let stripped = value
        .strip_prefix("Bearer:")
        .or_else(|| value.strip_prefix("Bearer "))
        .unwrap_or(value);
    stripped.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-that-is-at-least-32-chars";

    fn create_test_service() -> TokenService {
        TokenService::new(SECRET, Duration::hours(24))
    }

    #[test]
    fn test_issue_has_prefix() {
        let token = create_test_service().issue("1").unwrap();

        assert!(token.starts_with(TOKEN_PREFIX));
        assert!(token.len() > TOKEN_PREFIX.len());
    }

    #[test]
    fn test_round_trip_subject() {
        let service = create_test_service();
        let token = service.issue("42").unwrap();

        assert_eq!(service.validate(&token).unwrap(), "42");
    }

    #[test]
    fn test_accepts_standard_and_bare_forms() {
        let service = create_test_service();
        let token = service.issue("7").unwrap();
        let raw = token.strip_prefix(TOKEN_PREFIX).unwrap();

        assert_eq!(service.validate(&format!("Bearer {}", raw)).unwrap(), "7");
        assert_eq!(service.validate(raw).unwrap(), "7");
        assert_eq!(service.validate(&format!("  {}  ", token)).unwrap(), "7");
    }

    #[test]
    fn test_expiry_is_24_hours() {
        let service = create_test_service();
        let token = service.issue("1").unwrap();
        let raw = token.strip_prefix(TOKEN_PREFIX).unwrap();

        let claims = decode::<Claims>(raw, &service.decoding_key, &service.validation)
            .unwrap()
            .claims;
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_empty_is_unauthorized() {
        let service = create_test_service();

        assert!(matches!(service.validate(""), Err(AppError::Unauthorized)));
        assert!(matches!(service.validate("Bearer: "), Err(AppError::Unauthorized)));
        assert!(matches!(service.validate("   "), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_malformed_is_unauthorized() {
        let result = create_test_service().validate("Bearer: invalid.token.here");
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let other = TokenService::new(b"another-secret-that-is-32-chars-long", Duration::hours(24));
        let token = other.issue("1").unwrap();

        let result = create_test_service().validate(&token);
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_expired_is_unauthorized() {
        let expired = TokenService::new(SECRET, Duration::seconds(-120));
        let token = expired.issue("1").unwrap();

        let result = create_test_service().validate(&token);
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_unrepresentable_expiry_is_error() {
        let service = TokenService::new(SECRET, Duration::days(200_000_000));

        let result = service.issue("1");
        assert!(matches!(result, Err(AppError::Crypto(_))));
    }

    #[test]
    fn test_missing_subject_is_unauthorized() {
        #[derive(Serialize)]
        struct NoSubject {
            exp: i64,
        }

        let claims = NoSubject {
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let result = create_test_service().validate(&token);
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
