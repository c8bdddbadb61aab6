//! JWT token utilities for authentication and authorization.
//!
//! Provides bearer token creation and validation. Verification fails closed:
//! a malformed token, a bad signature, and an expired token all produce the
//! same `ServiceError::Auth`, so callers cannot probe which case applied.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::errors::{ServiceError, ServiceResult};

/// JWT Claims structure carrying the authenticated account identity.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Token expiration timestamp
    pub exp: i64,
    /// Token issued at timestamp
    pub iat: i64,
}

/// JWT token utility for creating and validating tokens.
///
/// The signing secret and token lifetime come from `Config`, supplied once at
/// construction. The secret is never logged.
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtUtils {
    pub fn new(secret: &str, ttl_seconds: u64) -> ServiceResult<Self> {
        if secret.is_empty() {
            return Err(ServiceError::configuration("JWT secret must not be empty"));
        }

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock in `validate_token`,
        // not against the OS clock inside the library.
        validation.validate_exp = false;

        Ok(JwtUtils {
            encoding_key,
            decoding_key,
            validation,
            ttl: Duration::seconds(ttl_seconds as i64),
        })
    }

    /// Generate a new token for the given user, expiring `ttl` after `now`.
    pub fn generate_token(&self, user_id: &str, now: DateTime<Utc>) -> ServiceResult<String> {
        let claims = Claims {
            sub: user_id.to_owned(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal(format!("Token generation failed: {e}")))
    }

    /// Validate and decode a token at the given instant.
    ///
    /// A token is accepted up to and including its `exp` second.
    pub fn validate_token(&self, token: &str, now: DateTime<Utc>) -> ServiceResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|_| ServiceError::Auth)?;

        if now.timestamp() > claims.exp {
            return Err(ServiceError::Auth);
        }

        Ok(claims)
    }
}

impl Claims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        assert!(matches!(
            JwtUtils::new("", 3600),
            Err(ServiceError::Configuration { .. })
        ));
    }

    #[test]
    fn token_roundtrip_carries_user_id() {
        let jwt = JwtUtils::new("secret", 3600).unwrap();
        let now = at(1_000_000);

        let token = jwt.generate_token("user-1", now).unwrap();
        let claims = jwt.validate_token(&token, now).unwrap();

        assert_eq!(claims.user_id(), "user-1");
        assert_eq!(claims.iat, 1_000_000);
        assert_eq!(claims.exp, 1_003_600);
    }

    #[test]
    fn token_is_valid_up_to_expiry_and_rejected_after() {
        let jwt = JwtUtils::new("secret", 3600).unwrap();
        let issued = at(1_000_000);
        let token = jwt.generate_token("user-1", issued).unwrap();

        assert!(jwt.validate_token(&token, at(1_003_600)).is_ok());
        assert!(matches!(
            jwt.validate_token(&token, at(1_003_601)),
            Err(ServiceError::Auth)
        ));
    }

    #[test]
    fn forged_and_malformed_tokens_fail_uniformly() {
        let jwt = JwtUtils::new("secret", 3600).unwrap();
        let other = JwtUtils::new("other-secret", 3600).unwrap();
        let now = at(1_000_000);

        let forged = other.generate_token("user-1", now).unwrap();
        assert!(matches!(
            jwt.validate_token(&forged, now),
            Err(ServiceError::Auth)
        ));
        assert!(matches!(
            jwt.validate_token("not.a.token", now),
            Err(ServiceError::Auth)
        ));
    }
}
