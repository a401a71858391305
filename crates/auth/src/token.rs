//! Signed session tokens (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};
use crate::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("token encoding failed: {0}")]
    Encode(String),
}

/// Verifies a presented session token and returns its claims.
pub trait SessionValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError>;
}

/// HS256 session token issuer/validator sharing one secret.
#[derive(Clone)]
pub struct Hs256SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl core::fmt::Debug for Hs256SessionTokens {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256SessionTokens")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl Hs256SessionTokens {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `principal`, valid from `now` for the configured TTL.
    pub fn issue(&self, principal: &Principal, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = SessionClaims::new(principal, now, now + self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }
}

impl SessionValidator for Hs256SessionTokens {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        // Time checks run through `validate_claims` against the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<SessionClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tours_core::AccountId;

    fn tokens(secret: &str) -> Hs256SessionTokens {
        Hs256SessionTokens::new(secret.as_bytes(), Duration::minutes(30))
    }

    #[test]
    fn issued_token_validates_and_carries_principal() {
        let svc = tokens("test-secret");
        let now = Utc::now();
        let principal = Principal::new(AccountId::new(7), "guia");

        let token = svc.issue(&principal, now).unwrap();
        let claims = svc.validate(&token, now + Duration::minutes(1)).unwrap();

        assert_eq!(claims.principal(), principal);
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = tokens("test-secret");
        let now = Utc::now();
        let token = svc.issue(&Principal::new(AccountId::new(1), "admin"), now).unwrap();

        assert_eq!(
            svc.validate(&token, now + Duration::minutes(31)),
            Err(TokenError::Claims(TokenValidationError::Expired))
        );
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let now = Utc::now();
        let token = tokens("one")
            .issue(&Principal::new(AccountId::new(1), "admin"), now)
            .unwrap();

        assert_eq!(tokens("two").validate(&token, now), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            tokens("s").validate("not.a.jwt", Utc::now()),
            Err(TokenError::Malformed(_))
        ));
    }
}
