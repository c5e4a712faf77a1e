//! Session token signing and validation

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// Shared HMAC secret used to sign and verify session tokens
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(**redacted**)")
    }
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub id: i64,
    /// Email the user signed in with
    pub email: String,
    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration time (Unix timestamp); tokens without it never expire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Result of validating a session token.
///
/// Failures are deliberately not distinguished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Valid(Claims),
    Invalid,
}

impl Outcome {
    pub fn into_claims(self) -> Option<Claims> {
        match self {
            Outcome::Valid(claims) => Some(claims),
            Outcome::Invalid => None,
        }
    }
}

/// Issues session tokens at login
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    ttl: Option<Duration>,
}

impl TokenSigner {
    /// Create a signer. With `ttl` unset, tokens carry no expiry.
    pub fn new(secret: &Secret, ttl: Option<Duration>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Token lifetime in seconds, if tokens expire
    pub fn ttl_secs(&self) -> Option<i64> {
        self.ttl.map(|ttl| ttl.num_seconds())
    }

    /// Sign a token for a user
    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = match self.ttl {
            Some(ttl) => Some(
                now.checked_add_signed(ttl)
                    .ok_or(AuthError::LifetimeOutOfRange)?
                    .timestamp(),
            ),
            None => None,
        };

        let claims = Claims {
            id: user_id,
            email: email.to_string(),
            iat: Some(now.timestamp()),
            exp,
        };

        debug!("Issuing session token for user: {}", user_id);

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }
}

/// Validates session tokens against the shared secret
#[derive(Clone)]
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(secret: &Secret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked only when the token carries one
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn validate(&self, token: &str) -> Outcome {
        if token.is_empty() {
            return Outcome::Invalid;
        }

        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Outcome::Valid(data.claims),
            Err(e) => {
                debug!("Rejected session token: {:?}", e.kind());
                Outcome::Invalid
            }
        }
    }
}

/// Validate a token against `secret` in one call
pub fn validate(token: &str, secret: &Secret) -> Outcome {
    TokenValidator::new(secret).validate(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> Secret {
        Secret::new("test-secret-key")
    }

    #[test]
    fn test_token_issue_and_validate() {
        let signer = TokenSigner::new(&secret(), None);

        let token = signer.issue(1, "jane@example.com").unwrap();
        let claims = validate(&token, &secret()).into_claims().unwrap();

        assert_eq!(claims.id, 1);
        assert_eq!(claims.email, "jane@example.com");
        assert!(claims.iat.is_some());
        assert!(claims.exp.is_none());
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = TokenSigner::new(&secret(), None).issue(1, "jane@example.com").unwrap();

        assert_eq!(validate(&token, &Secret::new("other-secret")), Outcome::Invalid);
    }

    #[test]
    fn test_empty_and_garbage_tokens_are_invalid() {
        let validator = TokenValidator::new(&secret());

        assert_eq!(validator.validate(""), Outcome::Invalid);
        assert_eq!(validator.validate("invalid-token"), Outcome::Invalid);
        assert_eq!(validator.validate("a.b.c"), Outcome::Invalid);
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let token = TokenSigner::new(&secret(), None).issue(7, "jane@example.com").unwrap();

        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(validate(&tampered, &secret()), Outcome::Invalid);
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let signer = TokenSigner::new(&secret(), Some(Duration::hours(-1)));
        let token = signer.issue(1, "jane@example.com").unwrap();

        assert_eq!(validate(&token, &secret()), Outcome::Invalid);
    }

    #[test]
    fn test_unexpired_token_is_valid() {
        let signer = TokenSigner::new(&secret(), Some(Duration::hours(24)));
        assert_eq!(signer.ttl_secs(), Some(86400));

        let token = signer.issue(3, "jane@example.com").unwrap();
        let claims = validate(&token, &secret()).into_claims().unwrap();
        assert!(claims.exp.is_some());
    }

    #[test]
    fn test_out_of_range_lifetime_is_an_error() {
        // Fits in a Duration but not in a DateTime once added to now
        let signer = TokenSigner::new(&secret(), Some(Duration::hours(10_000_000_000)));

        let err = signer.issue(1, "jane@example.com").unwrap_err();
        assert!(matches!(err, AuthError::LifetimeOutOfRange));
    }

    #[test]
    fn test_token_missing_claims_is_invalid() {
        #[derive(Serialize)]
        struct Partial {
            id: i64,
        }

        let token = encode(
            &Header::new(Algorithm::HS256),
            &Partial { id: 1 },
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .unwrap();

        assert_eq!(validate(&token, &secret()), Outcome::Invalid);
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        assert_eq!(format!("{:?}", secret()), "Secret(**redacted**)");
    }
}
