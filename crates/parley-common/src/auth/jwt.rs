//! JWT utilities for authentication
//!
//! Issues and validates HS256 access tokens using the `jsonwebtoken` crate.
//! [`JwtService`] is also the process's [`CredentialVerifier`].

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use parley_core::{Snowflake, UserId};
use serde::{Deserialize, Serialize};

use super::verifier::{strip_bearer, CredentialVerifier, VerificationError};
use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Get the user ID as a Snowflake
    pub fn user_id(&self) -> Result<Snowflake, VerificationError> {
        Snowflake::parse(&self.sub).map_err(|_| VerificationError::Malformed)
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// A freshly issued token and its lifetime in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// JWT service for encoding and decoding tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry: i64,
}

impl JwtService {
    /// Create a new JWT service with the given secret and token lifetime (seconds)
    #[must_use]
    pub fn new(secret: &str, token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry,
        }
    }

    pub fn token_expiry(&self) -> i64 {
        self.token_expiry
    }

    /// Issue a token for a user
    pub fn issue(&self, user_id: UserId) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.token_expiry)).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode JWT: {e}")))?;

        Ok(IssuedToken {
            token,
            expires_in: self.token_expiry,
        })
    }

    /// Decode and validate a token
    pub fn decode_token(&self, token: &str) -> Result<Claims, VerificationError> {
        let validation = Validation::default();

        decode::<Claims>(strip_bearer(token), &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => VerificationError::Expired,
                ErrorKind::InvalidSignature => VerificationError::SignatureInvalid,
                _ => VerificationError::Malformed,
            })
    }
}

impl CredentialVerifier for JwtService {
    fn verify(&self, credential: &str) -> Result<UserId, VerificationError> {
        self.decode_token(credential)?.user_id()
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("token_expiry", &self.token_expiry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test-secret-key-that-is-long-enough", 86400)
    }

    #[test]
    fn test_issue_and_verify() {
        let service = create_test_service();
        let user_id = Snowflake::new(12345);

        let issued = service.issue(user_id).unwrap();
        assert!(!issued.token.is_empty());
        assert_eq!(issued.expires_in, 86400);

        assert_eq!(service.verify(&issued.token).unwrap(), user_id);
    }

    #[test]
    fn test_verify_tolerates_bearer_prefix() {
        let service = create_test_service();
        let issued = service.issue(Snowflake::new(7)).unwrap();

        let header = format!("Bearer {}", issued.token);
        assert_eq!(service.verify(&header).unwrap(), Snowflake::new(7));
    }

    #[test]
    fn test_malformed_token() {
        let service = create_test_service();
        assert_eq!(
            service.verify("invalid.token.here"),
            Err(VerificationError::Malformed)
        );
        assert_eq!(service.verify(""), Err(VerificationError::Malformed));
    }

    #[test]
    fn test_expired_token() {
        // Well past the default 60s leeway
        let service = JwtService::new("test-secret-key-that-is-long-enough", -3600);
        let issued = service.issue(Snowflake::new(1)).unwrap();

        assert_eq!(service.verify(&issued.token), Err(VerificationError::Expired));
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = JwtService::new("one-secret-key-that-is-long-enough", 60);
        let verifier = JwtService::new("another-secret-key-that-is-long-too", 60);
        let issued = issuer.issue(Snowflake::new(1)).unwrap();

        assert_eq!(
            verifier.verify(&issued.token),
            Err(VerificationError::SignatureInvalid)
        );
    }

    #[test]
    fn test_non_numeric_subject_is_malformed() {
        let claims = Claims {
            sub: "alice".to_string(),
            iat: 0,
            exp: i64::MAX,
        };
        assert_eq!(claims.user_id(), Err(VerificationError::Malformed));
    }
}
