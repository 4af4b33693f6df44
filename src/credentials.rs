//! Password hashing and access-token signing.
//!
//! Passwords are stored as Argon2id PHC strings. Access tokens are HMAC
//! signed JWTs carrying the user id as `sub` and an absolute `exp`.

use anyhow::Result;
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum CredentialError {
    /// Bad signature, malformed token or expired token. Callers must not
    /// tell these apart in responses.
    #[error("invalid credential")]
    InvalidCredential,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token lifetime of {0} minutes is out of range")]
    Lifetime(i64),

    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// The subject as a user id, if it is one.
    pub fn subject_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Process-wide signing configuration, fixed at startup.
pub struct CredentialStore {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_minutes: i64,
}

impl CredentialStore {
    pub fn new(secret: &[u8], algorithm: Algorithm, ttl_minutes: i64) -> Self {
        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_minutes,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.jwt_secret_key.as_bytes(),
            config.signing_algorithm()?,
            config.access_token_expire_minutes,
        ))
    }

    pub fn ttl_minutes(&self) -> i64 {
        self.ttl_minutes
    }

    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialError::Hashing(err.to_string()))
    }

    /// A malformed stored hash verifies as `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Token for `subject` valid for the configured TTL.
    pub fn issue_token(&self, subject: Uuid) -> Result<String, CredentialError> {
        self.issue_token_with_ttl(subject, self.ttl_minutes)
    }

    pub fn issue_token_with_ttl(
        &self,
        subject: Uuid,
        ttl_minutes: i64,
    ) -> Result<String, CredentialError> {
        let now = Utc::now();
        let expires_at = Duration::try_minutes(ttl_minutes)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(CredentialError::Lifetime(ttl_minutes))?;

        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?)
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, CredentialError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!(error = %err, "rejected access token");
                CredentialError::InvalidCredential
            })
    }
}
