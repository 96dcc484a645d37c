//! Access and refresh token issuance.

use chrono::{Duration, Utc};
use common::UserId;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Lifetime of an access token.
pub const ACCESS_TOKEN_TTL_HOURS: i64 = 24;

/// Lifetime of a refresh token.
pub const REFRESH_TOKEN_TTL_HOURS: i64 = 168;

/// Who a token is issued for.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Claims carried in both tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub uid: String,
    pub exp: i64,
}

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Issues and verifies bearer tokens.
pub trait TokenIssuer: Send + Sync {
    /// Issues an access and refresh token for the subject.
    fn issue(&self, subject: &TokenSubject) -> Result<TokenPair, DomainError>;

    /// Verifies a token and returns the user it was issued for.
    fn verify(&self, token: &str) -> Result<UserId, DomainError>;
}

/// HS256 JWTs signed with a shared secret.
pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtTokenIssuer {
    /// Creates an issuer from the signing secret.
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    fn sign(&self, subject: &TokenSubject, ttl: Duration) -> Result<String, DomainError> {
        let claims = Claims {
            email: subject.email.clone(),
            first_name: subject.first_name.clone(),
            last_name: subject.last_name.clone(),
            uid: subject.user_id.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::InvalidToken(e.to_string()))
    }

    /// Decodes and validates a token, returning its claims.
    pub fn decode(&self, token: &str) -> Result<Claims, DomainError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| DomainError::InvalidToken(e.to_string()))
    }
}

impl std::fmt::Debug for JwtTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenIssuer").finish_non_exhaustive()
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, subject: &TokenSubject) -> Result<TokenPair, DomainError> {
        Ok(TokenPair {
            token: self.sign(subject, Duration::hours(ACCESS_TOKEN_TTL_HOURS))?,
            refresh_token: self.sign(subject, Duration::hours(REFRESH_TOKEN_TTL_HOURS))?,
        })
    }

    fn verify(&self, token: &str) -> Result<UserId, DomainError> {
        let claims = self.decode(token)?;
        UserId::parse(&claims.uid).map_err(|e| DomainError::InvalidToken(e.to_string()))
    }
}
