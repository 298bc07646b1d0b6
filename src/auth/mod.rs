pub mod validator;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use validator::{ClaimsValidator, RoleClaimsValidator};

/// Verified token payload, claim name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthClaims(Map<String, Value>);

impl AuthClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    pub fn email(&self) -> Option<&str> {
        self.get_str("email")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for AuthClaims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Per-request scope handed from the auth middleware to resolvers
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub claims: AuthClaims,
}

impl RequestContext {
    pub fn new(claims: AuthClaims) -> Self {
        Self { claims }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid or expired token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// HS256 signing and verification keys derived from the server secret
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry_hours: u64,
}

impl JwtKeys {
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    pub fn from_secret(secret: &str, expiry_hours: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        // Only HS256 is accepted; `exp` must be present and in the future
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.validate_aud = false;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry_hours,
        })
    }

    /// Verify signature, algorithm and expiry, then return the claims
    pub fn verify(&self, token: &str) -> Result<AuthClaims, JwtError> {
        let token_data = decode::<AuthClaims>(token, &self.decoding, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Sign claims, filling in `iat` and `exp` when absent
    pub fn issue(&self, claims: AuthClaims) -> Result<String, JwtError> {
        let now = Utc::now();
        let mut map = claims.0;
        map.entry("iat").or_insert_with(|| now.timestamp().into());
        if !map.contains_key("exp") {
            let exp = self.expires_at(now)?;
            map.insert("exp".to_string(), exp.timestamp().into());
        }

        encode(&Header::new(Self::ALGORITHM), &map, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// `now` plus the configured lifetime; out-of-range lifetimes are refused
    fn expires_at(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, JwtError> {
        i64::try_from(self.expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| JwtError::TokenGeneration(format!("expiry of {} hours is out of range", self.expiry_hours)))
    }
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("algorithm", &Self::ALGORITHM)
            .field("expiry_hours", &self.expiry_hours)
            .finish_non_exhaustive()
    }
}
