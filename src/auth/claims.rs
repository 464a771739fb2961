/// JWT Claims structure
///
/// Registered claims only (RFC 7519); the subject is the user id.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AuthError;

/// Fixed `iss` value for every token this service mints
pub const ISSUER: &str = "chirpy";

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
    /// Unique token id; keeps two tokens minted in the same second apart
    pub jti: String,
}

impl Claims {
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            exp: now + ttl.num_seconds(),
            iat: now,
            iss: ISSUER.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Claims read back from a signed token
///
/// `iss` and `sub` are kept loose so a token that is merely missing or
/// mistyping them still reaches the issuer and subject checks instead of
/// failing to parse. `exp` is checked by the decoder itself.
#[derive(Debug, Deserialize)]
pub struct ReceivedClaims {
    #[serde(default)]
    pub sub: Option<Value>,
    #[serde(default)]
    pub iss: Option<Value>,
}

impl ReceivedClaims {
    /// Issuer check, then subject check
    ///
    /// # Errors
    /// - `InvalidIssuer` if `iss` is missing or not `"chirpy"`
    /// - `MalformedSubject` if `sub` is missing or not a UUID string
    pub fn subject(&self) -> Result<Uuid, AuthError> {
        match &self.iss {
            Some(Value::String(iss)) if iss == ISSUER => {}
            _ => return Err(AuthError::InvalidIssuer),
        }

        self.sub
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|sub| Uuid::parse_str(sub).ok())
            .ok_or(AuthError::MalformedSubject)
    }
}
