/// Refresh Token Management
///
/// Refresh tokens are:
/// - 32 random bytes from a CSPRNG, hex encoded (64 characters)
/// - Opaque to clients; nothing inside them can be parsed or verified
/// - Hashed with SHA-256 before storage (never store plaintext)
/// - Reusable until they expire or are revoked (no rotation on use)

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::{thread_rng, RngCore};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::AuthError;
use crate::store::{RefreshTokenRecord, RefreshTokenRepository};

const TOKEN_BYTES: usize = 32;

/// Generate a new cryptographically secure refresh token
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Storage key for a token value
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Issue, resolve and revoke refresh tokens on top of a repository
#[derive(Clone)]
pub struct RefreshTokenStore {
    repository: Arc<dyn RefreshTokenRepository>,
    ttl: Duration,
}

impl RefreshTokenStore {
    pub fn new(repository: Arc<dyn RefreshTokenRepository>, ttl: Duration) -> Self {
        Self { repository, ttl }
    }

    /// Create and persist a fresh token for `user_id`, returning the plaintext
    ///
    /// # Errors
    /// Returns `PersistenceFailure` if the row cannot be written
    pub async fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        let token = generate_refresh_token();
        let now = Utc::now();
        let record = RefreshTokenRecord {
            token_hash: hash_token(&token),
            user_id,
            created_at: now,
            expires_at: now + self.ttl,
            revoked_at: None,
        };

        self.repository.insert_refresh_token(&record).await?;

        tracing::debug!(user_id = %user_id, expires_at = %record.expires_at, "Refresh token issued");
        Ok(token)
    }

    /// Return the owner of a usable token
    ///
    /// Checks, in order: the token exists, it has not been revoked, it has
    /// not expired.
    pub async fn resolve(&self, token: &str) -> Result<Uuid, AuthError> {
        let record = self
            .repository
            .find_refresh_token(&hash_token(token))
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if record.is_revoked() {
            return Err(AuthError::TokenRevoked);
        }

        if record.is_expired() {
            return Err(AuthError::TokenExpired);
        }

        Ok(record.user_id)
    }

    /// Revoke a token. Unknown and already revoked tokens are a no-op.
    ///
    /// # Errors
    /// Returns `PersistenceFailure` if storage fails
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        self.repository
            .mark_refresh_token_revoked(&hash_token(token), Utc::now())
            .await?;
        Ok(())
    }
}
