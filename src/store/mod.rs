//! Persistence collaborators
//!
//! The auth core and the HTTP handlers only see these traits. `PgStore`
//! backs them with Postgres; `InMemoryStore` with mutex-guarded maps.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::DatabaseError;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Password hash of an account, looked up by login identifier
#[derive(Debug, Clone)]
pub struct Credential {
    pub subject_id: Uuid,
    pub hashed_password: String,
}

/// Persisted refresh token, keyed by the SHA-256 of the token value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    #[inline]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chirp {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn find_credential(&self, email: &str) -> Result<Option<Credential>, DatabaseError>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), DatabaseError>;

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DatabaseError>;

    /// Set `revoked_at` unless it is already set. Missing rows are ignored.
    async fn mark_refresh_token_revoked(
        &self,
        token_hash: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `UniqueConstraintViolation` if the email is taken
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, DatabaseError>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, DatabaseError>;

    /// Returns false when no such user exists
    async fn upgrade_user(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Delete every user along with their chirps and refresh tokens
    async fn reset(&self) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait ChirpRepository: Send + Sync {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, DatabaseError>;

    /// Oldest first
    async fn list_chirps(&self) -> Result<Vec<Chirp>, DatabaseError>;

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>, DatabaseError>;

    async fn delete_chirp(&self, id: Uuid) -> Result<(), DatabaseError>;
}

/// Everything the HTTP application needs from one backend
pub trait Repository:
    CredentialRepository + RefreshTokenRepository + UserRepository + ChirpRepository + 'static
{
}

impl<T> Repository for T where
    T: CredentialRepository + RefreshTokenRepository + UserRepository + ChirpRepository + 'static
{
}
