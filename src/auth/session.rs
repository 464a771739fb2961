/// Session Issuer
///
/// Ties the hasher, the access token codec and the refresh token store
/// together behind the four operations the HTTP layer uses.
///
/// A session is `Anonymous` until `login`, then `Authenticated` with one
/// access token and one refresh token. `refresh` mints a new access token and
/// leaves the refresh token alone. After `revoke` (or refresh token expiry)
/// the session is back to `Anonymous`, although an access token already
/// handed out stays valid until its own `exp`.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::bearer::extract_bearer_token;
use crate::auth::jwt::{generate_access_token, validate_access_token};
use crate::auth::password::verify_password;
use crate::auth::refresh_token::RefreshTokenStore;
use crate::configuration::JwtSettings;
use crate::error::AuthError;
use crate::store::{CredentialRepository, RefreshTokenRepository};

// Verified against when the login identifier is unknown, so both paths do
// one Argon2 evaluation.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=15000,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

/// Tokens handed out by a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub subject_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct SessionIssuer {
    credentials: Arc<dyn CredentialRepository>,
    refresh_tokens: RefreshTokenStore,
    jwt: Arc<JwtSettings>,
}

impl SessionIssuer {
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        refresh_repository: Arc<dyn RefreshTokenRepository>,
        jwt: JwtSettings,
    ) -> Self {
        let refresh_tokens = RefreshTokenStore::new(refresh_repository, jwt.refresh_token_ttl());
        Self {
            credentials,
            refresh_tokens,
            jwt: Arc::new(jwt),
        }
    }

    /// Access token lifetime in seconds as actually minted
    pub fn access_token_expiry(&self) -> i64 {
        self.jwt
            .access_token_expiry
            .min(crate::auth::jwt::MAX_ACCESS_TOKEN_TTL_SECONDS)
    }

    /// The gate every protected operation passes: `Authorization` header
    /// value in, subject id out.
    pub fn require_identity(&self, header_value: &str) -> Result<Uuid, AuthError> {
        let token = extract_bearer_token(header_value)?;
        let subject = validate_access_token(token, &self.jwt.secret)?;

        tracing::debug!(user_id = %subject, "Access token accepted");
        Ok(subject)
    }

    /// Check a password and open a session
    ///
    /// Unknown identifiers and wrong passwords both fail with
    /// `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let subject_id = self.authenticate(email, password).await?;
        self.open_session(subject_id).await
    }

    /// The credential half of `login`: no tokens are issued
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Uuid, AuthError> {
        let credential = self.credentials.find_credential(email).await?;

        let (subject_id, stored_hash) = match credential {
            Some(credential) => (Some(credential.subject_id), credential.hashed_password),
            None => (None, DUMMY_HASH.to_string()),
        };

        let password = password.to_string();
        let matched = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| AuthError::HashingFailure(e.to_string()))?;

        match (subject_id, matched) {
            (Some(subject_id), Ok(true)) => Ok(subject_id),
            (Some(_), Err(e)) => Err(e),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    /// The token half of `login`, for an already authenticated subject
    pub async fn open_session(&self, subject_id: Uuid) -> Result<Session, AuthError> {
        let access_token = self.issue_access_token(subject_id)?;
        let refresh_token = self.refresh_tokens.issue(subject_id).await?;

        tracing::info!(user_id = %subject_id, "User logged in");
        Ok(Session {
            subject_id,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from a live refresh token
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let subject_id = self.refresh_tokens.resolve(refresh_token).await?;
        let access_token = self.issue_access_token(subject_id)?;

        tracing::info!(user_id = %subject_id, "Access token refreshed");
        Ok(access_token)
    }

    /// End a session. Revoking twice, or revoking an unknown token, succeeds.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.refresh_tokens.revoke(refresh_token).await?;

        tracing::info!("Refresh token revoked");
        Ok(())
    }

    fn issue_access_token(&self, subject_id: Uuid) -> Result<String, AuthError> {
        generate_access_token(&subject_id, &self.jwt.secret, self.jwt.access_token_ttl())
    }
}
