use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    Chirp, ChirpRepository, Credential, CredentialRepository, RefreshTokenRecord,
    RefreshTokenRepository, User, UserRepository,
};
use crate::error::DatabaseError;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, (User, String)>,
    chirps: Vec<Chirp>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
}

/// Process-local backend for tests and `storage = "memory"`
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DatabaseError> {
        self.state
            .lock()
            .map_err(|_| DatabaseError::UnexpectedError("in-memory store lock poisoned".to_string()))
    }
}

fn email_taken(state: &State, email: &str, except: Option<Uuid>) -> bool {
    state
        .users
        .values()
        .any(|(user, _)| user.email == email && Some(user.id) != except)
}

#[async_trait]
impl CredentialRepository for InMemoryStore {
    async fn find_credential(&self, email: &str) -> Result<Option<Credential>, DatabaseError> {
        let state = self.lock()?;
        Ok(state
            .users
            .values()
            .find(|(user, _)| user.email == email)
            .map(|(user, hashed_password)| Credential {
                subject_id: user.id,
                hashed_password: hashed_password.clone(),
            }))
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryStore {
    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), DatabaseError> {
        let mut state = self.lock()?;
        if !state.users.contains_key(&record.user_id) {
            return Err(DatabaseError::UnexpectedError(
                "refresh token owner does not exist".to_string(),
            ));
        }
        if state.refresh_tokens.contains_key(&record.token_hash) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "refresh token already exists".to_string(),
            ));
        }
        state
            .refresh_tokens
            .insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DatabaseError> {
        let state = self.lock()?;
        Ok(state.refresh_tokens.get(token_hash).cloned())
    }

    async fn mark_refresh_token_revoked(
        &self,
        token_hash: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let mut state = self.lock()?;
        if let Some(record) = state.refresh_tokens.get_mut(token_hash) {
            record.revoked_at.get_or_insert(revoked_at);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, DatabaseError> {
        let mut state = self.lock()?;
        if email_taken(&state, email, None) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "email already registered".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            is_chirpy_red: false,
        };
        state
            .users
            .insert(user.id, (user.clone(), hashed_password.to_string()));
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let state = self.lock()?;
        Ok(state.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let mut state = self.lock()?;
        if email_taken(&state, email, Some(id)) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "email already registered".to_string(),
            ));
        }

        Ok(state.users.get_mut(&id).map(|(user, stored_hash)| {
            user.email = email.to_string();
            user.updated_at = Utc::now();
            *stored_hash = hashed_password.to_string();
            user.clone()
        }))
    }

    async fn upgrade_user(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut state = self.lock()?;
        match state.users.get_mut(&id) {
            Some((user, _)) => {
                user.is_chirpy_red = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reset(&self) -> Result<(), DatabaseError> {
        let mut state = self.lock()?;
        *state = State::default();
        Ok(())
    }
}

#[async_trait]
impl ChirpRepository for InMemoryStore {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, DatabaseError> {
        let mut state = self.lock()?;
        if !state.users.contains_key(&user_id) {
            return Err(DatabaseError::UnexpectedError(
                "chirp author does not exist".to_string(),
            ));
        }

        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        state.chirps.push(chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(&self) -> Result<Vec<Chirp>, DatabaseError> {
        let state = self.lock()?;
        Ok(state.chirps.clone())
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>, DatabaseError> {
        let state = self.lock()?;
        Ok(state.chirps.iter().find(|chirp| chirp.id == id).cloned())
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut state = self.lock()?;
        state.chirps.retain(|chirp| chirp.id != id);
        Ok(())
    }
}
