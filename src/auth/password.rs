/// Password Hashing and Verification
///
/// Argon2id with a fresh random salt per hash. The PHC string stores the
/// algorithm, parameters and salt next to the digest, and verification reads
/// them back from there instead of using the current defaults.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::AuthError;

const SALT_LENGTH: usize = 16;

/// Hash a password with Argon2id
///
/// # Errors
/// Returns `HashingFailure` if the OS entropy source or the hasher fails
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; SALT_LENGTH];
    OsRng
        .try_fill_bytes(&mut salt_bytes)
        .map_err(|e| AuthError::HashingFailure(format!("entropy source unavailable: {}", e)))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AuthError::HashingFailure(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashingFailure(e.to_string()))
}

/// Verify a password against a stored PHC hash string
///
/// A wrong password is `Ok(false)`. The digest comparison is constant time.
///
/// # Errors
/// Returns `InvalidHashFormat` if the stored hash cannot be parsed or names
/// an algorithm/parameter set this build cannot evaluate
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::InvalidHashFormat)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => {
            tracing::debug!(error = %e, "Stored hash could not be evaluated");
            Err(AuthError::InvalidHashFormat)
        }
    }
}
