use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::AuthError;

/// Hash a key secret with Argon2id for storage.
pub fn hash_secret(secret: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(format!("argon2 hash failed: {e}")))?;
    Ok(hash.to_string())
}

/// Compare a presented secret against a stored hash.
///
/// Argon2 verification is constant-time; a plain string comparison here
/// would open a timing side-channel on the secret.
pub fn verify_secret(secret: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = argon2::PasswordHash::new(stored_hash)
        .map_err(|e| AuthError::Hashing(format!("invalid stored hash: {e}")))?;
    match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hashing(format!("verification error: {e}"))),
    }
}
