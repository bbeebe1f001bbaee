//! One-way encoding of customer passwords with Argon2id.
//!
//! Hashes are stored as PHC strings, so the salt and cost parameters travel with the hash.
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::AuthError;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::CredentialEncodingError(format!("Failed to hash password: {e}")))
}

/// Check a password against a stored hash.
///
/// A mismatch is `Ok(false)`. A stored hash that cannot be parsed is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::CredentialEncodingError(format!("Invalid password hash format: {e}")))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
}
