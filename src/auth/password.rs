//! Credential hashing for stored user passwords.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Argon2id with the crate's default cost parameters.
fn hasher() -> Argon2<'static> {
    Argon2::default()
}

/// PHC-format hash of `plain` under a fresh random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    match hasher().hash_password(plain.as_bytes(), &salt) {
        Ok(hash) => Ok(hash.to_string()),
        Err(e) => {
            error!(error = %e, "password hashing failed");
            Err(anyhow::anyhow!("hash password: {e}"))
        }
    }
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash cannot be parsed.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash is unreadable");
        anyhow::anyhow!("parse stored hash: {e}")
    })?;
    Ok(hasher().verify_password(plain.as_bytes(), &parsed).is_ok())
}
