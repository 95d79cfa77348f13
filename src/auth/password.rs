/// Password Hashing and Verification
///
/// bcrypt with a fresh salt per call. No password policy lives here: weak
/// passwords are the registration boundary's concern, and failure is
/// reserved for catastrophic conditions (entropy, malformed hash).

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

/// Hash a password using bcrypt
///
/// Two calls with the same input produce different outputs (different
/// salts); only verification is deterministic.
///
/// # Errors
/// Returns error if bcrypt hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
///
/// Returns `Ok(false)` on mismatch; `Err` only for a malformed hash or
/// bcrypt failure.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}
