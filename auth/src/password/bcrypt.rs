use bcrypt::DEFAULT_COST;

use super::errors::PasswordError;

/// Password hashing implementation.
///
/// Wraps bcrypt with a fixed cost factor. bcrypt only hashes the first
/// 72 bytes of its input; the truncation is applied explicitly here so that
/// `hash` and `verify` always agree on what was hashed, and so the behavior
/// does not depend on the backend's handling of over-long input.
pub struct PasswordHasher;

/// bcrypt ignores everything past this byte offset.
const MAX_PASSWORD_BYTES: usize = 72;

impl PasswordHasher {
    /// Create a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password.
    ///
    /// Generates a fresh random salt per call; the returned string embeds
    /// the algorithm version, cost factor, salt, and digest. Two passwords
    /// that agree on their first 72 bytes produce interchangeable hashes.
    ///
    /// # Errors
    /// * `HashingFailed` - bcrypt rejected the input or cost
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        bcrypt::hash(Self::truncate(password), DEFAULT_COST)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Recomputes the digest with the salt and cost embedded in `hash`;
    /// the comparison inside bcrypt is constant-time. A malformed hash
    /// verifies as `false` rather than erroring, so callers cannot tell a
    /// bad password from a bad record.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(Self::truncate(password), hash).unwrap_or(false)
    }

    fn truncate(password: &str) -> &[u8] {
        let bytes = password.as_bytes();
        &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)]
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
