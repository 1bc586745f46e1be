use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and JWT handling.
///
/// Holds the process-wide symmetric secret (via the JWT handler) and the
/// password hasher behind one seam, so the service never touches either
/// primitive directly.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// Malformed hashes verify as `false` rather than erroring.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Sign a claim set into a bearer token.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_token(&self, claims: &Claims) -> Result<String, JwtError> {
        self.jwt_handler.encode(claims)
    }

    /// Validate a bearer token and return its claims.
    ///
    /// Returns `None` for any invalid token, with no failure-reason
    /// distinction.
    pub fn validate_token(&self, token: &str) -> Option<Claims> {
        self.jwt_handler.decode(token)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_full_flow() {
        let authenticator = Authenticator::new(b"test_secret_key_at_least_32_bytes!");

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");
        assert!(authenticator.verify_password("my_password", &hash));

        let claims = Claims::for_subject("alice", Duration::hours(24));
        let token = authenticator
            .issue_token(&claims)
            .expect("Failed to issue token");

        let decoded = authenticator
            .validate_token(&token)
            .expect("Token validation failed");
        assert_eq!(decoded.sub, "alice");
    }

    #[test]
    fn test_wrong_password_does_not_verify() {
        let authenticator = Authenticator::new(b"test_secret_key_at_least_32_bytes!");

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        assert!(!authenticator.verify_password("wrong_password", &hash));
    }

    #[test]
    fn test_validate_invalid_token_is_none() {
        let authenticator = Authenticator::new(b"test_secret_key_at_least_32_bytes!");

        assert!(authenticator.validate_token("invalid.token.here").is_none());
    }
}
