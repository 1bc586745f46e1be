//! Authentication utilities library
//!
//! Provides the authentication infrastructure for the identity service:
//! - Password hashing (bcrypt)
//! - JWT token issuance and validation
//! - Authentication coordination
//!
//! The service defines its own domain traits and adapts these implementations,
//! keeping credential handling in one place without coupling it to HTTP or
//! storage concerns.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{Claims, JwtHandler};
//! use chrono::Duration;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = Claims::for_subject("alice", Duration::hours(24));
//! let token = handler.encode(&claims).unwrap();
//! let decoded = handler.decode(&token).unwrap();
//! assert_eq!(decoded.sub, "alice");
//! ```
//!
//! ## Complete Flow
//! ```
//! use auth::{Authenticator, Claims};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify, then issue a token
//! assert!(auth.verify_password("password123", &hash));
//! let claims = Claims::for_subject("alice", Duration::hours(24));
//! let token = auth.issue_token(&claims).unwrap();
//!
//! // Protected request: validate the token
//! let decoded = auth.validate_token(&token).unwrap();
//! assert_eq!(decoded.sub, "alice");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
