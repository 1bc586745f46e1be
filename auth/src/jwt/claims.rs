use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Signed claim set carried by an access token.
///
/// The subject is the username the token asserts; `exp` is the absolute
/// Unix timestamp after which the token is invalid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Create claims for a subject with an expiration relative to now.
    pub fn for_subject(subject: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject.into(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Seconds remaining until expiry, measured from issuance.
    pub fn ttl_seconds(&self) -> i64 {
        self.exp - self.iat
    }

    /// Check whether the token is expired at the given timestamp.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
