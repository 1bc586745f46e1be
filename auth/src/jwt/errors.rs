use thiserror::Error;

/// Error type for JWT issuance.
///
/// Decoding deliberately has no error type: validation failures collapse to
/// `None` so callers cannot distinguish a bad signature from an expired or
/// malformed token.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}
