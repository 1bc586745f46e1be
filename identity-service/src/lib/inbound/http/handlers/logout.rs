use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::CurrentUser;

/// Acknowledge a logout.
///
/// Tokens are stateless: the issued token stays technically valid until its
/// expiry, and discarding it is the client's responsibility.
pub async fn logout(
    Extension(current): Extension<CurrentUser>,
) -> Result<ApiSuccess<LogoutResponseData>, ApiError> {
    tracing::info!(username = %current.0.username, "User logged out");

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LogoutResponseData {
            message: "Successfully logged out".to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResponseData {
    pub message: String,
}
