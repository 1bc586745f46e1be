use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::CurrentUser;

/// Liveness probe that also reflects the caller's identity when a valid
/// token is presented; anonymous and invalid-token callers get the same
/// body with `authenticated_as: null`.
pub async fn health(
    current: Option<Extension<CurrentUser>>,
) -> Result<ApiSuccess<HealthResponseData>, ApiError> {
    Ok(ApiSuccess::new(
        StatusCode::OK,
        HealthResponseData {
            status: "ok".to_string(),
            authenticated_as: current.map(|Extension(user)| user.0.username.as_str().to_string()),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponseData {
    pub status: String,
    pub authenticated_as: Option<String>,
}
