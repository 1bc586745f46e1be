use auth::Authenticator;
use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the resolved identity into handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Why an inbound credential failed to resolve to an identity.
#[derive(Debug)]
pub enum IdentityRejection {
    /// No Authorization header, or not a Bearer credential.
    MissingCredential,
    /// Signature, algorithm, expiry, or payload-shape failure. One bucket:
    /// the codec does not say which.
    InvalidToken,
    /// The token verified but its subject no longer exists.
    UnknownSubject,
    /// The account exists but is deactivated.
    Disabled,
    /// The directory lookup itself failed.
    LookupFailed(UserError),
}

impl From<IdentityRejection> for ApiError {
    fn from(rejection: IdentityRejection) -> Self {
        match rejection {
            IdentityRejection::MissingCredential => {
                ApiError::Unauthorized("Authentication required".to_string())
            }
            IdentityRejection::InvalidToken => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            IdentityRejection::UnknownSubject => {
                ApiError::Unauthorized("User not found".to_string())
            }
            IdentityRejection::Disabled => {
                ApiError::Forbidden("User account is disabled".to_string())
            }
            IdentityRejection::LookupFailed(e) => ApiError::InternalServerError(e.to_string()),
        }
    }
}

/// Resolve a bearer credential to an active identity.
///
/// Free of any framework request/response types so the whole authorization
/// decision is testable in isolation; the middlewares below only differ in
/// what they do with the rejection.
pub async fn resolve_identity<UR: UserRepository>(
    authorization: Option<&str>,
    authenticator: &Authenticator,
    repository: &UR,
) -> Result<User, IdentityRejection> {
    let header = authorization.ok_or(IdentityRejection::MissingCredential)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(IdentityRejection::MissingCredential)?;

    let claims = authenticator
        .validate_token(token)
        .ok_or(IdentityRejection::InvalidToken)?;

    // A subject that is not even a well-formed username cannot belong to
    // anyone; treat it as a bad token rather than a missing user.
    let username = Username::new(claims.sub).map_err(|_| IdentityRejection::InvalidToken)?;

    let user = repository
        .find_by_username(&username)
        .await
        .map_err(IdentityRejection::LookupFailed)?
        .ok_or(IdentityRejection::UnknownSubject)?;

    if !user.is_active {
        return Err(IdentityRejection::Disabled);
    }

    Ok(user)
}

/// Middleware for endpoints that require an authenticated caller.
///
/// Missing credential, bad token, and stale subject each get their own 401
/// message; a disabled account gets 403. Unauthorized means "re-authenticate",
/// forbidden means "do not retry".
pub async fn require_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let authorization = bearer_header(&req);

    match resolve_identity(
        authorization.as_deref(),
        &state.authenticator,
        state.user_repository.as_ref(),
    )
    .await
    {
        Ok(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(req).await)
        }
        Err(rejection) => {
            tracing::warn!(rejection = ?rejection, "Rejected request");
            Err(ApiError::from(rejection).into_response())
        }
    }
}

/// Middleware for endpoints that merely behave differently when a caller is
/// authenticated.
///
/// Every failure, a disabled account included, yields an anonymous request
/// rather than an error. The asymmetry with [`require_identity`] is
/// deliberate: the optional path never reveals account state.
pub async fn optional_identity(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let authorization = bearer_header(&req);

    if let Ok(user) = resolve_identity(
        authorization.as_deref(),
        &state.authenticator,
        state.user_repository.as_ref(),
    )
    .await
    {
        req.extensions_mut().insert(CurrentUser(user));
    }

    next.run(req).await
}

fn bearer_header(req: &Request) -> Option<String> {
    req.headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}
