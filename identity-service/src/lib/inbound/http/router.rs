use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::health::health;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::me::me;
use super::handlers::register::register;
use super::middleware::optional_identity;
use super::middleware::require_identity;
use crate::domain::user::service::IdentityService;
use crate::outbound::repositories::user::PostgresUserRepository;

#[derive(Clone)]
pub struct AppState {
    pub identity_service: Arc<IdentityService<PostgresUserRepository>>,
    pub user_repository: Arc<PostgresUserRepository>,
    pub authenticator: Arc<Authenticator>,
}

/// Assemble the HTTP surface.
///
/// `/auth/register` and `/auth/login` are public; deployments are expected
/// to throttle them upstream per client address (5/min register, 10/min
/// login), the service itself does not.
pub fn create_router(
    identity_service: Arc<IdentityService<PostgresUserRepository>>,
    user_repository: Arc<PostgresUserRepository>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState {
        identity_service,
        user_repository,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login));

    let anonymous_aware_routes = Router::new().route("/health", get(health)).route_layer(
        middleware::from_fn_with_state(state.clone(), optional_identity),
    );

    let protected_routes = Router::new()
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_identity,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(anonymous_aware_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
