//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use shadow_auth_store::UserStore;

use crate::handlers::{health, login, users};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /v1/login` - Log in through the backend chain
/// - `GET /v1/whoami` - The caller, if any
///
/// ## Authenticated
/// - `GET /v1/me` - The calling user
/// - `GET /v1/users/:uuid` - Look up a user by key
pub fn create_router<S>(state: GatewayState<S>) -> Router
where
    S: UserStore + 'static,
{
    let request_timeout = state.config.request_timeout();
    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health::<S>))
        // Login (backend chain)
        .route("/v1/login", post(login::login::<S>))
        // Users
        .route("/v1/me", get(users::me))
        .route("/v1/whoami", get(users::whoami))
        .route("/v1/users/:uuid", get(users::get_user::<S>))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
