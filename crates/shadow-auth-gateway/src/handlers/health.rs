//! Health check endpoint.
//!
//! This module provides the public health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use shadow_auth_store::UserStore;

use crate::error::ApiError;
use crate::state::GatewayState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Number of shadow users in the local store.
    pub users: u64,
}

/// Health check handler.
///
/// Returns the current service status. This endpoint is public and
/// does not require authentication. A store failure is reported as 500.
///
/// # Example
///
/// ```text
/// GET /health
///
/// Response: 200 OK
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "users": 42
/// }
/// ```
///
/// # Errors
///
/// Returns `ApiError::Internal` if the store cannot be read.
pub async fn health<S>(
    State(state): State<Arc<GatewayState<S>>>,
) -> Result<Json<HealthResponse>, ApiError>
where
    S: UserStore + 'static,
{
    let users = state.store.count_users()?;

    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        users,
    }))
}
