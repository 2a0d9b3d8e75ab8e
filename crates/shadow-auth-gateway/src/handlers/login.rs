//! Login endpoint.
//!
//! Runs the backend chain over the request. Backends never raise, so the only
//! failure is every backend declining.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use shadow_auth::Backend;
use shadow_auth_store::UserStore;

use crate::error::ApiError;
use crate::handlers::users::UserResponse;
use crate::state::GatewayState;

/// Optional login body, forwarded to the backends.
#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
    /// Username, ignored by token backends.
    #[serde(default)]
    pub username: Option<String>,
    /// Password, ignored by token backends.
    #[serde(default)]
    pub password: Option<String>,
}

/// Log in with whatever credentials the request carries.
///
/// ```text
/// POST /v1/login
/// Authorization: Bearer <access token>
/// ```
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` if every backend declines.
pub async fn login<S>(
    State(state): State<Arc<GatewayState<S>>>,
    headers: HeaderMap,
    body: Option<Json<LoginBody>>,
) -> Result<Json<UserResponse>, ApiError>
where
    S: UserStore + 'static,
{
    let body = body.map(|Json(body)| body).unwrap_or_default();

    let user = state
        .backends
        .authenticate(&headers, body.username.as_deref(), body.password.as_deref())
        .await
        .ok_or_else(|| {
            tracing::debug!("All login backends declined");
            ApiError::Unauthorized
        })?;

    tracing::info!(uuid = %user.uuid, "Login succeeded");
    Ok(Json(user.into()))
}
