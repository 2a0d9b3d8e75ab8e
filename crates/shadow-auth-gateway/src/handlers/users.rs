//! User endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use shadow_auth::{Backend, User, UserUuid};
use shadow_auth_store::UserStore;

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::ApiError;
use crate::state::GatewayState;

/// Response for a single user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User key.
    pub uuid: String,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Short display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// Full display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Whether the account is enabled.
    pub is_active: bool,
    /// Staff flag.
    pub is_staff: bool,
    /// Superuser flag.
    pub is_superuser: bool,
    /// When the shadow record was created.
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            uuid: user.uuid.to_string(),
            email: user.email,
            short_name: user.short_name,
            full_name: user.full_name,
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            created_at: user.created_at,
        }
    }
}

/// Return the authenticated caller.
///
/// ```text
/// GET /v1/me
/// Authorization: Bearer <token>
/// ```
pub async fn me(AuthUser(authenticated): AuthUser) -> Json<UserResponse> {
    Json(authenticated.user.into())
}

/// Response describing who, if anyone, the caller is.
#[derive(Debug, Serialize)]
pub struct WhoamiResponse {
    /// Whether the request carried accepted credentials.
    pub authenticated: bool,
    /// The caller's user key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

/// Describe the caller. Anonymous requests get `authenticated: false`;
/// rejected credentials still fail with 401.
///
/// ```text
/// GET /v1/whoami
/// ```
pub async fn whoami(MaybeAuthUser(authenticated): MaybeAuthUser) -> Json<WhoamiResponse> {
    Json(WhoamiResponse {
        authenticated: authenticated.is_some(),
        uuid: authenticated.map(|a| a.user.uuid.to_string()),
    })
}

/// Look up a user by key. Requires authentication; never creates a user.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` for a malformed key and
/// `ApiError::NotFound` when no local user exists.
pub async fn get_user<S>(
    State(state): State<Arc<GatewayState<S>>>,
    caller: AuthUser,
    Path(raw): Path<String>,
) -> Result<Json<UserResponse>, ApiError>
where
    S: UserStore + 'static,
{
    let uuid = UserUuid::parse(raw).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::debug!(caller = %caller.uuid(), uuid = %uuid, "User lookup");

    let user = state
        .backends
        .get_user(&uuid)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("user {uuid}")))?;

    Ok(Json(user.into()))
}
