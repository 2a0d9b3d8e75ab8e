//! Authentication extractors.
//!
//! Both extractors run the gateway's [`AuthenticatorChain`](shadow_auth::AuthenticatorChain)
//! over the request headers. They differ only in how an anonymous request is
//! treated; rejected credentials are a 401 either way.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use shadow_auth::{Authenticated, Authenticator, User, UserUuid};
use shadow_auth_store::UserStore;

use crate::error::ApiError;
use crate::state::GatewayState;

/// An authenticated caller. Anonymous requests are rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Authenticated);

impl AuthUser {
    /// The local user the request acts as.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.0.user
    }

    /// The caller's user key.
    #[must_use]
    pub fn uuid(&self) -> &UserUuid {
        &self.0.user.uuid
    }
}

/// An optionally authenticated caller. Anonymous requests yield `None`.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Authenticated>);

#[async_trait]
impl<S> FromRequestParts<Arc<GatewayState<S>>> for MaybeAuthUser
where
    S: UserStore + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<GatewayState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let authenticated = state.authenticator.authenticate(&parts.headers).await?;
        Ok(Self(authenticated))
    }
}

#[async_trait]
impl<S> FromRequestParts<Arc<GatewayState<S>>> for AuthUser
where
    S: UserStore + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<GatewayState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let MaybeAuthUser(authenticated) = MaybeAuthUser::from_request_parts(parts, state).await?;
        authenticated.map(Self).ok_or_else(|| {
            tracing::debug!("Rejecting anonymous request");
            ApiError::Unauthorized
        })
    }
}
