//! OAuth2 opaque-token authentication.
//!
//! Access tokens are resolved by the identity service on every request. Unlike
//! the JWT path, neither type here provisions users: a token for a key with no
//! local record is rejected.

use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderMap;
use shadow_auth_core::UserUuid;
use shadow_auth_store::{User, UserStore};

use crate::config::AuthConfig;
use crate::entry::{Authenticated, Authenticator, Backend};
use crate::error::{AuthError, Result};
use crate::extract::{extract_token, ExtractMode, TokenSource};
use crate::remote::IdentityClient;
use crate::resolver::IdentityResolver;

/// Mandatory OAuth2 authenticator.
pub struct OAuth2Authenticator<S, C> {
    source: TokenSource,
    resolver: Arc<IdentityResolver<S, C>>,
}

impl<S, C> OAuth2Authenticator<S, C>
where
    S: UserStore,
    C: IdentityClient,
{
    /// Create a new authenticator.
    #[must_use]
    pub fn new(config: &AuthConfig, resolver: Arc<IdentityResolver<S, C>>) -> Self {
        Self {
            source: config.oauth_token_source(),
            resolver,
        }
    }
}

#[async_trait]
impl<S, C> Authenticator for OAuth2Authenticator<S, C>
where
    S: UserStore + 'static,
    C: IdentityClient + 'static,
{
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Option<Authenticated>> {
        let Some(token) = extract_token(headers, &self.source, ExtractMode::Strict)? else {
            return Ok(None);
        };

        let uuid = self
            .resolver
            .client()
            .resolve_token(&token)
            .await
            .ok_or(AuthError::UnresolvedToken)?;

        let user = self
            .resolver
            .find(&uuid)?
            .ok_or_else(|| AuthError::UserNotFound(uuid.clone()))?;

        tracing::debug!(uuid = %uuid, "Authenticated OAuth2 token");
        Ok(Some(Authenticated {
            user,
            credentials: None,
        }))
    }
}

/// Optional OAuth2 login backend.
///
/// Declines with `None` on every failure, including malformed headers and
/// store errors, so that the next backend in a chain can try.
pub struct OAuth2Backend<S, C> {
    source: TokenSource,
    resolver: Arc<IdentityResolver<S, C>>,
}

impl<S, C> OAuth2Backend<S, C>
where
    S: UserStore,
    C: IdentityClient,
{
    /// Create a new backend.
    #[must_use]
    pub fn new(config: &AuthConfig, resolver: Arc<IdentityResolver<S, C>>) -> Self {
        Self {
            source: config.oauth_token_source(),
            resolver,
        }
    }
}

#[async_trait]
impl<S, C> Backend for OAuth2Backend<S, C>
where
    S: UserStore + 'static,
    C: IdentityClient + 'static,
{
    async fn authenticate(
        &self,
        headers: &HeaderMap,
        _username: Option<&str>,
        _password: Option<&str>,
    ) -> Option<User> {
        let token = match extract_token(headers, &self.source, ExtractMode::Lenient) {
            Ok(token) => token?,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable credentials");
                return None;
            }
        };

        let uuid = self.resolver.client().resolve_token(&token).await?;

        match self.resolver.find_active(&uuid) {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                tracing::debug!(uuid = %uuid, "No active local user for resolved token");
                None
            }
            Err(e) => {
                tracing::error!(uuid = %uuid, error = %e, "Store lookup failed");
                None
            }
        }
    }

    async fn get_user(&self, uuid: &UserUuid) -> Option<User> {
        match self.resolver.find(uuid) {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(uuid = %uuid, error = %e, "Store lookup failed");
                None
            }
        }
    }
}
