//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use shadow_auth::{
    AuthConfig, AuthenticatorChain, BackendChain, HttpIdentityClient, IdentityResolver,
    JwtAuthenticator, OAuth2Authenticator, OAuth2Backend,
};
use shadow_auth_store::UserStore;

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
pub struct GatewayState<S>
where
    S: UserStore,
{
    /// The local user store.
    pub store: Arc<S>,
    /// Authenticators guarding protected routes, tried in order.
    pub authenticator: AuthenticatorChain,
    /// Login backends, tried in order.
    pub backends: BackendChain,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<S> GatewayState<S>
where
    S: UserStore,
{
    /// Create a new gateway state.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        authenticator: AuthenticatorChain,
        backends: BackendChain,
        config: GatewayConfig,
    ) -> Self {
        Self {
            store,
            authenticator,
            backends,
            config,
        }
    }
}

impl<S> GatewayState<S>
where
    S: UserStore + 'static,
{
    /// Wire the standard chains over `store`.
    ///
    /// Protected routes try the JWT authenticator first, then OAuth2. Login
    /// goes through the OAuth2 backend.
    ///
    /// # Errors
    ///
    /// Returns an error if [`AuthConfig::validate`] fails or the JWT
    /// verification key is unusable.
    pub fn from_config(
        store: Arc<S>,
        auth: &AuthConfig,
        config: GatewayConfig,
    ) -> shadow_auth::Result<Self> {
        auth.validate()?;
        let client = Arc::new(HttpIdentityClient::new(auth.clone()));
        let resolver = Arc::new(IdentityResolver::new(Arc::clone(&store), client));

        let jwt = JwtAuthenticator::new(auth, Arc::clone(&resolver))?;
        let oauth = OAuth2Authenticator::new(auth, Arc::clone(&resolver));
        let backend = OAuth2Backend::new(auth, resolver);

        if auth
            .oauth_token_source()
            .header_prefix
            .eq_ignore_ascii_case(&auth.auth_header_prefix)
        {
            tracing::warn!(
                prefix = %auth.auth_header_prefix,
                "JWT and OAuth2 share a header prefix; opaque tokens will be rejected by the JWT authenticator"
            );
        }

        let authenticator = AuthenticatorChain::new()
            .with(Arc::new(jwt))
            .with(Arc::new(oauth));
        let backends = BackendChain::new().with(Arc::new(backend));

        Ok(Self::new(store, authenticator, backends, config))
    }
}

impl<S> Clone for GatewayState<S>
where
    S: UserStore,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            authenticator: self.authenticator.clone(),
            backends: self.backends.clone(),
            config: self.config.clone(),
        }
    }
}
