//! Entry points used by a host framework.
//!
//! An [`Authenticator`] guards a request: it either identifies the caller,
//! declines because its scheme does not apply, or rejects the request. A
//! [`Backend`] is the softer login hook: it never raises, it only finds a user
//! or declines.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderMap;
use shadow_auth_core::UserUuid;
use shadow_auth_store::User;

use crate::error::Result;

/// A successfully authenticated request.
#[derive(Clone, PartialEq, Eq)]
pub struct Authenticated {
    /// The local user the request acts as.
    pub user: User,
    /// The raw credentials, when the scheme keeps them (JWT does, OAuth2 does not).
    pub credentials: Option<String>,
}

impl fmt::Debug for Authenticated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticated")
            .field("user", &self.user)
            .field(
                "credentials",
                &self.credentials.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Mandatory request authentication.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate a request from its headers.
    ///
    /// Returns `Ok(None)` when this scheme does not apply to the request.
    ///
    /// # Errors
    ///
    /// Returns an error when the request carries credentials for this scheme
    /// that cannot be accepted.
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Option<Authenticated>>;
}

/// Optional login backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Try to identify the caller. `username` and `password` are accepted for
    /// interface compatibility with password backends and may be ignored.
    async fn authenticate(
        &self,
        headers: &HeaderMap,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Option<User>;

    /// Look up a user by key. Never creates a user.
    async fn get_user(&self, uuid: &UserUuid) -> Option<User>;
}

/// Tries authenticators in order.
///
/// The first one to identify the caller wins. The first error aborts the
/// chain, so a malformed JWT is not retried as an OAuth2 token.
#[derive(Clone, Default)]
pub struct AuthenticatorChain {
    authenticators: Vec<Arc<dyn Authenticator>>,
}

impl AuthenticatorChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an authenticator.
    #[must_use]
    pub fn with(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticators.push(authenticator);
        self
    }

    /// Number of authenticators in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.authenticators.len()
    }

    /// Returns `true` if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.authenticators.is_empty()
    }
}

#[async_trait]
impl Authenticator for AuthenticatorChain {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Option<Authenticated>> {
        for authenticator in &self.authenticators {
            if let Some(authenticated) = authenticator.authenticate(headers).await? {
                return Ok(Some(authenticated));
            }
        }
        Ok(None)
    }
}

/// Tries backends in order; the first user found wins.
#[derive(Clone, Default)]
pub struct BackendChain {
    backends: Vec<Arc<dyn Backend>>,
}

impl BackendChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend.
    #[must_use]
    pub fn with(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backends.push(backend);
        self
    }

    /// Number of backends in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Returns `true` if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

#[async_trait]
impl Backend for BackendChain {
    async fn authenticate(
        &self,
        headers: &HeaderMap,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Option<User> {
        for backend in &self.backends {
            if let Some(user) = backend.authenticate(headers, username, password).await {
                return Some(user);
            }
        }
        None
    }

    async fn get_user(&self, uuid: &UserUuid) -> Option<User> {
        for backend in &self.backends {
            if let Some(user) = backend.get_user(uuid).await {
                return Some(user);
            }
        }
        None
    }
}
