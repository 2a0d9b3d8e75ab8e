//! Authentication error types.
//!
//! Three layers, three enums:
//!
//! - [`RemoteError`] stays inside the identity client. It is logged and
//!   collapsed into "no identity" before it crosses the client boundary.
//! - [`ResolveError`] is returned by the local identity resolver.
//! - [`AuthError`] is what an [`Authenticator`](crate::Authenticator) raises.

use shadow_auth_core::{IdError, UserUuid};
use shadow_auth_store::StoreError;
use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors raised by the mandatory authentication path.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The `Authorization` header uses the expected scheme but is malformed.
    #[error("malformed credentials: {0}")]
    MalformedCredentials(String),

    /// The JWT has expired.
    #[error("token expired")]
    TokenExpired,

    /// The JWT signature is invalid.
    #[error("invalid signature")]
    InvalidSignature,

    /// The JWT issuer does not match the expected value.
    #[error("invalid issuer")]
    InvalidIssuer,

    /// The JWT audience does not match the expected value.
    #[error("invalid audience")]
    InvalidAudience,

    /// The token format is invalid.
    #[error("invalid token format: {0}")]
    InvalidToken(String),

    /// A required claim is missing from the token.
    #[error("missing required claim: {0}")]
    MissingClaim(String),

    /// The identity carried by the token is not a valid user key.
    #[error("invalid user identity: {0}")]
    InvalidIdentity(#[from] IdError),

    /// The identity service did not resolve the access token.
    #[error("access token could not be resolved")]
    UnresolvedToken,

    /// No local user exists and the identity service did not confirm one.
    #[error("user not found: {0}")]
    UserNotFound(UserUuid),

    /// The user account is disabled.
    #[error("user inactive: {0}")]
    UserInactive(UserUuid),

    /// The verification key in the configuration is unusable.
    #[error("invalid key configuration: {0}")]
    InvalidKey(String),

    /// A setting is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::MalformedCredentials(_)
            | Self::TokenExpired
            | Self::InvalidSignature
            | Self::InvalidIssuer
            | Self::InvalidAudience
            | Self::InvalidToken(_)
            | Self::MissingClaim(_)
            | Self::InvalidIdentity(_)
            | Self::UnresolvedToken
            | Self::UserNotFound(_)
            | Self::UserInactive(_) => 401,
            Self::InvalidKey(_) | Self::InvalidConfig(_) | Self::Store(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns `true` if the credentials were rejected, as opposed to the
    /// server failing to check them.
    #[must_use]
    pub const fn is_authentication_failure(&self) -> bool {
        self.http_status_code() == 401
    }
}

impl From<ResolveError> for AuthError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UserNotFound(uuid) => Self::UserNotFound(uuid),
            ResolveError::Store(e) => Self::Store(e),
        }
    }
}

/// Errors returned by the local identity resolver.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Not found locally, and the identity service did not confirm the key.
    #[error("user not found: {0}")]
    UserNotFound(UserUuid),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Failures talking to the identity service.
///
/// Never returned across the [`IdentityClient`](crate::IdentityClient)
/// boundary; used to log the cause before collapsing to "no identity".
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request could not be sent or timed out.
    #[error("request failed: {0}")]
    Network(String),

    /// The service answered with a status other than 200.
    #[error("unexpected status: {0}")]
    Status(u16),

    /// The body could not be parsed or lacks the identity.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
