//! Authentication configuration.
//!
//! An [`AuthConfig`] is built once at startup and shared read-only by every
//! component. Nothing mutates it after construction.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::Deserialize;
use shadow_auth_core::UserUuid;

use crate::error::{AuthError, Result};
use crate::extract::TokenSource;

/// Named placeholder substituted with the user key in [`AuthConfig::validate_uuid_url`].
pub const UUID_PLACEHOLDER: &str = "{uuid}";

/// Positional placeholder, accepted in [`AuthConfig::validate_uuid_url`] as
/// well.
pub const POSITIONAL_PLACEHOLDER: &str = "{}";

/// Configuration for token validation and the remote identity service.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret (HMAC algorithms) or PEM-encoded public key (RSA, EC, `EdDSA`).
    #[serde(default)]
    pub jwt_secret_key: String,

    /// Expected JWT signing algorithm.
    #[serde(default = "AuthConfig::default_algorithm")]
    pub jwt_algorithm: Algorithm,

    /// Whether the `exp` claim is checked.
    ///
    /// Off by default: tokens issued by the identity service are accepted
    /// regardless of age. Turn this on to reject expired tokens.
    #[serde(default)]
    pub jwt_verify_expiration: bool,

    /// Clock skew tolerance for time-based claims, in seconds.
    #[serde(default)]
    pub jwt_leeway_seconds: u64,

    /// Expected `aud` claim. Audience is not checked when unset.
    #[serde(default)]
    pub jwt_audience: Option<String>,

    /// Expected `iss` claim. Issuer is not checked when unset.
    #[serde(default)]
    pub jwt_issuer: Option<String>,

    /// Scheme word expected before the token in the `Authorization` header.
    #[serde(default = "AuthConfig::default_header_prefix")]
    pub auth_header_prefix: String,

    /// Scheme word for OAuth2 access tokens, when it differs from
    /// `auth_header_prefix`. Distinct prefixes let both schemes coexist on
    /// one server.
    #[serde(default)]
    pub oauth_header_prefix: Option<String>,

    /// JWT claim holding the user key.
    #[serde(default = "AuthConfig::default_username_claim")]
    pub username_claim: String,

    /// Cookie read when no `Authorization` header is sent.
    #[serde(default)]
    pub auth_cookie: Option<String>,

    /// URL template of the "validate user uuid" endpoint, containing `{uuid}`
    /// or `{}`.
    #[serde(default = "AuthConfig::default_validate_uuid_url")]
    pub validate_uuid_url: String,

    /// Base URL of the OAuth2 provider.
    #[serde(default = "AuthConfig::default_oauth_domain")]
    pub oauth_domain: String,

    /// Path of the OAuth2 user-info endpoint, appended to `oauth_domain`.
    #[serde(default = "AuthConfig::default_oauth_user_info_path")]
    pub oauth_user_info_path: String,

    /// Field of the user-info response holding the user key.
    #[serde(default = "AuthConfig::default_oauth_identity_field")]
    pub oauth_identity_field: String,

    /// Timeout for each call to the identity service, in seconds.
    #[serde(default = "AuthConfig::default_remote_timeout")]
    pub remote_timeout_seconds: u64,
}

impl AuthConfig {
    const fn default_algorithm() -> Algorithm {
        Algorithm::HS256
    }

    fn default_header_prefix() -> String {
        "Bearer".to_string()
    }

    fn default_username_claim() -> String {
        "username".to_string()
    }

    fn default_validate_uuid_url() -> String {
        "http://localhost:8000/api/accounts/users/{uuid}/".to_string()
    }

    fn default_oauth_domain() -> String {
        "http://localhost:8000".to_string()
    }

    fn default_oauth_user_info_path() -> String {
        "/api/oauth/me/".to_string()
    }

    fn default_oauth_identity_field() -> String {
        "exo_uuid".to_string()
    }

    const fn default_remote_timeout() -> u64 {
        10
    }

    /// Get the validation URL for a given user key.
    #[must_use]
    pub fn validate_uuid_url_for(&self, uuid: &UserUuid) -> String {
        self.validate_uuid_url
            .replace(UUID_PLACEHOLDER, uuid.as_str())
            .replace(POSITIONAL_PLACEHOLDER, uuid.as_str())
    }

    /// Check the settings that would otherwise only fail at request time.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidConfig` if the validation URL has no
    /// placeholder or the remote timeout is zero, and `AuthError::InvalidKey`
    /// if an HMAC algorithm is configured with an empty secret.
    pub fn validate(&self) -> Result<()> {
        if !self.validate_uuid_url.contains(UUID_PLACEHOLDER)
            && !self.validate_uuid_url.contains(POSITIONAL_PLACEHOLDER)
        {
            return Err(AuthError::InvalidConfig(format!(
                "validate_uuid_url must contain {UUID_PLACEHOLDER} or {POSITIONAL_PLACEHOLDER}"
            )));
        }
        if self.remote_timeout_seconds == 0 {
            return Err(AuthError::InvalidConfig(
                "remote_timeout_seconds must be greater than zero".to_string(),
            ));
        }
        if self.uses_hmac() && self.jwt_secret_key.is_empty() {
            return Err(AuthError::InvalidKey(
                "jwt_secret_key must not be empty for HMAC algorithms".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns `true` if the JWT algorithm is keyed by a shared secret.
    #[must_use]
    pub const fn uses_hmac(&self) -> bool {
        matches!(
            self.jwt_algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        )
    }

    /// Get the OAuth2 user-info endpoint URL (without query string).
    #[must_use]
    pub fn oauth_user_info_url(&self) -> String {
        format!("{}{}", self.oauth_domain, self.oauth_user_info_path)
    }

    /// Get the remote call timeout as a `Duration`.
    #[must_use]
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_seconds)
    }

    /// Get the token source (header prefix and fallback cookie).
    #[must_use]
    pub fn token_source(&self) -> TokenSource {
        TokenSource {
            header_prefix: self.auth_header_prefix.clone(),
            cookie_name: self.auth_cookie.clone(),
        }
    }

    /// Get the token source used by the OAuth2 authenticator and backend.
    #[must_use]
    pub fn oauth_token_source(&self) -> TokenSource {
        TokenSource {
            header_prefix: self
                .oauth_header_prefix
                .clone()
                .unwrap_or_else(|| self.auth_header_prefix.clone()),
            cookie_name: self.auth_cookie.clone(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_key: String::new(),
            jwt_algorithm: Self::default_algorithm(),
            jwt_verify_expiration: false,
            jwt_leeway_seconds: 0,
            jwt_audience: None,
            jwt_issuer: None,
            auth_header_prefix: Self::default_header_prefix(),
            oauth_header_prefix: None,
            username_claim: Self::default_username_claim(),
            auth_cookie: None,
            validate_uuid_url: Self::default_validate_uuid_url(),
            oauth_domain: Self::default_oauth_domain(),
            oauth_user_info_path: Self::default_oauth_user_info_path(),
            oauth_identity_field: Self::default_oauth_identity_field(),
            remote_timeout_seconds: Self::default_remote_timeout(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret_key", &"<redacted>")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_verify_expiration", &self.jwt_verify_expiration)
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .field("jwt_audience", &self.jwt_audience)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("auth_header_prefix", &self.auth_header_prefix)
            .field("oauth_header_prefix", &self.oauth_header_prefix)
            .field("username_claim", &self.username_claim)
            .field("auth_cookie", &self.auth_cookie)
            .field("validate_uuid_url", &self.validate_uuid_url)
            .field("oauth_domain", &self.oauth_domain)
            .field("oauth_user_info_path", &self.oauth_user_info_path)
            .field("oauth_identity_field", &self.oauth_identity_field)
            .field("remote_timeout_seconds", &self.remote_timeout_seconds)
            .finish()
    }
}
