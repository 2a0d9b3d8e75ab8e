//! Client for the remote identity service.
//!
//! Each operation is a single GET with no retry and no caching. Whatever goes
//! wrong (network failure, timeout, non-200 status, unusable body) the caller
//! sees the same outcome, `None`. The cause is only visible in the logs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use shadow_auth_core::UserUuid;
use shadow_auth_store::User;

use crate::config::AuthConfig;
use crate::error::RemoteError;

/// Trait for talking to the remote identity service.
///
/// Implementations never fail: every error is logged and reported as `None`.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Confirm that `uuid` is a currently valid identity and fetch its profile.
    async fn validate_uuid(&self, uuid: &UserUuid) -> Option<RemoteUserData>;

    /// Resolve an opaque OAuth2 access token to the identity it belongs to.
    async fn resolve_token(&self, token: &str) -> Option<UserUuid>;
}

/// Profile returned by the "validate user uuid" endpoint.
///
/// Only `uuid` is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUserData {
    /// The confirmed user key.
    pub uuid: UserUuid,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Short display name.
    #[serde(default)]
    pub short_name: Option<String>,
    /// Full display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Active flag; missing means active.
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Staff flag.
    #[serde(default)]
    pub is_staff: Option<bool>,
    /// Superuser flag.
    #[serde(default)]
    pub is_superuser: Option<bool>,
}

impl RemoteUserData {
    /// Build the local shadow record for this identity.
    #[must_use]
    pub fn into_user(self) -> User {
        let mut user = User::new(self.uuid);
        user.email = self.email;
        user.short_name = self.short_name;
        user.full_name = self.full_name;
        user.is_active = self.is_active.unwrap_or(true);
        user.is_staff = self.is_staff.unwrap_or(false);
        user.is_superuser = self.is_superuser.unwrap_or(false);
        user
    }
}

/// HTTP implementation of [`IdentityClient`].
#[derive(Debug, Clone)]
pub struct HttpIdentityClient {
    config: AuthConfig,
    client: reqwest::Client,
}

impl HttpIdentityClient {
    /// Create a new client; each request is bounded by `remote_timeout_seconds`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should never happen with default TLS).
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.remote_timeout())
            .connect_timeout(Duration::from_secs(5).min(config.remote_timeout()))
            .build()
            .expect("failed to create HTTP client");

        Self { config, client }
    }

    /// Create a client with a custom reqwest client.
    #[must_use]
    pub fn with_client(config: AuthConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    async fn fetch_user_data(&self, uuid: &UserUuid) -> Result<RemoteUserData, RemoteError> {
        let url = self.config.validate_uuid_url_for(uuid);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let data: RemoteUserData = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;

        if data.uuid != *uuid {
            return Err(RemoteError::InvalidResponse(format!(
                "asked for {uuid}, got {}",
                data.uuid
            )));
        }

        Ok(data)
    }

    async fn fetch_token_identity(&self, token: &str) -> Result<UserUuid, RemoteError> {
        let url = self.config.oauth_user_info_url();

        let response = self
            .client
            .get(&url)
            .query(&[("access_token", token)])
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;

        let field = &self.config.oauth_identity_field;
        let raw = body
            .get(field)
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| RemoteError::InvalidResponse(format!("missing `{field}` field")))?;

        UserUuid::parse(raw).map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }
}

/// Log a failed remote call at a level matching its cause.
fn log_failure(operation: &'static str, err: &RemoteError) {
    match err {
        RemoteError::Network(_) => {
            tracing::error!(operation, error = %err, "Identity service unreachable");
        }
        RemoteError::Status(status) => {
            tracing::debug!(operation, status, "Identity service declined");
        }
        RemoteError::InvalidResponse(_) => {
            tracing::warn!(operation, error = %err, "Identity service sent an unusable response");
        }
    }
}

#[async_trait]
impl IdentityClient for HttpIdentityClient {
    async fn validate_uuid(&self, uuid: &UserUuid) -> Option<RemoteUserData> {
        match self.fetch_user_data(uuid).await {
            Ok(data) => {
                tracing::debug!(uuid = %uuid, "Identity service confirmed uuid");
                Some(data)
            }
            Err(e) => {
                log_failure("validate_uuid", &e);
                None
            }
        }
    }

    async fn resolve_token(&self, token: &str) -> Option<UserUuid> {
        match self.fetch_token_identity(token).await {
            Ok(uuid) => {
                tracing::debug!(uuid = %uuid, "Identity service resolved access token");
                Some(uuid)
            }
            Err(e) => {
                log_failure("resolve_token", &e);
                None
            }
        }
    }
}
