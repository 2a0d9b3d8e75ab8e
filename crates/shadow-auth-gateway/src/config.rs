//! Gateway configuration types.
//!
//! Both the gateway settings and the [`AuthConfig`] are read once at startup
//! from `SHADOW_AUTH_*` environment variables.

use std::num::NonZeroU64;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::Deserialize;
use shadow_auth::AuthConfig;
use thiserror::Error;

/// Prefix shared by every environment variable the gateway reads.
pub const ENV_PREFIX: &str = "SHADOW_AUTH_";

/// A configuration value could not be parsed.
#[derive(Debug, Error)]
#[error("invalid value for SHADOW_AUTH_{name}: {value:?}")]
pub struct ConfigError {
    /// Variable name without the prefix.
    pub name: &'static str,
    /// The rejected value.
    pub value: String,
}

/// Configuration for the gateway service.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    #[serde(default = "GatewayConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Directory holding the user database.
    #[serde(default = "GatewayConfig::default_data_dir")]
    pub data_dir: String,

    /// Request timeout in seconds.
    #[serde(default = "GatewayConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8080".to_string()
    }

    fn default_data_dir() -> String {
        "/data/shadow-auth".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Build the configuration from a variable lookup, keeping defaults for
    /// unset variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let mut config = Self::default();
        env.set_string("LISTEN_ADDR", &mut config.listen_addr);
        env.set_string("DATA_DIR", &mut config.data_dir);
        env.set_parsed("REQUEST_TIMEOUT_SECONDS", &mut config.request_timeout_seconds)?;
        Ok(config)
    }

    /// Build the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            data_dir: Self::default_data_dir(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

/// Build an [`AuthConfig`] from a variable lookup, keeping defaults for unset
/// variables.
///
/// # Errors
///
/// Returns an error if a set variable cannot be parsed or a timeout is zero.
pub fn auth_config_from_lookup<F>(lookup: F) -> Result<AuthConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let env = Env(lookup);
    let mut config = AuthConfig::default();

    env.set_string("JWT_SECRET_KEY", &mut config.jwt_secret_key);
    env.set_parsed::<Algorithm>("JWT_ALGORITHM", &mut config.jwt_algorithm)?;
    env.set_parsed("JWT_VERIFY_EXPIRATION", &mut config.jwt_verify_expiration)?;
    env.set_parsed("JWT_LEEWAY_SECONDS", &mut config.jwt_leeway_seconds)?;
    env.set_optional("JWT_AUDIENCE", &mut config.jwt_audience);
    env.set_optional("JWT_ISSUER", &mut config.jwt_issuer);
    env.set_string("HEADER_PREFIX", &mut config.auth_header_prefix);
    env.set_optional("OAUTH_HEADER_PREFIX", &mut config.oauth_header_prefix);
    env.set_string("USERNAME_CLAIM", &mut config.username_claim);
    env.set_optional("COOKIE", &mut config.auth_cookie);
    env.set_string("VALIDATE_UUID_URL", &mut config.validate_uuid_url);
    env.set_string("OAUTH_DOMAIN", &mut config.oauth_domain);
    env.set_string("OAUTH_USER_INFO_PATH", &mut config.oauth_user_info_path);
    env.set_string("OAUTH_IDENTITY_FIELD", &mut config.oauth_identity_field);
    env.set_nonzero("REMOTE_TIMEOUT_SECONDS", &mut config.remote_timeout_seconds)?;

    Ok(config)
}

/// Build an [`AuthConfig`] from the process environment.
///
/// # Errors
///
/// Returns an error if a set variable cannot be parsed.
pub fn auth_config_from_env() -> Result<AuthConfig, ConfigError> {
    auth_config_from_lookup(|name| std::env::var(name).ok())
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(&format!("{ENV_PREFIX}{name}"))
    }

    fn set_string(&self, name: &str, target: &mut String) {
        if let Some(value) = self.get(name) {
            *target = value;
        }
    }

    fn set_optional(&self, name: &str, target: &mut Option<String>) {
        if let Some(value) = self.get(name) {
            *target = Some(value).filter(|v| !v.is_empty());
        }
    }

    fn set_parsed<T: FromStr>(&self, name: &'static str, target: &mut T) -> Result<(), ConfigError> {
        if let Some(value) = self.get(name) {
            *target = value
                .trim()
                .parse()
                .map_err(|_| ConfigError { name, value })?;
        }
        Ok(())
    }

    fn set_nonzero(&self, name: &'static str, target: &mut u64) -> Result<(), ConfigError> {
        let mut value = NonZeroU64::MIN;
        if self.get(name).is_some() {
            self.set_parsed(name, &mut value)?;
            *target = value.get();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.data_dir, "/data/shadow-auth");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn gateway_config_from_lookup() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("SHADOW_AUTH_LISTEN_ADDR", "127.0.0.1:9000"),
            ("SHADOW_AUTH_REQUEST_TIMEOUT_SECONDS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.data_dir, "/data/shadow-auth");
        assert_eq!(config.request_timeout_seconds, 5);
    }

    #[test]
    fn auth_config_from_empty_lookup_is_default() {
        let config = auth_config_from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.jwt_algorithm, Algorithm::HS256);
        assert!(!config.jwt_verify_expiration);
        assert_eq!(config.auth_header_prefix, "Bearer");
    }

    #[test]
    fn auth_config_reads_prefixed_variables() {
        let config = auth_config_from_lookup(lookup(&[
            ("SHADOW_AUTH_JWT_SECRET_KEY", "s3cret"),
            ("SHADOW_AUTH_JWT_ALGORITHM", "HS512"),
            ("SHADOW_AUTH_JWT_VERIFY_EXPIRATION", "true"),
            ("SHADOW_AUTH_JWT_ISSUER", "https://id.example.com"),
            ("SHADOW_AUTH_JWT_AUDIENCE", ""),
            ("SHADOW_AUTH_HEADER_PREFIX", "JWT"),
            ("SHADOW_AUTH_OAUTH_HEADER_PREFIX", "Bearer"),
            ("SHADOW_AUTH_OAUTH_IDENTITY_FIELD", "exo_uuid"),
            ("SHADOW_AUTH_REMOTE_TIMEOUT_SECONDS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.jwt_secret_key, "s3cret");
        assert_eq!(config.jwt_algorithm, Algorithm::HS512);
        assert!(config.jwt_verify_expiration);
        assert_eq!(config.jwt_issuer.as_deref(), Some("https://id.example.com"));
        assert_eq!(config.jwt_audience, None);
        assert_eq!(config.auth_header_prefix, "JWT");
        assert_eq!(config.oauth_header_prefix.as_deref(), Some("Bearer"));
        assert_eq!(config.oauth_identity_field, "exo_uuid");
        assert_eq!(config.remote_timeout_seconds, 3);
    }

    #[test]
    fn unparsable_value_is_rejected() {
        let err = auth_config_from_lookup(lookup(&[("SHADOW_AUTH_JWT_VERIFY_EXPIRATION", "yes")]))
            .unwrap_err();
        assert_eq!(err.name, "JWT_VERIFY_EXPIRATION");
        assert!(err.to_string().contains("SHADOW_AUTH_JWT_VERIFY_EXPIRATION"));

        let err = auth_config_from_lookup(lookup(&[("SHADOW_AUTH_JWT_ALGORITHM", "XX999")]))
            .unwrap_err();
        assert_eq!(err.name, "JWT_ALGORITHM");
    }

    #[test]
    fn zero_remote_timeout_is_rejected() {
        let err = auth_config_from_lookup(lookup(&[("SHADOW_AUTH_REMOTE_TIMEOUT_SECONDS", "0")]))
            .unwrap_err();
        assert_eq!(err.name, "REMOTE_TIMEOUT_SECONDS");
        assert_eq!(err.value, "0");
    }
}
