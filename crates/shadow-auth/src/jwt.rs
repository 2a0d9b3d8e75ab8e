//! JWT authentication.
//!
//! Tokens are verified locally against the configured key, so no remote call
//! is needed to authenticate a known user. The identity service is only asked
//! when the token names a key with no local record yet.

use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderMap;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use shadow_auth_core::UserUuid;
use shadow_auth_store::UserStore;

use crate::config::AuthConfig;
use crate::entry::{Authenticated, Authenticator};
use crate::error::{AuthError, Result};
use crate::extract::{extract_token, ExtractMode, TokenSource};
use crate::remote::IdentityClient;
use crate::resolver::IdentityResolver;

/// Decoded JWT claims.
pub type Claims = Map<String, Value>;

/// Derives the local lookup key from a decoded payload.
///
/// Chosen once at startup and injected into the [`JwtAuthenticator`].
pub trait PayloadHandler: Send + Sync {
    /// Extract the user key from the claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims do not carry a usable key.
    fn lookup_key(&self, claims: &Claims) -> Result<UserUuid>;
}

/// Reads the user key from a single string claim.
#[derive(Debug, Clone)]
pub struct ClaimPayloadHandler {
    claim: String,
}

impl ClaimPayloadHandler {
    /// Create a handler reading `claim`.
    #[must_use]
    pub fn new(claim: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
        }
    }
}

impl PayloadHandler for ClaimPayloadHandler {
    fn lookup_key(&self, claims: &Claims) -> Result<UserUuid> {
        let value = claims
            .get(&self.claim)
            .ok_or_else(|| AuthError::MissingClaim(self.claim.clone()))?;
        let raw = value
            .as_str()
            .ok_or_else(|| AuthError::InvalidToken(format!("claim `{}` is not a string", self.claim)))?;
        Ok(UserUuid::parse(raw)?)
    }
}

/// Verifies JWT signatures and registered claims.
pub struct JwtDecoder {
    key: DecodingKey,
    validation: Validation,
}

impl JwtDecoder {
    /// Build a decoder from the configured key, algorithm and claim checks.
    ///
    /// HMAC algorithms use `jwt_secret_key` as the raw secret; the others
    /// expect it to hold a PEM-encoded public key.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidKey` if the PEM key cannot be parsed or the
    /// HMAC secret is empty.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let secret = config.jwt_secret_key.as_bytes();
        if config.uses_hmac() && secret.is_empty() {
            return Err(AuthError::InvalidKey("empty HMAC secret".to_string()));
        }
        let key = match config.jwt_algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                Ok(DecodingKey::from_secret(secret))
            }
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(secret),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(secret),
            Algorithm::EdDSA => DecodingKey::from_ed_pem(secret),
        }
        .map_err(|e| AuthError::InvalidKey(e.to_string()))?;

        let mut validation = Validation::new(config.jwt_algorithm);
        validation.leeway = config.jwt_leeway_seconds;
        validation.validate_exp = config.jwt_verify_expiration;
        if !config.jwt_verify_expiration {
            validation.required_spec_claims.clear();
        }
        if let Some(issuer) = &config.jwt_issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.jwt_audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self { key, validation })
    }

    /// Verify `token` and return its claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature, format or a checked claim is invalid.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                ErrorKind::InvalidAudience => AuthError::InvalidAudience,
                ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.clone()),
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;
        Ok(data.claims)
    }
}

/// Stateless JWT authenticator.
///
/// A token for a key with no local record still succeeds when the identity
/// service confirms the key; the shadow user is created on the way.
pub struct JwtAuthenticator<S, C> {
    source: TokenSource,
    decoder: JwtDecoder,
    payload_handler: Arc<dyn PayloadHandler>,
    resolver: Arc<IdentityResolver<S, C>>,
}

impl<S, C> JwtAuthenticator<S, C>
where
    S: UserStore,
    C: IdentityClient,
{
    /// Create an authenticator reading the key from `config.username_claim`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidKey` if the configured key is unusable and
    /// `AuthError::InvalidConfig` if [`AuthConfig::validate`] fails.
    pub fn new(config: &AuthConfig, resolver: Arc<IdentityResolver<S, C>>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source: config.token_source(),
            decoder: JwtDecoder::from_config(config)?,
            payload_handler: Arc::new(ClaimPayloadHandler::new(config.username_claim.clone())),
            resolver,
        })
    }

    /// Replace the payload handler.
    #[must_use]
    pub fn with_payload_handler(mut self, handler: Arc<dyn PayloadHandler>) -> Self {
        self.payload_handler = handler;
        self
    }
}

#[async_trait]
impl<S, C> Authenticator for JwtAuthenticator<S, C>
where
    S: UserStore + 'static,
    C: IdentityClient + 'static,
{
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Option<Authenticated>> {
        let Some(token) = extract_token(headers, &self.source, ExtractMode::Strict)? else {
            return Ok(None);
        };

        let claims = self.decoder.decode(&token)?;
        let uuid = self.payload_handler.lookup_key(&claims)?;
        let user = self.resolver.resolve_or_create(&uuid).await?;

        if !user.is_active {
            tracing::debug!(uuid = %uuid, "Rejecting token for inactive user");
            return Err(AuthError::UserInactive(uuid));
        }

        Ok(Some(Authenticated {
            user,
            credentials: Some(token),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bearer, config_for, resolver_for, seed_user, sign, uuid};
    use base64::prelude::*;
    use jsonwebtoken::get_current_timestamp;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn silent_remote() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn authenticates_existing_user() {
        let server = silent_remote().await;
        let config = config_for(&server.uri());
        let (resolver, store, _dir) = resolver_for(&config);
        let existing = seed_user(&store, "u-1", true);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        let token = sign(&json!({ "username": "u-1" }));
        let result = auth.authenticate(&bearer(&token)).await.unwrap().unwrap();

        assert_eq!(result.user, existing);
        assert_eq!(result.credentials.as_deref(), Some(token.as_str()));
    }

    #[tokio::test]
    async fn provisions_user_confirmed_remotely() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/accounts/users/u-2/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "uuid": "u-2" })))
            .expect(1)
            .mount(&server)
            .await;
        let config = config_for(&server.uri());
        let (resolver, store, _dir) = resolver_for(&config);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        let token = sign(&json!({ "username": "u-2" }));
        let result = auth.authenticate(&bearer(&token)).await.unwrap().unwrap();

        assert_eq!(result.user.uuid, uuid("u-2"));
        assert!(store.get_user(&uuid("u-2")).unwrap().is_some());
    }

    #[tokio::test]
    async fn unknown_user_rejected_remotely_fails() {
        let server = silent_remote().await;
        let config = config_for(&server.uri());
        let (resolver, store, _dir) = resolver_for(&config);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        let token = sign(&json!({ "username": "u-404" }));
        let result = auth.authenticate(&bearer(&token)).await;

        assert!(matches!(result, Err(AuthError::UserNotFound(ref id)) if *id == uuid("u-404")));
        assert_eq!(store.count_users().unwrap(), 0);
    }

    #[tokio::test]
    async fn no_token_is_not_authenticated() {
        let server = silent_remote().await;
        let config = config_for(&server.uri());
        let (resolver, _store, _dir) = resolver_for(&config);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        assert!(auth.authenticate(&HeaderMap::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_header_raises() {
        let server = silent_remote().await;
        let config = config_for(&server.uri());
        let (resolver, _store, _dir) = resolver_for(&config);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(http::header::AUTHORIZATION, "Bearer".parse().unwrap());
        let result = auth.authenticate(&headers).await;
        assert!(matches!(result, Err(AuthError::MalformedCredentials(_))));
    }

    #[tokio::test]
    async fn wrong_signature_fails() {
        let server = silent_remote().await;
        let config = config_for(&server.uri());
        let (resolver, store, _dir) = resolver_for(&config);
        seed_user(&store, "u-1", true);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &json!({ "username": "u-1" }),
            &jsonwebtoken::EncodingKey::from_secret(b"some-other-secret"),
        )
        .unwrap();

        let result = auth.authenticate(&bearer(&token)).await;
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[tokio::test]
    async fn unsigned_token_fails() {
        let server = silent_remote().await;
        let config = config_for(&server.uri());
        let (resolver, store, _dir) = resolver_for(&config);
        seed_user(&store, "u-1", true);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        let header = BASE64_URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = BASE64_URL_SAFE_NO_PAD.encode(r#"{"username":"u-1"}"#);
        let token = format!("{header}.{payload}.");

        let result = auth.authenticate(&bearer(&token)).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().is_authentication_failure());
    }

    #[tokio::test]
    async fn garbage_token_fails() {
        let server = silent_remote().await;
        let config = config_for(&server.uri());
        let (resolver, _store, _dir) = resolver_for(&config);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        let result = auth.authenticate(&bearer("not-a-jwt")).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn expired_token_accepted_when_expiration_unchecked() {
        let server = silent_remote().await;
        let config = config_for(&server.uri());
        assert!(!config.jwt_verify_expiration);
        let (resolver, store, _dir) = resolver_for(&config);
        seed_user(&store, "u-1", true);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        let token = sign(&json!({ "username": "u-1", "exp": 1_000_000 }));
        assert!(auth.authenticate(&bearer(&token)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn expired_token_rejected_when_expiration_checked() {
        let server = silent_remote().await;
        let config = AuthConfig {
            jwt_verify_expiration: true,
            ..config_for(&server.uri())
        };
        let (resolver, store, _dir) = resolver_for(&config);
        seed_user(&store, "u-1", true);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        let expired = sign(&json!({ "username": "u-1", "exp": 1_000_000 }));
        assert!(matches!(
            auth.authenticate(&bearer(&expired)).await,
            Err(AuthError::TokenExpired)
        ));

        let fresh = sign(&json!({ "username": "u-1", "exp": get_current_timestamp() + 3600 }));
        assert!(auth.authenticate(&bearer(&fresh)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_username_claim_fails() {
        let server = silent_remote().await;
        let config = config_for(&server.uri());
        let (resolver, _store, _dir) = resolver_for(&config);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        let token = sign(&json!({ "sub": "u-1" }));
        let result = auth.authenticate(&bearer(&token)).await;
        assert!(matches!(result, Err(AuthError::MissingClaim(ref c)) if c == "username"));
    }

    #[tokio::test]
    async fn invalid_username_claim_fails() {
        let server = silent_remote().await;
        let config = config_for(&server.uri());
        let (resolver, _store, _dir) = resolver_for(&config);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        let token = sign(&json!({ "username": "../../admin" }));
        let result = auth.authenticate(&bearer(&token)).await;
        assert!(matches!(result, Err(AuthError::InvalidIdentity(_))));

        let token = sign(&json!({ "username": 7 }));
        let result = auth.authenticate(&bearer(&token)).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn configured_claim_name() {
        let server = silent_remote().await;
        let config = AuthConfig {
            username_claim: "sub".to_string(),
            ..config_for(&server.uri())
        };
        let (resolver, store, _dir) = resolver_for(&config);
        seed_user(&store, "u-1", true);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        let token = sign(&json!({ "sub": "u-1" }));
        let result = auth.authenticate(&bearer(&token)).await.unwrap().unwrap();
        assert_eq!(result.user.uuid, uuid("u-1"));
    }

    #[tokio::test]
    async fn injected_payload_handler() {
        struct NestedHandler;

        impl PayloadHandler for NestedHandler {
            fn lookup_key(&self, claims: &Claims) -> Result<UserUuid> {
                let raw = claims
                    .get("user")
                    .and_then(|u| u.get("id"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| AuthError::MissingClaim("user.id".to_string()))?;
                Ok(UserUuid::parse(raw)?)
            }
        }

        let server = silent_remote().await;
        let config = config_for(&server.uri());
        let (resolver, store, _dir) = resolver_for(&config);
        seed_user(&store, "u-9", true);
        let auth = JwtAuthenticator::new(&config, resolver)
            .unwrap()
            .with_payload_handler(Arc::new(NestedHandler));

        let token = sign(&json!({ "user": { "id": "u-9" } }));
        let result = auth.authenticate(&bearer(&token)).await.unwrap().unwrap();
        assert_eq!(result.user.uuid, uuid("u-9"));
    }

    #[tokio::test]
    async fn inactive_user_fails() {
        let server = silent_remote().await;
        let config = config_for(&server.uri());
        let (resolver, store, _dir) = resolver_for(&config);
        seed_user(&store, "u-off", false);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        let token = sign(&json!({ "username": "u-off" }));
        let result = auth.authenticate(&bearer(&token)).await;
        assert!(matches!(result, Err(AuthError::UserInactive(_))));
    }

    #[tokio::test]
    async fn issuer_and_audience_checks() {
        let server = silent_remote().await;
        let config = AuthConfig {
            jwt_issuer: Some("https://id.example.com".to_string()),
            jwt_audience: Some("shadow".to_string()),
            ..config_for(&server.uri())
        };
        let (resolver, store, _dir) = resolver_for(&config);
        seed_user(&store, "u-1", true);
        let auth = JwtAuthenticator::new(&config, resolver).unwrap();

        let good = sign(&json!({
            "username": "u-1",
            "iss": "https://id.example.com",
            "aud": "shadow",
        }));
        assert!(auth.authenticate(&bearer(&good)).await.unwrap().is_some());

        let wrong_iss = sign(&json!({
            "username": "u-1",
            "iss": "https://evil.example.com",
            "aud": "shadow",
        }));
        assert!(matches!(
            auth.authenticate(&bearer(&wrong_iss)).await,
            Err(AuthError::InvalidIssuer)
        ));

        let wrong_aud = sign(&json!({
            "username": "u-1",
            "iss": "https://id.example.com",
            "aud": "other",
        }));
        assert!(matches!(
            auth.authenticate(&bearer(&wrong_aud)).await,
            Err(AuthError::InvalidAudience)
        ));
    }

    #[test]
    fn bad_pem_key_is_rejected() {
        let config = AuthConfig {
            jwt_algorithm: Algorithm::RS256,
            jwt_secret_key: "not a pem".to_string(),
            ..AuthConfig::default()
        };
        assert!(matches!(
            JwtDecoder::from_config(&config),
            Err(AuthError::InvalidKey(_))
        ));
    }

    #[test]
    fn empty_hmac_secret_is_rejected() {
        let config = AuthConfig {
            jwt_secret_key: String::new(),
            ..AuthConfig::default()
        };
        assert!(matches!(
            JwtDecoder::from_config(&config),
            Err(AuthError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn authenticator_rejects_invalid_config() {
        let server = silent_remote().await;
        let config = AuthConfig {
            remote_timeout_seconds: 0,
            ..config_for(&server.uri())
        };
        let (resolver, _store, _dir) = resolver_for(&config);
        assert!(matches!(
            JwtAuthenticator::new(&config, resolver),
            Err(AuthError::InvalidConfig(_))
        ));
    }
}
