//! Bearer-token authentication backed by a remote identity service.
//!
//! Requests carry either a signed JWT or an opaque OAuth2 access token. The
//! token is validated (locally for JWTs, remotely for OAuth2 tokens) and the
//! resulting identity key is mapped to a local shadow [`User`], which is
//! lazily provisioned the first time a remotely confirmed key is seen.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────────────────────────┐
//! │   Host server    │────▶│ Authenticator / Backend (entry)      │
//! │   (HTTP)         │     └───────┬──────────────────┬───────────┘
//! └──────────────────┘             │                  │
//!                          ┌───────▼───────┐  ┌───────▼────────┐
//!                          │ JwtAuthenti-  │  │ OAuth2Authenti-│
//!                          │ cator         │  │ cator / Backend│
//!                          └───────┬───────┘  └───────┬────────┘
//!                                  │ extract_token    │
//!                          ┌───────▼──────────────────▼────────┐
//!                          │        IdentityResolver           │
//!                          │   (find / resolve_or_create)      │
//!                          └───────┬──────────────────┬────────┘
//!                                  │                  │ HTTP
//!                          ┌───────▼───────┐  ┌───────▼────────┐
//!                          │   UserStore   │  │ IdentityClient │
//!                          │   (RocksDB)   │  │ (remote IdP)   │
//!                          └───────────────┘  └────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use shadow_auth::{
//!     AuthConfig, Authenticator, HttpIdentityClient, IdentityResolver, JwtAuthenticator,
//! };
//! use shadow_auth_store::RocksStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig {
//!     jwt_secret_key: "change-me".to_string(),
//!     ..AuthConfig::default()
//! };
//!
//! let store = Arc::new(RocksStore::open("/tmp/shadow-auth")?);
//! let client = Arc::new(HttpIdentityClient::new(config.clone()));
//! let resolver = Arc::new(IdentityResolver::new(store, client));
//! let jwt = JwtAuthenticator::new(&config, resolver)?;
//!
//! let mut headers = http::HeaderMap::new();
//! headers.insert(http::header::AUTHORIZATION, "Bearer eyJhbGciOi...".parse()?);
//!
//! if let Some(authenticated) = jwt.authenticate(&headers).await? {
//!     println!("Authenticated {}", authenticated.user.uuid);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod entry;
pub mod error;
pub mod extract;
pub mod jwt;
pub mod oauth;
pub mod remote;
pub mod resolver;

#[cfg(test)]
mod test_support;

pub use config::AuthConfig;
pub use entry::{Authenticated, Authenticator, AuthenticatorChain, Backend, BackendChain};
pub use error::{AuthError, RemoteError, ResolveError, Result};
pub use extract::{extract_token, ExtractMode, TokenSource};
pub use jwt::{ClaimPayloadHandler, Claims, JwtAuthenticator, JwtDecoder, PayloadHandler};
pub use oauth::{OAuth2Authenticator, OAuth2Backend};
pub use remote::{HttpIdentityClient, IdentityClient, RemoteUserData};
pub use resolver::IdentityResolver;

pub use shadow_auth_core::UserUuid;
pub use shadow_auth_store::User;
