//! HTTP gateway for shadow-auth.
//!
//! Exposes the authentication library over axum:
//!
//! - [`AuthUser`] and [`MaybeAuthUser`] extractors backed by an
//!   authenticator chain (JWT, then OAuth2)
//! - a login endpoint backed by a backend chain
//! - user lookup by key
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use shadow_auth::AuthConfig;
//! use shadow_auth_gateway::{create_router, GatewayConfig, GatewayState};
//! use shadow_auth_store::RocksStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(RocksStore::open("/tmp/shadow-auth")?);
//! let auth = AuthConfig {
//!     jwt_secret_key: "change-me".to_string(),
//!     ..AuthConfig::default()
//! };
//!
//! let state = GatewayState::from_config(store, &auth, GatewayConfig::default())?;
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{auth_config_from_env, ConfigError, GatewayConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::GatewayState;

pub use auth::{AuthUser, MaybeAuthUser};
