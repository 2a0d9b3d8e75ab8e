//! Shared fixtures for unit tests.

use std::sync::Arc;

use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use shadow_auth_core::UserUuid;
use shadow_auth_store::{RocksStore, User, UserStore};
use tempfile::TempDir;

use crate::config::AuthConfig;
use crate::remote::HttpIdentityClient;
use crate::resolver::IdentityResolver;

pub const SECRET: &str = "test-secret";

pub type TestResolver = IdentityResolver<RocksStore, HttpIdentityClient>;

/// Config pointing both identity endpoints at `base_url`.
pub fn config_for(base_url: &str) -> AuthConfig {
    AuthConfig {
        jwt_secret_key: SECRET.to_string(),
        validate_uuid_url: format!("{base_url}/api/accounts/users/{{uuid}}/"),
        oauth_domain: base_url.to_string(),
        oauth_user_info_path: "/api/oauth/me/".to_string(),
        ..AuthConfig::default()
    }
}

pub fn resolver_for(config: &AuthConfig) -> (Arc<TestResolver>, Arc<RocksStore>, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(RocksStore::open(dir.path()).unwrap());
    let client = Arc::new(HttpIdentityClient::new(config.clone()));
    let resolver = Arc::new(IdentityResolver::new(Arc::clone(&store), client));
    (resolver, store, dir)
}

pub fn uuid(raw: &str) -> UserUuid {
    UserUuid::parse(raw).unwrap()
}

pub fn seed_user(store: &RocksStore, raw: &str, is_active: bool) -> User {
    let mut user = User::new(uuid(raw));
    user.is_active = is_active;
    store.create_user(&user).unwrap();
    user
}

pub fn sign(claims: &Value) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    headers
}
