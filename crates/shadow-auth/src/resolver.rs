//! Local identity resolution.
//!
//! Maps a remote identity key to its local shadow record. The resolver is the
//! only component that creates users, and it only does so after the identity
//! service has confirmed the key.

use std::sync::Arc;

use shadow_auth_core::UserUuid;
use shadow_auth_store::{StoreError, User, UserStore};

use crate::error::ResolveError;
use crate::remote::IdentityClient;

/// Finds local users by key, provisioning them on first touch.
pub struct IdentityResolver<S, C> {
    store: Arc<S>,
    client: Arc<C>,
}

impl<S, C> IdentityResolver<S, C>
where
    S: UserStore,
    C: IdentityClient,
{
    /// Create a new resolver.
    #[must_use]
    pub fn new(store: Arc<S>, client: Arc<C>) -> Self {
        Self { store, client }
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a reference to the identity client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Exact-match lookup. Never creates a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn find(&self, uuid: &UserUuid) -> Result<Option<User>, StoreError> {
        self.store.get_user(uuid)
    }

    /// Exact-match lookup restricted to active users. Never creates a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn find_active(&self, uuid: &UserUuid) -> Result<Option<User>, StoreError> {
        self.store.get_active_user(uuid)
    }

    /// Return the local user for `uuid`, creating it if the identity service
    /// confirms the key.
    ///
    /// An existing record is returned unchanged. When two calls race to create
    /// the same record, the loser re-reads and returns the winner's record.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::UserNotFound` if there is no local record and the
    /// identity service does not confirm `uuid` (including when it is
    /// unreachable), or `ResolveError::Store` if the store fails.
    pub async fn resolve_or_create(&self, uuid: &UserUuid) -> Result<User, ResolveError> {
        if let Some(user) = self.store.get_user(uuid)? {
            return Ok(user);
        }

        let Some(data) = self.client.validate_uuid(uuid).await else {
            tracing::info!(uuid = %uuid, "Identity service did not confirm unknown uuid");
            return Err(ResolveError::UserNotFound(uuid.clone()));
        };

        let user = data.into_user();
        match self.store.create_user(&user) {
            Ok(()) => {
                tracing::info!(uuid = %uuid, "Provisioned shadow user");
                Ok(user)
            }
            Err(StoreError::AlreadyExists(_)) => {
                tracing::debug!(uuid = %uuid, "Shadow user created concurrently, re-reading");
                self.store.get_user(uuid)?.ok_or_else(|| {
                    ResolveError::Store(StoreError::Database(format!(
                        "user {uuid} reported as existing but not found"
                    )))
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
