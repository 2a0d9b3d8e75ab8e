//! `RocksDB` storage for shadow-auth local user records.
//!
//! The local store keeps only a minimal shadow record per remote identity,
//! keyed by its [`UserUuid`]. The remote identity service stays the source of
//! truth for credentials and profile data.
//!
//! # Architecture
//!
//! The storage uses a single column family:
//!
//! - `users`: shadow user records, keyed by the UTF-8 bytes of `uuid`
//!
//! # Example
//!
//! ```no_run
//! use shadow_auth_store::{RocksStore, User, UserStore};
//! use shadow_auth_core::UserUuid;
//!
//! let store = RocksStore::open("/tmp/shadow-auth-db").unwrap();
//!
//! let uuid: UserUuid = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
//! store.create_user(&User::new(uuid.clone())).unwrap();
//! assert!(store.get_user(&uuid).unwrap().is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;
pub mod types;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;
pub use types::User;

use shadow_auth_core::UserUuid;

/// The storage trait for local user records.
///
/// Users are only ever read or created here. Nothing in the authentication
/// path updates or deletes a record.
pub trait UserStore: Send + Sync {
    /// Get a user by exact-match `uuid`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user(&self, uuid: &UserUuid) -> Result<Option<User>>;

    /// Get a user by exact-match `uuid`, only if the user is active.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_active_user(&self, uuid: &UserUuid) -> Result<Option<User>> {
        Ok(self.get_user(uuid)?.filter(|user| user.is_active))
    }

    /// Insert a new user record.
    ///
    /// The insert is atomic with respect to other `create_user` calls: at most
    /// one record per `uuid` is ever written.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if a user with the same `uuid`
    /// exists, or an error if the database operation fails.
    fn create_user(&self, user: &User) -> Result<()>;

    /// Count all stored users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn count_users(&self) -> Result<u64>;
}
