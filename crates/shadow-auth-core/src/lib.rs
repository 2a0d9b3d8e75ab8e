//! Core types for shadow-auth.
//!
//! This crate provides the identifier shared by every other crate: the
//! [`UserUuid`] natural key that links a local shadow user record to its
//! identity in the remote identity service.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;

pub use error::IdError;
pub use ids::UserUuid;
