//! Error types for identifier parsing.

use thiserror::Error;

/// Errors that can occur when parsing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The identifier is empty.
    #[error("identifier is empty")]
    Empty,

    /// The identifier exceeds the maximum length.
    #[error("identifier too long: max {max} bytes, got {got}")]
    TooLong {
        /// Maximum accepted length in bytes.
        max: usize,
        /// Actual length in bytes.
        got: usize,
    },

    /// The identifier contains a character outside the accepted set.
    #[error("invalid character in identifier: {0:?}")]
    InvalidCharacter(char),
}
