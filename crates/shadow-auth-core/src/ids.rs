//! Identifier types for shadow-auth.
//!
//! The remote identity service owns user identities and hands out an opaque
//! string key for each one. Locally that key replaces the username: every
//! lookup, every token claim and every remote validation call uses it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IdError;

/// The natural key of a user, as issued by the remote identity service.
///
/// Usually a hyphenated RFC 4122 UUID, but any short token made of ASCII
/// alphanumerics, `-` and `_` is accepted. The restricted alphabet keeps the
/// key safe to substitute into a URL path segment.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserUuid(String);

impl UserUuid {
    /// Maximum accepted length in bytes.
    pub const MAX_LEN: usize = 128;

    /// Parse a `UserUuid`, validating length and alphabet.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty, longer than [`Self::MAX_LEN`],
    /// or contains a character other than ASCII alphanumerics, `-` or `_`.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdError::Empty);
        }
        if value.len() > Self::MAX_LEN {
            return Err(IdError::TooLong {
                max: Self::MAX_LEN,
                got: value.len(),
            });
        }
        if let Some(c) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(IdError::InvalidCharacter(c));
        }
        Ok(Self(value))
    }

    /// Return the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the UTF-8 bytes of the key.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for UserUuid {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for UserUuid {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserUuid> for String {
    fn from(id: UserUuid) -> Self {
        id.0
    }
}

impl AsRef<str> for UserUuid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserUuid({})", self.0)
    }
}

impl fmt::Display for UserUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc4122_uuid() {
        let raw = "550e8400-e29b-41d4-a716-446655440000";
        let id: UserUuid = raw.parse().unwrap();
        assert_eq!(id.as_str(), raw);
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn parses_short_keys() {
        assert!(UserUuid::parse("u-1").is_ok());
        assert!(UserUuid::parse("user_42").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(UserUuid::parse(""), Err(IdError::Empty));
    }

    #[test]
    fn rejects_path_characters() {
        assert_eq!(
            UserUuid::parse("../admin"),
            Err(IdError::InvalidCharacter('.'))
        );
        assert_eq!(UserUuid::parse("a/b"), Err(IdError::InvalidCharacter('/')));
        assert_eq!(UserUuid::parse("a b"), Err(IdError::InvalidCharacter(' ')));
    }

    #[test]
    fn rejects_too_long() {
        let raw = "a".repeat(UserUuid::MAX_LEN + 1);
        assert!(matches!(
            UserUuid::parse(raw),
            Err(IdError::TooLong { max: 128, got: 129 })
        ));
    }

    #[test]
    fn serde_roundtrip_validates() {
        let id = UserUuid::parse("u-1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"u-1\"");

        let back: UserUuid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let bad: Result<UserUuid, _> = serde_json::from_str("\"not ok\"");
        assert!(bad.is_err());
    }
}
