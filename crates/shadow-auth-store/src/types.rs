//! Domain types stored in the database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shadow_auth_core::UserUuid;

/// A local shadow user record.
///
/// The remote identity service owns the canonical profile. Profile fields
/// here are copied once when the record is created and are never refreshed
/// by the authentication path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Natural key, immutable once set.
    pub uuid: UserUuid,
    /// Email address, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Short display name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// Full display name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Inactive users never authenticate through a login backend.
    pub is_active: bool,
    /// Staff flag.
    #[serde(default)]
    pub is_staff: bool,
    /// Superuser flag.
    #[serde(default)]
    pub is_superuser: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create an active user with an empty profile.
    #[must_use]
    pub fn new(uuid: UserUuid) -> Self {
        Self {
            uuid,
            email: None,
            short_name: None,
            full_name: None,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: Utc::now(),
        }
    }
}
