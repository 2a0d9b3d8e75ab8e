//! Key encoding utilities for `RocksDB`.

use shadow_auth_core::UserUuid;

/// Encode a user key (the UTF-8 bytes of the `uuid`).
///
/// Keys compare byte-for-byte, so lookups are exact-match and case-sensitive.
#[must_use]
pub fn user_key(uuid: &UserUuid) -> Vec<u8> {
    uuid.as_bytes().to_vec()
}
