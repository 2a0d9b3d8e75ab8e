//! Token extraction from request headers.
//!
//! The same parsing backs two call sites. A mandatory authenticator wants a
//! malformed header reported so it can answer 401, while an optional login
//! backend wants to quietly decline and let the next backend try. The
//! [`ExtractMode`] selects between the two.

use http::header::{AUTHORIZATION, COOKIE};
use http::HeaderMap;

use crate::error::{AuthError, Result};

/// How malformed `Authorization` headers are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Malformed headers fail with `AuthError::MalformedCredentials`.
    Strict,
    /// Malformed headers are treated as absent.
    Lenient,
}

/// Where a token may be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSource {
    /// Scheme word expected before the token, compared case-insensitively.
    pub header_prefix: String,
    /// Cookie read when the request carries no `Authorization` header.
    pub cookie_name: Option<String>,
}

impl Default for TokenSource {
    fn default() -> Self {
        Self {
            header_prefix: "Bearer".to_string(),
            cookie_name: None,
        }
    }
}

/// Extract the raw token from a request.
///
/// Returns `Ok(None)` when the scheme does not apply: no header and no
/// cookie, or a header with a different scheme word.
///
/// # Errors
///
/// In [`ExtractMode::Strict`] only, returns `AuthError::MalformedCredentials`
/// when the header has the configured scheme but no token, more than one
/// token segment, or non-ASCII bytes.
pub fn extract_token(
    headers: &HeaderMap,
    source: &TokenSource,
    mode: ExtractMode,
) -> Result<Option<String>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(cookie_token(headers, source));
    };

    let Ok(value) = value.to_str() else {
        return malformed(
            mode,
            "Invalid Authorization header. Credentials string should only contain ASCII characters.",
        );
    };

    let segments: Vec<&str> = value.split_ascii_whitespace().collect();
    let Some(scheme) = segments.first() else {
        return Ok(cookie_token(headers, source));
    };

    if !scheme.eq_ignore_ascii_case(&source.header_prefix) {
        return Ok(None);
    }

    match segments.as_slice() {
        [_, token] => Ok(Some((*token).to_string())),
        [_] => malformed(
            mode,
            "Invalid Authorization header. No credentials provided.",
        ),
        _ => malformed(
            mode,
            "Invalid Authorization header. Credentials string should not contain spaces.",
        ),
    }
}

fn malformed(mode: ExtractMode, message: &str) -> Result<Option<String>> {
    match mode {
        ExtractMode::Strict => Err(AuthError::MalformedCredentials(message.to_string())),
        ExtractMode::Lenient => {
            tracing::debug!(reason = message, "Ignoring malformed Authorization header");
            Ok(None)
        }
    }
}

/// Read the fallback cookie, verbatim. Empty values are returned as-is.
fn cookie_token(headers: &HeaderMap, source: &TokenSource) -> Option<String> {
    let name = source.cookie_name.as_deref()?;

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
