//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Password-recovery emails link back to `/reset-password` with the one-time
//! token in the URL fragment. The reset page parses it here.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use url::form_urlencoded;

/// Credentials carried by a password-recovery link.
#[derive(Clone, PartialEq, Eq)]
pub struct RecoveryLink {
    pub access_token: String,
}

impl std::fmt::Debug for RecoveryLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryLink").field("access_token", &"<redacted>").finish()
    }
}

/// Why a recovery link cannot be used.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RecoveryLinkError {
    /// No token in the fragment (page opened directly).
    #[error("Invalid or missing reset link. Please request a new one.")]
    Missing,
    /// The provider redirected with an error (expired or already used).
    #[error("{0}")]
    Rejected(String),
}

/// Parse `#access_token=...&type=recovery` (leading `#` optional).
///
/// # Errors
///
/// Returns [`RecoveryLinkError::Rejected`] when the provider reported an
/// error and [`RecoveryLinkError::Missing`] when no recovery token is present.
pub fn parse_recovery_fragment(fragment: &str) -> Result<RecoveryLink, RecoveryLinkError> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut access_token = None;
    let mut kind = None;
    let mut error = None;
    let mut error_description = None;
    for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
        match key.as_ref() {
            "access_token" => access_token = Some(value.into_owned()),
            "type" => kind = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(RecoveryLinkError::Rejected(error_description.unwrap_or(error)));
    }
    match (access_token, kind.as_deref()) {
        (Some(access_token), Some("recovery")) if !access_token.is_empty() => Ok(RecoveryLink { access_token }),
        _ => Err(RecoveryLinkError::Missing),
    }
}

/// Current `location.hash`, empty outside the browser.
#[must_use]
pub fn location_fragment() -> String {
    #[cfg(feature = "hydrate")]
    {
        web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default()
    }
    #[cfg(not(feature = "hydrate"))]
    {
        String::new()
    }
}

/// Drop the token-bearing fragment from the address bar.
pub fn clear_location_fragment() {
    #[cfg(feature = "hydrate")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_hash("");
        }
    }
}
