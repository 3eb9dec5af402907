//! Error taxonomy for backend-as-a-service calls.
//!
//! DESIGN
//! ======
//! `AuthError` covers identity-provider failures and is shown verbatim on
//! auth forms. `ApiError` covers row-storage calls; its `Unauthorized`
//! variant is the only error that crosses into session state (it expires the
//! session, which the route guard then turns into a login redirect).

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde::Deserialize;

/// Failure reported by the auth endpoints or the transport underneath them.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Email/password pair rejected.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Account exists but the confirmation link was never followed.
    #[error("Email not confirmed")]
    EmailNotConfirmed,

    /// Sign-up attempted for an email that already has an account.
    #[error("User already registered")]
    UserAlreadyExists,

    /// Password rejected by the provider's policy.
    #[error("{0}")]
    WeakPassword(String),

    /// Operation requires an active session and there is none.
    #[error("You must be signed in to do that")]
    NotAuthenticated,

    /// Access/refresh token rejected; the local session is no longer valid.
    #[error("Your session has expired. Please sign in again.")]
    SessionExpired,

    /// Any other provider-side failure, message kept verbatim.
    #[error("{message}")]
    Provider { status: u16, message: String },

    /// Request never produced an HTTP response.
    #[error("Network error. Please check your connection and try again.")]
    Network(String),

    /// Response arrived but could not be understood.
    #[error("Unexpected response from the server: {0}")]
    Decode(String),
}

/// Failure reported by the row-storage endpoints.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Token missing, expired, or rejected.
    #[error("Your session has expired. Please sign in again.")]
    Unauthorized,

    /// Row does not exist (or is hidden by row-level security).
    #[error("Record not found")]
    NotFound,

    /// Any other non-success status with the backend's message.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// Request never produced an HTTP response.
    #[error("Network error. Please check your connection and try again.")]
    Network(String),

    /// Response body did not match the expected shape.
    #[error("Unexpected response from the server: {0}")]
    Decode(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotAuthenticated | AuthError::SessionExpired => Self::Unauthorized,
            AuthError::Network(detail) => Self::Network(detail),
            AuthError::Decode(detail) => Self::Decode(detail),
            other => Self::Backend { status: 0, message: other.to_string() },
        }
    }
}

/// Union of the shapes GoTrue uses for error bodies across versions.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl AuthErrorBody {
    fn message(&self) -> Option<String> {
        self.msg
            .clone()
            .or_else(|| self.error_description.clone())
            .or_else(|| self.message.clone())
            .or_else(|| self.error.clone())
    }
}

/// Map a non-success auth response onto [`AuthError`].
pub fn classify_auth_error(status: u16, body: &str) -> AuthError {
    let parsed: AuthErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message()
        .unwrap_or_else(|| format!("Authentication request failed ({status})"));

    match parsed.error_code.as_deref() {
        Some("invalid_credentials") => return AuthError::InvalidCredentials,
        Some("email_not_confirmed") => return AuthError::EmailNotConfirmed,
        Some("user_already_exists" | "email_exists") => return AuthError::UserAlreadyExists,
        Some("weak_password" | "same_password") => return AuthError::WeakPassword(message),
        Some("session_not_found" | "session_expired" | "refresh_token_not_found" | "refresh_token_already_used" | "bad_jwt") => {
            return AuthError::SessionExpired;
        }
        _ => {}
    }

    // Older servers only send free-text messages.
    let lowered = message.to_ascii_lowercase();
    if parsed.error.as_deref() == Some("invalid_grant") && lowered.contains("refresh token") {
        return AuthError::SessionExpired;
    }
    if lowered.contains("invalid login credentials") {
        return AuthError::InvalidCredentials;
    }
    if lowered.contains("email not confirmed") {
        return AuthError::EmailNotConfirmed;
    }
    if lowered.contains("already registered") {
        return AuthError::UserAlreadyExists;
    }
    if lowered.contains("password") && (status == 422 || lowered.contains("should")) {
        return AuthError::WeakPassword(message);
    }
    if status == 401 || status == 403 {
        return AuthError::SessionExpired;
    }
    AuthError::Provider { status, message }
}

#[derive(Debug, Default, Deserialize)]
struct RestErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// Map a non-success row-storage response onto [`ApiError`].
pub fn classify_api_error(status: u16, body: &str) -> ApiError {
    match status {
        401 => return ApiError::Unauthorized,
        404 | 406 => return ApiError::NotFound,
        _ => {}
    }
    let parsed: RestErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = match (parsed.message, parsed.details.or(parsed.hint)) {
        (Some(message), Some(extra)) => format!("{message} ({extra})"),
        (Some(message), None) => message,
        (None, _) => format!("Request failed ({status})"),
    };
    // PostgREST reports expired JWTs as 401, but some proxies rewrite to 403.
    if status == 403 && message.to_ascii_lowercase().contains("jwt") {
        return ApiError::Unauthorized;
    }
    ApiError::Backend { status, message }
}
