//! Identity-provider client (GoTrue-compatible `/auth/v1` endpoints).
//!
//! ARCHITECTURE
//! ============
//! [`AuthBackend`] is the seam the session store is written against. The
//! production implementation, [`SupabaseAuth`], builds requests and parses
//! responses with pure functions and hands the bytes to [`super::http`].
//! Tests substitute an in-memory backend.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use serde::Deserialize;

use super::error::{AuthError, classify_auth_error};
use super::http::{self, HttpRequest, HttpResponse, Method};
use super::types::{BackendConfig, Session, User, UserUpdate};

/// Fallback access-token lifetime when the provider omits both expiry fields.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Outcome of a sign-up request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignUpResponse {
    /// Auto-confirm is on; the account is usable immediately.
    Session(Session),
    /// A confirmation email was sent; no session yet.
    ConfirmationRequired(User),
}

/// Operations the session store needs from the identity provider.
#[allow(async_fn_in_trait)]
pub trait AuthBackend {
    /// Exchange email + password for a session.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Register a new account with a display name.
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<SignUpResponse, AuthError>;

    /// Exchange a refresh token for a new session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Send a password-recovery email.
    async fn recover_password(&self, email: &str) -> Result<(), AuthError>;

    /// Update attributes of the user owning `access_token`.
    async fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<User, AuthError>;
}

/// Production [`AuthBackend`] talking to a hosted project.
#[derive(Clone, Debug)]
pub struct SupabaseAuth {
    config: BackendConfig,
}

impl SupabaseAuth {
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, AuthError> {
        let response = http::send(request).await.map_err(AuthError::Network)?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(classify_auth_error(response.status, &response.body))
        }
    }
}

impl AuthBackend for SupabaseAuth {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let response = self.execute(password_grant_request(&self.config, email, password)?).await?;
        parse_session(&response.body, crate::util::time::now_secs())
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<SignUpResponse, AuthError> {
        let response = self.execute(sign_up_request(&self.config, email, password, name)?).await?;
        parse_sign_up(&response.body, crate::util::time::now_secs())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let response = self.execute(refresh_request(&self.config, refresh_token)?).await?;
        parse_session(&response.body, crate::util::time::now_secs())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.execute(sign_out_request(&self.config, access_token)?).await?;
        Ok(())
    }

    async fn recover_password(&self, email: &str) -> Result<(), AuthError> {
        self.execute(recover_request(&self.config, email)?).await?;
        Ok(())
    }

    async fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<User, AuthError> {
        let response = self.execute(update_user_request(&self.config, access_token, update)?).await?;
        serde_json::from_str(&response.body).map_err(|e| AuthError::Decode(e.to_string()))
    }
}

// =============================================================================
// REQUEST BUILDERS
// =============================================================================

fn auth_url(config: &BackendConfig, path: &str, query: &[(&str, &str)]) -> Result<String, AuthError> {
    let raw = format!("{}/auth/v1/{path}", config.supabase_url.trim_end_matches('/'));
    let mut url = url::Url::parse(&raw).map_err(|e| AuthError::Network(format!("invalid backend url: {e}")))?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url.into())
}

fn base_request(config: &BackendConfig, method: Method, url: String) -> HttpRequest {
    HttpRequest::new(method, url).header("apikey", &config.supabase_anon_key)
}

/// Redirect target embedded in emailed links, when a site URL is known.
fn site_link(config: &BackendConfig, path: &str) -> Option<String> {
    config
        .site_url
        .as_deref()
        .map(|site| format!("{}{path}", site.trim_end_matches('/')))
}

pub(crate) fn password_grant_request(
    config: &BackendConfig,
    email: &str,
    password: &str,
) -> Result<HttpRequest, AuthError> {
    let url = auth_url(config, "token", &[("grant_type", "password")])?;
    Ok(base_request(config, Method::Post, url)
        .json_body(&serde_json::json!({ "email": email, "password": password })))
}

pub(crate) fn refresh_request(config: &BackendConfig, refresh_token: &str) -> Result<HttpRequest, AuthError> {
    let url = auth_url(config, "token", &[("grant_type", "refresh_token")])?;
    Ok(base_request(config, Method::Post, url).json_body(&serde_json::json!({ "refresh_token": refresh_token })))
}

pub(crate) fn sign_up_request(
    config: &BackendConfig,
    email: &str,
    password: &str,
    name: &str,
) -> Result<HttpRequest, AuthError> {
    let redirect = site_link(config, "/login");
    let query: Vec<(&str, &str)> = redirect.as_deref().map(|r| ("redirect_to", r)).into_iter().collect();
    let url = auth_url(config, "signup", &query)?;
    Ok(base_request(config, Method::Post, url).json_body(&serde_json::json!({
        "email": email,
        "password": password,
        "data": { "name": name },
    })))
}

pub(crate) fn sign_out_request(config: &BackendConfig, access_token: &str) -> Result<HttpRequest, AuthError> {
    let url = auth_url(config, "logout", &[])?;
    Ok(base_request(config, Method::Post, url).bearer(access_token))
}

pub(crate) fn recover_request(config: &BackendConfig, email: &str) -> Result<HttpRequest, AuthError> {
    let redirect = site_link(config, "/reset-password");
    let query: Vec<(&str, &str)> = redirect.as_deref().map(|r| ("redirect_to", r)).into_iter().collect();
    let url = auth_url(config, "recover", &query)?;
    Ok(base_request(config, Method::Post, url).json_body(&serde_json::json!({ "email": email })))
}

pub(crate) fn update_user_request(
    config: &BackendConfig,
    access_token: &str,
    update: &UserUpdate,
) -> Result<HttpRequest, AuthError> {
    let url = auth_url(config, "user", &[])?;
    let body = serde_json::to_value(update).map_err(|e| AuthError::Decode(e.to_string()))?;
    Ok(base_request(config, Method::Put, url).bearer(access_token).json_body(&body))
}

// =============================================================================
// RESPONSE PARSERS
// =============================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

/// Parse a token-grant response body into a [`Session`].
pub(crate) fn parse_session(body: &str, now: i64) -> Result<Session, AuthError> {
    let token: TokenResponse = serde_json::from_str(body).map_err(|e| AuthError::Decode(e.to_string()))?;
    let expires_at = token
        .expires_at
        .or_else(|| token.expires_in.map(|secs| now + secs))
        .unwrap_or(now + DEFAULT_TOKEN_LIFETIME_SECS);
    Ok(Session {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at,
        user: token.user,
    })
}

/// Parse a sign-up response; the provider returns either a session or the
/// bare (unconfirmed) user depending on its auto-confirm setting.
pub(crate) fn parse_sign_up(body: &str, now: i64) -> Result<SignUpResponse, AuthError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| AuthError::Decode(e.to_string()))?;
    if value.get("access_token").is_some_and(|token| !token.is_null()) {
        return parse_session(body, now).map(SignUpResponse::Session);
    }
    let user_value = match value.get("user") {
        Some(user) if !user.is_null() => user.clone(),
        _ => value,
    };
    serde_json::from_value(user_value)
        .map(SignUpResponse::ConfirmationRequired)
        .map_err(|e| AuthError::Decode(e.to_string()))
}
