//! Host-server endpoints and the AI assistant endpoint.
//!
//! ERROR HANDLING
//! ==============
//! Callers get `Result` outputs instead of panics so a missing config or an
//! unreachable assistant degrades the UI without crashing hydration.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::Deserialize;

use super::error::ApiError;
use super::http::{self, HttpRequest, Method};
use super::types::BackendConfig;

const CONFIG_ENDPOINT: &str = "/api/config";

/// Fetch the backend configuration published by the host server.
///
/// # Errors
///
/// Returns [`ApiError`] if the request fails or the payload is incomplete.
pub async fn fetch_backend_config() -> Result<BackendConfig, ApiError> {
    let response = http::send(HttpRequest::new(Method::Get, CONFIG_ENDPOINT))
        .await
        .map_err(ApiError::Network)?;
    if !response.is_success() {
        return Err(ApiError::Backend {
            status: response.status,
            message: format!("config request failed: {}", response.status),
        });
    }
    parse_backend_config(&response.body)
}

pub(crate) fn parse_backend_config(body: &str) -> Result<BackendConfig, ApiError> {
    let config: BackendConfig = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    if config.supabase_url.trim().is_empty() || config.supabase_anon_key.trim().is_empty() {
        return Err(ApiError::Decode("backend url and key are required".to_owned()));
    }
    Ok(config)
}

// =============================================================================
// AI ASSISTANT
// =============================================================================

/// One turn of assistant conversation as sent upstream.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct AssistantTurn {
    pub role: String,
    pub content: String,
}

pub(crate) fn assistant_request(
    url: &str,
    access_token: &str,
    message: &str,
    history: &[AssistantTurn],
) -> HttpRequest {
    HttpRequest::new(Method::Post, url)
        .bearer(access_token)
        .json_body(&serde_json::json!({ "message": message, "history": history }))
}

#[derive(Deserialize)]
struct AssistantReply {
    #[serde(default)]
    reply: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

pub(crate) fn parse_assistant_reply(body: &str) -> Result<String, ApiError> {
    let reply: AssistantReply = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    reply
        .reply
        .or(reply.message)
        .or(reply.content)
        .ok_or_else(|| ApiError::Decode("assistant reply missing text".to_owned()))
}

/// Send a chat message to the assistant endpoint and return its reply text.
///
/// # Errors
///
/// Returns [`ApiError`] on transport, status, or decode failure.
pub async fn ask_assistant(
    url: &str,
    access_token: &str,
    message: &str,
    history: &[AssistantTurn],
) -> Result<String, ApiError> {
    let response = http::send(assistant_request(url, access_token, message, history))
        .await
        .map_err(ApiError::Network)?;
    if !response.is_success() {
        return Err(super::error::classify_api_error(response.status, &response.body));
    }
    parse_assistant_reply(&response.body)
}
