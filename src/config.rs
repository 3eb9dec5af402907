//! Host configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use client::net::types::BackendConfig;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {var}")]
    Missing { var: &'static str },
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub backend: BackendConfig,
}

impl ServerConfig {
    /// Build typed host config from environment variables.
    ///
    /// Required:
    /// - `SUPABASE_URL`
    /// - `SUPABASE_ANON_KEY`
    ///
    /// Optional:
    /// - `AI_ASSISTANT_URL`: assistant page disabled when absent
    /// - `SITE_URL`: origin for password-reset links
    /// - `PORT`: default 3000
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is unset or blank,
    /// a URL does not parse as http(s), or `PORT` is not a port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            non_blank(lookup(var)).ok_or(ConfigError::Missing { var })
        };

        let supabase_url = parse_base_url("SUPABASE_URL", &required("SUPABASE_URL")?)?;
        let supabase_anon_key = required("SUPABASE_ANON_KEY")?;
        let ai_assistant_url = non_blank(lookup("AI_ASSISTANT_URL"))
            .map(|raw| parse_base_url("AI_ASSISTANT_URL", &raw))
            .transpose()?;
        let site_url = non_blank(lookup("SITE_URL"))
            .map(|raw| parse_base_url("SITE_URL", &raw))
            .transpose()?;
        let port = match non_blank(lookup("PORT")) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            backend: BackendConfig { supabase_url, supabase_anon_key, ai_assistant_url, site_url },
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Accept only absolute http(s) URLs; the trailing slash is dropped so
/// callers can append paths directly.
fn parse_base_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::Invalid { var, value: raw.to_owned() };
    let parsed = reqwest::Url::parse(raw).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(raw.trim_end_matches('/').to_owned())
}
