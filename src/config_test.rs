use std::collections::HashMap;

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

const BASE: [(&str, &str); 2] = [("SUPABASE_URL", "https://demo.supabase.co/"), ("SUPABASE_ANON_KEY", "anon-key")];

#[test]
fn minimal_env_uses_defaults() {
    let config = ServerConfig::from_lookup(env(&BASE)).unwrap();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.backend.supabase_url, "https://demo.supabase.co");
    assert_eq!(config.backend.supabase_anon_key, "anon-key");
    assert_eq!(config.backend.ai_assistant_url, None);
    assert_eq!(config.backend.site_url, None);
}

#[test]
fn missing_url_is_reported_by_name() {
    let err = ServerConfig::from_lookup(env(&[("SUPABASE_ANON_KEY", "anon-key")])).unwrap_err();
    assert_eq!(err, ConfigError::Missing { var: "SUPABASE_URL" });
}

#[test]
fn blank_key_counts_as_missing() {
    let err = ServerConfig::from_lookup(env(&[("SUPABASE_URL", "https://demo.supabase.co"), ("SUPABASE_ANON_KEY", "   ")]))
        .unwrap_err();
    assert_eq!(err, ConfigError::Missing { var: "SUPABASE_ANON_KEY" });
}

#[test]
fn non_http_url_is_invalid() {
    let err = ServerConfig::from_lookup(env(&[("SUPABASE_URL", "ftp://demo"), ("SUPABASE_ANON_KEY", "k")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "SUPABASE_URL", .. }));
}

#[test]
fn optional_values_are_parsed() {
    let mut pairs = BASE.to_vec();
    pairs.extend([
        ("AI_ASSISTANT_URL", "https://assistant.example.com/chat"),
        ("SITE_URL", "https://crm.example.com/"),
        ("PORT", "8080"),
    ]);
    let config = ServerConfig::from_lookup(env(&pairs)).unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.backend.ai_assistant_url.as_deref(), Some("https://assistant.example.com/chat"));
    assert_eq!(config.backend.site_url.as_deref(), Some("https://crm.example.com"));
}

#[test]
fn blank_optional_url_is_absent() {
    let mut pairs = BASE.to_vec();
    pairs.push(("AI_ASSISTANT_URL", ""));
    let config = ServerConfig::from_lookup(env(&pairs)).unwrap();
    assert_eq!(config.backend.ai_assistant_url, None);
}

#[test]
fn bad_port_is_invalid() {
    let mut pairs = BASE.to_vec();
    pairs.push(("PORT", "99999"));
    let err = ServerConfig::from_lookup(env(&pairs)).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { var: "PORT", value: "99999".into() });
}
