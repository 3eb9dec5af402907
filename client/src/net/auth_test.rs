use super::*;

fn config() -> BackendConfig {
    BackendConfig {
        supabase_url: "https://proj.supabase.co/".to_owned(),
        supabase_anon_key: "anon".to_owned(),
        ai_assistant_url: None,
        site_url: Some("https://crm.example.com/".to_owned()),
    }
}

fn token_body(expires_at: Option<i64>) -> String {
    let mut value = serde_json::json!({
        "access_token": "acc",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "ref",
        "user": { "id": "u1", "email": "a@b.com" }
    });
    if let Some(at) = expires_at {
        value["expires_at"] = serde_json::json!(at);
    }
    value.to_string()
}

// =============================================================
// Request builders
// =============================================================

#[test]
fn password_grant_targets_token_endpoint_with_apikey() {
    let req = password_grant_request(&config(), "a@b.com", "Passw0rd").unwrap();
    assert_eq!(req.method, Method::Post);
    assert_eq!(req.url, "https://proj.supabase.co/auth/v1/token?grant_type=password");
    assert_eq!(req.header_value("apikey"), Some("anon"));
    assert_eq!(req.header_value("authorization"), None);
    let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, serde_json::json!({ "email": "a@b.com", "password": "Passw0rd" }));
}

#[test]
fn refresh_request_uses_refresh_grant() {
    let req = refresh_request(&config(), "ref").unwrap();
    assert_eq!(req.url, "https://proj.supabase.co/auth/v1/token?grant_type=refresh_token");
    let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, serde_json::json!({ "refresh_token": "ref" }));
}

#[test]
fn sign_up_carries_name_metadata_and_login_redirect() {
    let req = sign_up_request(&config(), "a@b.com", "Passw0rd", "Ada").unwrap();
    assert_eq!(
        req.url,
        "https://proj.supabase.co/auth/v1/signup?redirect_to=https%3A%2F%2Fcrm.example.com%2Flogin"
    );
    let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["data"]["name"], "Ada");
}

#[test]
fn recover_request_redirects_to_reset_page() {
    let req = recover_request(&config(), "a@b.com").unwrap();
    assert!(req.url.starts_with("https://proj.supabase.co/auth/v1/recover?redirect_to="));
    assert!(req.url.ends_with("%2Freset-password"));
}

#[test]
fn recover_request_without_site_url_has_no_query() {
    let mut cfg = config();
    cfg.site_url = None;
    let req = recover_request(&cfg, "a@b.com").unwrap();
    assert_eq!(req.url, "https://proj.supabase.co/auth/v1/recover");
}

#[test]
fn sign_out_and_update_are_bearer_authenticated() {
    let out = sign_out_request(&config(), "acc").unwrap();
    assert_eq!(out.header_value("Authorization"), Some("Bearer acc"));
    assert_eq!(out.body, None);

    let update = update_user_request(&config(), "acc", &UserUpdate::password("Passw0rd")).unwrap();
    assert_eq!(update.method, Method::Put);
    assert_eq!(update.url, "https://proj.supabase.co/auth/v1/user");
    assert_eq!(update.header_value("Authorization"), Some("Bearer acc"));
}

#[test]
fn invalid_backend_url_is_reported() {
    let mut cfg = config();
    cfg.supabase_url = "not a url".to_owned();
    assert!(matches!(password_grant_request(&cfg, "a", "b"), Err(AuthError::Network(_))));
}

// =============================================================
// Response parsers
// =============================================================

#[test]
fn parse_session_prefers_absolute_expiry() {
    let session = parse_session(&token_body(Some(5_000)), 100).unwrap();
    assert_eq!(session.expires_at, 5_000);
    assert_eq!(session.access_token, "acc");
    assert_eq!(session.refresh_token, "ref");
    assert_eq!(session.user.email.as_deref(), Some("a@b.com"));
}

#[test]
fn parse_session_derives_expiry_from_lifetime() {
    let session = parse_session(&token_body(None), 100).unwrap();
    assert_eq!(session.expires_at, 3_700);
}

#[test]
fn parse_session_rejects_garbage() {
    assert!(matches!(parse_session("{}", 0), Err(AuthError::Decode(_))));
}

#[test]
fn parse_sign_up_with_session() {
    let parsed = parse_sign_up(&token_body(Some(9)), 0).unwrap();
    assert!(matches!(parsed, SignUpResponse::Session(s) if s.expires_at == 9));
}

#[test]
fn parse_sign_up_bare_user_requires_confirmation() {
    let body = serde_json::json!({ "id": "u1", "email": "a@b.com", "confirmation_sent_at": "2024" }).to_string();
    let parsed = parse_sign_up(&body, 0).unwrap();
    assert!(matches!(parsed, SignUpResponse::ConfirmationRequired(u) if u.id == "u1"));
}

#[test]
fn parse_sign_up_nested_user_with_null_session() {
    let body = serde_json::json!({ "user": { "id": "u2" }, "session": null }).to_string();
    let parsed = parse_sign_up(&body, 0).unwrap();
    assert!(matches!(parsed, SignUpResponse::ConfirmationRequired(u) if u.id == "u2"));
}
