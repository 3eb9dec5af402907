use super::*;

fn user_with(name: Option<&str>, email: Option<&str>) -> User {
    User {
        id: "u1".to_owned(),
        email: email.map(str::to_owned),
        user_metadata: UserMetadata { name: name.map(str::to_owned) },
        email_confirmed_at: None,
        created_at: None,
        last_sign_in_at: None,
    }
}

// =============================================================
// User
// =============================================================

#[test]
fn user_decodes_gotrue_payload_with_extra_fields() {
    let user: User = serde_json::from_value(serde_json::json!({
        "id": "0b6f",
        "aud": "authenticated",
        "role": "authenticated",
        "email": "a@b.com",
        "email_confirmed_at": "2024-01-02T03:04:05Z",
        "created_at": "2024-01-01T00:00:00Z",
        "last_sign_in_at": "2024-02-01T00:00:00Z",
        "user_metadata": { "name": "Ada", "avatar": "x" },
        "app_metadata": { "provider": "email" }
    }))
    .unwrap();
    assert_eq!(user.id, "0b6f");
    assert_eq!(user.user_metadata.name.as_deref(), Some("Ada"));
    assert!(user.is_email_verified());
}

#[test]
fn user_decodes_minimal_payload() {
    let user: User = serde_json::from_value(serde_json::json!({ "id": "u1" })).unwrap();
    assert_eq!(user.email, None);
    assert_eq!(user.user_metadata, UserMetadata::default());
    assert!(!user.is_email_verified());
}

#[test]
fn display_name_prefers_metadata_then_email() {
    assert_eq!(user_with(Some("Ada"), Some("a@b.com")).display_name(), "Ada");
    assert_eq!(user_with(Some("   "), Some("a@b.com")).display_name(), "a@b.com");
    assert_eq!(user_with(None, None).display_name(), "User");
}

#[test]
fn initial_is_uppercased_first_char() {
    assert_eq!(user_with(Some("ada"), None).initial(), "A");
    assert_eq!(user_with(None, Some("zed@b.com")).initial(), "Z");
}

// =============================================================
// Session
// =============================================================

#[test]
fn session_expires_within_margin() {
    let session = Session {
        access_token: "a".to_owned(),
        refresh_token: "r".to_owned(),
        expires_at: 1_000,
        user: user_with(None, None),
    };
    assert!(session.expires_within(950, 60));
    assert!(!session.expires_within(900, 60));
    assert!(session.expires_within(2_000, 60));
}

#[test]
fn session_debug_redacts_tokens() {
    let session = Session {
        access_token: "secret-access".to_owned(),
        refresh_token: "secret-refresh".to_owned(),
        expires_at: 1,
        user: user_with(None, None),
    };
    let printed = format!("{session:?}");
    assert!(!printed.contains("secret-access"));
    assert!(!printed.contains("secret-refresh"));
}

// =============================================================
// UserUpdate
// =============================================================

#[test]
fn user_update_password_omits_data() {
    let value = serde_json::to_value(UserUpdate::password("Passw0rd")).unwrap();
    assert_eq!(value, serde_json::json!({ "password": "Passw0rd" }));
}

#[test]
fn user_update_display_name_trims() {
    let value = serde_json::to_value(UserUpdate::display_name("  Ada  ")).unwrap();
    assert_eq!(value, serde_json::json!({ "data": { "name": "Ada" } }));
}

// =============================================================
// Records
// =============================================================

#[test]
fn communication_maps_type_column() {
    let row: Communication = serde_json::from_value(serde_json::json!({
        "id": "c1",
        "type": "call",
        "subject": "Intro"
    }))
    .unwrap();
    assert_eq!(row.kind.as_deref(), Some("call"));
}

#[test]
fn contact_input_from_contact_copies_editable_fields() {
    let contact = Contact {
        id: "c1".to_owned(),
        name: "Ada".to_owned(),
        email: "ada@example.com".to_owned(),
        phone: Some("555".to_owned()),
        company: Some("Acme".to_owned()),
        job_title: None,
        notes: None,
        created_at: Some("2024-01-01".to_owned()),
    };
    let input = ContactInput::from(&contact);
    assert_eq!(input.name, "Ada");
    assert_eq!(input.company.as_deref(), Some("Acme"));
}
