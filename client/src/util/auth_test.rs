use super::*;

#[test]
fn parses_recovery_token() {
    let link = parse_recovery_fragment("#access_token=abc.def&expires_in=3600&refresh_token=r&type=recovery").unwrap();
    assert_eq!(link.access_token, "abc.def");
}

#[test]
fn fragment_without_hash_prefix_is_accepted() {
    assert!(parse_recovery_fragment("type=recovery&access_token=t").is_ok());
}

#[test]
fn non_recovery_token_is_rejected() {
    assert_eq!(
        parse_recovery_fragment("#access_token=t&type=signup"),
        Err(RecoveryLinkError::Missing)
    );
}

#[test]
fn empty_fragment_is_missing() {
    assert_eq!(parse_recovery_fragment(""), Err(RecoveryLinkError::Missing));
    assert_eq!(parse_recovery_fragment("#access_token=&type=recovery"), Err(RecoveryLinkError::Missing));
}

#[test]
fn provider_error_description_is_decoded() {
    let err = parse_recovery_fragment(
        "#error=access_denied&error_code=otp_expired&error_description=Email+link+is+invalid+or+has+expired",
    )
    .unwrap_err();
    assert_eq!(err, RecoveryLinkError::Rejected("Email link is invalid or has expired".to_owned()));
}

#[test]
fn debug_output_redacts_token() {
    let link = RecoveryLink { access_token: "secret".to_owned() };
    assert!(!format!("{link:?}").contains("secret"));
}
