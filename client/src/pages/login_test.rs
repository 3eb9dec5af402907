use super::*;

#[test]
fn unconfirmed_email_gets_actionable_message() {
    let message = sign_in_error_message(&AuthError::EmailNotConfirmed);
    assert!(message.contains("confirm your email"));
}

#[test]
fn other_errors_are_shown_verbatim() {
    assert_eq!(sign_in_error_message(&AuthError::InvalidCredentials), "Invalid login credentials");
    assert_eq!(
        sign_in_error_message(&AuthError::Network("dns".to_owned())),
        "Network error. Please check your connection and try again."
    );
}
