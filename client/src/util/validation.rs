//! Local form validation.
//!
//! Violations become [`ValidationError`]s attached to a named field and are
//! never sent to the backend. Backend failures go into [`FormErrors::root`].

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

use crate::net::types::ContactInput;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_NAME_LEN: usize = 2;

/// A single field-level violation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: &str) -> Self {
        Self { field, message: message.to_owned() }
    }
}

/// Errors collected for one form submission.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub fields: Vec<ValidationError>,
    /// Banner-level message (backend or transport failure).
    pub root: Option<String>,
}

impl FormErrors {
    #[must_use]
    pub fn root(message: impl Into<String>) -> Self {
        Self { fields: Vec::new(), root: Some(message.into()) }
    }

    /// First message recorded for `field`.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<String> {
        self.fields
            .iter()
            .find(|err| err.field == field)
            .map(|err| err.message.clone())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.root.is_none()
    }

    fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(err) = result {
            self.fields.push(err);
        }
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

// =============================================================================
// FIELD RULES
// =============================================================================

/// Require a non-blank value.
///
/// # Errors
///
/// Returns `message` against `field` when `value` is blank.
pub fn require(field: &'static str, value: &str, message: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, message));
    }
    Ok(())
}

/// Require a plausible email address (`local@domain.tld`).
///
/// # Errors
///
/// Returns a violation when blank or malformed.
pub fn validate_email(field: &'static str, email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    require(field, email, "Email is required")?;
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain
                .split_once('.')
                .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            && !email.chars().any(char::is_whitespace)
    });
    if !valid {
        return Err(ValidationError::new(field, "Invalid email address"));
    }
    Ok(())
}

/// Password policy: length plus lowercase, uppercase, and digit.
///
/// # Errors
///
/// Returns the first rule violated.
pub fn validate_password_policy(field: &'static str, password: &str) -> Result<(), ValidationError> {
    require(field, password, "Password is required")?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(field, "Password must be at least 8 characters"));
    }
    let has_lower = password.chars().any(char::is_lowercase);
    let has_upper = password.chars().any(char::is_uppercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Err(ValidationError::new(
            field,
            "Password must contain at least one uppercase letter, one lowercase letter, and one number",
        ));
    }
    Ok(())
}

/// Confirmation must be present and equal to `password`.
///
/// # Errors
///
/// Returns a violation against `field` on mismatch.
pub fn validate_confirmation(field: &'static str, password: &str, confirm: &str) -> Result<(), ValidationError> {
    require(field, confirm, "Please confirm your password")?;
    if password != confirm {
        return Err(ValidationError::new(field, "Passwords do not match"));
    }
    Ok(())
}

/// Display names need at least two visible characters.
///
/// # Errors
///
/// Returns a violation when blank or too short.
pub fn validate_display_name(field: &'static str, name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    require(field, name, "Name is required")?;
    if name.chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::new(field, "Name must be at least 2 characters"));
    }
    Ok(())
}

// =============================================================================
// FORMS
// =============================================================================

/// Validated sign-in credentials (email trimmed).
///
/// # Errors
///
/// Returns per-field errors.
pub fn validate_sign_in(email: &str, password: &str) -> Result<(String, String), FormErrors> {
    let mut errors = FormErrors::default();
    errors.check(validate_email("email", email));
    errors.check(require("password", password, "Password is required"));
    errors.into_result((email.trim().to_owned(), password.to_owned()))
}

/// Validated sign-up input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignUpInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// # Errors
///
/// Returns per-field errors.
pub fn validate_sign_up(name: &str, email: &str, password: &str, confirm: &str) -> Result<SignUpInput, FormErrors> {
    let mut errors = FormErrors::default();
    errors.check(validate_display_name("name", name));
    errors.check(validate_email("email", email));
    errors.check(validate_password_policy("password", password));
    errors.check(validate_confirmation("confirm_password", password, confirm));
    errors.into_result(SignUpInput {
        name: name.trim().to_owned(),
        email: email.trim().to_owned(),
        password: password.to_owned(),
    })
}

/// # Errors
///
/// Returns per-field errors.
pub fn validate_forgot_password(email: &str) -> Result<String, FormErrors> {
    let mut errors = FormErrors::default();
    errors.check(validate_email("email", email));
    errors.into_result(email.trim().to_owned())
}

/// New password + confirmation (reset flow).
///
/// # Errors
///
/// Returns per-field errors.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<String, FormErrors> {
    let mut errors = FormErrors::default();
    errors.check(validate_password_policy("new_password", password));
    errors.check(validate_confirmation("confirm_password", password, confirm));
    errors.into_result(password.to_owned())
}

/// Profile password change: current password required, new one per policy.
///
/// # Errors
///
/// Returns per-field errors.
pub fn validate_password_change(current: &str, password: &str, confirm: &str) -> Result<String, FormErrors> {
    let mut errors = FormErrors::default();
    errors.check(require("current_password", current, "Current password is required"));
    errors.check(validate_password_policy("new_password", password));
    errors.check(validate_confirmation("confirm_password", password, confirm));
    errors.into_result(password.to_owned())
}

/// # Errors
///
/// Returns per-field errors.
pub fn validate_profile(name: &str) -> Result<String, FormErrors> {
    let mut errors = FormErrors::default();
    errors.check(validate_display_name("name", name));
    errors.into_result(name.trim().to_owned())
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_owned)
}

/// Normalize a contact form: required name + email, blanks become `None`.
///
/// # Errors
///
/// Returns per-field errors.
pub fn validate_contact(input: &ContactInput) -> Result<ContactInput, FormErrors> {
    let mut errors = FormErrors::default();
    errors.check(require("name", &input.name, "Name is required"));
    errors.check(validate_email("email", &input.email));
    errors.into_result(ContactInput {
        name: input.name.trim().to_owned(),
        email: input.email.trim().to_owned(),
        phone: non_blank(input.phone.as_ref()),
        company: non_blank(input.company.as_ref()),
        job_title: non_blank(input.job_title.as_ref()),
        notes: non_blank(input.notes.as_ref()),
    })
}
