//! Login page: email + password sign-in.
//!
//! On success the session store notifies before `sign_in` resolves, so the
//! route guard already sees `Authenticated` and replaces `/login` with
//! `/dashboard`. This page never navigates itself.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;

use crate::app::use_services;
use crate::components::form_field::{FormBanner, FormField};
use crate::net::error::AuthError;
use crate::pages::spawn_with;
use crate::util::validation::{FormErrors, validate_sign_in};

/// Banner text for a failed sign-in.
pub(crate) fn sign_in_error_message(err: &AuthError) -> String {
    match err {
        AuthError::EmailNotConfirmed => {
            "Please confirm your email address. Check your inbox for the confirmation link.".to_owned()
        }
        other => other.to_string(),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let services = use_services();
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let errors = RwSignal::new(FormErrors::default());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let (email_value, password_value) = match validate_sign_in(&email.get_untracked(), &password.get_untracked()) {
            Ok(credentials) => credentials,
            Err(invalid) => {
                errors.set(invalid);
                return;
            }
        };
        errors.set(FormErrors::default());
        busy.set(true);
        spawn_with(services, move |services| async move {
            if let Err(err) = services.session.sign_in(&email_value, &password_value).await {
                log::info!("sign-in failed: {err}");
                let _ = errors.try_set(FormErrors::root(sign_in_error_message(&err)));
            }
            let _ = busy.try_set(false);
        });
    };

    view! {
        <div class="auth-card">
            <h1>"Sign in"</h1>
            <p class="auth-card__subtitle">"Welcome back. Sign in to your CRM."</p>
            <FormBanner errors/>
            <form class="auth-form" on:submit=on_submit novalidate>
                <FormField label="Email" field="email" value=email errors input_type="email" autocomplete="email"/>
                <FormField
                    label="Password"
                    field="password"
                    value=password
                    errors
                    input_type="password"
                    autocomplete="current-password"
                />
                <button class="btn btn--primary auth-form__submit" type="submit" disabled=move || busy.get()>
                    {move || if busy.get() { "Signing in..." } else { "Sign in" }}
                </button>
            </form>
            <div class="auth-card__links">
                <a href="/forgot-password">"Forgot your password?"</a>
                <span>"No account? " <a href="/signup">"Create one"</a></span>
            </div>
        </div>
    }
}
