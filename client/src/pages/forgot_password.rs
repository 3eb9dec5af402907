//! Forgot-password page: request a recovery email.
//!
//! The confirmation text is the same whether or not an account exists.

use leptos::prelude::*;

use crate::app::use_services;
use crate::components::form_field::{FormBanner, FormField};
use crate::pages::spawn_with;
use crate::util::validation::{FormErrors, validate_forgot_password};

#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    let services = use_services();
    let email = RwSignal::new(String::new());
    let errors = RwSignal::new(FormErrors::default());
    let busy = RwSignal::new(false);
    let sent = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let email_value = match validate_forgot_password(&email.get_untracked()) {
            Ok(email_value) => email_value,
            Err(invalid) => {
                errors.set(invalid);
                return;
            }
        };
        errors.set(FormErrors::default());
        busy.set(true);
        spawn_with(services, move |services| async move {
            match services.session.request_password_reset(&email_value).await {
                Ok(()) => {
                    let _ = sent.try_set(true);
                }
                Err(err) => {
                    let _ = errors.try_set(FormErrors::root(err.to_string()));
                }
            }
            let _ = busy.try_set(false);
        });
    };

    view! {
        <div class="auth-card">
            <h1>"Forgot password"</h1>
            <Show
                when=move || !sent.get()
                fallback=|| {
                    view! {
                        <p class="auth-card__subtitle">
                            "If an account exists for that address, a reset link is on its way."
                        </p>
                        <a class="btn btn--primary" href="/login">"Back to sign in"</a>
                    }
                }
            >
                <p class="auth-card__subtitle">"Enter your email and we will send you a reset link."</p>
                <FormBanner errors/>
                <form class="auth-form" on:submit=on_submit novalidate>
                    <FormField label="Email" field="email" value=email errors input_type="email" autocomplete="email"/>
                    <button class="btn btn--primary auth-form__submit" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Sending..." } else { "Send reset link" }}
                    </button>
                </form>
                <div class="auth-card__links">
                    <a href="/login">"Back to sign in"</a>
                </div>
            </Show>
        </div>
    }
}
