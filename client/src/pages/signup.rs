//! Sign-up page. Shows a confirmation notice when the provider requires the
//! user to follow an emailed link before a session exists.

use leptos::prelude::*;

use crate::app::use_services;
use crate::components::form_field::{FormBanner, FormField};
use crate::pages::spawn_with;
use crate::state::session::SignUpOutcome;
use crate::util::validation::{FormErrors, validate_sign_up};

#[component]
pub fn SignUpPage() -> impl IntoView {
    let services = use_services();
    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let errors = RwSignal::new(FormErrors::default());
    let busy = RwSignal::new(false);
    let confirmation_sent_to = RwSignal::new(None::<String>);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let input = match validate_sign_up(
            &name.get_untracked(),
            &email.get_untracked(),
            &password.get_untracked(),
            &confirm.get_untracked(),
        ) {
            Ok(input) => input,
            Err(invalid) => {
                errors.set(invalid);
                return;
            }
        };
        errors.set(FormErrors::default());
        busy.set(true);
        spawn_with(services, move |services| async move {
            match services.session.sign_up(&input.email, &input.password, &input.name).await {
                Ok(SignUpOutcome::ConfirmationRequired { email }) => {
                    let _ = confirmation_sent_to.try_set(Some(email));
                }
                Ok(SignUpOutcome::SignedIn) => {}
                Err(err) => {
                    let _ = errors.try_set(FormErrors::root(err.to_string()));
                }
            }
            let _ = busy.try_set(false);
        });
    };

    view! {
        <div class="auth-card">
            <Show
                when=move || confirmation_sent_to.get().is_none()
                fallback=move || {
                    view! {
                        <h1>"Check your email"</h1>
                        <p class="auth-card__subtitle">
                            "We sent a confirmation link to "
                            <strong>{move || confirmation_sent_to.get().unwrap_or_default()}</strong>
                            ". Follow it, then sign in."
                        </p>
                        <a class="btn btn--primary" href="/login">"Back to sign in"</a>
                    }
                }
            >
                <h1>"Create account"</h1>
                <FormBanner errors/>
                <form class="auth-form" on:submit=on_submit novalidate>
                    <FormField label="Full name" field="name" value=name errors autocomplete="name"/>
                    <FormField label="Email" field="email" value=email errors input_type="email" autocomplete="email"/>
                    <FormField
                        label="Password"
                        field="password"
                        value=password
                        errors
                        input_type="password"
                        autocomplete="new-password"
                    />
                    <FormField
                        label="Confirm password"
                        field="confirm_password"
                        value=confirm
                        errors
                        input_type="password"
                        autocomplete="new-password"
                    />
                    <p class="auth-form__hint">
                        "At least 8 characters with an uppercase letter, a lowercase letter, and a number."
                    </p>
                    <button class="btn btn--primary auth-form__submit" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Creating account..." } else { "Create account" }}
                    </button>
                </form>
                <div class="auth-card__links">
                    <span>"Already registered? " <a href="/login">"Sign in"</a></span>
                </div>
            </Show>
        </div>
    }
}
