//! Reset-password page reached from a recovery email.
//!
//! The recovery token in the URL fragment authorizes exactly one password
//! change. It never becomes the app session, so this public-only page stays
//! mounted until the change completes and the user is sent to `/login`.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::app::use_services;
use crate::components::form_field::{FormBanner, FormField, NoticeBanner};
use crate::pages::spawn_with;
use crate::util::auth::{RecoveryLink, clear_location_fragment, location_fragment, parse_recovery_fragment};
use crate::util::validation::{FormErrors, validate_new_password};

#[component]
pub fn ResetPasswordPage() -> impl IntoView {
    let services = use_services();
    let navigate = use_navigate();
    let link = RwSignal::new(None::<Result<RecoveryLink, String>>);
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let errors = RwSignal::new(FormErrors::default());
    let notice = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);
    let done = RwSignal::new(false);

    // The fragment only exists in the browser; read it once mounted.
    Effect::new(move || {
        if link.get_untracked().is_none() {
            let parsed = parse_recovery_fragment(&location_fragment()).map_err(|err| err.to_string());
            if parsed.is_ok() {
                clear_location_fragment();
            }
            link.set(Some(parsed));
        }
    });

    Effect::new(move || {
        if done.get() {
            navigate("/login", NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let Some(Ok(recovery)) = link.get_untracked() else {
            return;
        };
        let new_password = match validate_new_password(&password.get_untracked(), &confirm.get_untracked()) {
            Ok(new_password) => new_password,
            Err(invalid) => {
                errors.set(invalid);
                return;
            }
        };
        errors.set(FormErrors::default());
        busy.set(true);
        spawn_with(services, move |services| async move {
            match services
                .session
                .complete_password_recovery(&recovery.access_token, &new_password)
                .await
            {
                Ok(()) => {
                    let _ = notice.try_set(Some("Password updated. Please sign in.".to_owned()));
                    let _ = done.try_set(true);
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
            <h1>"Reset password"</h1>
            <NoticeBanner notice/>
            {move || match link.get() {
                None => view! { <div class="spinner" aria-label="Loading"></div> }.into_any(),
                Some(Err(message)) => {
                    view! {
                        <div class="form-banner form-banner--error" role="alert">{message}</div>
                        <a class="btn btn--primary" href="/forgot-password">"Request a new link"</a>
                    }
                        .into_any()
                }
                Some(Ok(_)) => {
                    view! {
                        <FormBanner errors/>
                        <form class="auth-form" on:submit=on_submit novalidate>
                            <FormField
                                label="New password"
                                field="new_password"
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
                            <button
                                class="btn btn--primary auth-form__submit"
                                type="submit"
                                disabled=move || busy.get()
                            >
                                {move || if busy.get() { "Updating..." } else { "Update password" }}
                            </button>
                        </form>
                    }
                        .into_any()
                }
            }}
        </div>
    }
}
