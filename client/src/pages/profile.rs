//! Profile page: display name, password change, account facts.

use leptos::prelude::*;

use crate::app::use_services;
use crate::components::form_field::{FormBanner, FormField, NoticeBanner};
use crate::pages::spawn_with;
use crate::state::session::SessionState;
use crate::util::time::display_date;
use crate::util::validation::{FormErrors, validate_password_change, validate_profile};

#[component]
pub fn ProfilePage() -> impl IntoView {
    let services = use_services();
    let session = expect_context::<RwSignal<SessionState>>();
    let user = move || session.with(|s| s.user().cloned());

    let name = RwSignal::new(
        session
            .with_untracked(|s| s.user().and_then(|u| u.user_metadata.name.clone()))
            .unwrap_or_default(),
    );
    let profile_errors = RwSignal::new(FormErrors::default());
    let profile_notice = RwSignal::new(None::<String>);
    let profile_busy = RwSignal::new(false);

    let current_password = RwSignal::new(String::new());
    let new_password = RwSignal::new(String::new());
    let confirm_password = RwSignal::new(String::new());
    let password_errors = RwSignal::new(FormErrors::default());
    let password_notice = RwSignal::new(None::<String>);
    let password_busy = RwSignal::new(false);

    let on_profile_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if profile_busy.get_untracked() {
            return;
        }
        let display_name = match validate_profile(&name.get_untracked()) {
            Ok(display_name) => display_name,
            Err(invalid) => {
                profile_errors.set(invalid);
                return;
            }
        };
        profile_errors.set(FormErrors::default());
        profile_notice.set(None);
        profile_busy.set(true);
        spawn_with(services, move |services| async move {
            match services.session.update_profile(&display_name).await {
                Ok(_) => {
                    let _ = profile_notice.try_set(Some("Profile updated.".to_owned()));
                }
                Err(err) => {
                    let _ = profile_errors.try_set(FormErrors::root(err.to_string()));
                }
            }
            let _ = profile_busy.try_set(false);
        });
    };

    let on_password_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if password_busy.get_untracked() {
            return;
        }
        let password = match validate_password_change(
            &current_password.get_untracked(),
            &new_password.get_untracked(),
            &confirm_password.get_untracked(),
        ) {
            Ok(password) => password,
            Err(invalid) => {
                password_errors.set(invalid);
                return;
            }
        };
        password_errors.set(FormErrors::default());
        password_notice.set(None);
        password_busy.set(true);
        spawn_with(services, move |services| async move {
            match services.session.update_password(&password).await {
                Ok(()) => {
                    let _ = password_notice.try_set(Some("Password updated successfully.".to_owned()));
                    for field in [current_password, new_password, confirm_password] {
                        let _ = field.try_set(String::new());
                    }
                }
                Err(err) => {
                    let _ = password_errors.try_set(FormErrors::root(err.to_string()));
                }
            }
            let _ = password_busy.try_set(false);
        });
    };

    let email = move || user().and_then(|u| u.email).unwrap_or_default();
    let user_id = move || user().map(|u| u.id).unwrap_or_default();
    let created = move || display_date(user().and_then(|u| u.created_at).as_deref(), "Unknown");
    let last_sign_in = move || display_date(user().and_then(|u| u.last_sign_in_at).as_deref(), "Never");
    let verified = move || if user().is_some_and(|u| u.is_email_verified()) { "Verified" } else { "Not verified" };

    view! {
        <div class="profile-page">
            <section class="panel">
                <h2>"Profile"</h2>
                <NoticeBanner notice=profile_notice/>
                <FormBanner errors=profile_errors/>
                <form class="record-form" on:submit=on_profile_submit novalidate>
                    <FormField label="Full name" field="name" value=name errors=profile_errors autocomplete="name"/>
                    <label class="form-field">
                        <span class="form-field__label">"Email"</span>
                        <input class="form-field__input" type="email" disabled prop:value=email/>
                    </label>
                    <button class="btn btn--primary" type="submit" disabled=move || profile_busy.get()>
                        {move || if profile_busy.get() { "Saving..." } else { "Save profile" }}
                    </button>
                </form>
            </section>

            <section class="panel">
                <h2>"Change password"</h2>
                <NoticeBanner notice=password_notice/>
                <FormBanner errors=password_errors/>
                <form class="record-form" on:submit=on_password_submit novalidate>
                    <FormField
                        label="Current password"
                        field="current_password"
                        value=current_password
                        errors=password_errors
                        input_type="password"
                        autocomplete="current-password"
                    />
                    <FormField
                        label="New password"
                        field="new_password"
                        value=new_password
                        errors=password_errors
                        input_type="password"
                        autocomplete="new-password"
                    />
                    <FormField
                        label="Confirm new password"
                        field="confirm_password"
                        value=confirm_password
                        errors=password_errors
                        input_type="password"
                        autocomplete="new-password"
                    />
                    <button class="btn btn--primary" type="submit" disabled=move || password_busy.get()>
                        {move || if password_busy.get() { "Updating..." } else { "Update password" }}
                    </button>
                </form>
            </section>

            <section class="panel">
                <h2>"Account"</h2>
                <dl class="record-details">
                    <div class="record-details__row"><dt>"User ID"</dt><dd>{user_id}</dd></div>
                    <div class="record-details__row"><dt>"Member since"</dt><dd>{created}</dd></div>
                    <div class="record-details__row"><dt>"Last sign-in"</dt><dd>{last_sign_in}</dd></div>
                    <div class="record-details__row"><dt>"Email"</dt><dd>{verified}</dd></div>
                </dl>
            </section>
        </div>
    }
}
