//! Create/edit form for a contact.

use leptos::prelude::*;

use crate::app::use_services;
use crate::components::form_field::{FormBanner, FormField, FormTextArea};
use crate::net::types::{Contact, ContactInput};
use crate::pages::spawn_with;
use crate::util::validation::{FormErrors, validate_contact};

/// `contact_id` selects update over insert.
#[component]
pub fn ContactForm(
    initial: ContactInput,
    #[prop(optional)] contact_id: Option<String>,
    on_saved: Callback<Contact>,
    on_cancel: Callback<()>,
) -> impl IntoView {
    let services = use_services();
    let name = RwSignal::new(initial.name);
    let email = RwSignal::new(initial.email);
    let phone = RwSignal::new(initial.phone.unwrap_or_default());
    let company = RwSignal::new(initial.company.unwrap_or_default());
    let job_title = RwSignal::new(initial.job_title.unwrap_or_default());
    let notes = RwSignal::new(initial.notes.unwrap_or_default());
    let errors = RwSignal::new(FormErrors::default());
    let busy = RwSignal::new(false);
    let contact_id = StoredValue::new(contact_id);
    let editing = contact_id.with_value(Option::is_some);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        // Blank optional fields are normalized to `None` by validation.
        let draft = ContactInput {
            name: name.get_untracked(),
            email: email.get_untracked(),
            phone: Some(phone.get_untracked()),
            company: Some(company.get_untracked()),
            job_title: Some(job_title.get_untracked()),
            notes: Some(notes.get_untracked()),
        };
        let input = match validate_contact(&draft) {
            Ok(input) => input,
            Err(invalid) => {
                errors.set(invalid);
                return;
            }
        };
        errors.set(FormErrors::default());
        busy.set(true);
        let id = contact_id.get_value();
        spawn_with(services, move |services| async move {
            let saved = match id {
                Some(id) => services.update::<Contact, _>(id, input).await,
                None => services.insert::<Contact, _>(input).await,
            };
            let _ = busy.try_set(false);
            match saved {
                Ok(contact) => on_saved.run(contact),
                Err(err) => {
                    let _ = errors.try_set(FormErrors::root(err.to_string()));
                }
            }
        });
    };

    view! {
        <form class="record-form" on:submit=on_submit novalidate>
            <h2>{if editing { "Edit contact" } else { "New contact" }}</h2>
            <FormBanner errors/>
            <FormField label="Name" field="name" value=name errors/>
            <FormField label="Email" field="email" value=email errors input_type="email"/>
            <FormField label="Phone" field="phone" value=phone errors input_type="tel"/>
            <FormField label="Company" field="company" value=company errors/>
            <FormField label="Job title" field="job_title" value=job_title errors/>
            <FormTextArea label="Notes" field="notes" value=notes errors/>
            <div class="record-form__actions">
                <button class="btn" type="button" on:click=move |_| on_cancel.run(())>
                    "Cancel"
                </button>
                <button class="btn btn--primary" type="submit" disabled=move || busy.get()>
                    {move || if busy.get() { "Saving..." } else { "Save" }}
                </button>
            </div>
        </form>
    }
}
