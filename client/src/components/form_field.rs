//! Labelled form inputs with inline error text.

use leptos::prelude::*;

use crate::util::validation::FormErrors;

/// Text-like input bound to `value`, showing `field`'s error from `errors`.
#[component]
pub fn FormField(
    label: &'static str,
    field: &'static str,
    value: RwSignal<String>,
    errors: RwSignal<FormErrors>,
    #[prop(default = "text")] input_type: &'static str,
    #[prop(optional)] autocomplete: Option<&'static str>,
    #[prop(optional)] disabled: Option<Signal<bool>>,
) -> impl IntoView {
    let error = move || errors.with(|e| e.field(field));
    view! {
        <label class="form-field" class:form-field--invalid=move || error().is_some()>
            <span class="form-field__label">{label}</span>
            <input
                class="form-field__input"
                type=input_type
                name=field
                autocomplete=autocomplete
                disabled=move || disabled.is_some_and(|d| d.get())
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
            {move || error().map(|message| view! { <span class="form-field__error">{message}</span> })}
        </label>
    }
}

/// Multi-line variant of [`FormField`].
#[component]
pub fn FormTextArea(
    label: &'static str,
    field: &'static str,
    value: RwSignal<String>,
    errors: RwSignal<FormErrors>,
) -> impl IntoView {
    let error = move || errors.with(|e| e.field(field));
    view! {
        <label class="form-field" class:form-field--invalid=move || error().is_some()>
            <span class="form-field__label">{label}</span>
            <textarea
                class="form-field__input form-field__input--multiline"
                name=field
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            ></textarea>
            {move || error().map(|message| view! { <span class="form-field__error">{message}</span> })}
        </label>
    }
}

/// Root-level banner for backend or transport failures.
#[component]
pub fn FormBanner(errors: RwSignal<FormErrors>) -> impl IntoView {
    move || {
        errors
            .with(|e| e.root.clone())
            .map(|message| view! { <div class="form-banner form-banner--error" role="alert">{message}</div> })
    }
}

/// Success banner shown after a completed submission.
#[component]
pub fn NoticeBanner(notice: RwSignal<Option<String>>) -> impl IntoView {
    move || {
        notice
            .get()
            .map(|message| view! { <div class="form-banner form-banner--success" role="status">{message}</div> })
    }
}
