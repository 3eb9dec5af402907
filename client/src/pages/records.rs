//! List and detail screens shared by deals, tasks, communications, and
//! purchase history. Rows are shown as returned by the backend.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::app::use_services;
use crate::components::confirm_dialog::ConfirmDialog;
use crate::components::record_card::{RecordView, record_card, record_details};
use crate::net::rest::ListQuery;
use crate::pages::{load_into, spawn_with, use_request_generation};
use crate::state::records::Loadable;

/// Searchable list of `R`.
pub fn record_list_page<R: RecordView>() -> AnyView {
    let services = use_services();
    let generation = use_request_generation();
    let rows = RwSignal::new(Loadable::<Vec<R>>::default());
    let search = RwSignal::new(String::new());

    Effect::new(move || {
        let query = ListQuery::default().search(&search.get());
        load_into(services, rows, generation.begin(), move |s| async move { s.list::<R>(query).await });
    });

    view! {
        <div class="records-page">
            <div class="records-page__toolbar">
                <input
                    class="records-page__search"
                    type="search"
                    placeholder=format!("Search {}", R::LABEL.to_lowercase())
                    prop:value=move || search.get()
                    on:input=move |ev| search.set(event_target_value(&ev))
                />
            </div>
            {move || rows.with(|r| r.error.clone()).map(|message| view! { <div class="form-banner form-banner--error">{message}</div> })}
            <div class="record-grid" class:record-grid--loading=move || rows.with(|r| r.loading)>
                {move || rows.with(|r| r.items().iter().map(record_card).collect::<Vec<_>>())}
            </div>
            <Show when=move || rows.with(|r| !r.loading && r.value.is_some() && r.items().is_empty())>
                <p class="empty-state">{format!("No {} found.", R::LABEL.to_lowercase())}</p>
            </Show>
        </div>
    }
    .into_any()
}

/// Detail view of one `R` with delete.
pub fn record_detail_page<R: RecordView>(id: String) -> AnyView {
    let services = use_services();
    let navigate = use_navigate();
    let record = RwSignal::new(Loadable::<R>::default());
    let confirming_delete = RwSignal::new(false);
    let deleted = RwSignal::new(false);
    let action_error = RwSignal::new(None::<String>);
    let record_id = StoredValue::new(id.clone());

    let ticket = use_request_generation().begin();
    load_into(services, record, ticket, move |s| async move { s.get::<R>(id).await });

    Effect::new(move || {
        if deleted.get() {
            navigate(R::PATH, NavigateOptions::default());
        }
    });

    let on_cancel_delete = Callback::new(move |()| confirming_delete.set(false));
    let on_confirm_delete = Callback::new(move |()| {
        confirming_delete.set(false);
        let id = record_id.get_value();
        spawn_with(services, move |services| async move {
            match services.delete::<R>(id).await {
                Ok(()) => {
                    let _ = deleted.try_set(true);
                }
                Err(err) => {
                    let _ = action_error.try_set(Some(err.to_string()));
                }
            }
        });
    });

    view! {
        <div class="record-detail">
            <a class="record-detail__back" href=R::PATH>{format!("← {}", R::LABEL)}</a>
            {move || action_error.get().map(|message| view! { <div class="form-banner form-banner--error">{message}</div> })}
            {move || {
                record.with(|state| {
                    if let Some(message) = state.error.clone() {
                        return view! { <div class="form-banner form-banner--error">{message}</div> }.into_any();
                    }
                    let Some(row) = state.value.as_ref() else {
                        return view! { <div class="spinner" aria-label="Loading"></div> }.into_any();
                    };
                    let heading = row.heading();
                    let details = record_details(row);
                    view! {
                        <header class="record-detail__header">
                            <h2>{heading}</h2>
                            <button class="btn btn--danger" on:click=move |_| confirming_delete.set(true)>
                                "Delete"
                            </button>
                        </header>
                        {details}
                    }
                        .into_any()
                })
            }}
            <Show when=move || confirming_delete.get()>
                <ConfirmDialog
                    title="Delete record"
                    message="This permanently deletes the record.".to_owned()
                    on_confirm=on_confirm_delete
                    on_cancel=on_cancel_delete
                />
            </Show>
        </div>
    }
    .into_any()
}
