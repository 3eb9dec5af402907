//! Contacts list and contact detail pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! The list re-fetches whenever the search text or company filter changes;
//! each fetch takes a fresh request ticket so an older, slower response can
//! never overwrite the result of a newer query. The company options come
//! from the rows fetched while no company filter was active.

#[cfg(test)]
#[path = "contacts_test.rs"]
mod contacts_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::app::use_services;
use crate::components::confirm_dialog::ConfirmDialog;
use crate::components::contact_form::ContactForm;
use crate::components::record_card::{RecordView, record_card, record_details};
use crate::net::rest::ListQuery;
use crate::net::types::{Communication, Contact, ContactInput, Deal, Task};
use crate::pages::{load_into, spawn_with, use_request_generation};
use crate::state::records::{Loadable, company_options};

/// Row query for the contacts list.
pub(crate) fn contacts_query(search: &str, company: &str) -> ListQuery {
    let mut query = ListQuery::default().search(search).order_by("name", true);
    let company = company.trim();
    if !company.is_empty() {
        query = query.equals("company", company);
    }
    query
}

#[component]
pub fn ContactsPage() -> impl IntoView {
    let services = use_services();
    let generation = use_request_generation();
    let contacts = RwSignal::new(Loadable::<Vec<Contact>>::default());
    let search = RwSignal::new(String::new());
    let company = RwSignal::new(String::new());
    let companies = RwSignal::new(Vec::<String>::new());
    let reload = RwSignal::new(0_u64);
    let creating = RwSignal::new(false);
    let pending_delete = RwSignal::new(None::<Contact>);
    let delete_error = RwSignal::new(None::<String>);

    Effect::new(move || {
        let query = contacts_query(&search.get(), &company.get());
        reload.track();
        load_into(services, contacts, generation.begin(), move |s| async move { s.list(query).await });
    });

    Effect::new(move || {
        let rows = contacts.with(|c| c.value.clone());
        if let Some(rows) = rows {
            if company.get_untracked().is_empty() {
                companies.set(company_options(&rows));
            }
        }
    });

    let on_saved = Callback::new(move |_: Contact| {
        creating.set(false);
        reload.update(|n| *n += 1);
    });
    let on_cancel_create = Callback::new(move |()| creating.set(false));
    let on_cancel_delete = Callback::new(move |()| pending_delete.set(None));
    let on_confirm_delete = Callback::new(move |()| {
        let Some(contact) = pending_delete.get_untracked() else {
            return;
        };
        pending_delete.set(None);
        spawn_with(services, move |services| async move {
            match services.delete::<Contact>(contact.id.clone()).await {
                Ok(()) => {
                    log::info!("deleted contact {}", contact.id);
                    let _ = delete_error.try_set(None);
                    let _ = reload.try_update(|n| *n += 1);
                }
                Err(err) => {
                    let _ = delete_error.try_set(Some(err.to_string()));
                }
            }
        });
    });

    view! {
        <div class="records-page contacts-page">
            <div class="records-page__toolbar">
                <input
                    class="records-page__search"
                    type="search"
                    placeholder="Search name, email, or company"
                    prop:value=move || search.get()
                    on:input=move |ev| search.set(event_target_value(&ev))
                />
                <select
                    class="records-page__filter"
                    prop:value=move || company.get()
                    on:change=move |ev| company.set(event_target_value(&ev))
                >
                    <option value="">"All companies"</option>
                    {move || {
                        companies
                            .get()
                            .into_iter()
                            .map(|name| {
                                let label = name.clone();
                                view! { <option value=name>{label}</option> }
                            })
                            .collect::<Vec<_>>()
                    }}
                </select>
                <button class="btn btn--primary" on:click=move |_| creating.set(true)>
                    "+ New contact"
                </button>
            </div>

            <Show when=move || creating.get()>
                <ContactForm initial=ContactInput::default() on_saved on_cancel=on_cancel_create/>
            </Show>

            {move || contacts.with(|c| c.error.clone()).map(|message| view! { <div class="form-banner form-banner--error">{message}</div> })}
            {move || delete_error.get().map(|message| view! { <div class="form-banner form-banner--error">{message}</div> })}

            <div class="record-grid" class:record-grid--loading=move || contacts.with(|c| c.loading)>
                {move || {
                    contacts
                        .with(|c| c.items().to_vec())
                        .into_iter()
                        .map(|contact| {
                            let card = record_card(&contact);
                            view! {
                                <div class="record-grid__item">
                                    {card}
                                    <button
                                        class="btn btn--danger btn--small"
                                        on:click=move |_| pending_delete.set(Some(contact.clone()))
                                    >
                                        "Delete"
                                    </button>
                                </div>
                            }
                        })
                        .collect::<Vec<_>>()
                }}
            </div>
            <Show when=move || contacts.with(|c| !c.loading && c.value.is_some() && c.items().is_empty())>
                <p class="empty-state">"No contacts match."</p>
            </Show>

            {move || {
                pending_delete
                    .get()
                    .map(|contact| {
                        view! {
                            <ConfirmDialog
                                title="Delete contact"
                                message=format!("Delete {}? This cannot be undone.", contact.name)
                                on_confirm=on_confirm_delete
                                on_cancel=on_cancel_delete
                            />
                        }
                    })
            }}
        </div>
    }
}

#[component]
pub fn ContactDetailPage(id: String) -> impl IntoView {
    let services = use_services();
    let navigate = use_navigate();
    let contact = RwSignal::new(Loadable::<Contact>::default());
    let deals = RwSignal::new(Loadable::<Vec<Deal>>::default());
    let tasks = RwSignal::new(Loadable::<Vec<Task>>::default());
    let communications = RwSignal::new(Loadable::<Vec<Communication>>::default());
    let editing = RwSignal::new(false);
    let confirming_delete = RwSignal::new(false);
    let deleted = RwSignal::new(false);
    let action_error = RwSignal::new(None::<String>);
    let contact_id = StoredValue::new(id.clone());

    let ticket = use_request_generation().begin();
    let related = ListQuery::default().equals("contact_id", &id);
    load_into(services, contact, ticket.clone(), move |s| async move { s.get(id).await });
    let query = related.clone();
    load_into(services, deals, ticket.clone(), move |s| async move { s.list(query).await });
    let query = related.clone();
    load_into(services, tasks, ticket.clone(), move |s| async move { s.list(query).await });
    load_into(services, communications, ticket, move |s| async move { s.list(related).await });

    Effect::new(move || {
        if deleted.get() {
            navigate("/contacts", NavigateOptions::default());
        }
    });

    let on_saved = Callback::new(move |saved: Contact| {
        editing.set(false);
        contact.update(|c| c.value = Some(saved));
    });
    let on_cancel_edit = Callback::new(move |()| editing.set(false));
    let on_cancel_delete = Callback::new(move |()| confirming_delete.set(false));
    let on_confirm_delete = Callback::new(move |()| {
        confirming_delete.set(false);
        let id = contact_id.get_value();
        spawn_with(services, move |services| async move {
            match services.delete::<Contact>(id).await {
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
            <a class="record-detail__back" href="/contacts">"← Contacts"</a>
            {move || action_error.get().map(|message| view! { <div class="form-banner form-banner--error">{message}</div> })}
            {move || {
                let state = contact.get();
                if let Some(message) = state.error {
                    return view! { <div class="form-banner form-banner--error">{message}</div> }.into_any();
                }
                let Some(record) = state.value else {
                    return view! { <div class="spinner" aria-label="Loading"></div> }.into_any();
                };
                if editing.get() {
                    return view! {
                        <ContactForm
                            initial=ContactInput::from(&record)
                            contact_id=record.id.clone()
                            on_saved
                            on_cancel=on_cancel_edit
                        />
                    }
                        .into_any();
                }
                let heading = record.heading();
                let details = record_details(&record);
                view! {
                    <header class="record-detail__header">
                        <h2>{heading}</h2>
                        <button class="btn" on:click=move |_| editing.set(true)>
                            "Edit"
                        </button>
                        <button class="btn btn--danger" on:click=move |_| confirming_delete.set(true)>
                            "Delete"
                        </button>
                    </header>
                    {details}
                }
                    .into_any()
            }}

            <section class="record-detail__related">
                <RelatedList title="Deals" rows=deals/>
                <RelatedList title="Tasks" rows=tasks/>
                <RelatedList title="Communications" rows=communications/>
            </section>

            <Show when=move || confirming_delete.get()>
                <ConfirmDialog
                    title="Delete contact"
                    message="This permanently deletes the contact.".to_owned()
                    on_confirm=on_confirm_delete
                    on_cancel=on_cancel_delete
                />
            </Show>
        </div>
    }
}

#[component]
fn RelatedList<R: RecordView>(title: &'static str, rows: RwSignal<Loadable<Vec<R>>>) -> impl IntoView {
    view! {
        <div class="related-list">
            <h3>{title}</h3>
            {move || {
                let items = rows.with(|r| r.items().to_vec());
                if items.is_empty() {
                    return view! { <p class="empty-state">"None yet."</p> }.into_any();
                }
                view! {
                    <ul>
                        {items
                            .into_iter()
                            .map(|item| view! { <li><a href=item.href()>{item.heading()}</a></li> })
                            .collect::<Vec<_>>()}
                    </ul>
                }
                    .into_any()
            }}
        </div>
    }
}
