//! Dashboard page: per-entity counts and open tasks.
//!
//! SYSTEM CONTEXT
//! ==============
//! Authenticated landing route. Counts are exact totals reported by the
//! row store; the task list only feeds the open-task preview. Every fetch
//! shares one request ticket, so leaving the page discards every response
//! still in flight.

use leptos::prelude::*;

use crate::app::use_services;
use crate::net::rest::ListQuery;
use crate::net::types::{Communication, Contact, Deal, Task};
use crate::pages::{load_into, use_request_generation};
use crate::state::records::{Loadable, open_tasks};
use crate::state::session::SessionState;
use crate::util::time::display_date;

const RECENT_TASKS: usize = 5;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let services = use_services();
    let session = expect_context::<RwSignal<SessionState>>();
    let contacts = RwSignal::new(Loadable::<usize>::default());
    let deals = RwSignal::new(Loadable::<usize>::default());
    let task_count = RwSignal::new(Loadable::<usize>::default());
    let communications = RwSignal::new(Loadable::<usize>::default());
    let tasks = RwSignal::new(Loadable::<Vec<Task>>::default());

    let ticket = use_request_generation().begin();
    load_into(services, contacts, ticket.clone(), |s| async move { s.count::<Contact>(ListQuery::default()).await });
    load_into(services, deals, ticket.clone(), |s| async move { s.count::<Deal>(ListQuery::default()).await });
    load_into(services, task_count, ticket.clone(), |s| async move { s.count::<Task>(ListQuery::default()).await });
    load_into(services, communications, ticket.clone(), |s| async move {
        s.count::<Communication>(ListQuery::default()).await
    });
    load_into(services, tasks, ticket, |s| async move { s.list(ListQuery::default()).await });

    let counts = [contacts, deals, task_count, communications];
    let loading = move || counts.iter().any(|c| c.with(|c| c.loading)) || tasks.with(|t| t.loading);
    let error = move || {
        counts
            .iter()
            .map(|c| c.with(|c| c.error.clone()))
            .chain([tasks.with(|t| t.error.clone())])
            .flatten()
            .next()
    };
    let greeting = move || session.with(|s| s.user().map(|u| u.display_name()).unwrap_or_default());

    view! {
        <div class="dashboard-page">
            <p class="dashboard-page__greeting">"Welcome back, " {greeting}</p>
            {move || error().map(|message| view! { <div class="form-banner form-banner--error">{message}</div> })}
            <div class="stat-grid" class:stat-grid--loading=loading>
                <StatCard label="Contacts" href="/contacts" count=contacts/>
                <StatCard label="Deals" href="/deals" count=deals/>
                <StatCard label="Tasks" href="/tasks" count=task_count/>
                <StatCard label="Communications" href="/communications" count=communications/>
            </div>

            <section class="dashboard-page__tasks">
                <h2>"Open tasks"</h2>
                {move || {
                    let open = tasks.with(|t| open_tasks(t.items(), RECENT_TASKS));
                    if open.is_empty() {
                        return view! { <p class="empty-state">"Nothing due. Enjoy the quiet."</p> }.into_any();
                    }
                    view! {
                        <ul class="task-list">
                            {open
                                .into_iter()
                                .map(|task| {
                                    let href = format!("/tasks/{}", task.id);
                                    let due = display_date(task.due_date.as_deref(), "No due date");
                                    view! {
                                        <li class="task-list__item">
                                            <a href=href>{task.title}</a>
                                            <span class="task-list__due">{due}</span>
                                        </li>
                                    }
                                })
                                .collect::<Vec<_>>()}
                        </ul>
                    }
                        .into_any()
                }}
            </section>
        </div>
    }
}

#[component]
fn StatCard(label: &'static str, href: &'static str, count: RwSignal<Loadable<usize>>) -> impl IntoView {
    let value = move || count.with(|c| c.value.map_or_else(|| "—".to_owned(), |n| n.to_string()));
    view! {
        <a class="stat-card" href=href>
            <span class="stat-card__value">{value}</span>
            <span class="stat-card__label">{label}</span>
        </a>
    }
}
