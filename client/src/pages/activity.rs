//! Activity page: the most recent communications across all contacts.

use leptos::prelude::*;

use crate::app::use_services;
use crate::components::record_card::RecordView;
use crate::net::rest::ListQuery;
use crate::net::types::Communication;
use crate::pages::{load_into, use_request_generation};
use crate::state::records::Loadable;

const ACTIVITY_LIMIT: u32 = 25;

#[component]
pub fn ActivityPage() -> impl IntoView {
    let services = use_services();
    let feed = RwSignal::new(Loadable::<Vec<Communication>>::default());
    let ticket = use_request_generation().begin();
    load_into(services, feed, ticket, |s| async move {
        s.list(ListQuery::default().order_by("communication_date", false).limit(ACTIVITY_LIMIT))
            .await
    });

    view! {
        <div class="activity-page">
            {move || feed.with(|f| f.error.clone()).map(|message| view! { <div class="form-banner form-banner--error">{message}</div> })}
            <Show when=move || !feed.with(|f| f.loading) fallback=|| view! { <div class="spinner"></div> }>
                <ol class="activity-feed">
                    {move || {
                        feed.with(|f| {
                            f.items()
                                .iter()
                                .map(|item| {
                                    let fields = item.fields();
                                    let kind = fields[0].1.clone();
                                    let when = fields[1].1.clone();
                                    view! {
                                        <li class="activity-feed__item">
                                            <span class="activity-feed__kind">{kind}</span>
                                            <a href=item.href()>{item.heading()}</a>
                                            <time class="activity-feed__time">{when}</time>
                                        </li>
                                    }
                                })
                                .collect::<Vec<_>>()
                        })
                    }}
                </ol>
                <Show when=move || feed.with(|f| f.items().is_empty())>
                    <p class="empty-state">"No activity recorded yet."</p>
                </Show>
            </Show>
        </div>
    }
}
