//! Home page: quick links into each record area.

use leptos::prelude::*;

use crate::components::layout::NAV_ITEMS;
use crate::state::session::SessionState;

#[component]
pub fn HomePage() -> impl IntoView {
    let session = expect_context::<RwSignal<SessionState>>();
    let name = move || session.with(|s| s.user().map(|u| u.display_name()).unwrap_or_default());

    view! {
        <div class="home-page">
            <h2>"Hello, " {name}</h2>
            <p>"Pick up where you left off."</p>
            <div class="home-page__links">
                {NAV_ITEMS
                    .iter()
                    .filter(|(href, _)| *href != "/home")
                    .map(|(href, label)| view! { <a class="home-page__link" href=*href>{*label}</a> })
                    .collect::<Vec<_>>()}
            </div>
        </div>
    }
}
