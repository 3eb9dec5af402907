//! Authenticated page chrome: sidebar navigation, top bar, sign-out.
//!
//! SYSTEM CONTEXT
//! ==============
//! Wraps every protected page. Signing out only clears the session store;
//! the route guard reacts to the new state and redirects to `/login`.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use leptos::prelude::*;
use leptos_router::hooks::use_location;

use crate::routing::Page;
use crate::state::session::SessionState;
use crate::state::ui::UiState;

/// Sidebar entries as `(href, label)`.
pub const NAV_ITEMS: &[(&str, &str)] = &[
    ("/dashboard", "Dashboard"),
    ("/home", "Home"),
    ("/contacts", "Contacts"),
    ("/deals", "Deals"),
    ("/tasks", "Tasks"),
    ("/communications", "Communications"),
    ("/purchase-history", "Purchase history"),
    ("/activity", "Activity"),
    ("/ai-assistant", "AI assistant"),
    ("/settings", "Settings"),
];

/// True when `pathname` is `href` or one of its detail pages.
pub fn is_active(pathname: &str, href: &str) -> bool {
    pathname == href || pathname.strip_prefix(href).is_some_and(|rest| rest.starts_with('/'))
}

#[component]
pub fn AppLayout(page: Page, children: Children) -> impl IntoView {
    let session = expect_context::<RwSignal<SessionState>>();
    let ui = expect_context::<RwSignal<UiState>>();
    let location = use_location();
    let services = crate::app::use_services();

    let display_name = move || session.with(|s| s.user().map(|u| u.display_name()).unwrap_or_default());
    let initial = move || session.with(|s| s.user().map(|u| u.initial()).unwrap_or_default());

    let signing_out = RwSignal::new(false);
    let on_sign_out = move |_| {
        if signing_out.get_untracked() {
            return;
        }
        signing_out.set(true);
        crate::pages::spawn_with(services, move |services| async move {
            services.session.sign_out().await;
            let _ = signing_out.try_set(false);
        });
    };

    view! {
        <div class="app-layout" class:app-layout--sidebar-open=move || ui.get().sidebar_open>
            <nav class="sidebar">
                <div class="sidebar__brand">"CRM"</div>
                <ul class="sidebar__nav">
                    {NAV_ITEMS
                        .iter()
                        .map(|(href, label)| {
                            let href = *href;
                            view! {
                                <li>
                                    <a
                                        href=href
                                        class="sidebar__link"
                                        class:sidebar__link--active=move || is_active(&location.pathname.get(), href)
                                        on:click=move |_| ui.update(UiState::close_sidebar)
                                    >
                                        {*label}
                                    </a>
                                </li>
                            }
                        })
                        .collect::<Vec<_>>()}
                </ul>
            </nav>

            <div class="app-layout__main">
                <header class="topbar">
                    <button
                        class="btn topbar__menu"
                        title="Menu"
                        on:click=move |_| ui.update(|u| u.sidebar_open = !u.sidebar_open)
                    >
                        "☰"
                    </button>
                    <h1 class="topbar__title">{page.title()}</h1>
                    <span class="topbar__spacer"></span>
                    <a href="/profile" class="topbar__user" title=display_name>
                        <span class="topbar__avatar">{initial}</span>
                        <span class="topbar__name">{display_name}</span>
                    </a>
                    <button
                        class="btn topbar__sign-out"
                        on:click=on_sign_out
                        disabled=move || signing_out.get()
                    >
                        "Sign out"
                    </button>
                </header>
                <main class="app-layout__content">{children()}</main>
            </div>
        </div>
    }
}
