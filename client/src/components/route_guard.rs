//! Guarded outlet: the only place routes are rendered.
//!
//! SYSTEM CONTEXT
//! ==============
//! The router sends every path here. The outlet derives a [`GuardDecision`]
//! from the current path and session, navigates (replacing history) on a
//! redirect, and otherwise mounts the page inside the right chrome.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::app::BootStatus;
use crate::components::layout::AppLayout;
use crate::net::types::{Communication, Deal, PurchaseHistory, Task};
use crate::pages::{
    activity::ActivityPage, ai_assistant::AiAssistantPage, contacts::ContactDetailPage, contacts::ContactsPage,
    dashboard::DashboardPage, forgot_password::ForgotPasswordPage, home::HomePage, login::LoginPage,
    profile::ProfilePage, records::record_detail_page, records::record_list_page, reset_password::ResetPasswordPage,
    settings::SettingsPage, signup::SignUpPage,
};
use crate::routing::{GuardDecision, Page, RouteMatch, RouteTable, Visibility, decide};
use crate::state::generation::RequestGeneration;
use crate::state::session::SessionState;

#[component]
pub fn GuardedOutlet() -> impl IntoView {
    let session = expect_context::<RwSignal<SessionState>>();
    let boot = expect_context::<RwSignal<BootStatus>>();
    let navigation = expect_context::<RequestGeneration>();
    let location = use_location();
    let navigate = use_navigate();
    let table = RouteTable::crm();

    let decision = Memo::new(move |_| decide(&table, &location.pathname.get(), &session.get()));

    Effect::new(move || {
        if let Some(target) = decision.get().redirect_target() {
            log::debug!("route guard redirect to {target}");
            navigate(target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    move || {
        let decision = decision.get();
        // Whatever was in flight belongs to the previous view.
        navigation.invalidate();
        match decision {
            GuardDecision::Loading => view! { <BootPlaceholder boot/> }.into_any(),
            GuardDecision::RedirectToLogin | GuardDecision::RedirectToDashboard => {
                view! { <div class="route-guard route-guard--redirecting"></div> }.into_any()
            }
            GuardDecision::Render(route) => {
                let page = route.page;
                let chrome = route.visibility;
                let content = render_page(route);
                if chrome == Visibility::PublicOnly {
                    view! { <main class="auth-page">{content}</main> }.into_any()
                } else {
                    view! { <AppLayout page>{content}</AppLayout> }.into_any()
                }
            }
        }
    }
}

#[component]
fn BootPlaceholder(boot: RwSignal<BootStatus>) -> impl IntoView {
    view! {
        <div class="route-guard route-guard--loading">
            {move || match boot.get() {
                BootStatus::Failed(message) => {
                    view! {
                        <p class="route-guard__error">
                            "The application could not start: " {message}
                        </p>
                    }
                        .into_any()
                }
                BootStatus::Starting | BootStatus::Ready => {
                    view! { <div class="spinner" aria-label="Loading"></div> }.into_any()
                }
            }}
        </div>
    }
}

fn render_page(route: RouteMatch) -> AnyView {
    let id = route.id.unwrap_or_default();
    match route.page {
        Page::Login => view! { <LoginPage/> }.into_any(),
        Page::SignUp => view! { <SignUpPage/> }.into_any(),
        Page::ForgotPassword => view! { <ForgotPasswordPage/> }.into_any(),
        Page::ResetPassword => view! { <ResetPasswordPage/> }.into_any(),
        Page::Dashboard => view! { <DashboardPage/> }.into_any(),
        Page::Home => view! { <HomePage/> }.into_any(),
        Page::Activity => view! { <ActivityPage/> }.into_any(),
        Page::Contacts => view! { <ContactsPage/> }.into_any(),
        Page::ContactDetail => view! { <ContactDetailPage id/> }.into_any(),
        Page::Deals => record_list_page::<Deal>(),
        Page::DealDetail => record_detail_page::<Deal>(id),
        Page::Tasks => record_list_page::<Task>(),
        Page::TaskDetail => record_detail_page::<Task>(id),
        Page::Communications => record_list_page::<Communication>(),
        Page::CommunicationDetail => record_detail_page::<Communication>(id),
        Page::PurchaseHistory => record_list_page::<PurchaseHistory>(),
        Page::PurchaseDetail => record_detail_page::<PurchaseHistory>(id),
        Page::Profile => view! { <ProfilePage/> }.into_any(),
        Page::Settings => view! { <SettingsPage/> }.into_any(),
        Page::AiAssistant => view! { <AiAssistantPage/> }.into_any(),
    }
}
