//! Root application component with routing and context providers.
//!
//! BOOT SEQUENCE
//! =============
//! 1. Fetch the public backend configuration from the host (`/api/config`).
//! 2. Build the session store and row client, publish them as [`Services`].
//! 3. Mirror store transitions into a `RwSignal<SessionState>` and restore
//!    the persisted session. Until then every route shows a placeholder.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment, WildcardSegment,
    components::{Route, Router, Routes},
};
use serde::Serialize;

use crate::components::route_guard::GuardedOutlet;
use crate::net::auth::SupabaseAuth;
use crate::net::error::ApiError;
use crate::net::rest::{ListQuery, Record, RestClient};
use crate::net::types::BackendConfig;
use crate::state::generation::RequestGeneration;
use crate::state::session::{AppSessionStore, LocalStoragePersistence, SessionState, SessionStore};
use crate::state::ui::UiState;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Backend handles available once configuration has loaded.
#[derive(Clone)]
pub struct Services {
    pub config: BackendConfig,
    pub session: AppSessionStore,
    pub rest: RestClient,
}

impl Services {
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self {
            session: SessionStore::new(SupabaseAuth::new(config.clone()), LocalStoragePersistence),
            rest: RestClient::new(config.clone()),
            config,
        }
    }

    /// List rows of `R` with the current access token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`]; `Unauthorized` also signs the user out.
    pub async fn list<R: Record>(&self, query: ListQuery) -> Result<Vec<R>, ApiError> {
        let rest = self.rest.clone();
        self.session
            .authorized(|token| async move { rest.list::<R>(&token, &query).await })
            .await
    }

    /// Exact row count of `R` under `query`'s filters.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`]; `Unauthorized` also signs the user out.
    pub async fn count<R: Record>(&self, query: ListQuery) -> Result<usize, ApiError> {
        let rest = self.rest.clone();
        self.session
            .authorized(|token| async move { rest.count::<R>(&token, &query).await })
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    pub async fn get<R: Record>(&self, id: String) -> Result<R, ApiError> {
        let rest = self.rest.clone();
        self.session
            .authorized(|token| async move { rest.get::<R>(&token, &id).await })
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] when the row is rejected.
    pub async fn insert<R: Record, I: Serialize>(&self, input: I) -> Result<R, ApiError> {
        let rest = self.rest.clone();
        self.session
            .authorized(|token| async move { rest.insert::<R, I>(&token, &input).await })
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] when the row is rejected or missing.
    pub async fn update<R: Record, I: Serialize>(&self, id: String, input: I) -> Result<R, ApiError> {
        let rest = self.rest.clone();
        self.session
            .authorized(|token| async move { rest.update::<R, I>(&token, &id, &input).await })
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] when the delete is rejected.
    pub async fn delete<R: Record>(&self, id: String) -> Result<(), ApiError> {
        let rest = self.rest.clone();
        self.session
            .authorized(|token| async move { rest.delete::<R>(&token, &id).await })
            .await
    }
}

/// Boot progress shown while the session is `Unknown`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BootStatus {
    #[default]
    Starting,
    Ready,
    Failed(String),
}

/// Snapshot of the services published by the app root, for use in event
/// handlers. `None` until configuration loads.
#[must_use]
pub fn use_services() -> StoredValue<Option<Services>> {
    let services = use_context::<RwSignal<Option<Services>>>().and_then(|services| services.get_untracked());
    StoredValue::new(services)
}

/// Root application component.
///
/// Provides all shared state contexts and sets up client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let session = RwSignal::new(SessionState::Unknown);
    let services = RwSignal::new(None::<Services>);
    let boot = RwSignal::new(BootStatus::Starting);
    let ui = RwSignal::new(UiState::with_dark_mode(crate::util::dark_mode::read_preference()));
    let navigation = RequestGeneration::new();

    provide_context(session);
    provide_context(services);
    provide_context(boot);
    provide_context(ui);
    provide_context(navigation);

    #[cfg(feature = "hydrate")]
    {
        crate::util::dark_mode::apply(ui.get_untracked().dark_mode);
        leptos::task::spawn_local(async move {
            match crate::net::api::fetch_backend_config().await {
                Ok(config) => {
                    let ready = Services::new(config);
                    ready.session.subscribe(move |state| session.set(state.clone()));
                    services.set(Some(ready.clone()));
                    boot.set(BootStatus::Ready);
                    ready.session.restore().await;
                }
                Err(err) => {
                    log::error!("backend configuration unavailable: {err}");
                    boot.set(BootStatus::Failed(err.to_string()));
                }
            }
        });
    }

    view! {
        <Stylesheet id="leptos" href="/pkg/crm.css"/>
        <Title text="CRM"/>

        <Router>
            <Routes fallback=|| view! { <GuardedOutlet/> }>
                <Route path=StaticSegment("") view=GuardedOutlet/>
                <Route path=WildcardSegment("any") view=GuardedOutlet/>
            </Routes>
        </Router>
    }
}
