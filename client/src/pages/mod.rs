//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration and delegates rendering details
//! to `components`. Pages never decide access; the guarded outlet only
//! mounts a page once the session allows it.

pub mod activity;
pub mod ai_assistant;
pub mod contacts;
pub mod dashboard;
pub mod forgot_password;
pub mod home;
pub mod login;
pub mod profile;
pub mod records;
pub mod reset_password;
pub mod settings;
pub mod signup;

use std::future::Future;

use leptos::prelude::*;

use crate::app::Services;
use crate::net::error::ApiError;
use crate::state::generation::{RequestGeneration, RequestTicket};
use crate::state::records::Loadable;

/// Run `task` on the browser event loop with the backend services.
/// Does nothing during server rendering.
pub(crate) fn spawn_with<F, Fut>(services: StoredValue<Option<Services>>, task: F)
where
    F: FnOnce(Services) -> Fut,
    Fut: Future<Output = ()> + 'static,
{
    let Some(services) = services.try_get_value().flatten() else {
        log::warn!("backend services not ready; request skipped");
        return;
    };
    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(task(services));
    #[cfg(not(feature = "hydrate"))]
    let _ = (services, task);
}

/// Fetch into `target`, dropping the result if `ticket` went stale.
pub(crate) fn load_into<T, F, Fut>(
    services: StoredValue<Option<Services>>,
    target: RwSignal<Loadable<T>>,
    ticket: RequestTicket,
    fetch: F,
) where
    T: Send + Sync + 'static,
    F: FnOnce(Services) -> Fut,
    Fut: Future<Output = Result<T, ApiError>> + 'static,
{
    let _ = target.try_update(Loadable::start);
    spawn_with(services, move |services| {
        let pending = fetch(services);
        async move {
            let result = pending.await;
            let _ = target.try_update(|state| state.apply(&ticket, result));
        }
    });
}

/// Navigation generation shared by every page.
pub(crate) fn use_request_generation() -> RequestGeneration {
    use_context::<RequestGeneration>().unwrap_or_default()
}
