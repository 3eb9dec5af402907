//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the small host API and stitches it with Leptos SSR
//! rendering under a single Axum router. Every page path is rendered by the
//! Leptos app; access decisions happen in the browser once the session has
//! been restored, so the server renders the same loading shell for all of
//! them.


use std::path::PathBuf;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Host API routes: public backend config plus probes.
fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/config", get(backend_config))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .layer(cors)
        .with_state(state)
}

/// Full host router: API routes + Leptos SSR + compiled assets under `/pkg`.
///
/// # Errors
///
/// Returns an error if the Leptos configuration cannot be loaded (missing or
/// malformed `Cargo.toml` `[package.metadata.leptos]` section).
pub fn leptos_app(state: AppState) -> Result<Router, String> {
    let conf = get_configuration(None).map_err(|e| format!("leptos configuration: {e}"))?;
    let leptos_options = conf.leptos_options;
    let routes = generate_route_list(client::app::App);

    let leptos_router = Router::new()
        .leptos_routes(&leptos_options, routes, {
            let opts = leptos_options.clone();
            move || client::app::shell(opts.clone())
        })
        .with_state(leptos_options.clone());

    let site_root_path = PathBuf::from(leptos_options.site_root.as_ref());

    Ok(api_routes(state)
        .nest_service("/pkg", ServeDir::new(site_root_path.join("pkg")))
        .merge(leptos_router)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http()))
}

/// Public backend coordinates for the browser client. The anon key is a
/// publishable key; nothing secret leaves the host.
async fn backend_config(State(state): State<AppState>) -> impl IntoResponse {
    ([(header::CACHE_CONTROL, "no-store")], Json(state.backend.as_ref().clone()))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Ready once the auth service answers its health check.
async fn readyz(State(state): State<AppState>) -> StatusCode {
    let url = state.auth_health_url();
    let result = state
        .http
        .get(&url)
        .header("apikey", &state.backend.supabase_anon_key)
        .send()
        .await;
    match result {
        Ok(resp) if resp.status().is_success() => StatusCode::OK,
        Ok(resp) => {
            tracing::warn!(%url, status = %resp.status(), "auth service not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(e) => {
            tracing::warn!(%url, error = %e, "auth service unreachable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
