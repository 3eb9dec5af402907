//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! host never touches CRM rows; it only publishes the backend coordinates
//! and probes the auth service for readiness.

use std::sync::Arc;
use std::time::Duration;

use client::net::types::BackendConfig;

/// Upper bound for the readiness probe round trip.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared application state. Clone is required by Axum.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    #[must_use]
    pub fn new(backend: BackendConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "http client build failed; using defaults");
                reqwest::Client::new()
            });
        Self { backend: Arc::new(backend), http }
    }

    /// Auth service health endpoint used by `/readyz`.
    #[must_use]
    pub fn auth_health_url(&self) -> String {
        format!("{}/auth/v1/health", self.backend.supabase_url)
    }
}
