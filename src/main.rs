mod config;
mod routes;
mod state;

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("failed to load .env: {e}");
        }
    }
    tracing_subscriber::fmt::init();

    let config = config::ServerConfig::from_env().expect("invalid host configuration");
    if config.backend.ai_assistant_url.is_none() {
        tracing::warn!("AI_ASSISTANT_URL not set; assistant page disabled");
    }

    let port = config.port;
    let state = state::AppState::new(config.backend);
    let app = routes::leptos_app(state).expect("leptos configuration failed");

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "crm listening");
    axum::serve(listener, app).await.expect("server failed");
}
