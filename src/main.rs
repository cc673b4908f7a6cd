use std::sync::Arc;

use anyhow::Result;
use research_graph::{api, app_state::AppState, backend::RetrievalClient, config};
use tokio::sync::oneshot;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = config::AppConfig::from_env()?;

    let backend = RetrievalClient::from_config(&cfg)?;
    info!("Retrieval backend at {}", cfg.retrieval_api_url);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let app_state = AppState::new(cfg.clone(), Arc::new(backend));
    *app_state
        .shutdown_sender
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(shutdown_tx);

    let app = api::create_router(app_state)
        .fallback_service(ServeDir::new(&cfg.frontend_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let listener = tokio::net::TcpListener::bind(&cfg.server_addr).await?;
    let server_url = format!("http://{}", cfg.server_addr);
    info!("🚀 Listening on {}", &server_url);

    if cfg.open_browser && webbrowser::open(&server_url).is_err() {
        warn!("Could not open a browser. Visit {} manually.", server_url);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            info!("Shutdown signal received, closing the server.");
        })
        .await?;

    info!("✅ Server closed.");
    Ok(())
}
