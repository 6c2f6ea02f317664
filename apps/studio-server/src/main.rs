///! Genga Studio Server
///! Serves the studio page and its JSON API on a single shared session

use std::path::PathBuf;
use studio_server::{create_app, AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("studio_server=debug,genga=debug,tower_http=info")),
        )
        .init();

    info!("Starting Genga Studio Server...");

    // Optional config file as the only argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = genga::StudioConfig::resolve(config_path.as_deref())?;
    info!(
        "Backend: {}, suggestion language: {}",
        config.backend.backend_type, config.suggestion_language
    );

    let (backend, services) = genga::connect(&config)?;
    match backend.is_available().await {
        Ok(true) => info!("{} backend is available", backend.name()),
        Ok(false) => warn!("{} backend rejected the probe; check the API key", backend.name()),
        Err(e) => warn!("{} backend is not reachable: {}", backend.name(), e),
    }

    let app = create_app(AppState::new(services));

    // Start server
    let addr = config.bind_addr.as_str();
    info!("Genga Studio listening on http://{}", addr);
    info!("API endpoints:");
    info!("  GET    /api/state                      - Current view");
    info!("  PUT    /api/scene                      - Update description, style, frame count");
    info!("  POST   /api/image                      - Upload reference frame (data URL)");
    info!("  DELETE /api/image                      - Remove reference frame");
    info!("  POST   /api/suggestions/:index/select  - Use a suggestion");
    info!("  POST   /api/presets/:index/apply       - Apply an example scene");
    info!("  POST   /api/generate                   - Generate key frames");
    info!("  GET    /api/styles, /api/presets       - Catalogues");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
