// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use streaming_viewport::application::streaming_service::StreamingService;
use streaming_viewport::infrastructure::broadcast_renderer::BroadcastRenderer;
use streaming_viewport::infrastructure::config::load_settings;
use streaming_viewport::infrastructure::sine_source::SineWaveSource;
use streaming_viewport::presentation::app_state::AppState;
use streaming_viewport::presentation::handlers::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let settings = load_settings()?;

    // Create collaborators (infrastructure layer)
    let source = Arc::new(SineWaveSource::from_channels(&settings.channels));
    let renderer = BroadcastRenderer::new();
    let render_feed = renderer.feed();

    // Start the controller (application layer)
    let (streaming_service, controller_task) =
        StreamingService::spawn(settings.stream.clone(), &settings.channels, source, renderer)?;

    let state = Arc::new(AppState {
        streaming_service: streaming_service.clone(),
        render_feed,
    });

    // Build router (presentation layer)
    let app = router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = settings
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", settings.server.bind))?;
    tracing::info!("Starting streaming viewport service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
            // Disposing the renderer ends open render streams so the server can drain
            if let Err(e) = streaming_service.shutdown().await {
                tracing::warn!("Controller already stopped: {}", e);
            }
        })
        .await?;

    controller_task
        .await
        .context("Controller task panicked")?
        .context("Controller stopped on a fatal error")?;

    Ok(())
}
