mod analysis;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::storage::UploadStore;
use crate::config::Config;
use crate::llm_client::VertexClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Blueprint API v{}", env!("CARGO_PKG_VERSION"));
    info!("Project ID: {}", config.project_id);
    info!("Location: {}", config.location);
    info!("Model name: {}", config.model_name);

    // Upload directory must exist before the first request
    std::fs::create_dir_all(&config.upload_dir)?;
    let store = UploadStore::new(config.upload_dir.clone());
    info!(
        "Upload directory: {} (per-request scope: {})",
        store.root().display(),
        config.scope_uploads_per_request
    );

    let generator = Arc::new(VertexClient::new(&config)?);
    info!("Model client initialized ({})", config.vertex_endpoint);

    let state = AppState {
        generator,
        store,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
