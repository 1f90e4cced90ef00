mod config;
mod contracts;
mod db;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod recruitment;
mod render;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::extraction::VisionExtractor;
use crate::llm_client::LlmClient;
use crate::render::ContractRenderer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::Storage;

/// Uploaded ID scans are phone photos; allow up to 20 MB per request.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Parafe API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let extractor = Arc::new(VisionExtractor::new(llm.clone()));

    // Contract renderer: directories are fixed for the process lifetime.
    std::fs::create_dir_all(&config.generated_dir)?;
    let renderer = ContractRenderer::new(&config.templates_dir, &config.generated_dir);
    info!(
        "Contract renderer ready (templates: {}, output: {})",
        config.templates_dir.display(),
        config.generated_dir.display()
    );

    // Optional S3 mirror for generated PDFs
    let storage = match &config.s3 {
        Some(settings) => {
            let storage = Storage::connect(settings).await;
            info!("S3 client initialized (bucket: {})", settings.bucket);
            Some(Arc::new(storage))
        }
        None => {
            info!("S3 not configured; generated PDFs stay local");
            None
        }
    };

    // Build app state
    let state = AppState {
        db,
        llm,
        extractor,
        renderer,
        storage,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
