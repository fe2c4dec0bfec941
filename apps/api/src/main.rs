mod analysis;
mod archive;
mod auth;
mod config;
mod db;
mod errors;
mod ingest;
mod llm_client;
mod models;
mod resumes;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::ResumeAnalyzer;
use crate::archive::S3Archive;
use crate::config::Config;
use crate::db::create_pool;
use crate::ingest::extract::{PdfTextLayer, TextExtractor};
use crate::ingest::ocr::TesseractOcr;
use crate::ingest::pipeline::UploadPipeline;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgResumeStore;
use crate::store::ResumeStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Cannot create upload dir {}", config.upload_dir.display()))?;

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store: Arc<dyn ResumeStore> = Arc::new(PgResumeStore::new(db));

    // Initialize S3 / MinIO
    let archive = Arc::new(S3Archive::connect(&config).await);
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Initialize LLM client
    let llm = LlmClient::new(config.llm_config())?;
    info!("LLM client initialized (model: {})", llm.model());

    let extractor = TextExtractor::new(
        Arc::new(PdfTextLayer),
        Arc::new(TesseractOcr::new(config.ocr_max_pages)),
    );
    let analyzer = ResumeAnalyzer::new(
        Arc::new(llm),
        config.retry_policy(),
        config.max_text_length,
    );
    let pipeline = UploadPipeline::new(
        config.upload_policy(),
        extractor,
        analyzer,
        store.clone(),
        archive,
        config.max_text_length,
        !config.is_production(),
    );

    let state = AppState {
        config: config.clone(),
        pipeline,
        store,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
