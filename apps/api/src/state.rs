use std::sync::Arc;

use crate::config::Config;
use crate::ingest::pipeline::UploadPipeline;
use crate::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: UploadPipeline,
    /// Read side for the query routes. The pipeline holds its own handle for writes.
    pub store: Arc<dyn ResumeStore>,
}
