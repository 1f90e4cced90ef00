use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::extraction::FieldExtractor;
use crate::llm_client::LlmClient;
use crate::render::ContractRenderer;
use crate::storage::Storage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub llm: LlmClient,
    /// Pluggable document extractor. Production: the vision model; tests
    /// substitute a stub.
    pub extractor: Arc<dyn FieldExtractor>,
    /// Contract rendering engine, configured once at startup.
    pub renderer: ContractRenderer,
    /// Optional S3 mirror for generated PDFs.
    pub storage: Option<Arc<Storage>>,
    pub config: Config,
}
