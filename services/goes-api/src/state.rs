//! Shared application state handed to every handler.

use std::sync::Arc;

use goes_catalog::Catalog;
use goes_engine::EngineConfig;
use goes_store::QueryStore;

/// Everything a handler needs: the catalog (stateless, cheap to copy), the
/// query store, the engine configuration, and the S3 client the orchestrator
/// hands to each spawned pipeline run.
#[derive(Clone)]
pub struct AppState {
    /// Satellite/product catalog used for validation and estimation.
    pub catalog: Catalog,
    /// Persistent query record store.
    pub store: Arc<dyn QueryStore>,
    /// Engine configuration (acceptance limits, worker pool size, API key, ...).
    pub config: Arc<EngineConfig>,
    /// Shared S3 client for the remote fallback.
    pub s3_client: Arc<aws_sdk_s3::Client>,
}
