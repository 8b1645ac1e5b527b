use std::sync::Arc;

use crate::analysis::storage::UploadStore;
use crate::config::Config;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable text generator. Default: `VertexClient`; tests swap in a stub.
    pub generator: Arc<dyn TextGenerator>,
    /// Root upload directory. Requests may narrow it via `UploadStore::scoped`.
    pub store: UploadStore,
    pub config: Config,
}
