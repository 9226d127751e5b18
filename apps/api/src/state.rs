use std::sync::Arc;

use crate::agent::ResumeAgent;
use crate::config::Config;
use crate::content::ContentStore;
use crate::provider::DocumentProvider;
use crate::search::EmbeddingCache;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub content: Arc<ContentStore>,
    /// Chapter embeddings for semantic search. Built on the first search.
    pub embeddings: Arc<EmbeddingCache>,
    pub agent: Arc<ResumeAgent>,
    /// Upload, OCR and JSON completion boundary.
    pub documents: Arc<dyn DocumentProvider>,
}
