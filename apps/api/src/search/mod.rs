// Semantic search over résumé chapters.
// Embedding cache + similarity ranker; the only algorithmic core of the service.
// All embedding calls go through the `EmbeddingProvider` boundary.

pub mod cache;
pub mod handlers;
pub mod ranker;

use thiserror::Error;

use crate::provider::ProviderError;

pub use cache::EmbeddingCache;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Caller-supplied query missing, empty or non-textual. Not retried.
    #[error("Invalid search input: {0}")]
    InvalidInput(String),

    /// Embedding provider unavailable, during either cache build or query embedding.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
