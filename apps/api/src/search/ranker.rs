//! Similarity Ranker — scores a free-text query against every cached chapter
//! embedding and returns the best matches.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::provider::ProviderError;
use crate::search::cache::{ChapterEmbedding, EmbeddingCache};
use crate::search::SearchError;

pub const DEFAULT_TOP_K: usize = 3;
/// Characters of canonical text shown in a result before truncation.
pub const EXCERPT_CHARS: usize = 200;
const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub chapter_id: String,
    pub chapter_title: String,
    pub excerpt: String,
    pub score: f32,
}

/// Ranks chapters against `query`, building the embedding cache if needed.
///
/// The query is validated before any provider call. Cache-build and
/// query-embedding failures both surface as `SearchError::Provider`.
pub async fn semantic_search(
    cache: &EmbeddingCache,
    query: &str,
    top_k: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    if query.trim().is_empty() {
        return Err(SearchError::InvalidInput("Query is required".to_string()));
    }
    if top_k == 0 {
        return Err(SearchError::InvalidInput(
            "topK must be a positive integer".to_string(),
        ));
    }

    let chapters = cache.ensure_cache().await?;

    let vectors = cache.provider().embed(&[query.to_string()]).await?;
    let query_embedding = match <[Vec<f32>; 1]>::try_from(vectors) {
        Ok([v]) => v,
        Err(vectors) => {
            return Err(ProviderError::CountMismatch {
                expected: 1,
                got: vectors.len(),
            }
            .into())
        }
    };

    let results = rank(&query_embedding, &chapters, top_k);
    debug!(
        "Semantic search over {} chapters returned {} results",
        chapters.len(),
        results.len()
    );
    Ok(results)
}

/// Scores, stably sorts (ties keep display order) and truncates to `top_k`.
pub fn rank(query: &[f32], chapters: &[ChapterEmbedding], top_k: usize) -> Vec<SearchResult> {
    let mut scored: Vec<(f32, &ChapterEmbedding)> = chapters
        .iter()
        .map(|ce| (cosine_similarity(query, &ce.embedding), ce))
        .collect();

    // `sort_by` is stable.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored
        .into_iter()
        .take(top_k)
        .map(|(score, ce)| SearchResult {
            chapter_id: ce.chapter_id.clone(),
            chapter_title: ce.chapter_title.clone(),
            excerpt: excerpt(&ce.canonical_text),
            score,
        })
        .collect()
}

/// Dot product over the product of Euclidean norms; 0.0 when either norm is 0
/// or a component is not finite.
/// Only the overlapping dimensions of mismatched vectors are compared.
/// Sums are accumulated in `f64` so large finite components cannot overflow.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    let score = dot / denominator;
    if denominator == 0.0 || !score.is_finite() {
        0.0
    } else {
        score as f32
    }
}

/// First `EXCERPT_CHARS` characters, with an ellipsis when text was cut.
pub fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}
