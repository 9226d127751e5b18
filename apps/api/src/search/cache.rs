//! Embedding Cache — one embedding per chapter, built lazily in a single
//! batched provider call and memoised until explicitly invalidated.
//!
//! Lifecycle: `Absent → Building → Ready`, back to `Absent` on invalidation,
//! build failure, or a cancelled build. Concurrent cold-start requests share
//! one build: builders serialise on an async mutex and late arrivals reuse
//! whatever the first builder published.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::content::{Chapter, ContentStore};
use crate::provider::{EmbeddingProvider, ProviderError};

#[derive(Debug, Clone, PartialEq)]
pub struct ChapterEmbedding {
    pub chapter_id: String,
    pub chapter_title: String,
    pub canonical_text: String,
    pub embedding: Vec<f32>,
}

/// Deterministic text blob embedded for a chapter.
pub fn canonical_text(chapter: &Chapter) -> String {
    format!(
        "{}. {}. {}. Skills: {}",
        chapter.title,
        chapter.subtitle,
        chapter.bullet_points.join(". "),
        chapter.tags.join(", ")
    )
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CachePhase {
    Absent,
    Building,
    Ready,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub state: CachePhase,
    pub chapters: usize,
    pub built_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
struct ReadyCache {
    embeddings: Arc<Vec<ChapterEmbedding>>,
    built_at: DateTime<Utc>,
}

enum CacheState {
    Absent,
    Building,
    Ready(ReadyCache),
}

pub struct EmbeddingCache {
    content: Arc<ContentStore>,
    provider: Arc<dyn EmbeddingProvider>,
    state: RwLock<CacheState>,
    /// Bumped by `invalidate()`. A build only publishes if no invalidation
    /// happened while it was in flight.
    generation: AtomicU64,
    build_lock: tokio::sync::Mutex<()>,
}

impl EmbeddingCache {
    pub fn new(content: Arc<ContentStore>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            content,
            provider,
            state: RwLock::new(CacheState::Absent),
            generation: AtomicU64::new(0),
            build_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    /// Returns the cached chapter embeddings, building them on first use.
    ///
    /// A failed or cancelled build leaves the cache absent so the next call
    /// retries from scratch.
    pub async fn ensure_cache(&self) -> Result<Arc<Vec<ChapterEmbedding>>, ProviderError> {
        if let Some(ready) = self.ready() {
            return Ok(ready);
        }

        let _build = self.build_lock.lock().await;

        // Another request may have published while we waited for the lock.
        if let Some(ready) = self.ready() {
            return Ok(ready);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let mut building = BuildingGuard::enter(&self.state);

        let embeddings = Arc::new(self.build().await?);

        building.disarm();
        let mut state = write_state(&self.state);
        if self.generation.load(Ordering::Acquire) == generation {
            *state = CacheState::Ready(ReadyCache {
                embeddings: Arc::clone(&embeddings),
                built_at: Utc::now(),
            });
            info!("Cached {} chapter embeddings", embeddings.len());
        } else {
            warn!("Embedding cache invalidated during build; discarding built embeddings");
            if matches!(*state, CacheState::Building) {
                *state = CacheState::Absent;
            }
        }

        Ok(embeddings)
    }

    /// Drops the cached embeddings. The next search rebuilds them.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        *write_state(&self.state) = CacheState::Absent;
        info!("Embedding cache invalidated");
    }

    pub fn status(&self) -> CacheStatus {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            CacheState::Absent => CacheStatus {
                state: CachePhase::Absent,
                chapters: 0,
                built_at: None,
            },
            CacheState::Building => CacheStatus {
                state: CachePhase::Building,
                chapters: 0,
                built_at: None,
            },
            CacheState::Ready(ready) => CacheStatus {
                state: CachePhase::Ready,
                chapters: ready.embeddings.len(),
                built_at: Some(ready.built_at),
            },
        }
    }

    fn ready(&self) -> Option<Arc<Vec<ChapterEmbedding>>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            CacheState::Ready(ready) => Some(Arc::clone(&ready.embeddings)),
            _ => None,
        }
    }

    /// Embeds every chapter in display order with one provider call.
    /// Vectors are mapped back by position; the provider must preserve order.
    async fn build(&self) -> Result<Vec<ChapterEmbedding>, ProviderError> {
        let chapters = self.content.sorted();
        let texts: Vec<String> = chapters.iter().map(canonical_text).collect();

        let vectors = self.provider.embed(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(ProviderError::CountMismatch {
                expected: texts.len(),
                got: vectors.len(),
            });
        }

        Ok(chapters
            .iter()
            .zip(texts)
            .zip(vectors)
            .map(|((chapter, canonical_text), embedding)| ChapterEmbedding {
                chapter_id: chapter.id.clone(),
                chapter_title: chapter.title.clone(),
                canonical_text,
                embedding,
            })
            .collect())
    }
}

fn write_state(state: &RwLock<CacheState>) -> RwLockWriteGuard<'_, CacheState> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}

/// Marks the cache as building and resets it to absent if the build never
/// completes (provider error or the request future being dropped).
struct BuildingGuard<'a> {
    state: &'a RwLock<CacheState>,
    armed: bool,
}

impl<'a> BuildingGuard<'a> {
    fn enter(state: &'a RwLock<CacheState>) -> Self {
        *write_state(state) = CacheState::Building;
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for BuildingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = write_state(self.state);
        if matches!(*state, CacheState::Building) {
            *state = CacheState::Absent;
        }
    }
}
