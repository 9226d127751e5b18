pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::agent::handlers as agent;
use crate::content::handlers as content;
use crate::ocr::handlers as ocr;
use crate::search::handlers as search;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Content
        .route("/api/chapters", get(content::handle_list_chapters))
        .route("/api/chapters/:id", get(content::handle_get_chapter))
        .route("/api/tags", get(content::handle_list_tags))
        // Semantic search
        .route("/api/search", post(search::handle_search))
        .route(
            "/api/admin/embeddings/invalidate",
            post(search::handle_invalidate),
        )
        // Agent proxy
        .route("/api/agent", post(agent::handle_agent))
        .route("/api/generate-image", post(agent::handle_generate_image))
        // OCR ingestion
        .route(
            "/api/ocr",
            post(ocr::handle_ocr).layer(DefaultBodyLimit::max(ocr::MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}
