use axum::{
    extract::{Path, State},
    Json,
};

use crate::content::Chapter;
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/chapters
pub async fn handle_list_chapters(State(state): State<AppState>) -> Json<Vec<Chapter>> {
    Json(state.content.sorted().to_vec())
}

/// GET /api/chapters/:id
pub async fn handle_get_chapter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Chapter>, AppError> {
    state
        .content
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Chapter \"{id}\" not found")))
}

/// GET /api/tags
pub async fn handle_list_tags(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.content.all_tags())
}
