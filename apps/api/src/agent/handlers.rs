//! Axum route handlers for the chat agent and chapter image generation.

use anyhow::anyhow;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::agent::prompts::{default_reply, fallback_image_prompt};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub conversation_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_used: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenRequest {
    pub chapter_id: String,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenResponse {
    pub image_url: String,
    pub chapter_id: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/agent
///
/// Starts a conversation, or continues one when `conversationId` is given.
pub async fn handle_agent(
    State(state): State<AppState>,
    payload: Result<Json<AgentRequest>, JsonRejection>,
) -> Result<Json<AgentResponse>, AppError> {
    let Json(request) = payload?;

    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Message is required".to_string()))?;
    let conversation_id = request.conversation_id.filter(|id| !id.is_empty());

    let turn = state
        .agent
        .send(conversation_id.as_deref(), &message)
        .await
        .map_err(|e| AppError::Provider(format!("Agent conversation failed: {e}")))?;

    let conversation_id = turn
        .conversation_id
        .ok_or_else(|| AppError::Internal(anyhow!("Conversation ID missing from response")))?;

    let content = if turn.text.is_empty() {
        default_reply()
    } else {
        turn.text
    };

    Ok(Json(AgentResponse {
        conversation_id,
        content,
        image_url: turn.image_url,
        tool_used: turn.tool_used,
    }))
}

/// POST /api/generate-image
///
/// Renders a chapter visual with the agent's image tool.
pub async fn handle_generate_image(
    State(state): State<AppState>,
    payload: Result<Json<ImageGenRequest>, JsonRejection>,
) -> Result<Json<ImageGenResponse>, AppError> {
    let Json(request) = payload?;

    let chapter = state
        .content
        .get(&request.chapter_id)
        .ok_or_else(|| AppError::NotFound(format!("Chapter \"{}\" not found", request.chapter_id)))?;

    let prompt = request
        .prompt
        .filter(|p| !p.trim().is_empty())
        .or_else(|| Some(chapter.image_prompt.clone()).filter(|p| !p.trim().is_empty()))
        .unwrap_or_else(|| fallback_image_prompt(chapter));

    let image_url = state
        .agent
        .generate_image(&prompt)
        .await
        .map_err(|e| AppError::Provider(format!("Image generation failed: {e}")))?
        .ok_or_else(|| {
            AppError::UnprocessableEntity(
                "Image generation did not produce a result. The agent may need a different prompt."
                    .to_string(),
            )
        })?;

    Ok(Json(ImageGenResponse {
        image_url,
        chapter_id: request.chapter_id,
    }))
}
