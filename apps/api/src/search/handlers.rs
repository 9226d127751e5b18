//! Axum route handlers for semantic search and cache administration.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::search::ranker::{semantic_search, SearchResult, DEFAULT_TOP_K};
use crate::search::SearchError;
use crate::state::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// `query` stays untyped so a non-string query is reported as invalid input
/// rather than as a body deserialization failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<Value>,
    #[serde(default)]
    pub top_k: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// POST /api/search
pub async fn handle_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Json(request) = payload?;

    let query = match request.query {
        Some(Value::String(query)) => query,
        _ => return Err(SearchError::InvalidInput("Query is required".to_string()).into()),
    };
    // Non-positive values become 0, which the ranker rejects.
    let top_k = request
        .top_k
        .map(|k| usize::try_from(k).unwrap_or(0))
        .unwrap_or(DEFAULT_TOP_K);

    let results = semantic_search(&state.embeddings, &query, top_k).await?;
    Ok(Json(SearchResponse { results }))
}

/// POST /api/admin/embeddings/invalidate
///
/// Drops the chapter embedding cache; the next search rebuilds it.
pub async fn handle_invalidate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let expected = state
        .config
        .admin_token
        .as_deref()
        .ok_or(AppError::Forbidden)?;

    let provided = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    if provided != Some(expected) {
        return Err(AppError::Unauthorized);
    }

    state.embeddings.invalidate();
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::build_router;
    use crate::search::cache::CachePhase;
    use crate::testing::{read_json, TestState};

    async fn post_search(state: AppState, body: String) -> (StatusCode, Value) {
        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/search")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        (status, read_json(response).await)
    }

    #[tokio::test]
    async fn test_search_returns_ranked_results() {
        let harness = TestState::new();
        let (status, body) = post_search(
            harness.state(),
            json!({ "query": "investing", "topK": 2 }).to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0]["chapterId"].is_string());
        assert!(results[0]["chapterTitle"].is_string());
        assert!(results[0]["excerpt"].is_string());
        assert!(results[0]["score"].is_number());
    }

    #[tokio::test]
    async fn test_search_defaults_to_three_results() {
        let harness = TestState::new();
        let (status, body) =
            post_search(harness.state(), json!({ "query": "anything" }).to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_or_non_text_query_is_bad_request() {
        let harness = TestState::new();
        for body in [json!({}), json!({ "query": 42 }), json!({ "query": "" })] {
            let (status, body) = post_search(harness.state(), body.to_string()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
        assert_eq!(harness.embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_positive_top_k_is_bad_request() {
        let harness = TestState::new();
        for top_k in [0, -3] {
            let (status, _) = post_search(
                harness.state(),
                json!({ "query": "q", "topK": top_k }).to_string(),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let harness = TestState::new();
        let (status, _) = post_search(harness.state(), "{not json".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_provider_failure_is_server_error() {
        let harness = TestState::new();
        harness.embedder.fail_next(1);
        let (status, body) =
            post_search(harness.state(), json!({ "query": "q" }).to_string()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "PROVIDER_ERROR");
    }

    async fn post_invalidate(state: AppState, token: Option<&str>) -> StatusCode {
        let mut request = Request::builder()
            .method("POST")
            .uri("/api/admin/embeddings/invalidate");
        if let Some(token) = token {
            request = request.header(ADMIN_TOKEN_HEADER, token);
        }
        build_router(state)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_invalidate_requires_configured_token() {
        let harness = TestState::new();
        assert_eq!(
            post_invalidate(harness.state(), Some("anything")).await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_invalidate_rejects_wrong_token() {
        let harness = TestState::new().with_admin_token("s3cret");
        assert_eq!(
            post_invalidate(harness.state(), None).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            post_invalidate(harness.state(), Some("nope")).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_invalidate_clears_cache() {
        let harness = TestState::new().with_admin_token("s3cret");
        let state = harness.state();
        state.embeddings.ensure_cache().await.unwrap();
        assert_eq!(state.embeddings.status().state, CachePhase::Ready);

        assert_eq!(
            post_invalidate(state.clone(), Some("s3cret")).await,
            StatusCode::NO_CONTENT
        );
        assert_eq!(state.embeddings.status().state, CachePhase::Absent);
    }
}
