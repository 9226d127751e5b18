/// Provider client — the single point of entry for all Mistral API calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider over HTTP directly.
/// Route handlers and services depend on the narrow traits below, which the
/// `MistralClient` implements and tests replace with in-memory fakes.
///
/// Models are hardcoded constants to prevent drift between environments.
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub const EMBED_MODEL: &str = "mistral-embed";
pub const AGENT_MODEL: &str = "mistral-medium-latest";
pub const STRUCTURE_MODEL: &str = "mistral-small-latest";
pub const OCR_MODEL: &str = "mistral-ocr-2505";
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Provider returned empty content")]
    EmptyContent,

    #[error("Provider returned {got} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}

// ────────────────────────────────────────────────────────────────────────────
// Provider boundaries
// ────────────────────────────────────────────────────────────────────────────

/// Order-preserving batch embedding. One call per batch.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}

/// Hosted agent and conversation API, plus the file store that holds
/// tool-generated artifacts.
#[async_trait]
pub trait AgentProvider: Send + Sync {
    async fn create_agent(&self, spec: &AgentSpec) -> Result<String, ProviderError>;

    async fn start_conversation(
        &self,
        agent_id: &str,
        inputs: &str,
        store: bool,
    ) -> Result<ConversationReply, ProviderError>;

    async fn append_conversation(
        &self,
        conversation_id: &str,
        inputs: &str,
    ) -> Result<ConversationReply, ProviderError>;

    async fn download_file(&self, file_id: &str) -> Result<FileDownload, ProviderError>;
}

/// Document upload, OCR and JSON-mode chat completion.
#[async_trait]
pub trait DocumentProvider: Send + Sync {
    async fn upload_file(
        &self,
        file_name: &str,
        bytes: Bytes,
        purpose: &str,
    ) -> Result<String, ProviderError>;

    async fn ocr(&self, file_id: &str) -> Result<Value, ProviderError>;

    /// Returns the raw text content of the first choice.
    async fn complete_json(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Shared wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AgentSpec {
    pub model: String,
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub tools: Vec<AgentTool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentTool {
    #[serde(rename = "type")]
    pub tool_type: String,
}

impl AgentTool {
    pub fn new(tool_type: &str) -> Self {
        Self {
            tool_type: tool_type.to_string(),
        }
    }
}

/// A conversation turn as returned by the provider. Outputs stay opaque
/// here; `agent::chunks` owns their interpretation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationReply {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub outputs: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct FileDownload {
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct StartConversationRequest<'a> {
    agent_id: &'a str,
    inputs: &'a str,
    store: bool,
}

#[derive(Serialize)]
struct AppendConversationRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
struct CreatedObject {
    id: String,
}

#[derive(Serialize)]
struct OcrRequest<'a> {
    model: &'a str,
    document: OcrDocument<'a>,
}

#[derive(Serialize)]
struct OcrDocument<'a> {
    #[serde(rename = "type")]
    document_type: &'static str,
    file_id: &'a str,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
    detail: Option<Value>,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single Mistral client used by all services.
#[derive(Clone)]
pub struct MistralClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl MistralClient {
    pub fn new(api_key: String, base_url: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    /// Sends a request built fresh on each attempt.
    /// Retries on 429 (rate limit), 5xx and transport errors with exponential backoff.
    async fn send<F>(&self, build: F) -> Result<Response, ProviderError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut last_error: Option<ProviderError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Provider call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = build(&self.client)
                .bearer_auth(&self.api_key)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ProviderError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Provider API returned {}: {}", status, body);
                last_error = Some(ProviderError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderError::Api {
                    status: status.as_u16(),
                    message: parse_error_message(body),
                });
            }

            return Ok(response);
        }

        Err(exhausted(last_error))
    }
}

#[async_trait]
impl EmbeddingProvider for MistralClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.url("embeddings");
        let request = EmbeddingRequest {
            model: EMBED_MODEL,
            input: texts,
        };
        let response = self.send(|c| c.post(&url).json(&request)).await?;
        let parsed: EmbeddingResponse = serde_json::from_slice(&response.bytes().await?)?;

        if parsed.data.len() != texts.len() {
            return Err(ProviderError::CountMismatch {
                expected: texts.len(),
                got: parsed.data.len(),
            });
        }

        debug!("Embedded {} inputs with {}", texts.len(), EMBED_MODEL);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl AgentProvider for MistralClient {
    async fn create_agent(&self, spec: &AgentSpec) -> Result<String, ProviderError> {
        let url = self.url("agents");
        let response = self.send(|c| c.post(&url).json(spec)).await?;
        let created: CreatedObject = serde_json::from_slice(&response.bytes().await?)?;
        Ok(created.id)
    }

    async fn start_conversation(
        &self,
        agent_id: &str,
        inputs: &str,
        store: bool,
    ) -> Result<ConversationReply, ProviderError> {
        let url = self.url("conversations");
        let request = StartConversationRequest {
            agent_id,
            inputs,
            store,
        };
        let response = self.send(|c| c.post(&url).json(&request)).await?;
        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }

    async fn append_conversation(
        &self,
        conversation_id: &str,
        inputs: &str,
    ) -> Result<ConversationReply, ProviderError> {
        let url = self.url(&format!("conversations/{conversation_id}"));
        let request = AppendConversationRequest { inputs };
        let response = self.send(|c| c.post(&url).json(&request)).await?;
        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }

    async fn download_file(&self, file_id: &str) -> Result<FileDownload, ProviderError> {
        let url = self.url(&format!("files/{file_id}/content"));
        let response = self.send(|c| c.get(&url)).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.bytes().await?;
        Ok(FileDownload { content_type, body })
    }
}

#[async_trait]
impl DocumentProvider for MistralClient {
    async fn upload_file(
        &self,
        file_name: &str,
        bytes: Bytes,
        purpose: &str,
    ) -> Result<String, ProviderError> {
        let url = self.url("files");
        let response = self
            .send(|c| {
                let part = multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
                let form = multipart::Form::new()
                    .text("purpose", purpose.to_string())
                    .part("file", part);
                c.post(&url).multipart(form)
            })
            .await?;
        let created: CreatedObject = serde_json::from_slice(&response.bytes().await?)?;
        Ok(created.id)
    }

    async fn ocr(&self, file_id: &str) -> Result<Value, ProviderError> {
        let url = self.url("ocr");
        let request = OcrRequest {
            model: OCR_MODEL,
            document: OcrDocument {
                document_type: "file",
                file_id,
            },
        };
        let response = self.send(|c| c.post(&url).json(&request)).await?;
        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }

    async fn complete_json(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let url = self.url("chat/completions");
        let request = ChatRequest {
            model: STRUCTURE_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };
        let response = self.send(|c| c.post(&url).json(&request)).await?;
        let parsed: ChatResponse = serde_json::from_slice(&response.bytes().await?)?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::EmptyContent)
    }
}

/// Final error once every retry failed. A trailing 429 becomes `RateLimited`.
fn exhausted(last_error: Option<ProviderError>) -> ProviderError {
    match last_error {
        Some(ProviderError::Api { status: 429, .. }) | None => ProviderError::RateLimited {
            retries: MAX_RETRIES,
        },
        Some(e) => e,
    }
}

/// Pulls a human-readable message out of a provider error body, falling back
/// to the raw body.
fn parse_error_message(body: String) -> String {
    match serde_json::from_str::<ProviderErrorBody>(&body) {
        Ok(ProviderErrorBody {
            message: Some(message),
            ..
        }) => message,
        Ok(ProviderErrorBody {
            detail: Some(detail),
            ..
        }) => match detail {
            Value::String(s) => s,
            other => other.to_string(),
        },
        _ => body,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
