//! In-memory provider fakes and router helpers shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use bytes::Bytes;
use serde_json::{json, Value};

use crate::agent::ResumeAgent;
use crate::config::Config;
use crate::content::{Chapter, ContentStore};
use crate::provider::{
    AgentProvider, AgentSpec, ConversationReply, DocumentProvider, EmbeddingProvider,
    FileDownload, ProviderError,
};
use crate::search::EmbeddingCache;
use crate::state::AppState;

/// PNG signature followed by the start of an IHDR chunk.
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52,
];

/// Minimal chapter: `"{title} subtitle"`, one bullet, one tag, no image prompt.
pub fn chapter(id: &str, order: i32, title: &str) -> Chapter {
    Chapter {
        id: id.to_string(),
        order,
        title: title.to_string(),
        subtitle: format!("{title} subtitle"),
        date_range: "2020 – 2024".to_string(),
        bullet_points: vec![format!("{title} did things")],
        image_prompt: String::new(),
        tags: vec![format!("{title}-tag")],
        projects: vec![],
        accent_color: None,
    }
}

pub async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

fn injected_failure() -> ProviderError {
    ProviderError::Api {
        status: 500,
        message: "injected failure".to_string(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// Embeddings
// ────────────────────────────────────────────────────────────────────────────

/// Returns a fixed vector per input, chosen by text prefix.
pub struct FakeEmbedder {
    by_prefix: Vec<(String, Vec<f32>)>,
    default: Vec<f32>,
    truncate: usize,
    delay: Option<Duration>,
    failures: AtomicUsize,
    inputs: Mutex<Vec<Vec<String>>>,
}

impl FakeEmbedder {
    pub fn constant(vector: Vec<f32>) -> Self {
        Self::by_prefix(vec![], vector)
    }

    pub fn by_prefix(prefixes: Vec<(&str, Vec<f32>)>, default: Vec<f32>) -> Self {
        Self {
            by_prefix: prefixes
                .into_iter()
                .map(|(p, v)| (p.to_string(), v))
                .collect(),
            default,
            truncate: 0,
            delay: None,
            failures: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Drops the last `n` vectors from every response.
    pub fn truncating(mut self, n: usize) -> Self {
        self.truncate = n;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes the next `n` calls fail with a 500.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        lock(&self.inputs).len()
    }

    pub fn inputs(&self) -> Vec<Vec<String>> {
        lock(&self.inputs).clone()
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| text.starts_with(prefix.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default.clone())
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        lock(&self.inputs).push(texts.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(injected_failure());
        }

        let mut vectors: Vec<Vec<f32>> = texts.iter().map(|t| self.vector_for(t)).collect();
        vectors.truncate(vectors.len().saturating_sub(self.truncate));
        Ok(vectors)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Agent
// ────────────────────────────────────────────────────────────────────────────

/// Replies to every conversation call with the same canned outputs and
/// records what it was asked.
#[derive(Default)]
pub struct FakeAgentProvider {
    reply: ConversationReply,
    files: Mutex<HashMap<String, Bytes>>,
    specs: Mutex<Vec<AgentSpec>>,
    started: Mutex<Vec<(String, bool)>>,
    appended: Mutex<Vec<String>>,
    inputs: Mutex<Vec<String>>,
}

impl FakeAgentProvider {
    pub fn replying(conversation_id: Option<&str>, outputs: Vec<Value>) -> Self {
        Self {
            reply: ConversationReply {
                conversation_id: conversation_id.map(String::from),
                outputs,
            },
            ..Self::default()
        }
    }

    /// Registers a downloadable `image/png` file.
    pub fn add_file(&self, file_id: &str, body: &[u8]) {
        lock(&self.files).insert(file_id.to_string(), Bytes::copy_from_slice(body));
    }

    pub fn agents_created(&self) -> usize {
        lock(&self.specs).len()
    }

    pub fn last_spec(&self) -> Option<AgentSpec> {
        lock(&self.specs).last().cloned()
    }

    pub fn started(&self) -> Vec<(String, bool)> {
        lock(&self.started).clone()
    }

    pub fn appended(&self) -> Vec<String> {
        lock(&self.appended).clone()
    }

    pub fn last_input(&self) -> Option<String> {
        lock(&self.inputs).last().cloned()
    }
}

#[async_trait]
impl AgentProvider for FakeAgentProvider {
    async fn create_agent(&self, spec: &AgentSpec) -> Result<String, ProviderError> {
        let mut specs = lock(&self.specs);
        specs.push(spec.clone());
        Ok(format!("agent-{}", specs.len()))
    }

    async fn start_conversation(
        &self,
        agent_id: &str,
        inputs: &str,
        store: bool,
    ) -> Result<ConversationReply, ProviderError> {
        lock(&self.started).push((agent_id.to_string(), store));
        lock(&self.inputs).push(inputs.to_string());
        Ok(self.reply.clone())
    }

    async fn append_conversation(
        &self,
        conversation_id: &str,
        inputs: &str,
    ) -> Result<ConversationReply, ProviderError> {
        lock(&self.appended).push(conversation_id.to_string());
        lock(&self.inputs).push(inputs.to_string());
        Ok(self.reply.clone())
    }

    async fn download_file(&self, file_id: &str) -> Result<FileDownload, ProviderError> {
        match lock(&self.files).get(file_id) {
            Some(body) => Ok(FileDownload {
                content_type: Some("image/png".to_string()),
                body: body.clone(),
            }),
            None => Err(ProviderError::Api {
                status: 404,
                message: format!("file {file_id} not found"),
            }),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Documents
// ────────────────────────────────────────────────────────────────────────────

/// Returns a fixed OCR result and a fixed completion. A blank completion
/// fails with `EmptyContent`, as the real client does.
pub struct FakeDocumentProvider {
    ocr_result: Value,
    completion: String,
    uploads: Mutex<Vec<(String, usize, String)>>,
    completions: Mutex<Vec<String>>,
}

impl FakeDocumentProvider {
    pub fn new(ocr_result: Value, completion: &str) -> Self {
        Self {
            ocr_result,
            completion: completion.to_string(),
            uploads: Mutex::new(Vec::new()),
            completions: Mutex::new(Vec::new()),
        }
    }

    /// `(file name, byte length, purpose)` per upload.
    pub fn uploads(&self) -> Vec<(String, usize, String)> {
        lock(&self.uploads).clone()
    }

    /// User messages sent for completion.
    pub fn completions(&self) -> Vec<String> {
        lock(&self.completions).clone()
    }
}

impl Default for FakeDocumentProvider {
    fn default() -> Self {
        Self::new(json!({ "pages": [] }), "{}")
    }
}

#[async_trait]
impl DocumentProvider for FakeDocumentProvider {
    async fn upload_file(
        &self,
        file_name: &str,
        bytes: Bytes,
        purpose: &str,
    ) -> Result<String, ProviderError> {
        let mut uploads = lock(&self.uploads);
        uploads.push((file_name.to_string(), bytes.len(), purpose.to_string()));
        Ok(format!("file-{}", uploads.len()))
    }

    async fn ocr(&self, _file_id: &str) -> Result<Value, ProviderError> {
        Ok(self.ocr_result.clone())
    }

    async fn complete_json(&self, _system: &str, user: &str) -> Result<String, ProviderError> {
        lock(&self.completions).push(user.to_string());
        if self.completion.trim().is_empty() {
            return Err(ProviderError::EmptyContent);
        }
        Ok(self.completion.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// App state
// ────────────────────────────────────────────────────────────────────────────

/// Chapters `a`, `b`, `c` wired to fresh fakes.
pub struct TestState {
    pub embedder: Arc<FakeEmbedder>,
    pub agents: Arc<FakeAgentProvider>,
    pub documents: Arc<FakeDocumentProvider>,
    admin_token: Option<String>,
}

impl TestState {
    pub fn new() -> Self {
        Self {
            embedder: Arc::new(FakeEmbedder::constant(vec![1.0, 0.0])),
            agents: Arc::new(FakeAgentProvider::default()),
            documents: Arc::new(FakeDocumentProvider::default()),
            admin_token: None,
        }
    }

    pub fn with_admin_token(mut self, token: &str) -> Self {
        self.admin_token = Some(token.to_string());
        self
    }

    pub fn with_agents(mut self, agents: FakeAgentProvider) -> Self {
        self.agents = Arc::new(agents);
        self
    }

    pub fn with_documents(mut self, documents: FakeDocumentProvider) -> Self {
        self.documents = Arc::new(documents);
        self
    }

    /// Builds a fresh `AppState` over the shared fakes.
    pub fn state(&self) -> AppState {
        let content = Arc::new(ContentStore::new(vec![
            chapter("a", 1, "A"),
            chapter("b", 2, "B"),
            chapter("c", 3, "C"),
        ]));
        AppState {
            config: Config {
                mistral_api_key: "test-key".to_string(),
                mistral_base_url: "http://localhost:0".to_string(),
                mistral_agent_id: None,
                admin_token: self.admin_token.clone(),
                port: 0,
                rust_log: "debug".to_string(),
            },
            embeddings: Arc::new(EmbeddingCache::new(content.clone(), self.embedder.clone())),
            agent: Arc::new(ResumeAgent::new(self.agents.clone(), content.clone(), None)),
            documents: self.documents.clone(),
            content,
        }
    }
}
