//! Conversational Agent Proxy.
//!
//! Forwards chat turns and image requests to the hosted agent and reduces its
//! heterogeneous outputs to "text plus an optional inline image". The agent
//! itself is created lazily from the Content Store unless an id is configured.

pub mod chunks;
pub mod handlers;
pub mod image;
pub mod prompts;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::agent::chunks::decode_outputs;
use crate::agent::image::download_to_data_url;
use crate::content::ContentStore;
use crate::provider::{AgentProvider, AgentSpec, AgentTool, ConversationReply, ProviderError, AGENT_MODEL};

pub const IMAGE_TOOL: &str = "image_generation";

/// One decoded agent turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentTurn {
    pub conversation_id: Option<String>,
    pub text: String,
    pub image_url: Option<String>,
    pub tool_used: Option<String>,
}

pub struct ResumeAgent {
    provider: Arc<dyn AgentProvider>,
    content: Arc<ContentStore>,
    /// Memoised agent id. The async mutex keeps concurrent first requests
    /// from creating duplicate agents.
    agent_id: Mutex<Option<String>>,
}

impl ResumeAgent {
    pub fn new(
        provider: Arc<dyn AgentProvider>,
        content: Arc<ContentStore>,
        configured_agent_id: Option<String>,
    ) -> Self {
        Self {
            provider,
            content,
            agent_id: Mutex::new(configured_agent_id),
        }
    }

    /// Returns the agent id, creating the agent on first use.
    pub async fn agent_id(&self) -> Result<String, ProviderError> {
        let mut agent_id = self.agent_id.lock().await;
        if let Some(id) = agent_id.as_ref() {
            return Ok(id.clone());
        }

        let spec = AgentSpec {
            model: AGENT_MODEL.to_string(),
            name: prompts::AGENT_NAME.to_string(),
            description: prompts::agent_description(),
            instructions: prompts::build_agent_instructions(&self.content),
            tools: prompts::AGENT_TOOLS.iter().map(|t| AgentTool::new(t)).collect(),
        };

        let id = self.provider.create_agent(&spec).await.map_err(|e| {
            error!("Failed to create agent: {e}");
            e
        })?;
        info!("Agent created: {id}");
        *agent_id = Some(id.clone());
        Ok(id)
    }

    /// Sends a user message, continuing `conversation_id` when given.
    pub async fn send(
        &self,
        conversation_id: Option<&str>,
        message: &str,
    ) -> Result<AgentTurn, ProviderError> {
        let reply = match conversation_id {
            Some(id) => self.provider.append_conversation(id, message).await?,
            None => {
                let agent_id = self.agent_id().await?;
                self.provider
                    .start_conversation(&agent_id, message, true)
                    .await?
            }
        };

        let mut turn = self.decode(reply).await;
        if turn.conversation_id.is_none() {
            turn.conversation_id = conversation_id.map(String::from);
        }
        Ok(turn)
    }

    /// Asks the agent to render `prompt` in a throwaway conversation.
    /// Returns `None` when no image came back.
    pub async fn generate_image(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        let agent_id = self.agent_id().await?;
        let reply = self
            .provider
            .start_conversation(&agent_id, &prompts::image_request(prompt), false)
            .await?;
        Ok(self.decode(reply).await.image_url)
    }

    /// Collects text and downloads generated images. The last image that
    /// downloads and decodes cleanly wins; failures are logged, not raised.
    async fn decode(&self, reply: ConversationReply) -> AgentTurn {
        let decoded = decode_outputs(&reply.outputs);

        let mut image_url = None;
        for file_id in &decoded.file_ids {
            match self.provider.download_file(file_id).await {
                Ok(download) => match download_to_data_url(&download) {
                    Ok(url) => image_url = Some(url),
                    Err(e) => warn!("Failed to decode generated image {file_id}: {e}"),
                },
                Err(e) => error!("Failed to download generated image {file_id}: {e}"),
            }
        }

        AgentTurn {
            conversation_id: reply.conversation_id,
            text: decoded.text,
            image_url,
            tool_used: decoded.saw_tool_file.then(|| IMAGE_TOOL.to_string()),
        }
    }
}
