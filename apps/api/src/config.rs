use anyhow::{Context, Result};

const DEFAULT_MISTRAL_BASE_URL: &str = "https://api.mistral.ai";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub mistral_api_key: String,
    pub mistral_base_url: String,
    /// Pre-provisioned agent. When unset the agent is created on first use.
    pub mistral_agent_id: Option<String>,
    /// Guards the cache administration endpoint. Unset disables it.
    pub admin_token: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            mistral_api_key: require_env("MISTRAL_API_KEY")?,
            mistral_base_url: optional_env("MISTRAL_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MISTRAL_BASE_URL.to_string()),
            mistral_agent_id: optional_env("MISTRAL_AGENT_ID"),
            admin_token: optional_env("ADMIN_TOKEN"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Empty values are treated the same as unset ones.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
