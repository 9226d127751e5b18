mod agent;
mod config;
mod content;
mod errors;
mod ocr;
mod provider;
mod routes;
mod search;
mod state;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::agent::ResumeAgent;
use crate::config::Config;
use crate::content::ContentStore;
use crate::provider::MistralClient;
use crate::routes::build_router;
use crate::search::EmbeddingCache;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Load authored content
    let content = Arc::new(ContentStore::authored());
    info!("Loaded {} chapters", content.len());

    // Initialize provider client
    let mistral = Arc::new(
        MistralClient::new(config.mistral_api_key.clone(), &config.mistral_base_url)
            .context("Failed to build provider HTTP client")?,
    );
    info!(
        "Provider client initialized (embeddings: {}, agent: {})",
        provider::EMBED_MODEL,
        provider::AGENT_MODEL
    );

    // Embedding cache starts absent and is built by the first search
    let embeddings = Arc::new(EmbeddingCache::new(content.clone(), mistral.clone()));

    let agent = Arc::new(ResumeAgent::new(
        mistral.clone(),
        content.clone(),
        config.mistral_agent_id.clone(),
    ));
    if config.admin_token.is_none() {
        info!("ADMIN_TOKEN not set; cache administration endpoint disabled");
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        content,
        embeddings,
        agent,
        documents: mistral,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the site origin once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
