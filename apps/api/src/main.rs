mod advertising;
mod code_review;
mod config;
mod devops;
mod errors;
mod llm_client;
mod pharmacy;
mod publishing;
mod requirements;
mod retro;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::backend::OpenAiBackend;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; a missing OPENAI_API_KEY stops startup here
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Assistant API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let backend = OpenAiBackend::new(
        &config.openai_base_url,
        config.openai_api_key.clone(),
        config.request_timeout,
    )
    .context("Failed to build the OpenAI HTTP client")?;
    let llm = LlmClient::new(Arc::new(backend), config.model_settings());
    info!(
        "LLM client initialized (model: {}, base url: {})",
        llm.model(),
        config.openai_base_url
    );

    let shutdown = CancellationToken::new();
    let state = AppState {
        llm,
        config: config.clone(),
        shutdown: shutdown.clone(),
    };

    let app = build_router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C and cancels every in-flight completion.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {e}");
        return std::future::pending().await;
    }
    info!("Shutdown requested; cancelling in-flight requests");
    shutdown.cancel();
}
