use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Config,
    /// Cancelled on shutdown; each request works on a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Cancellation token for one request.
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
