use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::request::{MAX_TEMPERATURE, MIN_TEMPERATURE};
use crate::llm_client::ModelSettings;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub request_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let temperature = get("OPENAI_TEMPERATURE", "0.7")
            .parse::<f32>()
            .context("OPENAI_TEMPERATURE must be a number")?;
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
            bail!("OPENAI_TEMPERATURE must be within [{MIN_TEMPERATURE}, {MAX_TEMPERATURE}], got {temperature}");
        }

        let max_tokens = get("OPENAI_MAX_TOKENS", "2000")
            .parse::<u32>()
            .context("OPENAI_MAX_TOKENS must be a non-negative integer")?;

        Ok(Config {
            openai_api_key: lookup("OPENAI_API_KEY")
                .filter(|k| !k.trim().is_empty())
                .context("Required environment variable 'OPENAI_API_KEY' is not set")?,
            openai_base_url: get("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            model: get("OPENAI_MODEL", DEFAULT_MODEL),
            temperature,
            // 0 means "let the backend decide"
            max_tokens: (max_tokens > 0).then_some(max_tokens),
            request_timeout: Duration::from_secs(
                get("OPENAI_TIMEOUT_SECS", "120")
                    .parse::<u64>()
                    .context("OPENAI_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            port: get("PORT", "5001")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG", "info"),
        })
    }

    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}
