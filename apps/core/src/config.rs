//! Environment-driven configuration.

use std::env;
use url::Url;

use crate::error::AppError;

/// Maximum prior context turns forwarded to the generator.
pub const MAX_CONTEXT_MESSAGES: usize = 10;

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Base URL of the threat-analysis service.
    pub analysis_service_url: String,
    /// Generation API key; generation degrades to the fallback reply when unset.
    pub openai_api_key: Option<String>,
    /// Generation model identifier.
    pub openai_model: String,
    /// Base URL of the generation API.
    pub openai_base_url: String,
    /// Allowed chat turns per user within the window.
    pub chat_rate_limit: usize,
    /// Rate-limit window in seconds.
    pub chat_rate_window_secs: u64,
}

impl EngineConfig {
    /// Load configuration from the environment (and a `.env` file if present).
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();

        let analysis_service_url =
            env::var("ANALYSIS_SERVICE_URL").unwrap_or_else(|_| "http://analysis:8081".to_string());
        let openai_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        // Fail at startup on unusable collaborator URLs, not mid-turn.
        Url::parse(&analysis_service_url)?;
        Url::parse(&openai_base_url)?;

        Ok(Self {
            bind_addr: env::var("FY_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8082".to_string()),
            analysis_service_url,
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_base_url,
            chat_rate_limit: env_usize("FY_CHAT_RATE_LIMIT", 20),
            chat_rate_window_secs: env_u64("FY_CHAT_RATE_WINDOW_SECS", 60),
        })
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
