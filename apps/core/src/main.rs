// Fy Engine entry point
// Guarded conversational pipeline for the Fy anti-fraud assistant.

mod brain;
mod config;
mod error;
mod guardrails;
mod models;
mod orchestrator;
mod prompts;
mod rate_limiter;
mod server;
mod services;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::EngineConfig;
use guardrails::PatternPiiGuard;
use orchestrator::ChatOrchestrator;
use rate_limiter::RateLimiter;
use server::AppState;
use services::analysis::{AnalysisClient, AnalysisDispatcher};
use services::generator::GeneratorClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EngineConfig::from_env()?;
    info!(
        analysis_service = %config.analysis_service_url,
        model = %config.openai_model,
        "starting fy-engine"
    );

    // Collaborators are built once and shared across turns.
    let guard = Arc::new(PatternPiiGuard::new());
    let analyzer = Arc::new(AnalysisClient::new(&config.analysis_service_url));
    let dispatcher = AnalysisDispatcher::new(analyzer);
    let generator = Arc::new(GeneratorClient::new(
        &config.openai_base_url,
        config.openai_api_key.clone(),
        &config.openai_model,
    ));
    let orchestrator = Arc::new(ChatOrchestrator::new(guard, dispatcher, generator));

    let limiter = Arc::new(Mutex::new(RateLimiter::new(
        config.chat_rate_limit,
        Duration::from_secs(config.chat_rate_window_secs),
    )));

    let state = AppState {
        orchestrator,
        limiter,
    };

    server::run(state, &config.bind_addr).await
}
