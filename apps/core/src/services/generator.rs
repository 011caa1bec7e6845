//! Reply generation through an OpenAI-style chat-completions API.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use super::traits::ReplyGenerator;
use crate::error::AppError;
use crate::models::ChatMessage;

const GENERATION_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REPLY_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;

/// HTTP client for the generation collaborator.
pub struct GeneratorClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: Client,
}

impl GeneratorClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_key,
            model: model.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ReplyGenerator for GeneratorClient {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("OPENAI_API_KEY is not set".to_string()))?;

        debug!(messages = messages.len(), model = %self.model, "requesting completion");

        let payload = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": MAX_REPLY_TOKENS,
            "temperature": TEMPERATURE,
        });

        let request_future = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send();

        let res = timeout(GENERATION_TIMEOUT, request_future).await??;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Http(format!(
                "completion request failed with status {}: {}",
                status, body
            )));
        }

        let json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| AppError::Http(e.to_string()))?;

        Ok(json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string())
    }
}
