//! In-memory collaborator doubles for pipeline and server tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::brain::EntityType;
use crate::error::AppError;
use crate::models::ChatMessage;
use crate::services::analysis::{AnalysisResult, Verdict};
use crate::services::traits::{ReplyGenerator, ThreatAnalyzer};

/// Generator double. `reply: None` simulates a collaborator failure.
pub struct FakeGenerator {
    reply: Option<String>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeGenerator {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            seen: Mutex::new(Vec::new()),
        })
    }

    /// The message list of the most recent generation request.
    pub fn last_request(&self) -> Vec<ChatMessage> {
        self.seen
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("generator was never called")
    }
}

#[async_trait]
impl ReplyGenerator for FakeGenerator {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(AppError::Http("connection refused".to_string())),
        }
    }
}

/// Analyzer double. `result: None` simulates a timeout.
pub struct FakeAnalyzer {
    result: Option<AnalysisResult>,
    calls: Mutex<Vec<(EntityType, String)>>,
}

impl FakeAnalyzer {
    pub fn with_result(result: AnalysisResult) -> Arc<Self> {
        Arc::new(Self {
            result: Some(result),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            result: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(EntityType, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ThreatAnalyzer for FakeAnalyzer {
    async fn analyze(&self, kind: EntityType, value: &str) -> Result<AnalysisResult, AppError> {
        self.calls.lock().unwrap().push((kind, value.to_string()));
        match &self.result {
            Some(result) => Ok(result.clone()),
            None => Err(AppError::Timeout("deadline exceeded".to_string())),
        }
    }
}

/// A dangerous-URL verdict like the analysis service would return.
pub fn dangerous_url_result(url: &str) -> AnalysisResult {
    AnalysisResult {
        entity_type: Some(EntityType::Url),
        content: Some(url.to_string()),
        risk_score: 85,
        verdict: Verdict::Dangerous,
        found_in_db: true,
        source: Some("localdb".to_string()),
        reasons: vec![
            "URL acortada que oculta el destino real".to_string(),
            "Dominio registrado hace solo 3 días".to_string(),
        ],
        latency_ms: Some(120),
    }
}
