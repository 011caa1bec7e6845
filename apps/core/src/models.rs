use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::brain::{EntityType, Intent, Mood};
use crate::services::analysis::{AnalysisResult, Verdict};

/// Represents one incoming chat turn.
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    /// Caller-assigned identifier for the end user.
    #[validate(length(min = 1))]
    pub user_id: String,
    /// The raw, possibly PII-carrying user message.
    #[validate(length(min = 1))]
    pub message: String,
    /// Prior conversation window, owned by the caller and read-only here.
    #[serde(default)]
    pub context: Option<Vec<ChatMessage>>,
}

/// A single role-tagged message in a conversation or generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender (e.g., "system", "user", "assistant").
    pub role: String,
    /// The text content of the message.
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Traceability record of the analysis step, attached to a response.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisTrace {
    /// url, email or phone
    pub entity_type: Option<EntityType>,
    /// The value that was analyzed
    pub entity_value: Option<String>,
    /// 0-100
    pub risk_score: Option<i32>,
    /// safe, suspicious, dangerous or unknown
    pub verdict: Option<Verdict>,
    /// Whether the threat database already knew the entity
    pub found_in_db: bool,
    /// Main source that flagged it (localdb, urlhaus, ...)
    pub source: Option<String>,
    /// Reasons supporting the verdict
    pub reasons: Vec<String>,
    /// Analysis time in milliseconds
    pub latency_ms: Option<i64>,
}

impl From<&AnalysisResult> for AnalysisTrace {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            entity_type: result.entity_type,
            entity_value: result.content.clone(),
            risk_score: Some(result.risk_score),
            verdict: Some(result.verdict),
            found_in_db: result.found_in_db,
            source: result.source.clone(),
            reasons: result.reasons.clone(),
            latency_ms: result.latency_ms,
        }
    }
}

/// Represents the outcome of one chat turn.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Fy's reply text.
    pub response: String,
    /// Avatar mood for the reply.
    pub mood: Mood,
    /// Whether PII was detected (and anonymized) in the input.
    pub pii_detected: bool,
    /// Classified intent of the message.
    pub intent: Intent,
    /// Whether the threat-analysis collaborator was invoked.
    pub analysis_performed: bool,
    /// Analysis trace, present when an analysis ran.
    pub trace: Option<AnalysisTrace>,
}
