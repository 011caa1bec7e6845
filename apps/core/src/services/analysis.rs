//! Threat-analysis dispatch.
//!
//! At most one entity is analyzed per chat turn, picked by strict priority
//! URL > Email > Phone. A failed call degrades to a synthesized `unknown`
//! verdict instead of blocking the conversation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

use super::traits::ThreatAnalyzer;
use crate::brain::{EntityBatch, EntityType};
use crate::error::AppError;

const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome label from threat analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    Suspicious,
    Dangerous,
    #[serde(other)]
    Unknown,
}

impl Verdict {
    /// Returns the wire label for the verdict.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::Suspicious => "suspicious",
            Verdict::Dangerous => "dangerous",
            Verdict::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of analyzing one entity, as returned by the analysis service or
/// synthesized locally when the service is unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "type")]
    pub entity_type: Option<EntityType>,
    pub content: Option<String>,
    pub risk_score: i32,
    pub verdict: Verdict,
    #[serde(default)]
    pub found_in_db: bool,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub latency_ms: Option<i64>,
}

/// HTTP client for the analysis service.
pub struct AnalysisClient {
    base_url: String,
    client: Client,
}

impl AnalysisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ThreatAnalyzer for AnalysisClient {
    async fn analyze(&self, kind: EntityType, value: &str) -> Result<AnalysisResult, AppError> {
        let endpoint = format!("{}/analyze/{}", self.base_url, kind.label());
        let payload = serde_json::json!({ kind.label(): value });

        let request_future = self.client.post(&endpoint).json(&payload).send();
        let res = timeout(ANALYSIS_TIMEOUT, request_future).await??;

        let status = res.status();
        if !status.is_success() {
            return Err(AppError::Http(format!(
                "analysis request failed with status {}",
                status
            )));
        }

        let result = res
            .json::<AnalysisResult>()
            .await
            .map_err(|e| AppError::Http(e.to_string()))?;
        Ok(result)
    }
}

/// Picks the entity to analyze and shields the turn from service failures.
pub struct AnalysisDispatcher {
    analyzer: Arc<dyn ThreatAnalyzer>,
}

impl AnalysisDispatcher {
    pub fn new(analyzer: Arc<dyn ThreatAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Send exactly one entity to the analysis collaborator.
    ///
    /// Priority is URL > Email > Phone, first value of the highest-priority
    /// non-empty list. Returns `None` when there is nothing to analyze. Any
    /// service failure yields a synthesized fallback result; no retry.
    pub async fn dispatch(&self, batch: &EntityBatch) -> Option<AnalysisResult> {
        let (kind, value) = if let Some(url) = batch.urls.first() {
            (EntityType::Url, url.as_str())
        } else if let Some(email) = batch.emails.first() {
            (EntityType::Email, email.as_str())
        } else if let Some(phone) = batch.phones.first() {
            (EntityType::Phone, phone.as_str())
        } else {
            return None;
        };

        info!(kind = %kind, "dispatching entity for analysis");

        match self.analyzer.analyze(kind, value).await {
            Ok(result) => Some(result),
            Err(err) => {
                warn!(kind = %kind, error = %err, "analysis service unavailable, synthesizing fallback");
                Some(fallback_result(kind, value))
            }
        }
    }
}

fn fallback_result(kind: EntityType, value: &str) -> AnalysisResult {
    let reason = match kind {
        EntityType::Url => "No se pudo analizar el enlace. Procede con precaución.",
        EntityType::Email => "No se pudo verificar el email.",
        EntityType::Phone => "No se pudo verificar el número.",
    };

    AnalysisResult {
        entity_type: Some(kind),
        content: Some(value.to_string()),
        risk_score: 50,
        verdict: Verdict::Unknown,
        found_in_db: false,
        source: None,
        reasons: vec![reason.to_string()],
        latency_ms: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_analyze_url_success() {
        let mock_server = MockServer::start().await;

        let body = json!({
            "type": "url",
            "content": "https://banco-falso.tk/login",
            "risk_score": 85,
            "verdict": "dangerous",
            "reasons": ["Dominio .tk gratuito, usado frecuentemente en phishing"],
            "found_in_db": true,
            "source": "localdb",
            "latency_ms": 120
        });

        Mock::given(method("POST"))
            .and(path("/analyze/url"))
            .and(body_json(json!({"url": "https://banco-falso.tk/login"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let client = AnalysisClient::new(mock_server.uri());
        let result = client
            .analyze(EntityType::Url, "https://banco-falso.tk/login")
            .await
            .unwrap();

        assert_eq!(result.verdict, Verdict::Dangerous);
        assert_eq!(result.risk_score, 85);
        assert!(result.found_in_db);
        assert_eq!(result.source.as_deref(), Some("localdb"));
    }

    #[tokio::test]
    async fn test_analyze_server_error_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/analyze/email"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = AnalysisClient::new(mock_server.uri());
        let result = client.analyze(EntityType::Email, "a@b.com").await;

        assert!(matches!(result, Err(AppError::Http(_))));
    }

    #[tokio::test]
    async fn test_unknown_verdict_decodes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/analyze/phone"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "phone",
                "content": "612345678",
                "risk_score": 10,
                "verdict": "whatever-new-label"
            })))
            .mount(&mock_server)
            .await;

        let client = AnalysisClient::new(mock_server.uri());
        let result = client.analyze(EntityType::Phone, "612345678").await.unwrap();

        assert_eq!(result.verdict, Verdict::Unknown);
        assert!(result.reasons.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_prefers_url_over_email() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/analyze/url"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "url",
                "content": "http://a.test",
                "risk_score": 0,
                "verdict": "safe"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        // No /analyze/email mock: a call there would fail the test through
        // the fallback verdict below.
        let dispatcher = AnalysisDispatcher::new(Arc::new(AnalysisClient::new(mock_server.uri())));
        let batch = EntityBatch {
            urls: vec!["http://a.test".to_string()],
            emails: vec!["b@test.com".to_string()],
            phones: vec![],
        };

        let result = dispatcher.dispatch(&batch).await.unwrap();
        assert_eq!(result.entity_type, Some(EntityType::Url));
        assert_eq!(result.verdict, Verdict::Safe);
    }

    #[tokio::test]
    async fn test_dispatch_empty_batch_is_none() {
        let mock_server = MockServer::start().await;
        let dispatcher = AnalysisDispatcher::new(Arc::new(AnalysisClient::new(mock_server.uri())));

        assert!(dispatcher.dispatch(&EntityBatch::default()).await.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_failure_synthesizes_fallback() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/analyze/phone"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let dispatcher = AnalysisDispatcher::new(Arc::new(AnalysisClient::new(mock_server.uri())));
        let batch = EntityBatch {
            urls: vec![],
            emails: vec![],
            phones: vec!["612345678".to_string()],
        };

        let result = dispatcher.dispatch(&batch).await.unwrap();
        assert_eq!(result.verdict, Verdict::Unknown);
        assert_eq!(result.risk_score, 50);
        assert!(!result.found_in_db);
        assert_eq!(result.reasons, vec!["No se pudo verificar el número."]);
    }
}
