use async_trait::async_trait;

use super::analysis::AnalysisResult;
use crate::brain::EntityType;
use crate::error::AppError;
use crate::models::ChatMessage;

/// Defines the public interface of the threat-analysis collaborator.
///
/// This trait abstracts the remote analysis service so that tests can
/// substitute fakes and deployments can point at different backends.
#[async_trait]
pub trait ThreatAnalyzer: Send + Sync {
    /// Analyze a single entity value of the given type.
    async fn analyze(&self, kind: EntityType, value: &str) -> Result<AnalysisResult, AppError>;
}

/// Defines the public interface of the reply-generation collaborator.
///
/// This trait abstracts the specific LLM backend, allowing different
/// providers to be used interchangeably.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Generates a complete reply from an ordered, role-tagged message list.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, AppError>;
}
