//! Placeholder anonymization around the generation step.

use async_trait::async_trait;
use std::collections::HashMap;

use super::detector::{PiiDetector, PiiFinding};
use crate::error::AppError;

/// Outcome of input anonymization.
#[derive(Debug, Clone)]
pub struct Anonymized {
    /// Text with every PII span replaced by a placeholder.
    pub text: String,
    /// Mapping placeholder -> original value.
    pub pii_map: HashMap<String, String>,
    /// Whether any PII was found.
    pub had_pii: bool,
}

/// Defines the public interface of the PII guardrail collaborator.
///
/// This trait abstracts the detection backend, allowing the regex-based
/// default to be swapped for a full NLP recognizer service.
#[async_trait]
pub trait PiiGuard: Send + Sync {
    /// Replace PII spans in `text` with placeholders.
    async fn anonymize(&self, text: &str) -> Result<Anonymized, AppError>;

    /// Check that generated output carries no PII.
    ///
    /// Returns `(is_safe, findings)`.
    async fn verify(&self, text: &str) -> Result<(bool, Vec<PiiFinding>), AppError>;
}

/// Regex-backed `PiiGuard` implementation.
pub struct PatternPiiGuard {
    detector: PiiDetector,
}

impl Default for PatternPiiGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternPiiGuard {
    pub fn new() -> Self {
        Self {
            detector: PiiDetector::new(),
        }
    }
}

#[async_trait]
impl PiiGuard for PatternPiiGuard {
    async fn anonymize(&self, text: &str) -> Result<Anonymized, AppError> {
        let findings = self.detector.detect(text);

        if findings.is_empty() {
            return Ok(Anonymized {
                text: text.to_string(),
                pii_map: HashMap::new(),
                had_pii: false,
            });
        }

        let mut anonymized = text.to_string();
        let mut pii_map = HashMap::new();

        // Replace from the end of the text so earlier offsets stay valid.
        let mut sorted = findings;
        sorted.sort_by(|a, b| b.start.cmp(&a.start));

        for (i, finding) in sorted.iter().enumerate() {
            let placeholder = format!("[{}_{}]", finding.entity_type, i);
            pii_map.insert(placeholder.clone(), text[finding.start..finding.end].to_string());
            anonymized.replace_range(finding.start..finding.end, &placeholder);
        }

        Ok(Anonymized {
            text: anonymized,
            pii_map,
            had_pii: true,
        })
    }

    async fn verify(&self, text: &str) -> Result<(bool, Vec<PiiFinding>), AppError> {
        let findings = self.detector.detect(text);
        Ok((findings.is_empty(), findings))
    }
}
