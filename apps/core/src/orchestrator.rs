//! Chat turn orchestration.
//!
//! Sequences one request/response cycle through the guarded pipeline:
//! anonymize input, classify intent, optionally analyze one entity,
//! generate the reply, verify the output. Stages run strictly in this
//! order; collaborator failures after anonymization degrade the turn
//! instead of aborting it.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::brain::{
    mood_for_intent, mood_from_risk, EntityExtractor, IntentClassifier, Mood,
};
use crate::config::MAX_CONTEXT_MESSAGES;
use crate::error::AppError;
use crate::guardrails::PiiGuard;
use crate::models::{AnalysisTrace, ChatRequest, ChatResponse};
use crate::prompts::{self, PromptPayload};
use crate::services::analysis::AnalysisDispatcher;
use crate::services::traits::ReplyGenerator;

/// Fixed reply when the generation collaborator fails.
const FALLBACK_REPLY: &str = "Ups, algo ha fallado por mi parte. ¿Puedes intentarlo de nuevo? 🙏";

/// Orchestrates the guarded chat pipeline for one turn at a time.
///
/// Holds no mutable state: every turn is an independent unit of work and the
/// collaborators are safe for concurrent use.
pub struct ChatOrchestrator {
    classifier: IntentClassifier,
    extractor: EntityExtractor,
    guard: Arc<dyn PiiGuard>,
    dispatcher: AnalysisDispatcher,
    generator: Arc<dyn ReplyGenerator>,
}

impl ChatOrchestrator {
    pub fn new(
        guard: Arc<dyn PiiGuard>,
        dispatcher: AnalysisDispatcher,
        generator: Arc<dyn ReplyGenerator>,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            extractor: EntityExtractor::new(),
            guard,
            dispatcher,
            generator,
        }
    }

    /// Process one chat turn.
    pub async fn process(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let request_id = Uuid::new_v4();

        // 1. Input guardrail. Failure here is fatal: un-anonymized text must
        // never reach the generator.
        let anonymized = self
            .guard
            .anonymize(&request.message)
            .await
            .map_err(|e| AppError::Anonymization(e.to_string()))?;

        if anonymized.had_pii {
            info!(%request_id, entities = anonymized.pii_map.len(), "pii detected and anonymized");
        }

        // 2. Classify the ORIGINAL message: the entity signals must see the
        // real URL/email/phone, which are exempt from anonymization.
        let intent_result = self.classifier.classify(&request.message);
        let intent = intent_result.intent;
        info!(%request_id, intent = %intent, confidence = intent_result.confidence, "intent classified");

        // 3. Threat analysis, only for Analysis turns that carry entities.
        let mut analysis = None;
        if intent_result.needs_analysis() {
            let batch = self.extractor.entities_for_analysis(&request.message);
            if !batch.is_empty() {
                info!(
                    %request_id,
                    urls = batch.urls.len(),
                    emails = batch.emails.len(),
                    phones = batch.phones.len(),
                    "entities extracted"
                );
                analysis = self.dispatcher.dispatch(&batch).await;
                if let Some(result) = &analysis {
                    info!(%request_id, verdict = %result.verdict, risk_score = result.risk_score, "analysis completed");
                }
            }
        }
        let analysis_performed = analysis.is_some();

        // 4. Generate the reply from the anonymized text.
        let payload = PromptPayload::for_turn(
            intent,
            &anonymized.text,
            analysis.as_ref(),
            &intent_result.triggers,
        );
        let messages = prompts::build_messages(
            &anonymized.text,
            &payload,
            request.context.as_deref(),
            MAX_CONTEXT_MESSAGES,
        );

        let mood = match &analysis {
            Some(result) => mood_from_risk(result.risk_score),
            None => mood_for_intent(intent),
        };

        let (response_text, mood) = match self.generator.generate(&messages).await {
            Ok(text) => (text, mood),
            Err(err) => {
                warn!(%request_id, error = %err, "generation failed, using fallback reply");
                (FALLBACK_REPLY.to_string(), Mood::Thinking)
            }
        };

        // 5. Output guardrail: redact anything the generator leaked.
        let (is_safe, findings) = self.guard.verify(&response_text).await?;
        let response_text = if is_safe {
            response_text
        } else {
            warn!(%request_id, findings = findings.len(), "pii detected in output, redacting");
            self.guard
                .anonymize(&response_text)
                .await
                .map_err(|e| AppError::Anonymization(e.to_string()))?
                .text
        };

        // 6. Assemble the response with the analysis trace.
        let trace = analysis.as_ref().map(AnalysisTrace::from);
        Ok(ChatResponse {
            response: response_text,
            mood,
            pii_detected: anonymized.had_pii,
            intent,
            analysis_performed,
            trace,
        })
    }
}
