//! # Brain Module
//!
//! Fast, non-LLM analysis of user messages. Runs BEFORE any collaborator
//! call to decide how the turn is handled.
//!
//! ## Components
//! - `intent`: Intent classification using keyword and regex scoring
//! - `entities`: URL/email/phone extraction for threat analysis
//! - `mood`: risk-score and intent to mood mapping

pub mod entities;
pub mod intent;
pub mod mood;

pub use entities::{Entity, EntityBatch, EntityExtractor, EntityType};
pub use intent::{Intent, IntentClassifier, IntentResult};
pub use mood::{mood_for_intent, mood_from_risk, Mood};
