//! Mood mapping for Fy's replies.
//!
//! The avatar mood is driven by the threat-analysis risk score when an
//! analysis ran, and by the intent otherwise.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::intent::Intent;

/// Discrete emotional tag attached to a generated reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Thinking,
    Warning,
    Danger,
}

impl Mood {
    /// Returns the wire label for the mood.
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Thinking => "thinking",
            Mood::Warning => "warning",
            Mood::Danger => "danger",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Map a 0-100 risk score to a mood.
pub fn mood_from_risk(risk_score: i32) -> Mood {
    if risk_score >= 70 {
        Mood::Danger
    } else if risk_score >= 40 {
        Mood::Warning
    } else if risk_score > 0 {
        Mood::Thinking
    } else {
        Mood::Happy
    }
}

/// Mood override used when no analysis result is attached to the turn.
pub fn mood_for_intent(intent: Intent) -> Mood {
    match intent {
        Intent::Rescue => Mood::Danger,
        Intent::Question | Intent::NeedsInfo => Mood::Thinking,
        // Analysis without a result falls through to casual handling.
        Intent::Analysis | Intent::Report | Intent::Smalltalk => Mood::Happy,
    }
}
