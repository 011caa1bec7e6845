//! Pattern-based PII detection for Spanish identity and payment data.
//!
//! Recognizes DNI, NIE, Spanish IBAN and card numbers with plain regex.
//! Phone numbers, emails and URLs are deliberately NOT treated as PII here:
//! they are the fraud signals the analysis service needs, so they must
//! survive anonymization. Free-form person names need an NLP collaborator
//! and are outside this detector.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// A single PII hit in a piece of text.
#[derive(Debug, Clone, Serialize)]
pub struct PiiFinding {
    /// Recognizer label, e.g. `ES_DNI`.
    #[serde(rename = "type")]
    pub entity_type: &'static str,
    /// Recognizer confidence.
    pub score: f32,
    /// Byte offset of the match start.
    #[serde(skip)]
    pub start: usize,
    /// Byte offset of the match end.
    #[serde(skip)]
    pub end: usize,
}

struct Recognizer {
    entity_type: &'static str,
    score: f32,
    pattern: Regex,
}

// Compile patterns once at startup; a malformed pattern is a programming
// error, so expect() is acceptable here.
static RECOGNIZERS: LazyLock<Vec<Recognizer>> = LazyLock::new(|| {
    vec![
        // Spanish DNI: 8 digits + letter
        Recognizer {
            entity_type: "ES_DNI",
            score: 0.95,
            pattern: Regex::new(r"\b[0-9]{8}[A-Za-z]\b").expect("Invalid regex: DNI pattern"),
        },
        // Spanish NIE: X/Y/Z + 7 digits + letter
        Recognizer {
            entity_type: "ES_NIE",
            score: 0.95,
            pattern: Regex::new(r"\b[XYZxyz][0-9]{7}[A-Za-z]\b")
                .expect("Invalid regex: NIE pattern"),
        },
        // Spanish IBAN
        Recognizer {
            entity_type: "ES_IBAN",
            score: 0.95,
            pattern: Regex::new(r"\bES[0-9]{2}\s?(?:[0-9]{4}\s?){5}\b")
                .expect("Invalid regex: IBAN pattern"),
        },
        // 16-digit card numbers in groups of four
        Recognizer {
            entity_type: "CREDIT_CARD",
            score: 0.9,
            pattern: Regex::new(r"\b[0-9]{4}[\s.-]?[0-9]{4}[\s.-]?[0-9]{4}[\s.-]?[0-9]{4}\b")
                .expect("Invalid regex: card pattern"),
        },
    ]
});

/// Regex-based PII detector.
pub struct PiiDetector;

impl Default for PiiDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PiiDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect PII spans in `text`.
    ///
    /// Overlapping matches are resolved before returning: findings are
    /// ordered by start offset (longer span first on equal starts) and any
    /// finding overlapping an already-kept span is dropped, so substitution
    /// never corrupts neighbouring replacements (an IBAN also matching the
    /// card pattern, for instance).
    pub fn detect(&self, text: &str) -> Vec<PiiFinding> {
        let mut findings: Vec<PiiFinding> = Vec::new();

        for recognizer in RECOGNIZERS.iter() {
            for m in recognizer.pattern.find_iter(text) {
                findings.push(PiiFinding {
                    entity_type: recognizer.entity_type,
                    score: recognizer.score,
                    start: m.start(),
                    end: m.end(),
                });
            }
        }

        findings.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut kept: Vec<PiiFinding> = Vec::new();
        for finding in findings {
            let overlaps = kept
                .iter()
                .any(|k| finding.start < k.end && k.start < finding.end);
            if !overlaps {
                kept.push(finding);
            }
        }
        kept
    }
}
