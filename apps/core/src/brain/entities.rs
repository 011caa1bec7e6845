//! Entity extraction using regex patterns.
//!
//! Pulls URLs, emails and Spanish phone numbers out of a user message so they
//! can be sent to the threat-analysis service. Pure Rust regex matching, no
//! network access.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Type of an analyzable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Url,
    Email,
    Phone,
}

impl EntityType {
    /// Returns the wire label for the entity type.
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Url => "url",
            EntityType::Email => "email",
            EntityType::Phone => "phone",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A typed, located substring extracted from a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityType,
    /// Raw matched substring, whitespace-trimmed.
    pub value: String,
    /// Byte offset of the match start in the source text.
    pub start: usize,
    /// Byte offset of the match end in the source text.
    pub end: usize,
}

/// Extracted entity values grouped by type, in first-seen order,
/// shaped for the analysis service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityBatch {
    pub urls: Vec<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

impl EntityBatch {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty() && self.emails.is_empty() && self.phones.is_empty()
    }
}

// Compile patterns once at startup. A malformed pattern is a programming
// error, so expect() is acceptable here.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
        .expect("Invalid regex: email pattern")
});

static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Full URLs with protocol
        Regex::new(r#"(?i)https?://[^\s<>"']+"#).expect("Invalid regex: protocol URL pattern"),
        // Bare www. domains
        Regex::new(r#"(?i)(?:www\.)[^\s<>"']+"#).expect("Invalid regex: www domain pattern"),
        // Known URL shorteners
        Regex::new(r#"(?i)(?:bit\.ly|tinyurl\.com|t\.co|goo\.gl|ow\.ly|is\.gd|buff\.ly)/[^\s<>"']+"#)
            .expect("Invalid regex: shortener pattern"),
        // Bare domains on common TLDs
        Regex::new(r"(?i)\b[\w-]+\.(?:es|com|org|net|info|tk|xyz|gob\.es)\b")
            .expect("Invalid regex: bare domain pattern"),
    ]
});

static PHONE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Spanish mobile with +34 country code
        Regex::new(r"\+34[\s.-]?[6789][\s.-]?[0-9]{2}[\s.-]?[0-9]{3}[\s.-]?[0-9]{3}")
            .expect("Invalid regex: +34 phone pattern"),
        // Spanish mobile without country code
        Regex::new(r"\b[6789][0-9]{2}[\s.-]?[0-9]{3}[\s.-]?[0-9]{3}\b")
            .expect("Invalid regex: bare phone pattern"),
        // Parenthesized country code
        Regex::new(r"\(\+?34\)[\s.-]?[6789][0-9]{8}").expect("Invalid regex: (34) phone pattern"),
    ]
});

/// Extractor for URLs, emails and phone numbers.
pub struct EntityExtractor;

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract all analyzable entities from `text`.
    ///
    /// Emails are processed first so their domains are known when URL
    /// candidates are considered: a URL candidate that is nothing more than
    /// the domain of an already-captured email is the same identifier, not an
    /// independent contact point, and is dropped. Values are deduplicated
    /// across types, first occurrence wins.
    pub fn extract(&self, text: &str) -> Vec<Entity> {
        let mut entities: Vec<Entity> = Vec::new();
        let mut email_domains: Vec<String> = Vec::new();

        for m in EMAIL_PATTERN.find_iter(text) {
            let value = m.as_str().trim().to_string();
            if entities.iter().any(|e| e.value == value) {
                continue;
            }
            if let Some((_, domain)) = value.rsplit_once('@') {
                email_domains.push(domain.to_lowercase());
            }
            entities.push(Entity {
                kind: EntityType::Email,
                value,
                start: m.start(),
                end: m.end(),
            });
        }

        for pattern in URL_PATTERNS.iter() {
            for m in pattern.find_iter(text) {
                let value = m.as_str().trim().to_string();
                if entities.iter().any(|e| e.value == value) {
                    continue;
                }
                let normalized = normalize_url_candidate(&value);
                if email_domains.iter().any(|domain| *domain == normalized) {
                    continue;
                }
                entities.push(Entity {
                    kind: EntityType::Url,
                    value,
                    start: m.start(),
                    end: m.end(),
                });
            }
        }

        // Phones and emails are never suppressed by the domain rule.
        for pattern in PHONE_PATTERNS.iter() {
            for m in pattern.find_iter(text) {
                let value = m.as_str().trim().to_string();
                if entities.iter().any(|e| e.value == value) {
                    continue;
                }
                entities.push(Entity {
                    kind: EntityType::Phone,
                    value,
                    start: m.start(),
                    end: m.end(),
                });
            }
        }

        entities
    }

    /// Project the extracted entities into per-type value lists for the
    /// analysis service, preserving first-seen order.
    pub fn entities_for_analysis(&self, text: &str) -> EntityBatch {
        let mut batch = EntityBatch::default();
        for entity in self.extract(text) {
            match entity.kind {
                EntityType::Url => batch.urls.push(entity.value),
                EntityType::Email => batch.emails.push(entity.value),
                EntityType::Phone => batch.phones.push(entity.value),
            }
        }
        batch
    }
}

/// Strip the scheme and one leading `www.` from a URL candidate so it can be
/// compared against email domains.
fn normalize_url_candidate(value: &str) -> String {
    let stripped = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .unwrap_or(value);
    let stripped = stripped.strip_prefix("www.").unwrap_or(stripped);
    stripped.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_protocol_url() {
        let extractor = EntityExtractor::new();

        let entities = extractor.extract("Mira esto: https://banco-falso.tk/login");
        let urls: Vec<_> = entities
            .iter()
            .filter(|e| e.kind == EntityType::Url)
            .collect();
        assert!(urls
            .iter()
            .any(|e| e.value == "https://banco-falso.tk/login"));
    }

    #[test]
    fn test_extracts_shortener() {
        let extractor = EntityExtractor::new();

        let entities = extractor.extract("¿Es seguro este enlace? bit.ly/abc123");
        let urls: Vec<_> = entities
            .iter()
            .filter(|e| e.kind == EntityType::Url)
            .collect();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].value, "bit.ly/abc123");
    }

    #[test]
    fn test_extracts_email_with_offsets() {
        let extractor = EntityExtractor::new();

        let text = "Me escribió soporte@banco-falso.com ayer";
        let entities = extractor.extract(text);
        let email = entities
            .iter()
            .find(|e| e.kind == EntityType::Email)
            .expect("email not extracted");
        assert_eq!(email.value, "soporte@banco-falso.com");
        assert_eq!(&text[email.start..email.end], "soporte@banco-falso.com");
    }

    #[test]
    fn test_extracts_spanish_phones() {
        let extractor = EntityExtractor::new();

        for text in ["Llámame al 612 345 678", "Mi número es +34612345678"] {
            let entities = extractor.extract(text);
            assert!(
                entities.iter().any(|e| e.kind == EntityType::Phone),
                "Expected a phone in '{}'",
                text
            );
        }
    }

    #[test]
    fn test_seven_digit_sequence_is_not_a_phone() {
        let extractor = EntityExtractor::new();

        let entities = extractor.extract("El código era 6123456");
        assert!(entities.iter().all(|e| e.kind != EntityType::Phone));
    }

    #[test]
    fn test_values_are_pairwise_distinct() {
        let extractor = EntityExtractor::new();

        let entities = extractor
            .extract("bit.ly/x y otra vez bit.ly/x y además https://tienda.es https://tienda.es");
        for (i, a) in entities.iter().enumerate() {
            for b in entities.iter().skip(i + 1) {
                assert_ne!(a.value, b.value, "duplicate value extracted");
            }
        }
    }

    #[test]
    fn test_email_domain_suppresses_bare_url() {
        let extractor = EntityExtractor::new();

        let entities = extractor.extract("Me escribieron desde user@dominio.es, el remitente pone dominio.es");
        assert!(entities
            .iter()
            .any(|e| e.kind == EntityType::Email && e.value == "user@dominio.es"));
        assert!(
            entities.iter().all(|e| e.kind != EntityType::Url),
            "bare domain matching an email domain must be suppressed"
        );
    }

    #[test]
    fn test_unrelated_domain_is_not_suppressed() {
        let extractor = EntityExtractor::new();

        let entities = extractor.extract("user@dominio.es me mandó a otra-web.com");
        assert!(entities
            .iter()
            .any(|e| e.kind == EntityType::Url && e.value == "otra-web.com"));
    }

    #[test]
    fn test_no_matches_returns_empty() {
        let extractor = EntityExtractor::new();

        assert!(extractor.extract("hola, ¿qué tal?").is_empty());
        assert!(extractor.extract("").is_empty());
    }

    #[test]
    fn test_batch_projection_preserves_order() {
        let extractor = EntityExtractor::new();

        let batch =
            extractor.entities_for_analysis("Mira bit.ly/aaa y también bit.ly/bbb y el 612345678");
        assert_eq!(batch.urls, vec!["bit.ly/aaa", "bit.ly/bbb"]);
        assert!(batch.emails.is_empty());
        assert_eq!(batch.phones, vec!["612345678"]);
    }

    #[test]
    fn test_empty_batch_reports_empty() {
        let extractor = EntityExtractor::new();

        assert!(extractor.entities_for_analysis("solo texto").is_empty());
        assert!(!extractor.entities_for_analysis("ver www.correos-envios.top").is_empty());
    }
}
