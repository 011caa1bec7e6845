//! Intent classification using weighted keyword and regex scoring.
//!
//! Fast pattern-based detection of what the user wants from Fy. Keywords are
//! Spanish substring matches worth 1.0 each; regex signals for analyzable
//! entities (URLs, shorteners, emails, Spanish phones, bare domains) are
//! worth 2.0 each. No ML model required - pure Rust regex matching.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Detected intent type.
///
/// Declaration order is the tie-break order: when two intents reach the same
/// score in the fallback resolution, the variant declared first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Wants something analyzed (URL, email, phone, message)
    Analysis,
    /// Mentions something suspicious but did NOT include the datum
    NeedsInfo,
    /// Cybersecurity question
    Question,
    /// Emergency, has already been a victim
    Rescue,
    /// Wants to report a scam
    Report,
    /// Greeting, casual chat
    Smalltalk,
}

impl Intent {
    /// All variants in declaration (tie-break) order.
    pub const ALL: [Intent; 6] = [
        Intent::Analysis,
        Intent::NeedsInfo,
        Intent::Question,
        Intent::Rescue,
        Intent::Report,
        Intent::Smalltalk,
    ];

    /// Returns the wire label for the intent.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Analysis => "analysis",
            Intent::NeedsInfo => "needs_info",
            Intent::Question => "question",
            Intent::Rescue => "rescue",
            Intent::Report => "report",
            Intent::Smalltalk => "smalltalk",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of intent classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    /// Detected intent
    pub intent: Intent,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Keywords and pattern ids that matched
    pub triggers: Vec<String>,
}

impl IntentResult {
    /// Whether this turn should go through the threat-analysis service.
    pub fn needs_analysis(&self) -> bool {
        self.intent == Intent::Analysis
    }
}

const ANALYSIS_KEYWORDS: &[&str] = &[
    "mira esto",
    "es seguro",
    "es legítimo",
    "me llegó",
    "me han enviado",
    "qué opinas de",
    "analiza",
    "verifica",
    "comprueba",
    "revisar",
    "este enlace",
    "esta url",
    "este link",
    "este mensaje",
    "este sms",
    "este email",
    "este correo",
    "este número",
    "este teléfono",
    "me llamaron",
    "me escribieron",
    "es real",
    "es falso",
    "es phishing",
    "es estafa",
    "parece sospechoso",
    "no me fío",
    "será verdad",
];

const RESCUE_KEYWORDS: &[&str] = &[
    "me han estafado",
    "he sido víctima",
    "me robaron",
    "me engañaron",
    "di mis datos",
    "metí mi tarjeta",
    "puse mi contraseña",
    "he instalado",
    "descargué algo",
    "ayuda urgente",
    "emergencia",
    "qué hago ahora",
    "es tarde",
    "ya di",
    "ya puse",
    "ya metí",
    "creo que me han",
    "me hackearon",
];

// No URL/email/phone patterns here: their absence is what separates
// NeedsInfo from Analysis.
const NEEDS_INFO_KEYWORDS: &[&str] = &[
    "me llegó un mensaje",
    "me llegó un sms",
    "me ha llegado",
    "recibí un mensaje",
    "recibí un sms",
    "recibí un email",
    "recibí un correo",
    "me llamaron",
    "me han llamado",
    "llamada de un número",
    "número desconocido",
    "número que no conozco",
    "número raro",
    "mensaje sospechoso",
    "sms sospechoso",
    "email sospechoso",
    "correo sospechoso",
    "mensaje raro",
    "sms raro",
    "email raro",
    "correo raro",
    "me escribieron",
    "me contactaron",
    "me mandaron algo",
    "no sé quién es",
    "no sé de quién es",
    "no reconozco",
    "dice que soy",
    "dicen que debo",
    "dice que tengo",
    "supuestamente de",
    "haciéndose pasar",
    "se hace pasar",
];

const QUESTION_KEYWORDS: &[&str] = &[
    "qué es",
    "cómo funciona",
    "cómo puedo",
    "qué significa",
    "por qué",
    "explícame",
    "cuéntame",
    "dime",
    "qué hago si",
    "cómo sé si",
    "cómo protegerme",
    "es seguro usar",
    "recomiendas",
    "qué opinas",
    "consejos",
    "tips",
];

const REPORT_KEYWORDS: &[&str] = &[
    "reportar",
    "reportar estafa",
    "quiero reportar",
    "denunciar",
    "quiero denunciar",
    "reportar fraude",
    "avisar de una estafa",
    "informar de estafa",
    "reportar número",
    "reportar enlace",
    "reportar email",
    "reportar página",
];

const SMALLTALK_KEYWORDS: &[&str] = &[
    "hola",
    "buenas",
    "hey",
    "qué tal",
    "cómo estás",
    "gracias",
    "vale",
    "ok",
    "perfecto",
    "genial",
    "adiós",
    "hasta luego",
    "chao",
];

fn keywords_for(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Analysis => ANALYSIS_KEYWORDS,
        Intent::NeedsInfo => NEEDS_INFO_KEYWORDS,
        Intent::Question => QUESTION_KEYWORDS,
        Intent::Rescue => RESCUE_KEYWORDS,
        Intent::Report => REPORT_KEYWORDS,
        Intent::Smalltalk => SMALLTALK_KEYWORDS,
    }
}

/// Named regex signal for an analyzable entity.
struct SignalPattern {
    id: &'static str,
    pattern: Regex,
}

// Compile patterns once at startup; a malformed pattern is a programming
// error, so expect() is acceptable here.
static ANALYSIS_SIGNAL_PATTERNS: LazyLock<Vec<SignalPattern>> = LazyLock::new(|| {
    vec![
        SignalPattern {
            id: "url_protocol",
            pattern: Regex::new(r"(?i)https?://").expect("Invalid regex: protocol signal"),
        },
        SignalPattern {
            id: "url_shortener",
            pattern: Regex::new(r"(?i)bit\.ly|tinyurl").expect("Invalid regex: shortener signal"),
        },
        SignalPattern {
            id: "email",
            pattern: Regex::new(r"(?i)@\w+\.\w+").expect("Invalid regex: email signal"),
        },
        SignalPattern {
            id: "phone_country_code",
            pattern: Regex::new(r"\+?34[\s.-]?[6789]").expect("Invalid regex: +34 phone signal"),
        },
        SignalPattern {
            id: "phone_bare",
            pattern: Regex::new(r"\b[6789][\s.-]?\d{2}[\s.-]?\d{2,3}[\s.-]?\d{2,3}\b")
                .expect("Invalid regex: bare phone signal"),
        },
        SignalPattern {
            id: "bare_domain",
            pattern: Regex::new(r"(?i)\b[\w-]+\.(?:es|com|org|net|info|tk|xyz|gob\.es)\b")
                .expect("Invalid regex: bare domain signal"),
        },
    ]
});

/// Intent classifier over keyword lists and entity signal patterns.
pub struct IntentClassifier;

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify the intent of a message. Deterministic and side-effect free;
    /// calling it twice on the same text yields the same result.
    pub fn classify(&self, text: &str) -> IntentResult {
        let lower = text.to_lowercase();

        // Entity signals decide Analysis vs NeedsInfo independently of the
        // generic extractor.
        let has_analyzable_entity = ANALYSIS_SIGNAL_PATTERNS
            .iter()
            .any(|signal| signal.pattern.is_match(text));

        let mut scores = [0.0f32; Intent::ALL.len()];
        let mut triggers: [Vec<String>; Intent::ALL.len()] = Default::default();

        for intent in Intent::ALL {
            let slot = intent as usize;
            for keyword in keywords_for(intent) {
                if lower.contains(keyword) {
                    scores[slot] += 1.0;
                    triggers[slot].push((*keyword).to_string());
                }
            }
        }

        // Only Analysis carries regex signals; they weigh double.
        for signal in ANALYSIS_SIGNAL_PATTERNS.iter() {
            if signal.pattern.is_match(text) {
                scores[Intent::Analysis as usize] += 2.0;
                triggers[Intent::Analysis as usize].push(format!("pattern:{}", signal.id));
            }
        }

        // A URL/email/phone signal almost certainly means analysis.
        let analysis_score = scores[Intent::Analysis as usize];
        if analysis_score >= 2.0 {
            return IntentResult {
                intent: Intent::Analysis,
                confidence: (analysis_score / 5.0).min(1.0),
                triggers: std::mem::take(&mut triggers[Intent::Analysis as usize]),
            };
        }

        // Rescue outranks everything else on any match.
        let rescue_score = scores[Intent::Rescue as usize];
        if rescue_score > 0.0 {
            return IntentResult {
                intent: Intent::Rescue,
                confidence: (rescue_score / 3.0).min(1.0),
                triggers: std::mem::take(&mut triggers[Intent::Rescue as usize]),
            };
        }

        let report_score = scores[Intent::Report as usize];
        if report_score > 0.0 {
            return IntentResult {
                intent: Intent::Report,
                confidence: (report_score / 2.0).min(1.0),
                triggers: std::mem::take(&mut triggers[Intent::Report as usize]),
            };
        }

        // NeedsInfo: mentions something suspicious but gave no verifiable datum.
        let needs_info_score = scores[Intent::NeedsInfo as usize];
        if needs_info_score > 0.0 && !has_analyzable_entity {
            return IntentResult {
                intent: Intent::NeedsInfo,
                confidence: (needs_info_score / 3.0).min(1.0),
                triggers: std::mem::take(&mut triggers[Intent::NeedsInfo as usize]),
            };
        }

        // Highest score among the remaining intents, NeedsInfo excluded.
        // Strict comparison keeps the earliest declared variant on ties.
        let mut best_intent = Intent::Analysis;
        let mut best_score = 0.0f32;
        for intent in Intent::ALL {
            if intent == Intent::NeedsInfo {
                continue;
            }
            let score = scores[intent as usize];
            if score > best_score {
                best_score = score;
                best_intent = intent;
            }
        }

        if best_score == 0.0 {
            return IntentResult {
                intent: Intent::Question,
                confidence: 0.3,
                triggers: vec![],
            };
        }

        IntentResult {
            intent: best_intent,
            confidence: (best_score / 3.0).min(1.0),
            triggers: std::mem::take(&mut triggers[best_intent as usize]),
        }
    }
}
