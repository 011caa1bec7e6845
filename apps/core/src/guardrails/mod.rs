//! # Guardrails Module
//!
//! Input/output PII guardrails wrapped around the untrusted generation step:
//! anonymize what goes in, verify what comes out.

pub mod anonymizer;
pub mod detector;

pub use anonymizer::{Anonymized, PatternPiiGuard, PiiGuard};
pub use detector::{PiiDetector, PiiFinding};
