//! Natural Language Identification
//!
//! Wraps a language-identification backend behind [`LanguageDetector`] and
//! exposes [`detect_language`], which never fails: any detector error becomes
//! the `"unknown"` sentinel.
//!
//! The default backend is `whatlang`, a trigram model with no random state,
//! so identical input always yields the identical code.

use thiserror::Error;
use tracing::debug;

use crate::constants::language::UNKNOWN;

/// Reasons a detector can refuse to name a language
#[derive(Debug, Error, PartialEq)]
pub enum DetectionError {
    #[error("no linguistic features in input")]
    NoFeatures,

    #[error("detection too ambiguous (confidence {confidence:.2} < {required:.2})")]
    Ambiguous { confidence: f64, required: f64 },

    #[error("detection unreliable for this input (confidence {confidence:.2})")]
    Unreliable { confidence: f64 },
}

/// Language identification backend
pub trait LanguageDetector: Send + Sync {
    /// Return an ISO-639 style code for the text
    fn detect(&self, text: &str) -> std::result::Result<String, DetectionError>;
}

/// `whatlang`-backed detector returning ISO 639-3 codes ("eng", "spa", ...)
///
/// Guesses whatlang itself marks unreliable are refused, which covers short
/// messages like "ok" or "I lost my job today". `min_confidence` adds a
/// stricter floor on top.
#[derive(Debug, Clone)]
pub struct WhatlangDetector {
    min_confidence: f64,
}

impl WhatlangDetector {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> std::result::Result<String, DetectionError> {
        let info = whatlang::detect(text).ok_or(DetectionError::NoFeatures)?;
        if !info.is_reliable() {
            return Err(DetectionError::Unreliable {
                confidence: info.confidence(),
            });
        }
        if info.confidence() < self.min_confidence {
            return Err(DetectionError::Ambiguous {
                confidence: info.confidence(),
                required: self.min_confidence,
            });
        }
        Ok(info.lang().code().to_string())
    }
}

/// Detect the language of `text`, or `"unknown"` when the detector fails.
pub fn detect_language(detector: &dyn LanguageDetector, text: &str) -> String {
    match detector.detect(text) {
        Ok(code) => code,
        Err(e) => {
            debug!("Language detection failed: {}", e);
            UNKNOWN.to_string()
        }
    }
}

/// Upper-cased code for display, `UNKNOWN` for the sentinel
pub fn display_language(code: &str) -> String {
    if code == UNKNOWN {
        "UNKNOWN".to_string()
    } else {
        code.to_uppercase()
    }
}
