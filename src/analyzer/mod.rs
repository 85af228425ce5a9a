//! Text Analyzer Module
//!
//! Pure analysis helpers applied to user input and classifier output:
//! - Sentiment label normalization
//! - Natural language identification

pub mod label;
pub mod language;

pub use label::normalize_label;
pub use language::{
    DetectionError, LanguageDetector, WhatlangDetector, detect_language, display_language,
};
