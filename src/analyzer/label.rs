//! Sentiment Label Normalization
//!
//! Classifier checkpoints disagree on label vocabularies: some emit
//! `Negative`/`Neutral`/`Positive`, some `NEG`/`NEU`/`POS`, and older ones
//! only `LABEL_0`/`LABEL_1`/`LABEL_2`. This module folds all of them into the
//! canonical [`Sentiment`].
//!
//! Unrecognized schemes fall through to [`Sentiment::Positive`].

use crate::types::Sentiment;

/// Map a raw classifier label onto one of the three canonical categories.
///
/// Matching is case-insensitive. Index-style labels follow the common
/// `negative=0, neutral=1, positive=2` ordering.
pub fn normalize_label(label: &str) -> Sentiment {
    let s = label.to_lowercase();
    if s.contains("neg") || s.ends_with("_0") {
        return Sentiment::Negative;
    }
    if s.contains("neu") || s.ends_with("_1") {
        return Sentiment::Neutral;
    }
    Sentiment::Positive
}
