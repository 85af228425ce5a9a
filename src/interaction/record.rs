//! Interaction data: validated generation settings and the per-session
//! record of the last successful generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::settings::{
    CREATIVITY_DEFAULT, CREATIVITY_MAX, CREATIVITY_MIN, LENGTH_DEFAULT, LENGTH_MAX, LENGTH_MIN,
};
use crate::types::{EchoError, Result, Sentiment};

/// Response length (words) and creativity (sampling temperature)
///
/// Always within bounds: length in 40..=150, creativity in 0.0..=1.5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationSettings {
    length: u32,
    creativity: f64,
}

impl GenerationSettings {
    pub fn new(length: u32, creativity: f64) -> Result<Self> {
        Ok(Self {
            length: validate_length(length)?,
            creativity: validate_creativity(creativity)?,
        })
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn creativity(&self) -> f64 {
        self.creativity
    }

    pub fn with_length(self, length: u32) -> Result<Self> {
        Self::new(length, self.creativity)
    }

    pub fn with_creativity(self, creativity: f64) -> Result<Self> {
        Self::new(self.length, creativity)
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            length: LENGTH_DEFAULT,
            creativity: CREATIVITY_DEFAULT,
        }
    }
}

pub(crate) fn validate_length(length: u32) -> Result<u32> {
    if (LENGTH_MIN..=LENGTH_MAX).contains(&length) {
        Ok(length)
    } else {
        Err(EchoError::InvalidSetting {
            name: "length",
            value: length.to_string(),
            expected: format!("{}..={} words", LENGTH_MIN, LENGTH_MAX),
        })
    }
}

pub(crate) fn validate_creativity(creativity: f64) -> Result<f64> {
    // NaN fails the range check as well
    if (CREATIVITY_MIN..=CREATIVITY_MAX).contains(&creativity) {
        Ok(creativity)
    } else {
        Err(EchoError::InvalidSetting {
            name: "creativity",
            value: creativity.to_string(),
            expected: format!("{:.1}..={:.1}", CREATIVITY_MIN, CREATIVITY_MAX),
        })
    }
}

/// The most recent successful generation in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Full user text, untrimmed and untruncated
    pub original_text: String,
    /// Canonical sentiment, never the raw classifier label
    pub detected_sentiment: Sentiment,
    pub requested_length: u32,
    pub creativity: f64,
    /// Language code or "unknown"
    pub detected_language: String,
    pub created_at: DateTime<Utc>,
}

impl InteractionRecord {
    pub fn new(
        original_text: impl Into<String>,
        detected_sentiment: Sentiment,
        settings: GenerationSettings,
        detected_language: impl Into<String>,
    ) -> Self {
        Self {
            original_text: original_text.into(),
            detected_sentiment,
            requested_length: settings.length(),
            creativity: settings.creativity(),
            detected_language: detected_language.into(),
            created_at: Utc::now(),
        }
    }
}
