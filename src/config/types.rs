//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/echomind/) and project (.echomind/) level configuration.

use serde::{Deserialize, Serialize};

use crate::ai::provider::{RepetitionControls, ServiceConfig};
use crate::constants::generation::{
    CLASSIFIER_PREFIX_CHARS, ENCODER_NO_REPEAT_NGRAM_SIZE, NO_REPEAT_NGRAM_SIZE,
    REPETITION_PENALTY,
};
use crate::constants::settings::{CREATIVITY_DEFAULT, LENGTH_DEFAULT};
use crate::interaction::GenerationSettings;
use crate::types::{EchoError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Sentiment classification service
    pub classifier: ServiceConfig,

    /// Text generation service
    pub generator: ServiceConfig,

    /// Generation defaults and request shaping
    pub generation: GenerationConfig,

    /// Language detection settings
    pub language: LanguageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            classifier: ServiceConfig::default(),
            generator: ServiceConfig::default(),
            generation: GenerationConfig::default(),
            language: LanguageConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `EchoError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        for (role, service) in [("classifier", &self.classifier), ("generator", &self.generator)] {
            if service.timeout_secs == 0 {
                return Err(EchoError::Config(format!(
                    "{}.timeout_secs must be greater than 0",
                    role
                )));
            }
        }

        if self.classifier.provider == "openai" {
            return Err(EchoError::Config(
                "classifier.provider cannot be 'openai'; use huggingface or ollama".to_string(),
            ));
        }

        // Default settings must satisfy the same bounds as user-supplied ones
        self.generation
            .default_settings()
            .map_err(|e| EchoError::Config(format!("generation defaults: {}", e)))?;

        if self.generation.classifier_prefix_chars == 0 {
            return Err(EchoError::Config(
                "generation.classifier_prefix_chars must be greater than 0".to_string(),
            ));
        }

        if self.generation.repetition_penalty <= 0.0 {
            return Err(EchoError::Config(format!(
                "generation.repetition_penalty must be positive, got {}",
                self.generation.repetition_penalty
            )));
        }

        if !(0.0..=1.0).contains(&self.language.min_confidence) {
            return Err(EchoError::Config(format!(
                "language.min_confidence must be between 0.0 and 1.0, got {}",
                self.language.min_confidence
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Response length (words) used when none is given
    pub default_length: u32,

    /// Creativity used when none is given
    pub default_creativity: f64,

    /// Characters of input sent to the classifier
    pub classifier_prefix_chars: usize,

    pub no_repeat_ngram_size: u32,
    pub encoder_no_repeat_ngram_size: u32,
    pub repetition_penalty: f64,
    pub early_stopping: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_length: LENGTH_DEFAULT,
            default_creativity: CREATIVITY_DEFAULT,
            classifier_prefix_chars: CLASSIFIER_PREFIX_CHARS,
            no_repeat_ngram_size: NO_REPEAT_NGRAM_SIZE,
            encoder_no_repeat_ngram_size: ENCODER_NO_REPEAT_NGRAM_SIZE,
            repetition_penalty: REPETITION_PENALTY,
            early_stopping: true,
        }
    }
}

impl GenerationConfig {
    /// Validated settings built from the configured defaults
    pub fn default_settings(&self) -> Result<GenerationSettings> {
        GenerationSettings::new(self.default_length, self.default_creativity)
    }

    /// Repetition controls applied to the primary generation
    pub fn repetition_controls(&self) -> RepetitionControls {
        RepetitionControls {
            no_repeat_ngram_size: Some(self.no_repeat_ngram_size),
            encoder_no_repeat_ngram_size: Some(self.encoder_no_repeat_ngram_size),
            repetition_penalty: Some(self.repetition_penalty as f32),
            early_stopping: Some(self.early_stopping),
        }
    }
}

// =============================================================================
// Language Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Run language detection at all
    pub enabled: bool,

    /// Confidence below which the language is reported as unknown
    pub min_confidence: f64,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_confidence: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.classifier.provider, "huggingface");
        assert_eq!(config.generation.classifier_prefix_chars, 256);
    }

    #[test]
    fn test_validate_rejects_out_of_range_defaults() {
        let mut config = Config::default();
        config.generation.default_length = 10;
        assert!(matches!(config.validate(), Err(EchoError::Config(_))));

        let mut config = Config::default();
        config.generation.default_creativity = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.generator.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("generator.timeout_secs"));
    }

    #[test]
    fn test_validate_rejects_openai_classifier() {
        let mut config = Config::default();
        config.classifier.provider = "openai".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_repetition_controls_all_set() {
        let controls = GenerationConfig::default().repetition_controls();
        assert_eq!(controls.no_repeat_ngram_size, Some(3));
        assert_eq!(controls.encoder_no_repeat_ngram_size, Some(3));
        assert_eq!(controls.repetition_penalty, Some(1.1));
        assert_eq!(controls.early_stopping, Some(true));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = Config::default();
        config.generator.api_key = Some("hf_secret".to_string());
        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(!rendered.contains("hf_secret"));
        assert!(rendered.contains("[generator]"));
    }
}
