//! Pre-flight Service Checks
//!
//! Verifies that the classifier and generator services are reachable before a
//! user starts an interactive session, and that language detection behaves.
//! Checks never abort the program; they only report.

use std::time::Instant;
use tracing::{info, warn};

use super::provider::{SentimentClassifier, TextGenerator};
use crate::analyzer::{LanguageDetector, detect_language};
use crate::constants::language::UNKNOWN;

/// Sentence whose language any working detector should identify
const LANGUAGE_PROBE: &str =
    "The weather has been lovely this week and everyone seems to be in a good mood.";

/// Pre-flight check results
#[derive(Debug, Clone)]
pub struct PreflightResult {
    /// All checks passed
    pub passed: bool,
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Warnings (non-blocking)
    pub warnings: Vec<String>,
    /// Errors (blocking)
    pub errors: Vec<String>,
    /// Recommendations
    pub recommendations: Vec<String>,
}

impl PreflightResult {
    pub fn new() -> Self {
        Self {
            passed: true,
            checks: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    fn add_check(&mut self, check: CheckResult) {
        if !check.passed {
            self.passed = false;
            self.errors.push(check.message.clone());
        }
        if let Some(ref warn) = check.warning {
            self.warnings.push(warn.clone());
        }
        self.checks.push(check);
    }

    fn add_recommendation(&mut self, rec: String) {
        if !self.recommendations.contains(&rec) {
            self.recommendations.push(rec);
        }
    }
}

impl Default for PreflightResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Individual check result
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub warning: Option<String>,
    pub duration_ms: u64,
}

/// Pre-flight checker for the configured services
#[derive(Debug, Default)]
pub struct PreflightCheck;

impl PreflightCheck {
    pub fn new() -> Self {
        Self
    }

    /// Run every check
    pub async fn check_all(
        &self,
        classifier: &dyn SentimentClassifier,
        generator: &dyn TextGenerator,
        detector: Option<&dyn LanguageDetector>,
    ) -> PreflightResult {
        let mut result = PreflightResult::new();

        info!("Running pre-flight checks...");

        let start = Instant::now();
        let health = classifier.health_check().await;
        self.record_health(
            "classifier",
            classifier.name(),
            classifier.model(),
            health,
            start,
            &mut result,
        );

        let start = Instant::now();
        let health = generator.health_check().await;
        self.record_health(
            "generator",
            generator.name(),
            generator.model(),
            health,
            start,
            &mut result,
        );

        match detector {
            Some(detector) => self.check_language_detector(detector, &mut result),
            None => result.warnings.push("Language detection is disabled".to_string()),
        }

        if result.passed {
            info!("Pre-flight checks passed ({} checks)", result.checks.len());
        } else {
            warn!("Pre-flight checks failed: {} errors", result.errors.len());
        }

        result
    }

    fn record_health(
        &self,
        role: &str,
        provider: &str,
        model: &str,
        health: crate::types::Result<bool>,
        start: Instant,
        result: &mut PreflightResult,
    ) {
        let name = format!("{}_{}", role, provider);
        let duration_ms = start.elapsed().as_millis() as u64;

        let (passed, message, warning) = match health {
            Ok(true) => (
                true,
                format!("{} '{}' ({}) is reachable", role, provider, model),
                None,
            ),
            Ok(false) => (
                false,
                format!("{} '{}' ({}) is not available", role, provider, model),
                Some("Check the service URL, credentials, and model name".to_string()),
            ),
            Err(e) => (
                false,
                format!("{} '{}' health check failed: {}", role, provider, e),
                None,
            ),
        };

        if !passed {
            match provider {
                "huggingface" => result.add_recommendation(
                    "Set HF_TOKEN or api_key for the Hugging Face inference API".to_string(),
                ),
                "ollama" => result.add_recommendation(
                    format!("Start Ollama with `ollama serve` and pull the model: ollama pull {}", model),
                ),
                "openai" => result
                    .add_recommendation("Check OPENAI_API_KEY environment variable".to_string()),
                _ => {}
            }
        }

        result.add_check(CheckResult {
            name,
            passed,
            message,
            warning,
            duration_ms,
        });
    }

    fn check_language_detector(
        &self,
        detector: &dyn LanguageDetector,
        result: &mut PreflightResult,
    ) {
        let start = Instant::now();
        let code = detect_language(detector, LANGUAGE_PROBE);

        // A detector that cannot place plain English is misconfigured, not broken
        let warning = (code == UNKNOWN).then(|| {
            "Language detector could not identify a plain English sentence; \
             lower language.min_confidence"
                .to_string()
        });

        result.add_check(CheckResult {
            name: "language_detector".to_string(),
            passed: true,
            message: format!("Language detector identified probe as '{}'", code),
            warning,
            duration_ms: start.elapsed().as_millis() as u64,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{Classification, GenerationRequest};
    use crate::analyzer::{DetectionError, WhatlangDetector};
    use crate::types::Result;
    use async_trait::async_trait;

    struct Probe {
        healthy: bool,
    }

    #[async_trait]
    impl SentimentClassifier for Probe {
        async fn classify(&self, _text: &str) -> Result<Classification> {
            Ok(Classification::new("neutral", None))
        }
        fn name(&self) -> &str {
            "ollama"
        }
        fn model(&self) -> &str {
            "llama3:latest"
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(self.healthy)
        }
    }

    #[async_trait]
    impl TextGenerator for Probe {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            Ok(String::new())
        }
        fn name(&self) -> &str {
            "huggingface"
        }
        fn model(&self) -> &str {
            "google/flan-t5-base"
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(self.healthy)
        }
    }

    struct Blind;

    impl LanguageDetector for Blind {
        fn detect(&self, _text: &str) -> std::result::Result<String, DetectionError> {
            Err(DetectionError::NoFeatures)
        }
    }

    #[test]
    fn test_preflight_result_creation() {
        let mut result = PreflightResult::new();
        assert!(result.passed);

        result.add_check(CheckResult {
            name: "test".to_string(),
            passed: true,
            message: "Test passed".to_string(),
            warning: None,
            duration_ms: 10,
        });

        assert!(result.passed);
        assert_eq!(result.checks.len(), 1);
    }

    #[tokio::test]
    async fn test_all_healthy() {
        let probe = Probe { healthy: true };
        let detector = WhatlangDetector::default();
        let result = PreflightCheck::new()
            .check_all(&probe, &probe, Some(&detector))
            .await;

        assert!(result.passed);
        assert_eq!(result.checks.len(), 3);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_unhealthy_services_fail_with_recommendations() {
        let probe = Probe { healthy: false };
        let result = PreflightCheck::new().check_all(&probe, &probe, None).await;

        assert!(!result.passed);
        assert_eq!(result.errors.len(), 2);
        assert!(result.recommendations.iter().any(|r| r.contains("ollama serve")));
        assert!(result.recommendations.iter().any(|r| r.contains("HF_TOKEN")));
        assert!(result.warnings.iter().any(|w| w.contains("disabled")));
    }

    #[tokio::test]
    async fn test_blind_detector_warns_without_failing() {
        let probe = Probe { healthy: true };
        let result = PreflightCheck::new()
            .check_all(&probe, &probe, Some(&Blind))
            .await;

        assert!(result.passed);
        assert!(result.warnings.iter().any(|w| w.contains("min_confidence")));
    }
}
