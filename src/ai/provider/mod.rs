//! Inference Service Abstraction
//!
//! Defines the two service contracts the interaction flow depends on:
//!
//! - [`SentimentClassifier`]: text → raw label + confidence
//! - [`TextGenerator`]: prompt + generation settings → text
//!
//! Concrete adapters talk to remote inference servers over HTTP. Every
//! failure comes back as an [`EchoError`] carrying a categorized
//! [`crate::types::ServiceError`], never as a panic.
//!
//! ## Modules
//!
//! - `huggingface`: Hugging Face style inference endpoint (classifier + generator)
//! - `ollama`: local Ollama server (generator, prompt-based classifier)
//! - `openai`: OpenAI-compatible chat completions (generator)

mod huggingface;
mod ollama;
mod openai;

pub use huggingface::HuggingFaceProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::constants::network::DEFAULT_TIMEOUT_SECS;
use crate::types::{EchoError, Result};

// =============================================================================
// Service Results
// =============================================================================

/// Raw classifier output before label normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Label exactly as the model emitted it ("LABEL_0", "negative", ...)
    pub label: String,
    /// Confidence, when the service reports one
    pub score: Option<f32>,
}

impl Classification {
    pub fn new(label: impl Into<String>, score: Option<f32>) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Options that discourage the generator from repeating itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepetitionControls {
    pub no_repeat_ngram_size: Option<u32>,
    pub encoder_no_repeat_ngram_size: Option<u32>,
    pub repetition_penalty: Option<f32>,
    pub early_stopping: Option<bool>,
}

/// One generation call. Built per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_new_tokens: u32,
    pub min_new_tokens: Option<u32>,
    pub do_sample: bool,
    /// `None` leaves the generator's default temperature in place
    pub temperature: Option<f32>,
    pub repetition: RepetitionControls,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, max_new_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_new_tokens,
            min_new_tokens: None,
            do_sample: true,
            temperature: None,
            repetition: RepetitionControls::default(),
        }
    }

    pub fn with_min_new_tokens(mut self, min: u32) -> Self {
        self.min_new_tokens = Some(min);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_repetition(mut self, repetition: RepetitionControls) -> Self {
        self.repetition = repetition;
        self
    }
}

// =============================================================================
// Service Configuration
// =============================================================================

/// Configuration for one inference service
///
/// Note: API keys are never serialized to output and are redacted in debug
/// output. Each provider converts the key to SecretString internally.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Provider type: "huggingface", "ollama", "openai"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// API key / token
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for self-hosted endpoints)
    pub api_base: Option<String>,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider: "huggingface".to_string(),
            model: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
            api_base: None,
        }
    }
}

impl ServiceConfig {
    pub fn new(provider: impl Into<String>, model: Option<&str>) -> Self {
        Self {
            provider: provider.into(),
            model: model.map(String::from),
            ..Default::default()
        }
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// Sentiment classification service
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify `text`, returning the top label
    async fn classify(&self, text: &str) -> Result<Classification>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the service is reachable
    async fn health_check(&self) -> Result<bool>;
}

/// Text generation service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for the request, returned as the service produced it
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the service is reachable
    async fn health_check(&self) -> Result<bool>;
}

pub type SharedClassifier = Arc<dyn SentimentClassifier>;
pub type SharedGenerator = Arc<dyn TextGenerator>;

/// Create a classifier from configuration
pub fn create_classifier(config: &ServiceConfig) -> Result<SharedClassifier> {
    match config.provider.as_str() {
        "huggingface" => Ok(Arc::new(HuggingFaceProvider::classifier(config.clone())?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
        _ => Err(EchoError::Config(format!(
            "Unknown classifier provider: {}. Supported: huggingface, ollama",
            config.provider
        ))),
    }
}

/// Create a generator from configuration
pub fn create_generator(config: &ServiceConfig) -> Result<SharedGenerator> {
    match config.provider.as_str() {
        "huggingface" => Ok(Arc::new(HuggingFaceProvider::generator(config.clone())?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        _ => Err(EchoError::Config(format!(
            "Unknown generator provider: {}. Supported: huggingface, ollama, openai",
            config.provider
        ))),
    }
}

/// Validate an endpoint URL (SSRF prevention)
///
/// Only allows http/https schemes. Returns the URL without a trailing slash.
pub(crate) fn validate_endpoint(endpoint: &str, service: &str) -> Result<String> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        EchoError::Config(format!(
            "Invalid {} endpoint URL '{}': {}",
            service, endpoint, e
        ))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(EchoError::Config(format!(
            "{} endpoint must use http or https scheme, got: {}",
            service,
            url.scheme()
        )));
    }

    if url.scheme() == "http"
        && let Some(host) = url.host_str()
        && !matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]")
    {
        warn!(
            "{} endpoint uses plain http on a non-local host: {}",
            service, host
        );
    }

    let mut result = url.to_string();
    if result.ends_with('/') {
        result.pop();
    }
    Ok(result)
}

/// Build a reqwest client with the configured timeout
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| EchoError::Config(format!("Failed to create HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_request_builder() {
        let request = GenerationRequest::new("prompt", 135)
            .with_min_new_tokens(45)
            .with_temperature(0.7);
        assert_eq!(request.max_new_tokens, 135);
        assert_eq!(request.min_new_tokens, Some(45));
        assert_eq!(request.temperature, Some(0.7));
        assert!(request.do_sample);
        assert_eq!(request.repetition, RepetitionControls::default());
    }

    #[test]
    fn test_service_config_redacts_key() {
        let config = ServiceConfig {
            api_key: Some("hf_secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hf_secret"));
        assert!(debug.contains("[REDACTED]"));

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hf_secret"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = ServiceConfig::new("carrier-pigeon", None);
        assert!(matches!(
            create_classifier(&config),
            Err(EchoError::Config(_))
        ));
        assert!(matches!(create_generator(&config), Err(EchoError::Config(_))));
    }

    #[test]
    fn test_openai_is_not_a_classifier() {
        let config = ServiceConfig::new("openai", None);
        assert!(create_classifier(&config).is_err());
    }

    #[test]
    fn test_validate_endpoint() {
        assert_eq!(
            validate_endpoint("http://localhost:11434/", "ollama").unwrap(),
            "http://localhost:11434"
        );
        assert!(validate_endpoint("ftp://example.com", "ollama").is_err());
        assert!(validate_endpoint("not a url", "ollama").is_err());
    }
}
