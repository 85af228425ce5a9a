//! Ollama Local Model Provider
//!
//! Generator backed by a locally-running Ollama server. The same server can
//! act as a sentiment classifier by asking the model for a one-word label;
//! such labels carry no confidence score.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{
    Classification, GenerationRequest, SentimentClassifier, ServiceConfig, TextGenerator,
    http_client, validate_endpoint,
};
use crate::types::{EchoError, ErrorCategory, ErrorClassifier, Result, ServiceError};

const DEFAULT_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3:latest";
const SERVICE: &str = "ollama";

const CLASSIFY_INSTRUCTION: &str = "Classify the sentiment of the text below. \
Answer with exactly one word: positive, neutral, or negative.";

/// Ollama Local Model Provider
#[derive(Debug)]
pub struct OllamaProvider {
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_base = validate_endpoint(&api_base, SERVICE)?;

        Ok(Self {
            api_base,
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client: http_client(config.timeout_secs)?,
        })
    }

    async fn complete(&self, request: &OllamaRequest) -> Result<String> {
        let url = format!("{}/api/generate", self.api_base);
        debug!("Sending request to Ollama API");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let mut err = ErrorClassifier::classify_transport(&e, SERVICE);
                if e.is_connect() {
                    err.message = format!(
                        "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                        self.api_base
                    );
                }
                EchoError::Service(err)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EchoError::Service(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Ollama API error ({}): {}", status, body),
                SERVICE,
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|e| {
            EchoError::Service(ServiceError::with_service(
                ErrorCategory::ParseError,
                format!("Failed to parse Ollama response: {}", e),
                SERVICE,
            ))
        })?;

        Ok(body.response)
    }
}

#[async_trait]
impl TextGenerator for OllamaProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        info!(
            "Generating with Ollama (model: {}, num_predict: {})",
            self.model, request.max_new_tokens
        );

        let start_time = Instant::now();
        let text = self
            .complete(&OllamaRequest::generation(&self.model, request))
            .await?;
        debug!("Generation took {:?}", start_time.elapsed());

        Ok(text)
    }

    fn name(&self) -> &str {
        SERVICE
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        check_server(self).await
    }
}

#[async_trait]
impl SentimentClassifier for OllamaProvider {
    async fn classify(&self, text: &str) -> Result<Classification> {
        debug!("Classifying {} chars with {}", text.chars().count(), self.model);

        let prompt = format!("{}\n\nText: {}\n\nSentiment:", CLASSIFY_INSTRUCTION, text);
        let raw = self
            .complete(&OllamaRequest::classification(&self.model, prompt))
            .await?;

        let label = raw
            .split_whitespace()
            .next()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '_'))
            .filter(|w| !w.is_empty())
            .ok_or_else(|| {
                EchoError::Service(ServiceError::with_service(
                    ErrorCategory::ParseError,
                    "Ollama returned an empty sentiment label",
                    SERVICE,
                ))
            })?;

        Ok(Classification::new(label, None))
    }

    fn name(&self) -> &str {
        SERVICE
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        check_server(self).await
    }
}

async fn check_server(provider: &OllamaProvider) -> Result<bool> {
    let url = format!("{}/api/tags", provider.api_base);

    match provider.client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            if let Ok(tags) = resp.json::<OllamaTagsResponse>().await {
                let base_name = provider.model.trim_end_matches(":latest");
                let model_available = tags
                    .models
                    .iter()
                    .any(|m| m.name == provider.model || m.name.starts_with(base_name));

                if model_available {
                    info!("Ollama is available with model: {}", provider.model);
                    Ok(true)
                } else {
                    warn!(
                        "Ollama is running but model '{}' not found. Pull with: ollama pull {}",
                        provider.model, provider.model
                    );
                    Ok(false)
                }
            } else {
                info!("Ollama is available");
                Ok(true)
            }
        }
        Ok(resp) => {
            warn!("Ollama API check failed: {}", resp.status());
            Ok(false)
        }
        Err(e) => {
            warn!("Ollama not available: {}. Start with: ollama serve", e);
            Ok(false)
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Default, Serialize)]
struct OllamaOptions {
    num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repeat_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

impl OllamaRequest {
    fn generation(model: &str, request: &GenerationRequest) -> Self {
        // Greedy decoding is top_k = 1 in Ollama terms
        let top_k = (!request.do_sample).then_some(1);
        Self {
            model: model.to_string(),
            prompt: request.prompt.clone(),
            stream: false,
            options: OllamaOptions {
                num_predict: request.max_new_tokens,
                temperature: request.temperature,
                repeat_penalty: request.repetition.repetition_penalty,
                top_k,
            },
        }
    }

    fn classification(model: &str, prompt: String) -> Self {
        Self {
            model: model.to_string(),
            prompt,
            stream: false,
            options: OllamaOptions {
                num_predict: 4,
                temperature: Some(0.0),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::RepetitionControls;
    use httpmock::prelude::*;
    use serde_json::json;

    fn provider_for(server: &MockServer) -> OllamaProvider {
        OllamaProvider::new(ServiceConfig {
            provider: "ollama".to_string(),
            api_base: Some(server.base_url()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::new("ollama", None);
        let provider = OllamaProvider::new(config).expect("Failed to create provider");
        assert_eq!(provider.api_base, DEFAULT_API_BASE);
        assert_eq!(provider.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let config = ServiceConfig {
            provider: "ollama".to_string(),
            api_base: Some("file:///etc/passwd".to_string()),
            ..Default::default()
        };
        assert!(OllamaProvider::new(config).is_err());
    }

    #[tokio::test]
    async fn test_generate_maps_options() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate").json_body(json!({
                    "model": DEFAULT_MODEL,
                    "prompt": "hello",
                    "stream": false,
                    "options": {"num_predict": 60, "repeat_penalty": 1.1}
                }));
                then.status(200)
                    .json_body(json!({"response": "Hi there!", "done": true}));
            })
            .await;

        let request = GenerationRequest::new("hello", 60).with_repetition(RepetitionControls {
            repetition_penalty: Some(1.1),
            ..Default::default()
        });
        let text = provider_for(&server).generate(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "Hi there!");
    }

    #[tokio::test]
    async fn test_classify_takes_first_word() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200)
                    .json_body(json!({"response": " Negative.\nThe text is sad."}));
            })
            .await;

        let result = provider_for(&server).classify("I lost my job").await.unwrap();
        assert_eq!(result.label, "Negative");
        assert_eq!(result.score, None);
    }

    #[tokio::test]
    async fn test_empty_label_is_parse_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({"response": "   "}));
            })
            .await;

        let err = provider_for(&server).classify("text").await.unwrap_err();
        assert_eq!(
            err.service_error().map(|e| e.category),
            Some(ErrorCategory::ParseError)
        );
    }

    #[tokio::test]
    async fn test_server_error_is_categorized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(404).body("model not found");
            })
            .await;

        let err = provider_for(&server)
            .generate(&GenerationRequest::new("hi", 10))
            .await
            .unwrap_err();
        assert_eq!(
            err.service_error().map(|e| e.category),
            Some(ErrorCategory::BadRequest)
        );
    }

    #[tokio::test]
    async fn test_health_check_looks_for_model() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tags");
                then.status(200)
                    .json_body(json!({"models": [{"name": "llama3:latest"}]}));
            })
            .await;

        let provider = provider_for(&server);
        assert!(TextGenerator::health_check(&provider).await.unwrap());

        let other = OllamaProvider::new(ServiceConfig {
            provider: "ollama".to_string(),
            model: Some("mistral".to_string()),
            api_base: Some(server.base_url()),
            ..Default::default()
        })
        .unwrap();
        assert!(!TextGenerator::health_check(&other).await.unwrap());
    }
}
