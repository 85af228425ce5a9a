//! OpenAI-Compatible Chat Provider
//!
//! Generator using the Chat Completions API. Works against OpenAI itself or
//! any server exposing the same `/chat/completions` route.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{GenerationRequest, ServiceConfig, TextGenerator, http_client, validate_endpoint};
use crate::types::{EchoError, ErrorCategory, ErrorClassifier, Result, ServiceError};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const SERVICE: &str = "openai";

/// OpenAI API Provider with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                EchoError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_base = validate_endpoint(&api_base, SERVICE)?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client: http_client(config.timeout_secs)?,
        })
    }

    fn build_request(&self, request: &GenerationRequest) -> ChatCompletionRequest {
        // Chat models have no greedy switch; zero temperature is the closest
        let temperature = if request.do_sample {
            request.temperature
        } else {
            Some(0.0)
        };

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            max_tokens: request.max_new_tokens,
            temperature,
            frequency_penalty: request
                .repetition
                .repetition_penalty
                .map(|p| (p - 1.0).clamp(0.0, 2.0)),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        info!(
            "Generating with OpenAI (model: {}, max_tokens: {})",
            self.model, request.max_new_tokens
        );

        let start_time = Instant::now();
        let url = format!("{}/chat/completions", self.api_base);

        debug!("Sending request to OpenAI API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.build_request(request))
            .send()
            .await
            .map_err(|e| EchoError::Service(ErrorClassifier::classify_transport(&e, SERVICE)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EchoError::Service(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("OpenAI API error ({}): {}", status, body),
                SERVICE,
            )));
        }

        let parse_error = |message: String| {
            EchoError::Service(ServiceError::with_service(
                ErrorCategory::ParseError,
                message,
                SERVICE,
            ))
        };

        let response_body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| parse_error(format!("Failed to parse OpenAI response: {}", e)))?;

        debug!("Generation took {:?}", start_time.elapsed());

        response_body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| parse_error("No content in OpenAI response".to_string()))
    }

    fn name(&self) -> &str {
        SERVICE
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.api_base);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("OpenAI API is available");
                Ok(true)
            }
            Ok(resp) => {
                warn!("OpenAI API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("OpenAI API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn provider_for(server: &MockServer) -> OpenAiProvider {
        OpenAiProvider::new(ServiceConfig {
            provider: "openai".to_string(),
            api_key: Some("sk-test".to_string()),
            api_base: Some(server.base_url()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = OpenAiProvider::new(ServiceConfig {
            provider: "openai".to_string(),
            api_key: Some("sk-very-secret".to_string()),
            ..Default::default()
        })
        .unwrap();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("sk-very-secret"));
        assert_eq!(provider.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_greedy_request_pins_temperature() {
        let provider = OpenAiProvider::new(ServiceConfig {
            provider: "openai".to_string(),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        })
        .unwrap();
        let mut request = GenerationRequest::new("p", 50).with_temperature(0.9);
        request.do_sample = false;
        let body = provider.build_request(&request);
        assert_eq!(body.temperature, Some(0.0));
        assert_eq!(body.max_tokens, 50);
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer sk-test")
                    .json_body(json!({
                        "model": DEFAULT_MODEL,
                        "messages": [{"role": "user", "content": "prompt"}],
                        "max_tokens": 135,
                        "temperature": 0.5
                    }));
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "Sounds great!"}}]
                }));
            })
            .await;

        let request = GenerationRequest::new("prompt", 135).with_temperature(0.5);
        let text = provider_for(&server).generate(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "Sounds great!");
    }

    #[tokio::test]
    async fn test_auth_failure_is_categorized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(401)
                    .json_body(json!({"error": {"message": "bad key"}}));
            })
            .await;

        let err = provider_for(&server)
            .generate(&GenerationRequest::new("prompt", 10))
            .await
            .unwrap_err();
        assert_eq!(
            err.service_error().map(|e| e.category),
            Some(ErrorCategory::Auth)
        );
    }

    #[tokio::test]
    async fn test_missing_content_is_parse_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let err = provider_for(&server)
            .generate(&GenerationRequest::new("prompt", 10))
            .await
            .unwrap_err();
        assert_eq!(
            err.service_error().map(|e| e.category),
            Some(ErrorCategory::ParseError)
        );
    }
}
