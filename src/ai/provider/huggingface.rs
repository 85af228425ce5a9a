//! Hugging Face Inference Provider
//!
//! Talks to the Hugging Face serverless inference API, or any self-hosted
//! server exposing the same `POST /models/{model}` contract. One type serves
//! both roles: `text-classification` checkpoints for sentiment and
//! `text2text-generation` checkpoints for replies.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{
    Classification, GenerationRequest, SentimentClassifier, ServiceConfig, TextGenerator,
    http_client, validate_endpoint,
};
use crate::types::{EchoError, ErrorCategory, ErrorClassifier, Result, ServiceError};

const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co";
const DEFAULT_CLASSIFIER_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";
const DEFAULT_GENERATOR_MODEL: &str = "google/flan-t5-base";
const SERVICE: &str = "huggingface";

/// Hugging Face inference endpoint client
pub struct HuggingFaceProvider {
    /// Access token, never exposed in logs or debug output
    token: Option<SecretString>,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for HuggingFaceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceProvider")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl HuggingFaceProvider {
    /// Provider defaulting to the sentiment classification checkpoint
    pub fn classifier(config: ServiceConfig) -> Result<Self> {
        Self::with_default_model(config, DEFAULT_CLASSIFIER_MODEL)
    }

    /// Provider defaulting to the text2text generation checkpoint
    pub fn generator(config: ServiceConfig) -> Result<Self> {
        Self::with_default_model(config, DEFAULT_GENERATOR_MODEL)
    }

    fn with_default_model(config: ServiceConfig, default_model: &str) -> Result<Self> {
        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_base = validate_endpoint(&api_base, SERVICE)?;

        let token = config
            .api_key
            .or_else(|| std::env::var("HF_TOKEN").ok())
            .filter(|t| !t.is_empty())
            .map(SecretString::from);

        if token.is_none() && api_base == DEFAULT_API_BASE {
            warn!("No Hugging Face token configured; the hosted API may reject requests");
        }

        Ok(Self {
            token,
            api_base,
            model: config.model.unwrap_or_else(|| default_model.to_string()),
            client: http_client(config.timeout_secs)?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.api_base, self.model)
    }

    /// POST a JSON body to the model endpoint and return the raw response body
    async fn post<B: Serialize + ?Sized>(&self, body: &B) -> Result<String> {
        let mut request = self.client.post(self.endpoint()).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| EchoError::Service(ErrorClassifier::classify_transport(&e, SERVICE)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| EchoError::Service(ErrorClassifier::classify_transport(&e, SERVICE)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or(text);
            return Err(EchoError::Service(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Hugging Face API error ({}): {}", status, message),
                SERVICE,
            )));
        }

        Ok(text)
    }

    fn parse_error(message: String) -> EchoError {
        EchoError::Service(ServiceError::with_service(
            ErrorCategory::ParseError,
            message,
            SERVICE,
        ))
    }
}

#[async_trait]
impl SentimentClassifier for HuggingFaceProvider {
    async fn classify(&self, text: &str) -> Result<Classification> {
        debug!("Classifying {} chars with {}", text.chars().count(), self.model);

        let start_time = Instant::now();
        let body = self.post(&ClassificationRequest { inputs: text }).await?;
        debug!("Classification took {:?}", start_time.elapsed());

        let parsed: ClassificationResponse = serde_json::from_str(&body)
            .map_err(|e| Self::parse_error(format!("Unexpected classification response: {}", e)))?;

        parsed
            .into_scores()
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .map(|top| Classification::new(top.label, Some(top.score)))
            .ok_or_else(|| Self::parse_error("Classifier returned no labels".to_string()))
    }

    fn name(&self) -> &str {
        SERVICE
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        check_model_endpoint(self).await
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        info!(
            "Generating with Hugging Face (model: {}, max_new_tokens: {})",
            self.model, request.max_new_tokens
        );

        let start_time = Instant::now();
        let body = self.post(&GenerateRequest::from_request(request)).await?;
        debug!("Generation took {:?}", start_time.elapsed());

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| Self::parse_error(format!("Unexpected generation response: {}", e)))?;

        parsed
            .into_text()
            .ok_or_else(|| Self::parse_error("Generator returned no text".to_string()))
    }

    fn name(&self) -> &str {
        SERVICE
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        check_model_endpoint(self).await
    }
}

async fn check_model_endpoint(provider: &HuggingFaceProvider) -> Result<bool> {
    let mut request = provider.client.get(provider.endpoint());
    if let Some(token) = &provider.token {
        request = request.bearer_auth(token.expose_secret());
    }

    match request.send().await {
        Ok(resp) if resp.status().is_success() => {
            info!("Hugging Face model available: {}", provider.model);
            Ok(true)
        }
        Ok(resp) => {
            warn!(
                "Hugging Face check failed for {}: {}",
                provider.model,
                resp.status()
            );
            Ok(false)
        }
        Err(e) => {
            warn!("Hugging Face not reachable: {}", e);
            Ok(false)
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ClassificationRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            Self::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
            Self::Flat(scores) => scores,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_new_tokens: Option<u32>,
    do_sample: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    no_repeat_ngram_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoder_no_repeat_ngram_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repetition_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    early_stopping: Option<bool>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    wait_for_model: bool,
}

impl<'a> GenerateRequest<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        // transformers rejects sampling at zero temperature; decode greedily instead
        let greedy = !request.do_sample || request.temperature.is_some_and(|t| t <= 0.0);
        Self {
            inputs: &request.prompt,
            parameters: GenerateParameters {
                max_new_tokens: request.max_new_tokens,
                min_new_tokens: request.min_new_tokens,
                do_sample: !greedy,
                temperature: request.temperature.filter(|_| !greedy),
                no_repeat_ngram_size: request.repetition.no_repeat_ngram_size,
                encoder_no_repeat_ngram_size: request.repetition.encoder_no_repeat_ngram_size,
                repetition_penalty: request.repetition.repetition_penalty,
                early_stopping: request.repetition.early_stopping,
            },
            options: GenerateOptions {
                wait_for_model: true,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    List(Vec<GeneratedText>),
    Single(GeneratedText),
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        match self {
            Self::List(items) => items.into_iter().next().map(|g| g.generated_text),
            Self::Single(item) => Some(item.generated_text),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::RepetitionControls;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config_for(server: &MockServer, model: &str) -> ServiceConfig {
        ServiceConfig {
            provider: "huggingface".to_string(),
            model: Some(model.to_string()),
            api_key: Some("hf_test".to_string()),
            api_base: Some(server.base_url()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_models() {
        let classifier = HuggingFaceProvider::classifier(ServiceConfig::default()).unwrap();
        assert_eq!(classifier.model, DEFAULT_CLASSIFIER_MODEL);
        assert_eq!(classifier.api_base, DEFAULT_API_BASE);

        let generator = HuggingFaceProvider::generator(ServiceConfig::default()).unwrap();
        assert_eq!(generator.model, DEFAULT_GENERATOR_MODEL);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ServiceConfig {
            api_key: Some("hf_very_secret".to_string()),
            ..Default::default()
        };
        let provider = HuggingFaceProvider::classifier(config).unwrap();
        assert!(!format!("{:?}", provider).contains("hf_very_secret"));
    }

    #[test]
    fn test_generate_parameters_skip_unset_fields() {
        let request = GenerationRequest::new("p", 90).with_temperature(0.7);
        let body = serde_json::to_value(GenerateRequest::from_request(&request)).unwrap();
        assert_eq!(body["parameters"]["max_new_tokens"], 90);
        assert!(body["parameters"].get("min_new_tokens").is_none());
        assert!(body["parameters"].get("repetition_penalty").is_none());
        assert_eq!(body["options"]["wait_for_model"], true);
    }

    #[test]
    fn test_zero_temperature_decodes_greedily() {
        let request = GenerationRequest::new("p", 90).with_temperature(0.0);
        let body = serde_json::to_value(GenerateRequest::from_request(&request)).unwrap();
        assert_eq!(body["parameters"]["do_sample"], false);
        assert!(body["parameters"].get("temperature").is_none());

        let request = GenerationRequest::new("p", 90).with_temperature(0.7);
        let body = serde_json::to_value(GenerateRequest::from_request(&request)).unwrap();
        assert_eq!(body["parameters"]["do_sample"], true);
        assert!(body["parameters"]["temperature"].as_f64().unwrap() > 0.69);
    }

    #[tokio::test]
    async fn test_classify_picks_highest_score() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/sentiment")
                    .header("authorization", "Bearer hf_test")
                    .json_body(json!({"inputs": "I lost my job today"}));
                then.status(200).json_body(json!([[
                    {"label": "neutral", "score": 0.2},
                    {"label": "negative", "score": 0.75},
                    {"label": "positive", "score": 0.05}
                ]]));
            })
            .await;

        let provider = HuggingFaceProvider::classifier(config_for(&server, "sentiment")).unwrap();
        let result = provider.classify("I lost my job today").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.label, "negative");
        assert_eq!(result.score, Some(0.75));
    }

    #[tokio::test]
    async fn test_classify_accepts_flat_list() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/models/sentiment");
                then.status(200)
                    .json_body(json!([{"label": "LABEL_2", "score": 0.9}]));
            })
            .await;

        let provider = HuggingFaceProvider::classifier(config_for(&server, "sentiment")).unwrap();
        let result = provider.classify("great day").await.unwrap();
        assert_eq!(result.label, "LABEL_2");
    }

    #[tokio::test]
    async fn test_generate_sends_parameters() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/models/t5").json_body(json!({
                    "inputs": "prompt",
                    "parameters": {
                        "max_new_tokens": 135,
                        "min_new_tokens": 45,
                        "do_sample": true,
                        "no_repeat_ngram_size": 3,
                        "encoder_no_repeat_ngram_size": 3,
                        "repetition_penalty": 1.1,
                        "early_stopping": true
                    },
                    "options": {"wait_for_model": true}
                }));
                then.status(200)
                    .json_body(json!([{"generated_text": "  That sounds hard.  "}]));
            })
            .await;

        let provider = HuggingFaceProvider::generator(config_for(&server, "t5")).unwrap();
        let request = GenerationRequest::new("prompt", 135)
            .with_min_new_tokens(45)
            .with_repetition(RepetitionControls {
                no_repeat_ngram_size: Some(3),
                encoder_no_repeat_ngram_size: Some(3),
                repetition_penalty: Some(1.1),
                early_stopping: Some(true),
            });
        let text = provider.generate(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "  That sounds hard.  ");
    }

    #[tokio::test]
    async fn test_http_error_is_categorized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/models/t5");
                then.status(503)
                    .json_body(json!({"error": "Model google/flan-t5-base is currently loading"}));
            })
            .await;

        let provider = HuggingFaceProvider::generator(config_for(&server, "t5")).unwrap();
        let err = provider
            .generate(&GenerationRequest::new("prompt", 10))
            .await
            .unwrap_err();

        let service = err.service_error().expect("service error");
        assert_eq!(service.category, ErrorCategory::Unavailable);
        assert!(service.message.contains("currently loading"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/models/sentiment");
                then.status(200).body("not json");
            })
            .await;

        let provider = HuggingFaceProvider::classifier(config_for(&server, "sentiment")).unwrap();
        let err = provider.classify("text").await.unwrap_err();
        assert_eq!(
            err.service_error().map(|e| e.category),
            Some(ErrorCategory::ParseError)
        );
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/models/sentiment");
                then.status(200).json_body(json!({"loaded": true}));
            })
            .await;

        let provider = HuggingFaceProvider::classifier(config_for(&server, "sentiment")).unwrap();
        assert!(SentimentClassifier::health_check(&provider).await.unwrap());

        let missing = HuggingFaceProvider::classifier(config_for(&server, "missing")).unwrap();
        assert!(!SentimentClassifier::health_check(&missing).await.unwrap());
    }
}
