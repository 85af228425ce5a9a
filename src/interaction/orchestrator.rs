//! Interaction Orchestrator
//!
//! Sequences one user turn: detect language, classify a bounded prefix,
//! build a tone prompt, generate, and remember the result for the session.
//! A second entry point regenerates the last reply in a different tone.
//!
//! ## Primary flow
//!
//! ```text
//! Idle ─▶ AwaitingClassification ─▶ AwaitingGeneration ─▶ Displayed
//! ```
//!
//! Empty input is rejected before any state change or service call. A service
//! failure at either step restores the previous flow state and leaves the
//! stored record untouched.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::record::{GenerationSettings, InteractionRecord};
use super::store::{FlowState, SessionStore};
use crate::ai::prompt::build_prompt_for;
use crate::ai::provider::GenerationRequest;
use crate::ai::{SharedRegistry, TokenBudget};
use crate::analyzer::{LanguageDetector, detect_language, normalize_label};
use crate::config::GenerationConfig;
use crate::constants::generation::RESPONSE_MARKER;
use crate::constants::language::UNKNOWN;
use crate::types::{EchoError, Result, Sentiment, SessionId};

/// What the user sees after a successful primary flow
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub sentiment: Sentiment,
    /// Classifier confidence, when the service reports one
    pub score: Option<f32>,
    /// Language code or "unknown"
    pub language: String,
    pub text: String,
}

/// Result of regenerating the last reply
#[derive(Debug, Clone, PartialEq)]
pub struct Regeneration {
    pub tone: Sentiment,
    pub text: String,
}

pub struct Orchestrator {
    registry: SharedRegistry,
    detector: Option<Arc<dyn LanguageDetector>>,
    store: Arc<SessionStore>,
    config: GenerationConfig,
}

impl Orchestrator {
    pub fn new(
        registry: SharedRegistry,
        detector: Option<Arc<dyn LanguageDetector>>,
        store: Arc<SessionStore>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            registry,
            detector,
            store,
            config,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Run the primary flow for `text`
    #[instrument(skip(self, session, text), fields(session = %session, chars = text.chars().count()))]
    pub async fn submit(
        &self,
        session: &SessionId,
        text: &str,
        settings: GenerationSettings,
    ) -> Result<Reply> {
        if text.trim().is_empty() {
            debug!("Rejected empty submission");
            return Err(EchoError::EmptyInput);
        }

        let previous = self.store.flow_state(session);
        let result = self.run_primary(session, text, settings).await;
        if let Err(e) = &result {
            debug!("Interaction failed: {}", e);
            self.store.set_flow_state(session, previous);
        }
        result
    }

    async fn run_primary(
        &self,
        session: &SessionId,
        text: &str,
        settings: GenerationSettings,
    ) -> Result<Reply> {
        let language = match &self.detector {
            Some(detector) => detect_language(detector.as_ref(), text),
            None => UNKNOWN.to_string(),
        };

        let pipelines = self.registry.get().await?;

        self.store
            .set_flow_state(session, FlowState::AwaitingClassification);
        let prefix = truncate_chars(text, self.config.classifier_prefix_chars);
        let classification = pipelines
            .classifier
            .classify(prefix)
            .await
            .map_err(EchoError::into_classification)?;
        let sentiment = normalize_label(&classification.label);
        debug!(
            "Classifier label '{}' normalized to {}",
            classification.label, sentiment
        );

        self.store
            .set_flow_state(session, FlowState::AwaitingGeneration);
        let budget = TokenBudget::from_target_words(settings.length());
        let request = GenerationRequest::new(build_prompt_for(text, sentiment), budget.max_new_tokens)
            .with_min_new_tokens(budget.min_new_tokens)
            .with_repetition(self.config.repetition_controls());
        let generated = pipelines
            .generator
            .generate(&request)
            .await
            .map_err(EchoError::into_generation)?;

        self.store.store_record(
            session,
            InteractionRecord::new(text, sentiment, settings, language.clone()),
        );
        info!(
            "Replied with {} tone ({} chars, language {})",
            sentiment,
            generated.trim().len(),
            language
        );

        Ok(Reply {
            sentiment,
            score: classification.score,
            language,
            text: generated.trim().to_string(),
        })
    }

    /// Regenerate the last reply, in `tone` or the originally detected one
    #[instrument(skip(self, session), fields(session = %session))]
    pub async fn regenerate(
        &self,
        session: &SessionId,
        tone: Option<Sentiment>,
    ) -> Result<Regeneration> {
        let record = self
            .store
            .last_interaction(session)
            .ok_or(EchoError::NoInteraction)?;
        let tone = tone.unwrap_or(record.detected_sentiment);

        let pipelines = self.registry.get().await?;

        let request = GenerationRequest::new(
            build_prompt_for(&record.original_text, tone),
            record.requested_length,
        )
        .with_temperature(record.creativity as f32);

        let raw = pipelines
            .generator
            .generate(&request)
            .await
            .map_err(EchoError::into_generation)
            .inspect_err(|e| debug!("Regeneration failed: {}", e))?;

        info!(
            "Regenerated with {} tone (was {})",
            tone, record.detected_sentiment
        );

        Ok(Regeneration {
            tone,
            text: extract_response(&raw),
        })
    }
}

/// Text after the last response marker, or the whole output, trimmed
pub fn extract_response(raw: &str) -> String {
    match raw.rfind(RESPONSE_MARKER) {
        Some(idx) => raw[idx + RESPONSE_MARKER.len()..].trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// First `max_chars` characters of `text`, on a char boundary
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
