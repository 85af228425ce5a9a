//! AI Integration Layer
//!
//! Everything between the interaction flow and the inference services:
//! tone prompts, token budgets, service adapters, and the shared registry
//! that owns them.

pub mod budget;
pub mod preflight;
pub mod prompt;
pub mod provider;
pub mod registry;

pub use budget::TokenBudget;
pub use preflight::{CheckResult, PreflightCheck, PreflightResult};
pub use prompt::{build_prompt, build_prompt_for, tone_template};
pub use provider::{
    Classification, GenerationRequest, HuggingFaceProvider, OllamaProvider, OpenAiProvider,
    RepetitionControls, SentimentClassifier, ServiceConfig, SharedClassifier, SharedGenerator,
    TextGenerator, create_classifier, create_generator,
};
pub use registry::{ModelRegistry, Pipelines, SharedRegistry};
