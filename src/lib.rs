//! EchoMind - Sentiment-Aware Reply Generation
//!
//! Listens to what a user shares, classifies its sentiment, and answers with a
//! reply written in a matching tone. The last reply can be regenerated in any
//! other tone with sampling controlled by a creativity setting.
//!
//! ## Core Features
//!
//! - **Sentiment Classification**: hosted or local classifier, labels normalized
//!   to positive / neutral / negative
//! - **Tone Prompts**: one template per sentiment with a word-count target
//! - **Regeneration**: re-run the last message in a chosen tone
//! - **Shared Services**: classifier and generator built once per process
//!
//! ## Quick Start
//!
//! ```ignore
//! use echomind::{Config, GenerationSettings, SessionId};
//! use echomind::cli::CommandContext;
//!
//! let ctx = CommandContext::from_config(Config::default());
//! let session = SessionId::generate();
//! let reply = ctx
//!     .orchestrator
//!     .submit(&session, "I finally finished my thesis!", GenerationSettings::default())
//!     .await?;
//! println!("{} -> {}", reply.sentiment, reply.text);
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: prompts, token budgets, service adapters, model registry
//! - [`analyzer`]: label normalization and language identification
//! - [`interaction`]: session state and the submit / regenerate flow
//! - [`config`]: layered configuration

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod interaction;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, GenerationConfig, LanguageConfig};

// Error Types
pub use types::{EchoError, ErrorCategory, Result, Sentiment, ServiceError, SessionId};

// =============================================================================
// Interaction Re-exports
// =============================================================================

pub use interaction::{
    FlowState, GenerationSettings, InteractionRecord, Orchestrator, Regeneration, Reply,
    SessionStore,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    GenerationRequest, ModelRegistry, PreflightCheck, SentimentClassifier, ServiceConfig,
    SharedRegistry, TextGenerator, TokenBudget, build_prompt,
};

// =============================================================================
// Analyzer Re-exports
// =============================================================================

pub use analyzer::{LanguageDetector, WhatlangDetector, detect_language, normalize_label};
