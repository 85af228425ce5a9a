//! Interaction Flow
//!
//! One user turn from text to tone-adapted reply, plus the per-session state
//! that makes regeneration possible.

pub mod orchestrator;
pub mod record;
pub mod store;

pub use orchestrator::{Orchestrator, Regeneration, Reply, extract_response};
pub use record::{GenerationSettings, InteractionRecord};
pub use store::{FlowState, SessionStore};
