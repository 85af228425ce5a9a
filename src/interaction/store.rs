//! Session-scoped interaction state
//!
//! Each session owns its flow state and at most one [`InteractionRecord`].
//! Sessions never see each other's data.

use dashmap::DashMap;
use serde::Serialize;

use super::record::InteractionRecord;
use crate::types::SessionId;

/// Where a session is in the primary flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    #[default]
    Idle,
    AwaitingClassification,
    AwaitingGeneration,
    Displayed,
}

impl std::fmt::Display for FlowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingClassification => "awaiting_classification",
            Self::AwaitingGeneration => "awaiting_generation",
            Self::Displayed => "displayed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
struct SessionState {
    flow: FlowState,
    last: Option<InteractionRecord>,
}

/// Concurrent map of session id to session state
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current flow state (Idle for unknown sessions)
    pub fn flow_state(&self, session: &SessionId) -> FlowState {
        self.sessions
            .get(session)
            .map(|s| s.flow)
            .unwrap_or_default()
    }

    pub fn set_flow_state(&self, session: &SessionId, flow: FlowState) {
        self.sessions.entry(session.clone()).or_default().flow = flow;
    }

    /// Replace the session's record and mark the result displayed
    pub fn store_record(&self, session: &SessionId, record: InteractionRecord) {
        let mut entry = self.sessions.entry(session.clone()).or_default();
        entry.last = Some(record);
        entry.flow = FlowState::Displayed;
    }

    pub fn last_interaction(&self, session: &SessionId) -> Option<InteractionRecord> {
        self.sessions.get(session).and_then(|s| s.last.clone())
    }

    /// Drop everything held for a session
    pub fn end_session(&self, session: &SessionId) {
        self.sessions.remove(session);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
