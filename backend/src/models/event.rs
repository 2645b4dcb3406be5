//! Lifecycle events, the event log, and the notification sink boundary
//!
//! The engine emits a fixed vocabulary of lifecycle events with structured
//! payloads. Every event is recorded in the orchestrator's own [`EventLog`]
//! (the engine's audit trail — this is also where degraded-path conditions
//! like defaulted decisions and persistence failures are logged), and
//! non-audit events are fanned out to registered [`EventSink`]s.
//!
//! Delivery to sinks is fire-and-forget from the engine's perspective: a
//! sink that fails must swallow its own error.

use crate::models::decision::CommunicationMessage;
use crate::models::round::{ReplicationResult, RoundResult};
use crate::models::state::GameState;
use serde::Serialize;

/// A lifecycle event with its structured payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// Snapshot of the whole game state (emitted on configure and resume)
    StateSnapshot { state: Box<GameState> },

    ReplicationStarted {
        number: usize,
        total: usize,
    },

    ReplicationComplete {
        result: Box<ReplicationResult>,
    },

    RoundStarted {
        number: usize,
    },

    CommunicationStarted {
        round: usize,
    },

    CommunicationMessage {
        firm: usize,
        text: String,
    },

    CommunicationComplete {
        transcript: Vec<CommunicationMessage>,
    },

    /// A decision has been requested from the firm and is outstanding
    DecisionPending {
        firm: usize,
    },

    FirmDecision {
        firm: usize,
        value: f64,
        rationale: Option<String>,
    },

    RoundComplete {
        result: Box<RoundResult>,
    },

    GameOver {
        state: Box<GameState>,
    },

    /// Fatal condition surfaced to observers (validation, communication
    /// failure)
    Error {
        message: String,
    },

    /// Audit-only: a firm's decision call failed and was replaced with the
    /// deterministic default. Recorded in the event log, not fanned out.
    DecisionDefaulted {
        firm: usize,
        reason: String,
    },

    /// Audit-only: the persistence collaborator rejected the final snapshot.
    /// Game completion is unaffected.
    PersistenceFailed {
        reason: String,
    },
}

impl GameEvent {
    /// Audit-only events stay in the log and are not delivered to sinks.
    pub fn is_audit_only(&self) -> bool {
        matches!(
            self,
            GameEvent::DecisionDefaulted { .. } | GameEvent::PersistenceFailed { .. }
        )
    }
}

/// Notification collaborator: receives every non-audit event.
///
/// Implementations must not panic and must swallow their own delivery
/// errors; the engine treats emission as infallible.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &GameEvent);
}

/// Append-only record of everything the engine did
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Count events matching a predicate (test and audit helper).
    pub fn count_matching(&self, predicate: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}
