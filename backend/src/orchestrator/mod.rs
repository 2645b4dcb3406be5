//! Orchestrator - the stateful game driver
//!
//! See `engine.rs` for the state machine and round loop, `pause.rs` for the
//! cooperative cancellation token, and `snapshot.rs` for the persistence
//! boundary.

pub mod engine;
pub mod pause;
pub mod snapshot;

// Re-export main types for convenience
pub use engine::{GameError, GameOrchestrator, RunOutcome};
pub use pause::PauseToken;
pub use snapshot::{GameSnapshot, GameStore, StoreError};
