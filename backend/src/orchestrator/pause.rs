//! Cooperative pause token
//!
//! Pause is a cancellation token threaded through the round loop, checked
//! only at round and replication boundaries — an in-flight round always
//! finishes. The token is cloneable so observers (an admin surface, an
//! event sink) can request suspension while the loop runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle requesting cooperative suspension of the game loop
#[derive(Debug, Clone, Default)]
pub struct PauseToken {
    requested: Arc<AtomicBool>,
}

impl PauseToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to suspend at its next boundary.
    pub fn request_pause(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// True when a pause has been requested and not yet cleared.
    pub fn is_paused(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Clear the request (done by resume).
    pub fn clear(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }
}
