//! Time management for the game loop
//!
//! A game advances in discrete rounds. A fixed number of rounds forms one
//! replication, and a fixed number of replications forms the whole game.
//! This module provides deterministic progression through that grid, plus
//! wall-clock millisecond stamps for result records.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, for result timestamps.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Tracks position within the round/replication grid
///
/// # Example
/// ```
/// use oligopoly_core_rs::GameClock;
///
/// let mut clock = GameClock::new(10, 3); // 10 rounds, 3 replications
/// assert_eq!(clock.current_round(), 0);
/// assert_eq!(clock.current_replication(), 0);
///
/// clock.advance_round();
/// assert_eq!(clock.current_round(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    /// Round index within the current replication (0-based)
    current_round: usize,
    /// Replication index (0-based)
    current_replication: usize,
    /// Rounds in one replication
    rounds_per_replication: usize,
    /// Total replications in the game
    num_replications: usize,
}

impl GameClock {
    /// Create a clock positioned at round 0 of replication 0.
    ///
    /// # Panics
    /// Panics if either dimension is zero.
    pub fn new(rounds_per_replication: usize, num_replications: usize) -> Self {
        assert!(
            rounds_per_replication > 0,
            "rounds_per_replication must be positive"
        );
        assert!(num_replications > 0, "num_replications must be positive");
        Self {
            current_round: 0,
            current_replication: 0,
            rounds_per_replication,
            num_replications,
        }
    }

    /// Round index within the current replication (0-based).
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    /// Replication index (0-based).
    pub fn current_replication(&self) -> usize {
        self.current_replication
    }

    /// Advance to the next round within the replication.
    pub fn advance_round(&mut self) {
        self.current_round += 1;
    }

    /// True once every round of the current replication has been played.
    pub fn replication_finished(&self) -> bool {
        self.current_round >= self.rounds_per_replication
    }

    /// Move to round 0 of the next replication.
    pub fn advance_replication(&mut self) {
        self.current_replication += 1;
        self.current_round = 0;
    }

    /// True once every replication has been played.
    pub fn game_finished(&self) -> bool {
        self.current_replication >= self.num_replications
    }

    pub fn rounds_per_replication(&self) -> usize {
        self.rounds_per_replication
    }

    pub fn num_replications(&self) -> usize {
        self.num_replications
    }
}
