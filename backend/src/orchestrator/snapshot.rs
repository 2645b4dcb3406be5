//! Game snapshots and the persistence boundary
//!
//! A finished (or suspended) game serializes into a [`GameSnapshot`] keyed
//! by the game's unique identity, carrying the configuration, the full
//! round/replication history, the equilibrium benchmarks, the summary, and
//! lifecycle timestamps. A SHA-256 hash of the canonical-JSON configuration
//! lets stores detect configuration mismatches on load.
//!
//! # Critical Invariants
//!
//! - Persistence is best-effort: a failing store is logged and never
//!   affects game completion or in-memory correctness
//! - The snapshot is a pure projection of [`GameState`]; capturing one has
//!   no side effects

use crate::models::state::GameState;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

/// Persistence failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store rejected snapshot: {0}")]
    Rejected(String),
}

/// Serializable snapshot of a whole game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Unique game identity (mirrors `state.id`)
    pub game_id: Uuid,

    /// SHA-256 hex digest of the canonical-JSON configuration
    pub config_hash: String,

    /// The complete game state at capture time
    pub state: GameState,

    /// Wall-clock capture stamp (ms since Unix epoch)
    pub saved_at_ms: u64,
}

impl GameSnapshot {
    /// Capture a snapshot of the given state.
    pub fn capture(state: &GameState) -> Result<Self, StoreError> {
        let config_json = serde_json::to_vec(&state.config)?;
        let mut hasher = Sha256::new();
        hasher.update(&config_json);
        let config_hash = format!("{:x}", hasher.finalize());

        Ok(Self {
            game_id: state.id,
            config_hash,
            state: state.clone(),
            saved_at_ms: crate::core::time::unix_millis(),
        })
    }
}

/// Persistence collaborator: accepts finished game snapshots.
///
/// Optional — a game without a store plays identically.
pub trait GameStore: Send + Sync {
    fn save(&self, snapshot: &GameSnapshot) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equilibrium;
    use crate::models::config::GameConfiguration;
    use crate::models::state::{GamePhase, GameState};

    fn minimal_state() -> GameState {
        let config = GameConfiguration::duopoly_quantity_default();
        let benchmarks = equilibrium::compute_benchmarks(&config, None).unwrap();
        GameState {
            id: Uuid::new_v4(),
            phase: GamePhase::Configuring,
            config,
            current_replication: 0,
            current_round: 0,
            rounds: Vec::new(),
            replications: Vec::new(),
            benchmarks,
            game_parameters: None,
            summary: None,
            created_at_ms: 0,
            started_at_ms: None,
            completed_at_ms: None,
        }
    }

    #[test]
    fn test_config_hash_is_stable() {
        let state = minimal_state();
        let first = GameSnapshot::capture(&state).unwrap();
        let second = GameSnapshot::capture(&state).unwrap();
        assert_eq!(first.config_hash, second.config_hash);
        assert_eq!(first.config_hash.len(), 64);
    }

    #[test]
    fn test_config_hash_tracks_config_changes() {
        let state_a = minimal_state();
        let mut state_b = minimal_state();
        state_b.config.rounds = 7;

        let snap_a = GameSnapshot::capture(&state_a).unwrap();
        let snap_b = GameSnapshot::capture(&state_b).unwrap();
        assert_ne!(snap_a.config_hash, snap_b.config_hash);
    }

    #[test]
    fn test_snapshot_serde_roundtrip() {
        let snapshot = GameSnapshot::capture(&minimal_state()).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.game_id, snapshot.game_id);
        assert_eq!(restored.config_hash, snapshot.config_hash);
        assert_eq!(restored.state.config, snapshot.state.config);
    }
}
