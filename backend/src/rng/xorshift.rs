//! xorshift64* random number generator
//!
//! Small, fast PRNG with good statistical quality, used as the engine's only
//! source of randomness.
//!
//! # Determinism
//!
//! Same seed → same sequence. This is CRITICAL for:
//! - Reproducing a game exactly (debugging, audit)
//! - Pause/resume equivalence tests
//! - Comparing strategies across identical parameter draws

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use oligopoly_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let u = rng.next_f64();          // [0.0, 1.0)
/// let x = rng.range_f64(5.0, 9.0); // [5.0, 9.0)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit, never zero)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with the given seed.
    ///
    /// A zero seed is remapped to 1 (xorshift state must be non-zero).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Advance the state and return the next raw 64-bit value.
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform f64 in [0.0, 1.0), with 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next() >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform f64 in [min, max).
    ///
    /// # Panics
    /// Panics if min > max.
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        assert!(min <= max, "min must not exceed max");
        min + self.next_f64() * (max - min)
    }

    /// Current internal state, for checkpointing and replay.
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
