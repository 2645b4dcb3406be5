//! Deterministic random number generation
//!
//! Uses the xorshift64* algorithm for fast, deterministic draws.
//! CRITICAL: all randomness in the engine (parameter realization) MUST go
//! through this module so that seed + configuration fully determine a game.

mod xorshift;

pub use xorshift::RngManager;
