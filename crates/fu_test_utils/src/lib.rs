//! # Fractured Universe Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Determinism test harness
//! - Fixture helpers for planets, fleets and started games
//! - Seeded combat trials for balance checks
//! - An in-memory leaderboard
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod balance;
pub mod determinism;
pub mod fixtures;
pub mod leaderboard;

/// Re-export proptest for convenience.
pub use proptest;
