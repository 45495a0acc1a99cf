//! Final score computation and the leaderboard seam.
//!
//! The core only computes the score; where it ends up is the business of a
//! [`Leaderboard`] implementation supplied by the caller.

use serde::{Deserialize, Serialize};

use crate::components::Resources;
use crate::config::ScoringConfig;
use crate::factions::FactionId;

/// Deterministic final score.
///
/// `floor(credits / 10 + metal / 5) + 500 * planets + accumulated` with the
/// default weights.
#[must_use]
pub fn final_score(
    resources: &Resources,
    planets_owned: usize,
    accumulated: u64,
    config: &ScoringConfig,
) -> u64 {
    let stockpile = resources.credits as f64 / config.credit_divisor.max(1) as f64
        + resources.metal as f64 / config.metal_divisor.max(1) as f64;
    stockpile.floor() as u64 + config.per_planet * planets_owned as u64 + accumulated
}

/// A score handed to a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Name the player entered.
    pub player_name: String,
    /// Faction played.
    pub faction: FactionId,
    /// Final score.
    pub score: u64,
}

/// External score sink.
pub trait Leaderboard {
    /// Error raised by the sink.
    type Error;

    /// Record one finished game.
    fn submit(&mut self, entry: ScoreEntry) -> Result<(), Self::Error>;
}
