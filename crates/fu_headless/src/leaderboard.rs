//! Score sink that writes finished games to the log.

use std::convert::Infallible;

use fu_core::scoring::{Leaderboard, ScoreEntry};

/// Leaderboard that records entries through `tracing`.
#[derive(Debug, Default)]
pub struct LogLeaderboard {
    submitted: usize,
}

impl LogLeaderboard {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries submitted so far.
    #[must_use]
    pub fn submitted(&self) -> usize {
        self.submitted
    }
}

impl Leaderboard for LogLeaderboard {
    type Error = Infallible;

    fn submit(&mut self, entry: ScoreEntry) -> Result<(), Self::Error> {
        self.submitted += 1;
        tracing::info!(
            player = %entry.player_name,
            faction = %entry.faction,
            score = entry.score,
            "Leaderboard entry"
        );
        Ok(())
    }
}
