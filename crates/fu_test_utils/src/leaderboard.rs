//! In-memory leaderboard for tests.

use std::convert::Infallible;

use fu_core::scoring::{Leaderboard, ScoreEntry};

/// Collects submitted scores in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLeaderboard {
    entries: Vec<ScoreEntry>,
}

impl InMemoryLeaderboard {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every submission, in arrival order.
    #[must_use]
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// The `n` best scores, highest first.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<&ScoreEntry> {
        let mut ranked: Vec<&ScoreEntry> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(n);
        ranked
    }
}

impl Leaderboard for InMemoryLeaderboard {
    type Error = Infallible;

    fn submit(&mut self, entry: ScoreEntry) -> Result<(), Self::Error> {
        self.entries.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fu_core::factions::FactionId;

    fn entry(name: &str, score: u64) -> ScoreEntry {
        ScoreEntry {
            player_name: name.into(),
            faction: FactionId::Tarren,
            score,
        }
    }

    #[test]
    fn test_top_ranks_by_score() {
        let mut board = InMemoryLeaderboard::new();
        for (name, score) in [("a", 10), ("b", 30), ("c", 20)] {
            board.submit(entry(name, score)).unwrap();
        }
        let top: Vec<&str> = board.top(2).iter().map(|e| e.player_name.as_str()).collect();
        assert_eq!(top, vec!["b", "c"]);
        assert_eq!(board.entries().len(), 3);
    }
}
