//! Player-facing notification feed and combat log.
//!
//! Both are bounded, newest-first rings: pushing past capacity evicts the
//! oldest entry.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::combat::Losses;

/// Notifications kept in the feed.
pub const NOTIFICATION_CAPACITY: usize = 8;

/// Combat events kept in the log.
pub const COMBAT_LOG_CAPACITY: usize = 30;

/// A bounded, newest-first list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedFeed<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedFeed<T> {
    /// Create an empty feed holding at most `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add an entry at the front, evicting the oldest if full.
    pub fn push(&mut self, entry: T) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// The newest entry.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the feed is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Neutral information.
    Info,
    /// Something went well.
    Success,
    /// Something needs attention.
    Warning,
    /// A command was rejected or something went badly.
    Error,
}

/// A message for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Tick it was raised on.
    pub tick: u64,
    /// Text.
    pub message: String,
    /// Severity.
    pub severity: Severity,
}

/// Notification feed.
pub type NotificationFeed = BoundedFeed<Notification>;

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::with_capacity(NOTIFICATION_CAPACITY)
    }
}

/// Label used when neither side won decisively.
pub const DRAW_LABEL: &str = "Draw";

/// Immutable record of one resolved engagement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatEvent {
    /// Tick the battle happened on.
    pub tick: u64,
    /// Planet name or "Deep Space".
    pub location: String,
    /// Attacker label.
    pub attacker: String,
    /// Defender label.
    pub defender: String,
    /// Attacker ships lost.
    pub attacker_losses: Losses,
    /// Defender ships lost.
    pub defender_losses: Losses,
    /// Attacker label, defender label, or [`DRAW_LABEL`].
    pub winner: String,
}

/// Combat log.
pub type CombatLog = BoundedFeed<CombatEvent>;

impl Default for CombatLog {
    fn default() -> Self {
        Self::with_capacity(COMBAT_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(tick: u64) -> Notification {
        Notification {
            tick,
            message: format!("n{tick}"),
            severity: Severity::Info,
        }
    }

    #[test]
    fn test_feed_is_newest_first_and_bounded() {
        let mut feed = NotificationFeed::default();
        for tick in 0..12 {
            feed.push(note(tick));
        }
        assert_eq!(feed.len(), NOTIFICATION_CAPACITY);
        let ticks: Vec<u64> = feed.iter().map(|n| n.tick).collect();
        assert_eq!(ticks, vec![11, 10, 9, 8, 7, 6, 5, 4]);
        assert_eq!(feed.latest().map(|n| n.tick), Some(11));
    }

    #[test]
    fn test_combat_log_capacity() {
        let mut log = CombatLog::default();
        for tick in 0..40 {
            log.push(CombatEvent {
                tick,
                location: "Deep Space".into(),
                attacker: "Player".into(),
                defender: "Neutral".into(),
                attacker_losses: Losses::new(),
                defender_losses: Losses::new(),
                winner: DRAW_LABEL.into(),
            });
        }
        assert_eq!(log.len(), COMBAT_LOG_CAPACITY);
        assert_eq!(log.iter().last().map(|e| e.tick), Some(10));
    }
}
