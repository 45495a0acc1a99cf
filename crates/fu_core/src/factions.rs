//! Faction definitions and identifiers.

use serde::{Deserialize, Serialize};

/// Unique identifier for factions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FactionId {
    /// The Tarren Republic - humanity's far-flung descendants.
    Tarren,
    /// The Kor'ai Empire - reptilian warriors of contest.
    Korai,
    /// The Reaper Clans - scavenger pirates.
    Reapers,
    /// The Ascendancy - zealots chasing Ancient technology.
    Ascendancy,
}

impl FactionId {
    /// Every faction in canonical order.
    ///
    /// AI opponents are assigned in this order, skipping the player's pick.
    pub const ALL: [FactionId; 4] = [
        FactionId::Tarren,
        FactionId::Korai,
        FactionId::Reapers,
        FactionId::Ascendancy,
    ];

    /// Get the display name for this faction.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Tarren => "Tarren Republic",
            Self::Korai => "Kor'ai Empire",
            Self::Reapers => "Reaper Clans",
            Self::Ascendancy => "The Ascendancy",
        }
    }

    /// Get the short name for this faction.
    #[must_use]
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::Tarren => "Tarren",
            Self::Korai => "Kor'ai",
            Self::Reapers => "Reapers",
            Self::Ascendancy => "Ascendancy",
        }
    }

    /// Name of this faction's capital world.
    #[must_use]
    pub const fn homeworld_name(&self) -> &'static str {
        match self {
            Self::Tarren => "New Tarra",
            Self::Korai => "Kora Prime",
            Self::Reapers => "Blackwater Station",
            Self::Ascendancy => "Zenith Prime",
        }
    }

    /// The factions left for AI opponents once the player has chosen.
    pub fn opponents_of(player: FactionId) -> impl Iterator<Item = FactionId> {
        Self::ALL.into_iter().filter(move |f| *f != player)
    }
}

impl std::fmt::Display for FactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
