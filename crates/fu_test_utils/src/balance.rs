//! Seeded combat trials for balance checks.
//!
//! Runs the same engagement many times on fresh copies of the fleets and
//! tallies outcomes, so faction matchups can be compared without playing
//! whole games.

use fu_core::combat::{self, Victor};
use fu_core::components::Fleet;
use fu_core::config::CombatConfig;
use fu_core::data::FactionData;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Tally of repeated fleet engagements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngagementStats {
    /// Total engagements run.
    pub trials: u32,
    /// Attacker wins.
    pub attacker_wins: u32,
    /// Defender wins.
    pub defender_wins: u32,
    /// Draws.
    pub draws: u32,
    /// Smallest clamped power ratio seen.
    pub min_ratio: f64,
    /// Largest clamped power ratio seen.
    pub max_ratio: f64,
}

impl EngagementStats {
    /// Attacker win rate (0.0 to 1.0).
    pub fn attacker_win_rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        f64::from(self.attacker_wins) / f64::from(self.trials)
    }

    /// Draw rate (0.0 to 1.0).
    pub fn draw_rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        f64::from(self.draws) / f64::from(self.trials)
    }
}

/// Fight `attacker` against `defender` `trials` times from one seed.
pub fn fleet_trials(
    attacker: &Fleet,
    attacker_faction: &FactionData,
    defender: &Fleet,
    defender_faction: &FactionData,
    config: &CombatConfig,
    trials: u32,
    seed: u64,
) -> EngagementStats {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut stats = EngagementStats {
        min_ratio: f64::INFINITY,
        max_ratio: f64::NEG_INFINITY,
        ..EngagementStats::default()
    };

    for _ in 0..trials {
        let mut a = attacker.clone();
        let mut d = defender.clone();
        let result = combat::resolve_fleet_engagement(
            &mut a,
            attacker_faction,
            &mut d,
            defender_faction,
            config,
            &mut rng,
        );
        stats.trials += 1;
        match result.victor {
            Victor::Attacker => stats.attacker_wins += 1,
            Victor::Defender => stats.defender_wins += 1,
            Victor::Draw => stats.draws += 1,
        }
        stats.min_ratio = stats.min_ratio.min(result.ratio);
        stats.max_ratio = stats.max_ratio.max(result.ratio);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::fleet;
    use fu_core::components::{AiId, Owner};
    use fu_core::data::FactionRegistry;
    use fu_core::factions::FactionId;

    #[test]
    fn test_mirror_match_is_mostly_draws() {
        let registry = FactionRegistry::builtin();
        let korai = registry.get(FactionId::Korai);
        let ships = [("korai_drone_fodder", 5), ("korai_drone_bomber", 4)];
        let a = fleet(1, Owner::Player, 0, 0, &ships);
        let d = fleet(2, Owner::Ai(AiId(0)), 0, 0, &ships);

        let stats = fleet_trials(&a, korai, &d, korai, &CombatConfig::default(), 200, 9);
        assert_eq!(stats.trials, 200);
        assert_eq!(stats.attacker_wins + stats.defender_wins + stats.draws, 200);
        assert!(stats.draws > 0);
        assert!(stats.min_ratio >= 0.1 && stats.max_ratio <= 10.0);
    }
}
