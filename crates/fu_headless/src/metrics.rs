//! Per-game outcome metrics and batch aggregation.

use std::collections::BTreeMap;

use fu_core::components::Owner;
use fu_core::factions::FactionId;
use fu_core::simulation::{GamePhase, Simulation};
use serde::{Deserialize, Serialize};

/// Outcome of a single game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Random seed used.
    pub seed: u64,
    /// Faction the player controlled.
    pub faction: FactionId,
    /// Ticks played.
    pub duration_ticks: u64,
    /// Whether the player was knocked out.
    pub game_over: bool,
    /// Planets the player held at the end.
    pub player_planets: usize,
    /// AI empires still in the game, by name.
    pub surviving_ais: Vec<String>,
    /// Final score if the game ended, else the score it would have had.
    pub final_score: u64,
    /// Battles recorded in the combat log.
    pub combats: usize,
    /// Simulation state hash at the end (for determinism checks).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Collect metrics from a finished (or stopped) simulation.
    #[must_use]
    pub fn from_simulation(sim: &Simulation, seed: u64, faction: FactionId) -> Self {
        let world = sim.world();
        Self {
            seed,
            faction,
            duration_ticks: sim.get_tick(),
            game_over: sim.phase() == GamePhase::GameOver,
            player_planets: world.map_or(0, |w| w.planets_owned(Owner::Player)),
            surviving_ais: world
                .map(|w| w.ais.values().map(|ai| ai.name.clone()).collect())
                .unwrap_or_default(),
            final_score: sim.final_score().or(sim.current_score()).unwrap_or(0),
            combats: sim.combat_log().len(),
            final_state_hash: sim.state_hash(),
        }
    }
}

/// Aggregate view over a batch of games.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total games played.
    pub total_games: u32,
    /// Games that ended with the player eliminated.
    pub games_over: u32,
    /// Average game duration in ticks.
    pub avg_duration_ticks: f64,
    /// Shortest game.
    pub min_duration_ticks: u64,
    /// Longest game.
    pub max_duration_ticks: u64,
    /// Average planets held by the player at the end.
    pub avg_player_planets: f64,
    /// Average final score.
    pub avg_final_score: f64,
    /// Average battles per game.
    pub avg_combats: f64,
    /// How often each AI empire survived to the end.
    pub ai_survival_rates: BTreeMap<String, f64>,
}

impl BatchSummary {
    /// Calculate a summary from per-game metrics.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }
        let n = games.len() as f64;

        let mut survivors: BTreeMap<String, u32> = BTreeMap::new();
        for name in games.iter().flat_map(|g| &g.surviving_ais) {
            *survivors.entry(name.clone()).or_default() += 1;
        }

        Self {
            total_games: games.len() as u32,
            games_over: games.iter().filter(|g| g.game_over).count() as u32,
            avg_duration_ticks: games.iter().map(|g| g.duration_ticks as f64).sum::<f64>() / n,
            min_duration_ticks: games.iter().map(|g| g.duration_ticks).min().unwrap_or(0),
            max_duration_ticks: games.iter().map(|g| g.duration_ticks).max().unwrap_or(0),
            avg_player_planets: games.iter().map(|g| g.player_planets as f64).sum::<f64>() / n,
            avg_final_score: games.iter().map(|g| g.final_score as f64).sum::<f64>() / n,
            avg_combats: games.iter().map(|g| g.combats as f64).sum::<f64>() / n,
            ai_survival_rates: survivors
                .into_iter()
                .map(|(name, count)| (name, f64::from(count) / n))
                .collect(),
        }
    }
}
