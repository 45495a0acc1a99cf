//! Fixed-cadence game runner.
//!
//! Drives one [`Simulation`] from a tokio interval, logging what the player
//! would see: notifications, battles, eliminations. The same stepping logic
//! runs unpaced for batch games.

use std::time::Duration;

use fu_core::config::SimConfig;
use fu_core::data::FactionRegistry;
use fu_core::error::Result;
use fu_core::events::Severity;
use fu_core::factions::FactionId;
use fu_core::scoring::{Leaderboard, ScoreEntry};
use fu_core::simulation::{Command, GamePhase, Simulation, TickEvents};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::metrics::GameMetrics;

/// Headless runner configuration.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Faction the player controls.
    pub faction: FactionId,
    /// Seed for the random stream; a random one is drawn and logged if unset.
    pub seed: Option<u64>,
    /// Stop after this many ticks even if the game is still going.
    pub max_ticks: u64,
    /// Wall-clock time between ticks.
    pub interval: Duration,
    /// Name submitted with the final score.
    pub player_name: String,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            faction: FactionId::Tarren,
            seed: None,
            max_ticks: 3000,
            interval: Duration::from_millis(SimConfig::default().tick.interval_ms),
            player_name: "Commander".to_string(),
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The player lost every planet.
    GameOver,
    /// The tick limit was reached.
    TickLimit,
}

/// A finished run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final simulation state.
    pub simulation: Simulation,
    /// Outcome metrics.
    pub metrics: GameMetrics,
    /// Why the run stopped.
    pub reason: StopReason,
    /// Name to submit the score under.
    pub player_name: String,
}

impl RunOutcome {
    /// Hand the final score to a leaderboard.
    pub fn submit_score<L: Leaderboard + ?Sized>(
        &self,
        leaderboard: &mut L,
    ) -> std::result::Result<Option<ScoreEntry>, L::Error> {
        self.simulation.submit_score(&self.player_name, leaderboard)
    }
}

/// Runs one game headlessly.
#[derive(Debug)]
pub struct HeadlessRunner {
    sim: Simulation,
    config: HeadlessConfig,
    seed: u64,
}

impl HeadlessRunner {
    /// Start a game with the given data.
    pub fn new(config: HeadlessConfig, sim_config: SimConfig, registry: FactionRegistry) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut sim = Simulation::with_seed(sim_config, registry, seed);
        sim.execute(Command::StartGame {
            faction: config.faction,
        })?;
        info!(seed, faction = %config.faction, max_ticks = config.max_ticks, "Headless game ready");
        Ok(Self { sim, config, seed })
    }

    /// The simulation being driven.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Seed the game was started with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Advance one tick and log what happened.
    ///
    /// Returns the reason to stop, if the run is over.
    pub fn step(&mut self) -> Option<StopReason> {
        let events = self.sim.tick();
        self.log_tick(&events);

        if self.sim.phase() == GamePhase::GameOver {
            Some(StopReason::GameOver)
        } else if self.sim.get_tick() >= self.config.max_ticks {
            Some(StopReason::TickLimit)
        } else {
            None
        }
    }

    /// Run at the configured cadence until the game ends or the tick limit.
    ///
    /// Ticks missed while the host was busy are dropped rather than replayed
    /// in a burst.
    pub async fn run(mut self) -> RunOutcome {
        // a zero period would panic
        let mut interval = tokio::time::interval(self.config.interval.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if let Some(reason) = self.step() {
                return self.finish(reason);
            }
        }
    }

    /// Run as fast as possible, with no wall clock involved.
    pub fn run_unpaced(mut self) -> RunOutcome {
        loop {
            if let Some(reason) = self.step() {
                return self.finish(reason);
            }
        }
    }

    fn finish(self, reason: StopReason) -> RunOutcome {
        let metrics = GameMetrics::from_simulation(&self.sim, self.seed, self.config.faction);
        info!(
            ?reason,
            ticks = metrics.duration_ticks,
            planets = metrics.player_planets,
            score = metrics.final_score,
            "Run finished"
        );
        RunOutcome {
            simulation: self.sim,
            metrics,
            reason,
            player_name: self.config.player_name,
        }
    }

    fn log_tick(&self, events: &TickEvents) {
        // Feed is newest first; everything stamped with this tick is new.
        let fresh: Vec<_> = self
            .sim
            .notifications()
            .iter()
            .take_while(|n| n.tick == events.tick)
            .collect();
        for note in fresh.into_iter().rev() {
            match note.severity {
                Severity::Error | Severity::Warning => warn!(tick = note.tick, "{}", note.message),
                Severity::Info | Severity::Success => info!(tick = note.tick, "{}", note.message),
            }
        }

        for battle in &events.combat {
            info!(
                tick = battle.tick,
                location = %battle.location,
                attacker = %battle.attacker,
                defender = %battle.defender,
                winner = %battle.winner,
                "Battle"
            );
        }
        if events.economy {
            if let Some(player) = self.sim.player() {
                debug!(tick = events.tick, resources = ?player.resources, "Economy");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_ticks: u64) -> HeadlessConfig {
        HeadlessConfig {
            seed: Some(11),
            max_ticks,
            interval: Duration::from_millis(1),
            ..HeadlessConfig::default()
        }
    }

    #[test]
    fn test_unpaced_run_stops_at_tick_limit() {
        let runner = HeadlessRunner::new(config(40), SimConfig::default(), FactionRegistry::builtin()).unwrap();
        let outcome = runner.run_unpaced();

        assert_eq!(outcome.reason, StopReason::TickLimit);
        assert_eq!(outcome.metrics.duration_ticks, 40);
        assert_eq!(outcome.metrics.seed, 11);
        assert_eq!(outcome.simulation.get_tick(), 40);
    }

    #[tokio::test]
    async fn test_paced_run_matches_unpaced() {
        let paced = HeadlessRunner::new(config(15), SimConfig::default(), FactionRegistry::builtin())
            .unwrap()
            .run()
            .await;
        let unpaced = HeadlessRunner::new(config(15), SimConfig::default(), FactionRegistry::builtin())
            .unwrap()
            .run_unpaced();

        assert_eq!(paced.metrics, unpaced.metrics);
    }

    #[test]
    fn test_random_seed_is_reported() {
        let mut cfg = config(1);
        cfg.seed = None;
        let runner = HeadlessRunner::new(cfg, SimConfig::default(), FactionRegistry::builtin()).unwrap();
        let seed = runner.seed();
        assert_eq!(runner.run_unpaced().metrics.seed, seed);
    }

    #[test]
    fn test_outcome_submits_under_player_name() {
        let mut cfg = config(5);
        cfg.player_name = "Admiral".to_string();
        let outcome = HeadlessRunner::new(cfg, SimConfig::default(), FactionRegistry::builtin())
            .unwrap()
            .run_unpaced();

        let mut board = fu_test_utils::leaderboard::InMemoryLeaderboard::new();
        let entry = outcome.submit_score(&mut board).unwrap().unwrap();
        assert_eq!(entry.player_name, "Admiral");
        assert_eq!(entry.score, outcome.metrics.final_score);
    }
}
