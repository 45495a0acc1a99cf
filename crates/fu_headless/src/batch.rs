//! Batch game runner for balance testing.
//!
//! Runs many seeded games in parallel using rayon. No wall clock is
//! involved, so a batch is reproducible from its seeds alone.

use std::path::Path;

use fu_core::config::SimConfig;
use fu_core::data::FactionRegistry;
use fu_core::factions::FactionId;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, GameMetrics};
use crate::runner::{HeadlessConfig, HeadlessRunner};

/// Configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of games to run.
    pub game_count: u32,
    /// Seed of the first game; game `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Tick limit per game.
    pub max_ticks: u64,
    /// Player faction, or `None` to rotate through every faction.
    pub faction: Option<FactionId>,
    /// Maximum parallel games (0 = rayon default).
    pub parallel_games: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game_count: 100,
            seed_start: 0,
            max_ticks: 3000,
            faction: None,
            parallel_games: 0,
        }
    }
}

impl BatchConfig {
    /// Create a config for `game_count` games.
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Default::default()
        }
    }

    /// Set seed start.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the tick limit.
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Play every game as one faction.
    pub fn with_faction(mut self, faction: FactionId) -> Self {
        self.faction = Some(faction);
        self
    }

    fn faction_for(&self, index: u32) -> FactionId {
        self.faction
            .unwrap_or(FactionId::ALL[index as usize % FactionId::ALL.len()])
    }
}

/// A game that could not be run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchError {
    /// Game index within the batch.
    pub game_index: u32,
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Results from a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Individual game metrics, in seed order.
    pub games: Vec<GameMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Games that failed to start.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Run one game to completion without pacing.
pub fn run_single_game(
    seed: u64,
    faction: FactionId,
    max_ticks: u64,
    sim_config: &SimConfig,
    registry: &FactionRegistry,
) -> fu_core::error::Result<GameMetrics> {
    let config = HeadlessConfig {
        faction,
        seed: Some(seed),
        max_ticks,
        ..HeadlessConfig::default()
    };
    let runner = HeadlessRunner::new(config, sim_config.clone(), registry.clone())?;
    Ok(runner.run_unpaced().metrics)
}

/// Run a batch of games.
pub fn run_batch(config: BatchConfig, sim_config: &SimConfig, registry: &FactionRegistry) -> BatchResults {
    info!(
        games = config.game_count,
        seed_start = config.seed_start,
        max_ticks = config.max_ticks,
        "Starting batch run"
    );

    if config.parallel_games > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<GameMetrics, BatchError>> = (0..config.game_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            let faction = config.faction_for(i);
            run_single_game(seed, faction, config.max_ticks, sim_config, registry)
                .map(|m| {
                    debug!(seed, ticks = m.duration_ticks, score = m.final_score, "Game complete");
                    m
                })
                .map_err(|e| {
                    warn!(game = i, seed, error = %e, "Game failed");
                    BatchError {
                        game_index: i,
                        seed,
                        message: e.to_string(),
                    }
                })
        })
        .collect();

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<GameMetrics> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    info!(
        games = summary.total_games,
        games_over = summary.games_over,
        avg_score = summary.avg_final_score,
        "Batch complete"
    );

    BatchResults {
        config,
        games,
        summary,
        errors,
    }
}

/// Check that the same seed always produces the same game.
pub fn verify_determinism(seed: u64, runs: u32, max_ticks: u64) -> bool {
    let sim_config = SimConfig::default();
    let registry = FactionRegistry::builtin();
    let results: Vec<u64> = (0..runs)
        .into_par_iter()
        .filter_map(|_| run_single_game(seed, FactionId::Tarren, max_ticks, &sim_config, &registry).ok())
        .map(|m| m.final_state_hash)
        .collect();

    results.len() == runs as usize && results.windows(2).all(|w| w[0] == w[1])
}
