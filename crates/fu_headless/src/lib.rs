//! Headless game driver for balance testing and CI verification.
//!
//! This crate runs the Fractured Universe simulation without any front end:
//!
//! - **Fixed-cadence play**: a tokio interval ticks one game in real time,
//!   logging notifications and battles as they happen
//! - **Batch runs**: many seeded games in parallel with rayon, summarised
//!   as JSON for balance review
//! - **Data overrides**: simulation config and faction rosters from RON
//!
//! # Example
//!
//! ```bash
//! # Play one game as the Kor'ai at 100 ms per tick
//! cargo run -p fu_headless -- run --faction korai --interval-ms 100
//!
//! # Run 200 seeded games and write a summary
//! cargo run -p fu_headless -- batch --count 200 --seed 7 --output results/batch.json
//! ```

pub mod batch;
pub mod config_loader;
pub mod leaderboard;
pub mod metrics;
pub mod runner;

pub use batch::{run_batch, run_single_game, BatchConfig, BatchResults};
pub use config_loader::{load_factions, load_sim_config, LoadError};
pub use leaderboard::LogLeaderboard;
pub use metrics::{BatchSummary, GameMetrics};
pub use runner::{HeadlessConfig, HeadlessRunner, RunOutcome};
