//! Headless Fractured Universe driver.
//!
//! # Usage
//!
//! ```bash
//! # Play one game at the configured cadence, logging events to stderr
//! cargo run -p fu_headless -- run --faction ascendancy --seed 7 --ticks 2000
//!
//! # Run a batch of seeded games and write a JSON summary
//! cargo run -p fu_headless -- batch --count 500 --seed 0 --ticks 3000 --output results/batch.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fu_core::factions::FactionId;
use fu_headless::{
    batch::{run_batch, BatchConfig},
    config_loader::load_or_default,
    leaderboard::LogLeaderboard,
    runner::{HeadlessConfig, HeadlessRunner},
};

#[derive(Parser)]
#[command(name = "fu_headless")]
#[command(about = "Headless Fractured Universe runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Simulation config overrides (RON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Faction tables (RON list, one entry per faction)
    #[arg(long, global = true)]
    factions: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game at a fixed tick cadence
    Run {
        /// Faction to play
        #[arg(short, long, value_enum, default_value = "tarren")]
        faction: FactionArg,

        /// Random seed (drawn at random if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many ticks
        #[arg(short, long, default_value = "3000")]
        ticks: u64,

        /// Milliseconds between ticks (defaults to the config's interval)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Name to submit the score under
        #[arg(long, default_value = "Commander")]
        player_name: String,
    },

    /// Run a batch of seeded games in parallel
    Batch {
        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Seed of the first game
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Tick limit per game
        #[arg(short, long, default_value = "3000")]
        ticks: u64,

        /// Play every game as this faction instead of rotating
        #[arg(short, long, value_enum)]
        faction: Option<FactionArg>,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: usize,

        /// Write the full results as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FactionArg {
    Tarren,
    Korai,
    Reapers,
    Ascendancy,
}

impl From<FactionArg> for FactionId {
    fn from(arg: FactionArg) -> Self {
        match arg {
            FactionArg::Tarren => FactionId::Tarren,
            FactionArg::Korai => FactionId::Korai,
            FactionArg::Reapers => FactionId::Reapers,
            FactionArg::Ascendancy => FactionId::Ascendancy,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose when set
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let (sim_config, registry) = match load_or_default(cli.config.as_deref(), cli.factions.as_deref()) {
        Ok(data) => data,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Run {
            faction,
            seed,
            ticks,
            interval_ms,
            player_name,
        } => {
            let config = HeadlessConfig {
                faction: faction.into(),
                seed,
                max_ticks: ticks,
                interval: Duration::from_millis(interval_ms.unwrap_or(sim_config.tick.interval_ms)),
                player_name,
            };
            cmd_run(config, sim_config, registry)
        }
        Commands::Batch {
            count,
            seed,
            ticks,
            faction,
            parallel,
            output,
        } => {
            let config = BatchConfig {
                game_count: count,
                seed_start: seed,
                max_ticks: ticks,
                faction: faction.map(FactionId::from),
                parallel_games: parallel,
            };
            cmd_batch(config, &sim_config, &registry, output)
        }
    }
}

/// Play one paced game and submit the score.
fn cmd_run(
    config: HeadlessConfig,
    sim_config: fu_core::config::SimConfig,
    registry: fu_core::data::FactionRegistry,
) -> ExitCode {
    let runner = match HeadlessRunner::new(config, sim_config, registry) {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!("Failed to start game: {e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_time().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    let outcome = runtime.block_on(runner.run());

    let mut leaderboard = LogLeaderboard::new();
    match outcome.submit_score(&mut leaderboard) {
        Ok(Some(entry)) => eprintln!("Final score for {}: {}", entry.player_name, entry.score),
        Ok(None) => eprintln!("No score to submit"),
        Err(never) => match never {},
    }
    eprintln!("State hash: {:016x}", outcome.metrics.final_state_hash);
    ExitCode::SUCCESS
}

/// Run a batch and print the summary as JSON.
fn cmd_batch(
    config: BatchConfig,
    sim_config: &fu_core::config::SimConfig,
    registry: &fu_core::data::FactionRegistry,
    output: Option<PathBuf>,
) -> ExitCode {
    let results = run_batch(config, sim_config, registry);

    match serde_json::to_string_pretty(&results.summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("Failed to encode summary: {e}");
            return ExitCode::FAILURE;
        }
    }

    if let Some(path) = output {
        if let Err(e) = results.save(&path) {
            tracing::error!(path = %path.display(), "Failed to save results: {e}");
            return ExitCode::FAILURE;
        }
        tracing::info!(path = %path.display(), "Results saved");
    }

    if results.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
