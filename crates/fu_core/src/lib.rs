//! # Fractured Universe Core
//!
//! Deterministic simulation core for the Fractured Universe 4X game.
//!
//! This crate contains **only** game logic:
//! - No rendering
//! - No IO
//! - No wall-clock time (the host decides when to call [`simulation::Simulation::tick`])
//! - All randomness drawn from one seeded stream owned by the simulation
//!
//! This separation enables:
//! - Headless batch runs
//! - Save/restore through byte snapshots
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`data`] - Faction rosters, planet tables and tech trees
//! - [`components`] - Planets, fleets, empires and identifiers
//! - [`galaxy`] - Galaxy generation
//! - [`economy`] - Income and population drift
//! - [`research`] - Research progress and ship unlocks
//! - [`movement`] - Fleet movement and arrivals
//! - [`combat`] - Fleet engagements and planet assaults
//! - [`ai`] - AI opponent policy
//! - [`simulation`] - Commands and the tick scheduler
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod data;
pub mod economy;
pub mod error;
pub mod events;
pub mod factions;
pub mod galaxy;
pub mod math;
pub mod movement;
pub mod research;
pub mod scoring;
pub mod simulation;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::SimConfig;
    pub use crate::data::{FactionData, FactionRegistry, ShipCategory, ShipData, TechTree};
    pub use crate::error::{GameError, Result};
    pub use crate::events::{CombatEvent, Notification, Severity};
    pub use crate::factions::FactionId;
    pub use crate::galaxy::Galaxy;
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::scoring::{Leaderboard, ScoreEntry};
    pub use crate::simulation::{Command, GamePhase, Simulation, TickEvents};
    pub use crate::world::WorldState;
}
