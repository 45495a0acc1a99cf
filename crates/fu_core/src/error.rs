//! Error types for the game simulation.
//!
//! Every variant except the data/snapshot ones is a recoverable command
//! rejection: the scheduler turns it into an error notification and leaves
//! the world untouched.

use thiserror::Error;

use crate::components::{FleetId, PlanetId};

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// Failed to parse faction or configuration data.
    #[error("Failed to parse {what}: {message}")]
    DataParseError {
        /// What was being parsed (e.g. "simulation config").
        what: String,
        /// Parser error message.
        message: String,
    },

    /// Configuration values that parse but cannot be simulated.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Snapshot encoding or decoding failed.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// No planet with this identifier exists.
    #[error("Planet not found: {0}")]
    PlanetNotFound(PlanetId),

    /// No fleet with this identifier exists (it may have been destroyed).
    #[error("Fleet not found: {0}")]
    FleetNotFound(FleetId),

    /// The ship id is not part of the faction roster.
    #[error("Ship not found: {0}")]
    UnknownShip(String),

    /// The research project id is not part of the faction tech tree.
    #[error("Research project not found: {0}")]
    UnknownProject(String),

    /// The acting side does not own the planet or fleet.
    #[error("You do not control {0}")]
    NotOwner(String),

    /// Shipbuilding needs a shipyard on the planet.
    #[error("Shipyard required to build ships!")]
    ShipyardRequired,

    /// The ship still needs to be unlocked through research.
    #[error("{0} has not been researched yet")]
    ShipLocked(String),

    /// Insufficient resources.
    #[error("Insufficient resources: need {required} {resource}, have {available}")]
    InsufficientResources {
        /// Resource type.
        resource: &'static str,
        /// Amount required.
        required: u64,
        /// Amount available.
        available: u64,
    },

    /// The research lab requirement is not met anywhere in the empire.
    #[error("Need Research Lab level {required} (best is {available})")]
    LabLevelTooLow {
        /// Lab level the project needs.
        required: u32,
        /// Highest lab level across owned planets.
        available: u32,
    },

    /// A prerequisite project has not been completed.
    #[error("Prerequisites not met for {0}")]
    PrerequisitesNotMet(String),

    /// The project is already in the completed set.
    #[error("Already researched: {0}")]
    AlreadyResearched(String),

    /// Another project occupies the single research track.
    #[error("Already researching {0}")]
    ResearchInProgress(String),

    /// Colonization target already has an owner.
    #[error("{0} is already claimed")]
    PlanetAlreadyOwned(String),

    /// The target of an attack or order is not valid for it.
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// The command is not valid in the current game phase.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
