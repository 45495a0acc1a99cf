//! Research progress and ship unlock gating.
//!
//! Each empire runs at most one project at a time. Starting a project
//! checks every precondition before paying; progress then accrues every
//! tick and any overshoot past the required time is discarded.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::components::{Empire, Owner, Resources};
use crate::config::ResearchConfig;
use crate::data::{FactionData, TechTree};
use crate::error::{GameError, Result};
use crate::galaxy::Galaxy;

/// Per-empire research state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResearchState {
    completed: BTreeSet<String>,
    current: Option<String>,
    progress: f64,
}

impl ResearchState {
    /// Completed project ids.
    #[must_use]
    pub const fn completed(&self) -> &BTreeSet<String> {
        &self.completed
    }

    /// Project in progress, if any.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Progress on the current project.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Whether a project has been completed.
    #[must_use]
    pub fn is_completed(&self, project_id: &str) -> bool {
        self.completed.contains(project_id)
    }
}

/// Research lab levels across an owner's planets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabSummary {
    /// Highest single lab level; gates project eligibility.
    pub highest: u32,
    /// Sum of all lab levels; speeds progress.
    pub total: u32,
}

impl LabSummary {
    /// Summarize the labs on every planet `owner` controls.
    #[must_use]
    pub fn for_owner(galaxy: &Galaxy, owner: Owner) -> Self {
        galaxy.owned_by(owner).fold(Self::default(), |acc, planet| {
            let level = planet.structures.research_lab;
            Self {
                highest: acc.highest.max(level),
                total: acc.total + level,
            }
        })
    }
}

/// Start a research project, paying its cost.
///
/// Fails without touching the empire if the project is unknown, already
/// done, another project is running, a prerequisite is missing, labs are
/// too weak, or the stockpile is short.
pub fn start_research(
    empire: &mut Empire,
    tree: &TechTree,
    project_id: &str,
    labs: LabSummary,
) -> Result<()> {
    let project = tree
        .get(project_id)
        .ok_or_else(|| GameError::UnknownProject(project_id.to_string()))?;
    let state = &empire.research;

    if state.is_completed(&project.id) {
        return Err(GameError::AlreadyResearched(project.name.clone()));
    }
    if let Some(current) = state.current() {
        let name = tree.get(current).map_or(current, |p| p.name.as_str());
        return Err(GameError::ResearchInProgress(name.to_string()));
    }
    if !tree.prerequisites_met(&project.id, &state.completed) {
        return Err(GameError::PrerequisitesNotMet(project.name.clone()));
    }
    if labs.highest < project.required_lab {
        return Err(GameError::LabLevelTooLow {
            required: project.required_lab,
            available: labs.highest,
        });
    }
    let cost = Resources {
        credits: project.cost.credits,
        fuel: project.cost.fuel,
        ..Resources::default()
    };
    empire.resources.ensure_affordable(&cost)?;

    empire.resources.spend(&cost);
    empire.research.current = Some(project.id.clone());
    empire.research.progress = 0.0;
    Ok(())
}

/// Progress gained per tick.
#[must_use]
pub fn research_rate(labs: LabSummary, research_multiplier: f64, config: &ResearchConfig) -> f64 {
    (config.base_rate + f64::from(labs.total) * config.lab_bonus) * research_multiplier
}

/// Advance the current project by one tick.
///
/// Returns the id of the project completed this tick, if any.
pub fn advance_research(
    state: &mut ResearchState,
    tree: &TechTree,
    labs: LabSummary,
    research_multiplier: f64,
    config: &ResearchConfig,
) -> Option<String> {
    let current = state.current.as_deref()?;
    let Some(project) = tree.get(current) else {
        // Project vanished from the tree; drop it rather than stall forever.
        state.current = None;
        state.progress = 0.0;
        return None;
    };

    state.progress += research_rate(labs, research_multiplier, config);
    if state.progress < f64::from(project.research_time) {
        return None;
    }

    let done = project.id.clone();
    state.completed.insert(done.clone());
    state.current = None;
    state.progress = 0.0;
    Some(done)
}

/// Whether an empire may build a ship design.
///
/// Tier-0 designs are always available; others need their project done.
#[must_use]
pub fn is_ship_unlocked(
    faction: &FactionData,
    tree: &TechTree,
    state: &ResearchState,
    ship_id: &str,
) -> bool {
    match faction.get_ship(ship_id) {
        Some(ship) if ship.is_starter() => true,
        Some(ship) => tree
            .project_for_ship(&ship.id)
            .is_some_and(|p| state.is_completed(&p.id)),
        None => false,
    }
}
