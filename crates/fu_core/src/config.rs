//! Simulation tuning constants.
//!
//! Every section has a `Default` matching the shipped balance and is marked
//! `#[serde(default)]`, so a RON file only needs the values it overrides:
//!
//! ```ron
//! SimConfig(
//!     galaxy: (total_planets: 60),
//!     combat: (jitter: 0.2),
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::components::{Resources, Structures};
use crate::error::{GameError, Result};

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Scheduler cadence.
    pub tick: TickConfig,
    /// Galaxy generation.
    pub galaxy: GalaxyConfig,
    /// Economy formulas.
    pub economy: EconomyConfig,
    /// Research formulas.
    pub research: ResearchConfig,
    /// Fleet movement.
    pub movement: MovementConfig,
    /// Combat coefficients.
    pub combat: CombatConfig,
    /// AI policy probabilities.
    pub ai: AiConfig,
    /// Starting conditions.
    pub start: StartConfig,
    /// Score formula.
    pub scoring: ScoringConfig,
}

/// Largest galaxy side whose squared diagonal still fits the fixed-point range.
pub const MAX_GALAXY_EXTENT: u32 = 30_000;

impl SimConfig {
    /// Parse and validate a configuration from RON text.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(|e| GameError::DataParseError {
            what: "simulation config".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value can be simulated without overflow or a
    /// degenerate range.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] listing every problem found.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        let galaxy = &self.galaxy;
        for (name, side) in [("width", galaxy.width), ("height", galaxy.height)] {
            if side > MAX_GALAXY_EXTENT {
                errors.push(format!("galaxy {name} {side} exceeds {MAX_GALAXY_EXTENT}"));
            }
            if u64::from(side) <= 2 * u64::from(galaxy.margin) {
                errors.push(format!(
                    "galaxy {name} {side} leaves no room inside margin {}",
                    galaxy.margin
                ));
            }
        }
        if galaxy.min_separation > MAX_GALAXY_EXTENT {
            errors.push(format!(
                "min_separation {} exceeds {MAX_GALAXY_EXTENT}",
                galaxy.min_separation
            ));
        }
        if self.movement.fleet_speed > MAX_GALAXY_EXTENT
            || self.movement.proximity_radius > MAX_GALAXY_EXTENT
        {
            errors.push(format!("movement distances must not exceed {MAX_GALAXY_EXTENT}"));
        }

        let ai = &self.ai;
        for (name, chance) in [
            ("build_chance", ai.build_chance),
            ("move_chance", ai.move_chance),
            ("attack_chance", ai.attack_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                errors.push(format!("ai {name} {chance} is not a probability"));
            }
        }

        let combat = &self.combat;
        if !(combat.jitter >= 0.0 && combat.jitter.is_finite()) {
            errors.push(format!("combat jitter {} must be finite and non-negative", combat.jitter));
        }
        if !(combat.min_ratio > 0.0 && combat.min_ratio <= combat.max_ratio && combat.max_ratio.is_finite()) {
            errors.push(format!(
                "combat ratio bounds {}..{} must be positive and ordered",
                combat.min_ratio, combat.max_ratio
            ));
        }
        let fleet = &combat.fleet;
        let planet = &combat.planet;
        for (name, min, max) in [
            ("fleet loss", fleet.min_loss, fleet.max_loss),
            ("planet attacker loss", planet.min_loss, planet.attacker_max_loss),
            ("planet defender loss", planet.min_loss, planet.defender_max_loss),
        ] {
            if !(0.0..=1.0).contains(&min) || !(min..=1.0).contains(&max) {
                errors.push(format!("{name} bounds {min}..{max} must be ordered within 0..1"));
            }
        }
        for (name, value) in [
            ("fleet defender_loss", fleet.defender_loss),
            ("fleet attacker_loss", fleet.attacker_loss),
            ("fleet decisive_threshold", fleet.decisive_threshold),
            ("planet attacker_loss", planet.attacker_loss),
            ("planet defender_fleet_loss", planet.defender_fleet_loss),
            ("planet win_threshold", planet.win_threshold),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                errors.push(format!("{name} {value} must be finite and non-negative"));
            }
        }
        if !(0.0..=1.0).contains(&planet.capture_population_factor) {
            errors.push(format!(
                "capture_population_factor {} must be within 0..1",
                planet.capture_population_factor
            ));
        }

        let research = &self.research;
        for (name, value) in [
            ("economy credits_per_population", self.economy.credits_per_population),
            ("research base_rate", research.base_rate),
            ("research lab_bonus", research.lab_bonus),
            ("research credit_cost_factor", research.credit_cost_factor),
            ("research fuel_cost_factor", research.fuel_cost_factor),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                errors.push(format!("{name} {value} must be finite and non-negative"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(GameError::InvalidConfig(errors.join("; ")))
        }
    }
}

/// Scheduler cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Wall-clock milliseconds between ticks (used by drivers only).
    pub interval_ms: u64,
    /// Economy, population drift and elimination sweep run every N ticks.
    pub economy_interval: u64,
    /// AI policy runs every N ticks.
    pub ai_interval: u64,
    /// Ticks that must pass before losing every planet ends the game.
    pub game_over_grace: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            economy_interval: 5,
            ai_interval: 10,
            game_over_grace: 10,
        }
    }
}

/// Galaxy generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyConfig {
    /// Galaxy width.
    pub width: u32,
    /// Galaxy height.
    pub height: u32,
    /// Total planets including homeworlds.
    pub total_planets: u32,
    /// Neutral planets keep this far from the edges.
    pub margin: u32,
    /// Preferred minimum distance between planets.
    pub min_separation: u32,
    /// Placement attempts before a candidate is accepted regardless.
    pub placement_attempts: u32,
    /// Homeworld template.
    pub homeworld: HomeworldConfig,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            width: 4000,
            height: 3000,
            total_planets: 150,
            margin: 100,
            min_separation: 120,
            placement_attempts: 100,
            homeworld: HomeworldConfig::default(),
        }
    }
}

/// Stats every homeworld starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeworldConfig {
    /// Base credit income.
    pub base_income: u32,
    /// Defense rating.
    pub defense: u32,
    /// Starting population.
    pub population: u32,
    /// Population cap.
    pub population_cap: u32,
    /// Starting structures.
    pub structures: Structures,
}

impl Default for HomeworldConfig {
    fn default() -> Self {
        Self {
            base_income: 50,
            defense: 100,
            population: 1000,
            population_cap: 5000,
            structures: Structures {
                shipyard: 2,
                defense_grid: 2,
                mining_facility: 2,
                research_lab: 1,
            },
        }
    }
}

/// Economy formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Credits per inhabitant per economy tick.
    pub credits_per_population: f64,
    /// Metal per mining facility level.
    pub mining_per_level: u32,
    /// Metal with no mining facility.
    pub mining_base: u32,
    /// Flat fuel base before the biome modifier.
    pub fuel_base: u32,
    /// Flat food base before the biome modifier.
    pub food_base: u32,
    /// Inhabitants fed by one unit of food.
    pub population_per_food: u32,
    /// Population gained per drift step when food is in surplus.
    pub growth_step: u32,
    /// Net food below this shrinks population.
    pub starvation_threshold: i64,
    /// Population lost per drift step when starving.
    pub starvation_step: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            credits_per_population: 0.5,
            mining_per_level: 15,
            mining_base: 5,
            fuel_base: 10,
            food_base: 10,
            population_per_food: 10,
            growth_step: 2,
            starvation_threshold: -10,
            starvation_step: 1,
        }
    }
}

/// Research formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Progress per tick before lab bonuses.
    pub base_rate: f64,
    /// Extra progress per tick for each lab level across the empire.
    pub lab_bonus: f64,
    /// Research time of the first project.
    pub time_base: u32,
    /// Extra research time per project index.
    pub time_step: u32,
    /// Projects per required lab level.
    pub projects_per_lab_level: u32,
    /// Cap on the required lab level.
    pub max_required_lab: u32,
    /// Fraction of the ship's credit cost charged in credits.
    pub credit_cost_factor: f64,
    /// Fraction of the ship's metal cost charged in fuel.
    pub fuel_cost_factor: f64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            base_rate: 1.0,
            lab_bonus: 0.2,
            time_base: 20,
            time_step: 15,
            projects_per_lab_level: 3,
            max_required_lab: 3,
            credit_cost_factor: 0.5,
            fuel_cost_factor: 0.3,
        }
    }
}

/// Fleet movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Distance covered per tick.
    pub fleet_speed: u32,
    /// A fleet within this box of a planet counts as being at it.
    pub proximity_radius: u32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            fleet_speed: 40,
            proximity_radius: 50,
        }
    }
}

/// Combat coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Maximum random bonus as a fraction of base power.
    pub jitter: f64,
    /// Lower clamp of the power ratio.
    pub min_ratio: f64,
    /// Upper clamp of the power ratio.
    pub max_ratio: f64,
    /// Fleet against fleet.
    pub fleet: FleetEngagementConfig,
    /// Fleet against planet.
    pub planet: PlanetAssaultConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            jitter: 0.3,
            min_ratio: 0.1,
            max_ratio: 10.0,
            fleet: FleetEngagementConfig::default(),
            planet: PlanetAssaultConfig::default(),
        }
    }
}

/// Fleet engagement loss coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetEngagementConfig {
    /// Defender loss ratio per unit of power ratio.
    pub defender_loss: f64,
    /// Attacker loss ratio per unit of inverse power ratio.
    pub attacker_loss: f64,
    /// Minimum loss ratio.
    pub min_loss: f64,
    /// Maximum loss ratio.
    pub max_loss: f64,
    /// A side wins outright only when its power exceeds the other's by
    /// this factor; anything closer is a draw.
    pub decisive_threshold: f64,
}

impl Default for FleetEngagementConfig {
    fn default() -> Self {
        Self {
            defender_loss: 0.4,
            attacker_loss: 0.3,
            min_loss: 0.05,
            max_loss: 0.9,
            decisive_threshold: 1.2,
        }
    }
}

/// Planet assault coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetAssaultConfig {
    /// Attacker loss ratio per unit of inverse power ratio.
    pub attacker_loss: f64,
    /// Maximum attacker loss ratio.
    pub attacker_max_loss: f64,
    /// Minimum loss ratio for either side.
    pub min_loss: f64,
    /// Defending fleet loss ratio per unit of power ratio.
    pub defender_fleet_loss: f64,
    /// Maximum defending fleet loss ratio.
    pub defender_max_loss: f64,
    /// The attacker captures the planet when its power exceeds the
    /// defense by this factor.
    pub win_threshold: f64,
    /// Defense added per defense grid level.
    pub defense_grid_bonus: u32,
    /// Fraction of population that survives a capture.
    pub capture_population_factor: f64,
}

impl Default for PlanetAssaultConfig {
    fn default() -> Self {
        Self {
            attacker_loss: 0.35,
            attacker_max_loss: 0.8,
            min_loss: 0.05,
            defender_fleet_loss: 0.5,
            defender_max_loss: 0.9,
            win_threshold: 1.1,
            defense_grid_bonus: 25,
            capture_population_factor: 0.5,
        }
    }
}

/// AI policy probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Chance to build a drone on an AI turn.
    pub build_chance: f64,
    /// Chance to dispatch a fleet on an AI turn.
    pub move_chance: f64,
    /// Chance a dispatched fleet attacks rather than expands.
    pub attack_chance: f64,
    /// Ships a fleet needs before it is dispatched.
    pub min_fleet_to_move: u32,
    /// Ships a fleet needs before it may attack.
    pub min_fleet_to_attack: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            build_chance: 0.45,
            move_chance: 0.15,
            attack_chance: 0.6,
            min_fleet_to_move: 3,
            min_fleet_to_attack: 5,
        }
    }
}

/// Starting conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartConfig {
    /// Stockpile every empire starts with.
    pub resources: Resources,
    /// Drones in each homeworld garrison.
    pub garrison_drones: u32,
    /// Frigates in each homeworld garrison.
    pub garrison_frigates: u32,
}

impl Default for StartConfig {
    fn default() -> Self {
        Self {
            resources: Resources {
                credits: 2000,
                metal: 1000,
                fuel: 500,
                food: 500,
            },
            garrison_drones: 5,
            garrison_frigates: 2,
        }
    }
}

/// Score formula and awards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Credits per point.
    pub credit_divisor: u64,
    /// Metal per point.
    pub metal_divisor: u64,
    /// Points per owned planet.
    pub per_planet: u64,
    /// Award for capturing a planet.
    pub capture_award: u64,
    /// Award for colonizing a planet.
    pub colonize_award: u64,
    /// Award for eliminating a faction.
    pub elimination_award: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            credit_divisor: 10,
            metal_divisor: 5,
            per_planet: 500,
            capture_award: 250,
            colonize_award: 100,
            elimination_award: 1000,
        }
    }
}
