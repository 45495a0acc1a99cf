//! World entity definitions: planets, fleets, owners and empires.
//!
//! These are plain data with small invariant-preserving helpers. All game
//! logic lives in the subsystem modules.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{Biome, SizeClass};
use crate::error::{GameError, Result};
use crate::factions::FactionId;
use crate::math::Vec2Fixed;
use crate::research::ResearchState;

/// Unique identifier for planets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlanetId(pub u32);

impl fmt::Display for PlanetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "planet-{}", self.0)
    }
}

/// Unique identifier for fleets. Never reused within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FleetId(pub u64);

impl fmt::Display for FleetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fleet-{}", self.0)
    }
}

/// Identifier of an AI opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AiId(pub u8);

impl fmt::Display for AiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ai_{}", self.0)
    }
}

/// Who controls a planet or fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Owner {
    /// Nobody. Only planets can be unclaimed.
    #[default]
    Unclaimed,
    /// The human player.
    Player,
    /// An AI opponent.
    Ai(AiId),
}

impl Owner {
    /// Whether this is the human player.
    #[must_use]
    pub const fn is_player(self) -> bool {
        matches!(self, Owner::Player)
    }

    /// Whether anybody owns the object.
    #[must_use]
    pub const fn is_claimed(self) -> bool {
        !matches!(self, Owner::Unclaimed)
    }

    /// The AI id, if an AI owns the object.
    #[must_use]
    pub const fn ai(self) -> Option<AiId> {
        match self {
            Owner::Ai(id) => Some(id),
            Owner::Unclaimed | Owner::Player => None,
        }
    }

    /// Whether `self` and `other` are different, claimed sides.
    #[must_use]
    pub fn is_hostile_to(self, other: Owner) -> bool {
        self.is_claimed() && other.is_claimed() && self != other
    }
}

/// Planetary structure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// Enables shipbuilding.
    Shipyard,
    /// Adds to planetary defense.
    DefenseGrid,
    /// Increases metal yield.
    MiningFacility,
    /// Speeds research and gates advanced projects.
    ResearchLab,
}

impl StructureKind {
    /// Every structure kind.
    pub const ALL: [StructureKind; 4] = [
        StructureKind::Shipyard,
        StructureKind::DefenseGrid,
        StructureKind::MiningFacility,
        StructureKind::ResearchLab,
    ];

    /// Credits and metal needed for one upgrade level.
    #[must_use]
    pub const fn upgrade_cost(self) -> Resources {
        let (credits, metal) = match self {
            StructureKind::Shipyard => (500, 300),
            StructureKind::DefenseGrid => (400, 200),
            StructureKind::MiningFacility => (300, 400),
            StructureKind::ResearchLab => (600, 200),
        };
        Resources {
            credits,
            metal,
            fuel: 0,
            food: 0,
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            StructureKind::Shipyard => "Shipyard",
            StructureKind::DefenseGrid => "Defense Grid",
            StructureKind::MiningFacility => "Mining Facility",
            StructureKind::ResearchLab => "Research Lab",
        }
    }
}

/// Structure levels on a planet. Each level is independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Structures {
    /// Shipyard level.
    pub shipyard: u32,
    /// Defense grid level.
    pub defense_grid: u32,
    /// Mining facility level.
    pub mining_facility: u32,
    /// Research lab level.
    pub research_lab: u32,
}

impl Structures {
    /// Level of one structure.
    #[must_use]
    pub const fn level(&self, kind: StructureKind) -> u32 {
        match kind {
            StructureKind::Shipyard => self.shipyard,
            StructureKind::DefenseGrid => self.defense_grid,
            StructureKind::MiningFacility => self.mining_facility,
            StructureKind::ResearchLab => self.research_lab,
        }
    }

    /// Raise a structure by one level.
    pub fn upgrade(&mut self, kind: StructureKind) {
        let level = match kind {
            StructureKind::Shipyard => &mut self.shipyard,
            StructureKind::DefenseGrid => &mut self.defense_grid,
            StructureKind::MiningFacility => &mut self.mining_facility,
            StructureKind::ResearchLab => &mut self.research_lab,
        };
        *level += 1;
    }
}

/// A planet in the galaxy. Planets are never destroyed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Identifier (index into the galaxy's planet list).
    pub id: PlanetId,
    /// Display name.
    pub name: String,
    /// Current controller.
    pub owner: Owner,
    /// Galaxy coordinates.
    pub position: Vec2Fixed,
    /// Size class.
    pub size: SizeClass,
    /// Biome.
    pub biome: Biome,
    /// Base credit income.
    pub base_income: u32,
    /// Intrinsic defense rating.
    pub defense: u32,
    population: u32,
    population_cap: u32,
    /// Structure levels.
    pub structures: Structures,
}

impl Planet {
    /// Create an unclaimed, empty planet.
    #[must_use]
    pub fn new(id: PlanetId, name: String, position: Vec2Fixed, size: SizeClass, biome: Biome) -> Self {
        Self {
            id,
            name,
            owner: Owner::Unclaimed,
            position,
            size,
            biome,
            base_income: size.base_income(),
            defense: 0,
            population: 0,
            population_cap: size.population_capacity(biome),
            structures: Structures::default(),
        }
    }

    /// Current population.
    #[must_use]
    pub const fn population(&self) -> u32 {
        self.population
    }

    /// Maximum population.
    #[must_use]
    pub const fn population_cap(&self) -> u32 {
        self.population_cap
    }

    /// Change the cap, shrinking population to fit if needed.
    pub fn set_population_cap(&mut self, cap: u32) {
        self.population_cap = cap;
        self.population = self.population.min(cap);
    }

    /// Set population, clamped to `[0, population_cap]`.
    pub fn set_population(&mut self, population: u32) {
        self.population = population.min(self.population_cap);
    }

    /// Room left below the cap.
    #[must_use]
    pub const fn capacity_remaining(&self) -> u32 {
        self.population_cap.saturating_sub(self.population)
    }
}

/// A group of ships travelling together.
///
/// A fleet is moving exactly when it has a destination, so the two can
/// never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    /// Identifier.
    pub id: FleetId,
    /// Controller. Never [`Owner::Unclaimed`].
    pub owner: Owner,
    /// Current position.
    pub position: Vec2Fixed,
    /// Ship design id to count. Zero counts are never stored.
    ships: BTreeMap<String, u32>,
    destination: Option<PlanetId>,
}

impl Fleet {
    /// Create an empty, stationary fleet.
    #[must_use]
    pub fn new(id: FleetId, owner: Owner, position: Vec2Fixed) -> Self {
        Self {
            id,
            owner,
            position,
            ships: BTreeMap::new(),
            destination: None,
        }
    }

    /// Builder-style ship insertion.
    #[must_use]
    pub fn with_ships(mut self, ship_id: &str, count: u32) -> Self {
        self.add_ships(ship_id, count);
        self
    }

    /// Ship counts by design id.
    #[must_use]
    pub const fn ships(&self) -> &BTreeMap<String, u32> {
        &self.ships
    }

    /// Count of one design.
    #[must_use]
    pub fn count(&self, ship_id: &str) -> u32 {
        self.ships.get(ship_id).copied().unwrap_or(0)
    }

    /// Total ships across all designs.
    #[must_use]
    pub fn total_ships(&self) -> u32 {
        self.ships.values().sum()
    }

    /// Whether the fleet has no ships left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    /// Add ships of one design.
    pub fn add_ships(&mut self, ship_id: &str, count: u32) {
        if count > 0 {
            *self.ships.entry(ship_id.to_string()).or_insert(0) += count;
        }
    }

    /// Remove up to `count` ships of one design, pruning empty entries.
    /// Returns how many were actually removed.
    pub fn remove_ships(&mut self, ship_id: &str, count: u32) -> u32 {
        let Some(current) = self.ships.get_mut(ship_id) else {
            return 0;
        };
        let removed = count.min(*current);
        *current -= removed;
        if *current == 0 {
            self.ships.remove(ship_id);
        }
        removed
    }

    /// Whether the fleet is travelling.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.destination.is_some()
    }

    /// Current destination, if moving.
    #[must_use]
    pub const fn destination(&self) -> Option<PlanetId> {
        self.destination
    }

    /// Order the fleet towards a planet.
    pub fn set_destination(&mut self, planet: PlanetId) {
        self.destination = Some(planet);
    }

    /// Stop at `position`, clearing the destination.
    pub fn arrive(&mut self, position: Vec2Fixed) {
        self.position = position;
        self.destination = None;
    }
}

/// A resource pool. Every amount is non-negative by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resources {
    /// Credits.
    pub credits: u64,
    /// Metal.
    pub metal: u64,
    /// Fuel.
    pub fuel: u64,
    /// Food.
    pub food: u64,
}

impl Resources {
    /// Cost in credits and metal only.
    #[must_use]
    pub const fn credits_metal(credits: u64, metal: u64) -> Self {
        Self {
            credits,
            metal,
            fuel: 0,
            food: 0,
        }
    }

    /// Check that `cost` is affordable, naming the first short resource.
    pub fn ensure_affordable(&self, cost: &Resources) -> Result<()> {
        let pairs = [
            ("credits", cost.credits, self.credits),
            ("metal", cost.metal, self.metal),
            ("fuel", cost.fuel, self.fuel),
            ("food", cost.food, self.food),
        ];
        for (resource, required, available) in pairs {
            if available < required {
                return Err(GameError::InsufficientResources {
                    resource,
                    required,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Whether `cost` is affordable.
    #[must_use]
    pub fn can_afford(&self, cost: &Resources) -> bool {
        self.ensure_affordable(cost).is_ok()
    }

    /// Deduct an affordable cost. Call [`Self::ensure_affordable`] first.
    pub fn spend(&mut self, cost: &Resources) {
        self.credits = self.credits.saturating_sub(cost.credits);
        self.metal = self.metal.saturating_sub(cost.metal);
        self.fuel = self.fuel.saturating_sub(cost.fuel);
        self.food = self.food.saturating_sub(cost.food);
    }
}

/// State shared by the player and every AI: faction, stockpile, research.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Empire {
    /// Faction played.
    pub faction: FactionId,
    /// Resource stockpile.
    pub resources: Resources,
    /// Starting homeworld.
    pub homeworld: PlanetId,
    /// Accumulated score awards.
    pub score: u64,
    /// Research progress.
    pub research: ResearchState,
}

impl Empire {
    /// A fresh empire with the given stockpile.
    #[must_use]
    pub fn new(faction: FactionId, homeworld: PlanetId, resources: Resources) -> Self {
        Self {
            faction,
            resources,
            homeworld,
            score: 0,
            research: ResearchState::default(),
        }
    }
}

/// AI difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// Easy.
    Easy,
    /// Normal.
    #[default]
    Normal,
    /// Hard.
    Hard,
}

/// AI personality tag. Policy weighting is currently uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Personality {
    /// Aggressive.
    Aggressive,
    /// Defensive.
    Defensive,
    /// Economic.
    Economic,
}

impl Personality {
    /// Personalities handed out in turn to AI opponents.
    pub const CYCLE: [Personality; 3] = [
        Personality::Aggressive,
        Personality::Defensive,
        Personality::Economic,
    ];
}

/// A computer-controlled opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiPlayer {
    /// Identifier.
    pub id: AiId,
    /// Display name (the faction name).
    pub name: String,
    /// Difficulty.
    pub difficulty: Difficulty,
    /// Personality.
    pub personality: Personality,
    /// Economy, research and score.
    pub empire: Empire,
}
