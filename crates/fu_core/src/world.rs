//! Live game world: galaxy, fleets and every empire.
//!
//! All state-changing operations that both the player and the AI can
//! trigger live here and are validated before anything is touched, so a
//! rejected order leaves the world exactly as it was.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{self, Victor};
use crate::components::{
    AiId, AiPlayer, Difficulty, Empire, Fleet, FleetId, Owner, Personality, PlanetId, Resources,
    StructureKind,
};
use crate::config::{EconomyConfig, ResearchConfig, SimConfig};
use crate::data::{FactionRegistry, ShipCategory, TechTree};
use crate::economy::{self, EconomyReport};
use crate::error::{GameError, Result};
use crate::events::{CombatEvent, DRAW_LABEL};
use crate::factions::FactionId;
use crate::galaxy::Galaxy;
use crate::math::{Fixed, Vec2Fixed};
use crate::research::{self, LabSummary};

/// Population a freshly colonized planet starts with, capped by capacity.
pub const COLONY_POPULATION: u32 = 100;

/// Location label for engagements away from any planet.
pub const DEEP_SPACE: &str = "Deep Space";

/// A ship that was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Construction {
    /// Fleet the ship joined.
    pub fleet: FleetId,
    /// Design name.
    pub ship_name: String,
    /// Where it was built.
    pub planet_name: String,
}

/// Outcome of a planet assault, ready for the feeds.
#[derive(Debug, Clone, PartialEq)]
pub struct AssaultReport {
    /// Combat log entry.
    pub event: CombatEvent,
    /// Whether the planet changed hands.
    pub captured: bool,
    /// Owner of the planet before the assault.
    pub defender: Owner,
    /// AI knocked out of the game by losing its last planet.
    pub eliminated: Option<AiPlayer>,
}

/// Outcome of a fleet engagement, ready for the feeds.
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementReport {
    /// Combat log entry.
    pub event: CombatEvent,
    /// Who won.
    pub victor: Victor,
}

/// Everything that exists once a game has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// The map.
    pub galaxy: Galaxy,
    /// Every fleet, ordered by id.
    pub fleets: BTreeMap<FleetId, Fleet>,
    /// The human player's empire.
    pub player: Empire,
    /// Surviving AI opponents.
    pub ais: BTreeMap<AiId, AiPlayer>,
    /// Research graph per faction.
    pub tech_trees: BTreeMap<FactionId, TechTree>,
    next_fleet_id: u64,
}

impl WorldState {
    /// Build the opening position for a player faction.
    ///
    /// Generates the galaxy, one AI per remaining faction, the starting
    /// stockpiles, and a garrison fleet at every homeworld.
    pub fn new_game<R: Rng + ?Sized>(
        player_faction: FactionId,
        registry: &FactionRegistry,
        config: &SimConfig,
        rng: &mut R,
    ) -> Self {
        let galaxy = Galaxy::generate(player_faction, &config.galaxy, rng);
        let start = config.start.resources;

        let tech_trees = FactionId::ALL
            .into_iter()
            .map(|faction| (faction, TechTree::for_faction(registry.get(faction), &config.research)))
            .collect();

        let ais = FactionId::opponents_of(player_faction)
            .enumerate()
            .map(|(i, faction)| {
                let id = AiId(i as u8);
                let player = AiPlayer {
                    id,
                    name: faction.display_name().to_string(),
                    difficulty: Difficulty::default(),
                    personality: Personality::CYCLE[i % Personality::CYCLE.len()],
                    empire: Empire::new(faction, PlanetId(i as u32 + 1), start),
                };
                (id, player)
            })
            .collect();

        let mut world = Self {
            galaxy,
            fleets: BTreeMap::new(),
            player: Empire::new(player_faction, PlanetId(0), start),
            ais,
            tech_trees,
            next_fleet_id: 1,
        };

        for owner in world.owners() {
            world.garrison(owner, registry, config);
        }
        world
    }

    fn garrison(&mut self, owner: Owner, registry: &FactionRegistry, config: &SimConfig) {
        let Some(empire) = self.empire(owner) else {
            return;
        };
        let faction = registry.get(empire.faction);
        let Some(home) = self.galaxy.get(empire.homeworld) else {
            return;
        };
        let position = home.position;

        let drone = faction.ships_in(ShipCategory::Drone).first().map(|s| s.id.clone());
        let frigate = faction.ships_in(ShipCategory::Frigate).first().map(|s| s.id.clone());

        let id = self.spawn_fleet(owner, position);
        if let Some(fleet) = self.fleets.get_mut(&id) {
            if let Some(drone) = drone {
                fleet.add_ships(&drone, config.start.garrison_drones);
            }
            if let Some(frigate) = frigate {
                fleet.add_ships(&frigate, config.start.garrison_frigates);
            }
        }
        self.prune_empty_fleets();
    }

    /// The player followed by every surviving AI.
    #[must_use]
    pub fn owners(&self) -> Vec<Owner> {
        std::iter::once(Owner::Player)
            .chain(self.ais.keys().map(|id| Owner::Ai(*id)))
            .collect()
    }

    /// The empire behind an owner.
    #[must_use]
    pub fn empire(&self, owner: Owner) -> Option<&Empire> {
        match owner {
            Owner::Player => Some(&self.player),
            Owner::Ai(id) => self.ais.get(&id).map(|ai| &ai.empire),
            Owner::Unclaimed => None,
        }
    }

    /// Mutable access to the empire behind an owner.
    pub fn empire_mut(&mut self, owner: Owner) -> Option<&mut Empire> {
        empire_in(&mut self.player, &mut self.ais, owner)
    }

    /// Faction played by an owner.
    #[must_use]
    pub fn faction_of(&self, owner: Owner) -> Option<FactionId> {
        self.empire(owner).map(|e| e.faction)
    }

    /// Name shown for an owner in the combat log.
    #[must_use]
    pub fn owner_label(&self, owner: Owner) -> String {
        match owner {
            Owner::Player => "Player".to_string(),
            Owner::Ai(id) => self
                .ais
                .get(&id)
                .map_or_else(|| id.to_string(), |ai| ai.name.clone()),
            Owner::Unclaimed => "Neutral".to_string(),
        }
    }

    /// Planets held by an owner.
    #[must_use]
    pub fn planets_owned(&self, owner: Owner) -> usize {
        self.galaxy.count_owned(owner)
    }

    /// Create an empty fleet and return its id.
    ///
    /// Callers must give it ships before the next prune.
    pub fn spawn_fleet(&mut self, owner: Owner, position: Vec2Fixed) -> FleetId {
        let id = FleetId(self.next_fleet_id);
        self.next_fleet_id += 1;
        self.fleets.insert(id, Fleet::new(id, owner, position));
        id
    }

    /// First stationary fleet of `owner` within the proximity box.
    #[must_use]
    pub fn idle_fleet_near(&self, owner: Owner, position: Vec2Fixed, radius: Fixed) -> Option<FleetId> {
        self.fleets
            .values()
            .find(|f| f.owner == owner && !f.is_moving() && f.position.within_box(position, radius))
            .map(|f| f.id)
    }

    fn first_idle_fleet(&self, owner: Owner) -> Option<FleetId> {
        self.fleets
            .values()
            .find(|f| f.owner == owner && !f.is_moving())
            .map(|f| f.id)
    }

    /// Drop fleets with no ships left.
    pub fn prune_empty_fleets(&mut self) {
        self.fleets.retain(|_, fleet| !fleet.is_empty());
    }

    fn award(&mut self, owner: Owner, points: u64) {
        if let Some(empire) = self.empire_mut(owner) {
            empire.score += points;
        }
    }

    /// Remove an AI and its fleets from play.
    pub fn eliminate(&mut self, ai: AiId) -> Option<AiPlayer> {
        let removed = self.ais.remove(&ai)?;
        let owner = Owner::Ai(ai);
        self.fleets.retain(|_, fleet| fleet.owner != owner);
        tracing::info!(ai = %ai, name = %removed.name, "AI eliminated");
        Some(removed)
    }

    /// Eliminate every AI that no longer holds a planet.
    pub fn sweep_eliminations(&mut self) -> Vec<AiPlayer> {
        let landless: Vec<AiId> = self
            .ais
            .keys()
            .copied()
            .filter(|id| self.galaxy.count_owned(Owner::Ai(*id)) == 0)
            .collect();
        landless.into_iter().filter_map(|id| self.eliminate(id)).collect()
    }

    /// Build one ship at a planet for `owner`.
    ///
    /// The ship joins an idle fleet of the owner near the planet. With
    /// `merge_anywhere` it may instead join the owner's first idle fleet;
    /// failing both a new fleet is formed at the planet.
    pub fn build_ship(
        &mut self,
        owner: Owner,
        planet_id: PlanetId,
        ship_id: &str,
        registry: &FactionRegistry,
        config: &SimConfig,
        merge_anywhere: bool,
    ) -> Result<Construction> {
        let planet = self
            .galaxy
            .get(planet_id)
            .ok_or(GameError::PlanetNotFound(planet_id))?;
        if planet.owner != owner {
            return Err(GameError::NotOwner(planet.name.clone()));
        }
        if planet.structures.shipyard == 0 {
            return Err(GameError::ShipyardRequired);
        }
        let empire = self
            .empire(owner)
            .ok_or_else(|| GameError::InvalidState(format!("{owner:?} has no empire")))?;
        let faction = registry.get(empire.faction);
        let ship = faction
            .get_ship(ship_id)
            .ok_or_else(|| GameError::UnknownShip(ship_id.to_string()))?;
        let unlocked = self
            .tech_trees
            .get(&empire.faction)
            .is_some_and(|tree| research::is_ship_unlocked(faction, tree, &empire.research, ship_id));
        if !unlocked {
            return Err(GameError::ShipLocked(ship.name.clone()));
        }
        let cost = Resources::credits_metal(ship.cost.credits, ship.cost.metal);
        empire.resources.ensure_affordable(&cost)?;

        let position = planet.position;
        let construction_site = planet.name.clone();
        let ship_name = ship.name.clone();
        let design = ship.id.clone();

        if let Some(empire) = self.empire_mut(owner) {
            empire.resources.spend(&cost);
        }
        let radius = Fixed::from_num(config.movement.proximity_radius);
        let nearby = self.idle_fleet_near(owner, position, radius);
        let target = match nearby {
            Some(id) => id,
            None => match self.first_idle_fleet(owner).filter(|_| merge_anywhere) {
                Some(id) => id,
                None => self.spawn_fleet(owner, position),
            },
        };
        if let Some(fleet) = self.fleets.get_mut(&target) {
            fleet.add_ships(&design, 1);
        }

        Ok(Construction {
            fleet: target,
            ship_name,
            planet_name: construction_site,
        })
    }

    /// Raise a structure by one level, paying its cost.
    ///
    /// Returns the planet name.
    pub fn upgrade_structure(
        &mut self,
        owner: Owner,
        planet_id: PlanetId,
        kind: StructureKind,
    ) -> Result<String> {
        let planet = self
            .galaxy
            .get(planet_id)
            .ok_or(GameError::PlanetNotFound(planet_id))?;
        if planet.owner != owner {
            return Err(GameError::NotOwner(planet.name.clone()));
        }
        let name = planet.name.clone();
        let cost = kind.upgrade_cost();
        let empire = empire_in(&mut self.player, &mut self.ais, owner)
            .ok_or_else(|| GameError::InvalidState(format!("{owner:?} has no empire")))?;
        empire.resources.ensure_affordable(&cost)?;
        empire.resources.spend(&cost);

        if let Some(planet) = self.galaxy.get_mut(planet_id) {
            planet.structures.upgrade(kind);
        }
        Ok(name)
    }

    /// Claim an unowned planet with a fleet of `owner`.
    ///
    /// Returns the planet name.
    pub fn colonize(
        &mut self,
        owner: Owner,
        planet_id: PlanetId,
        fleet_id: FleetId,
        config: &SimConfig,
    ) -> Result<String> {
        let fleet = self
            .fleets
            .get(&fleet_id)
            .ok_or(GameError::FleetNotFound(fleet_id))?;
        if fleet.owner != owner {
            return Err(GameError::NotOwner(fleet_id.to_string()));
        }
        let planet = self
            .galaxy
            .get_mut(planet_id)
            .ok_or(GameError::PlanetNotFound(planet_id))?;
        if planet.owner.is_claimed() {
            return Err(GameError::PlanetAlreadyOwned(planet.name.clone()));
        }

        planet.owner = owner;
        planet.set_population(COLONY_POPULATION);
        let name = planet.name.clone();
        self.award(owner, config.scoring.colonize_award);
        Ok(name)
    }

    /// Order a fleet of `owner` towards a planet.
    ///
    /// Returns the destination name.
    pub fn send_fleet(&mut self, owner: Owner, fleet_id: FleetId, destination: PlanetId) -> Result<String> {
        let name = self
            .galaxy
            .get(destination)
            .map(|p| p.name.clone())
            .ok_or(GameError::PlanetNotFound(destination))?;
        let fleet = self
            .fleets
            .get_mut(&fleet_id)
            .ok_or(GameError::FleetNotFound(fleet_id))?;
        if fleet.owner != owner {
            return Err(GameError::NotOwner(fleet_id.to_string()));
        }
        fleet.set_destination(destination);
        Ok(name)
    }

    /// Start a research project for `owner`.
    ///
    /// Returns the project name.
    pub fn start_research(&mut self, owner: Owner, project_id: &str) -> Result<String> {
        let labs = LabSummary::for_owner(&self.galaxy, owner);
        let empire = empire_in(&mut self.player, &mut self.ais, owner)
            .ok_or_else(|| GameError::InvalidState(format!("{owner:?} has no empire")))?;
        let tree = self
            .tech_trees
            .get(&empire.faction)
            .ok_or_else(|| GameError::UnknownProject(project_id.to_string()))?;
        research::start_research(empire, tree, project_id, labs)?;
        Ok(tree.get(project_id).map_or_else(|| project_id.to_string(), |p| p.name.clone()))
    }

    /// Advance every empire's current project by one tick.
    ///
    /// Returns `(owner, project name)` for each project finished.
    pub fn advance_research(
        &mut self,
        registry: &FactionRegistry,
        config: &ResearchConfig,
    ) -> Vec<(Owner, String)> {
        let mut finished = Vec::new();
        for owner in self.owners() {
            let labs = LabSummary::for_owner(&self.galaxy, owner);
            let Some(empire) = empire_in(&mut self.player, &mut self.ais, owner) else {
                continue;
            };
            let Some(tree) = self.tech_trees.get(&empire.faction) else {
                continue;
            };
            let multiplier = registry.get(empire.faction).bonuses.research;
            if let Some(done) =
                research::advance_research(&mut empire.research, tree, labs, multiplier, config)
            {
                let name = tree.get(&done).map_or(done.clone(), |p| p.name.clone());
                tracing::info!(?owner, project = %done, "Research complete");
                finished.push((owner, name));
            }
        }
        finished
    }

    /// Collect income and drift population for every empire.
    pub fn run_economy(
        &mut self,
        registry: &FactionRegistry,
        config: &EconomyConfig,
    ) -> Vec<(Owner, EconomyReport)> {
        let mut reports = Vec::new();
        for owner in self.owners() {
            let Some(faction) = self.faction_of(owner) else {
                continue;
            };
            let multiplier = registry.get(faction).bonuses.economy;
            let report = economy::assess(&self.galaxy, owner, multiplier, config);
            if let Some(empire) = self.empire_mut(owner) {
                economy::collect(&mut empire.resources, &report);
            }
            economy::drift_population(&mut self.galaxy, owner, report.net_food, config);
            reports.push((owner, report));
        }
        reports
    }

    /// Resolve a fleet assaulting a planet.
    ///
    /// The planet owner's nearest idle fleet joins the defense. Destroyed
    /// fleets are removed. Returns `None` if the fleet or planet is gone.
    pub fn assault_planet<R: Rng + ?Sized>(
        &mut self,
        attacker_id: FleetId,
        planet_id: PlanetId,
        registry: &FactionRegistry,
        config: &SimConfig,
        rng: &mut R,
        tick: u64,
    ) -> Option<AssaultReport> {
        let planet = self.galaxy.get(planet_id)?;
        let defender_owner = planet.owner;
        let attacker_owner = self.fleets.get(&attacker_id)?.owner;
        let attacker_faction = registry.get(self.faction_of(attacker_owner)?);
        let defender_faction = self.faction_of(defender_owner).map(|f| registry.get(f));
        let radius = Fixed::from_num(config.movement.proximity_radius);
        let defender_id = if defender_owner.is_claimed() {
            self.idle_fleet_near(defender_owner, planet.position, radius)
        } else {
            None
        };
        let attacker_label = self.owner_label(attacker_owner);
        let defender_label = self.owner_label(defender_owner);

        let mut attacker = self.fleets.remove(&attacker_id)?;
        let mut garrison = defender_id.and_then(|id| self.fleets.remove(&id));
        let defending = match (garrison.as_mut(), defender_faction) {
            (Some(fleet), Some(faction)) => Some((fleet, faction)),
            _ => None,
        };
        let result = combat::resolve_planet_assault(
            &mut attacker,
            attacker_faction,
            planet,
            defending,
            &config.combat,
            rng,
        );
        let location = planet.name.clone();

        for fleet in std::iter::once(attacker).chain(garrison) {
            if !fleet.is_empty() {
                self.fleets.insert(fleet.id, fleet);
            }
        }

        let mut eliminated = None;
        if result.captured {
            if let Some(planet) = self.galaxy.get_mut(planet_id) {
                combat::capture(planet, attacker_owner, &config.combat);
                tracing::info!(planet = %planet.name, new_owner = ?attacker_owner, "Planet captured");
            }
            self.award(attacker_owner, config.scoring.capture_award);
            if let Some(ai) = defender_owner.ai() {
                if self.galaxy.count_owned(defender_owner) == 0 {
                    eliminated = self.eliminate(ai);
                    if eliminated.is_some() {
                        self.award(attacker_owner, config.scoring.elimination_award);
                    }
                }
            }
        }
        tracing::debug!(
            planet = %location,
            ratio = result.ratio,
            captured = result.captured,
            "Planet assault resolved"
        );

        let winner = if result.captured {
            attacker_label.clone()
        } else {
            defender_label.clone()
        };
        Some(AssaultReport {
            event: CombatEvent {
                tick,
                location,
                attacker: attacker_label,
                defender: defender_label,
                attacker_losses: result.attacker_losses,
                defender_losses: result.defender_losses,
                winner,
            },
            captured: result.captured,
            defender: defender_owner,
            eliminated,
        })
    }

    /// Resolve one fleet attacking another.
    ///
    /// Returns `None` if either fleet is gone or both share an owner.
    pub fn engage_fleets<R: Rng + ?Sized>(
        &mut self,
        attacker_id: FleetId,
        defender_id: FleetId,
        registry: &FactionRegistry,
        config: &SimConfig,
        rng: &mut R,
        tick: u64,
    ) -> Option<EngagementReport> {
        let attacker_owner = self.fleets.get(&attacker_id)?.owner;
        let defender = self.fleets.get(&defender_id)?;
        if defender.owner == attacker_owner {
            return None;
        }
        let defender_owner = defender.owner;
        let radius = Fixed::from_num(config.movement.proximity_radius);
        let location = self
            .galaxy
            .planet_near(defender.position, radius)
            .map_or_else(|| DEEP_SPACE.to_string(), |p| p.name.clone());
        let attacker_faction = registry.get(self.faction_of(attacker_owner)?);
        let defender_faction = registry.get(self.faction_of(defender_owner)?);
        let attacker_label = self.owner_label(attacker_owner);
        let defender_label = self.owner_label(defender_owner);

        let mut attacker = self.fleets.remove(&attacker_id)?;
        let Some(mut defender) = self.fleets.remove(&defender_id) else {
            self.fleets.insert(attacker_id, attacker);
            return None;
        };
        let result = combat::resolve_fleet_engagement(
            &mut attacker,
            attacker_faction,
            &mut defender,
            defender_faction,
            &config.combat,
            rng,
        );
        for fleet in [attacker, defender] {
            if !fleet.is_empty() {
                self.fleets.insert(fleet.id, fleet);
            }
        }
        tracing::debug!(
            location = %location,
            ratio = result.ratio,
            victor = ?result.victor,
            "Fleet engagement resolved"
        );

        let winner = match result.victor {
            Victor::Attacker => attacker_label.clone(),
            Victor::Defender => defender_label.clone(),
            Victor::Draw => DRAW_LABEL.to_string(),
        };
        Some(EngagementReport {
            event: CombatEvent {
                tick,
                location,
                attacker: attacker_label,
                defender: defender_label,
                attacker_losses: result.attacker_losses,
                defender_losses: result.defender_losses,
                winner,
            },
            victor: result.victor,
        })
    }
}

/// Split borrow of one empire so the tech trees stay readable alongside it.
fn empire_in<'a>(
    player: &'a mut Empire,
    ais: &'a mut BTreeMap<AiId, AiPlayer>,
    owner: Owner,
) -> Option<&'a mut Empire> {
    match owner {
        Owner::Player => Some(player),
        Owner::Ai(id) => ais.get_mut(&id).map(|ai| &mut ai.empire),
        Owner::Unclaimed => None,
    }
}
