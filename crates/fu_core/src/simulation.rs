//! Game phases, player commands and the fixed-order tick scheduler.
//!
//! The [`Simulation`] owns the seeded random stream, so a run is fully
//! reproducible from its seed and the sequence of commands fed to it.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ai::{self, AiOrder};
use crate::combat::Victor;
use crate::components::{AiId, Empire, FleetId, Owner, PlanetId, Resources, StructureKind};
use crate::config::SimConfig;
use crate::data::FactionRegistry;
use crate::error::{GameError, Result};
use crate::events::{CombatEvent, CombatLog, Notification, NotificationFeed, Severity};
use crate::factions::FactionId;
use crate::math::Fixed;
use crate::movement::{self, Arrival, ArrivalAction};
use crate::scoring::{self, Leaderboard, ScoreEntry};
use crate::world::WorldState;

/// Top-level game phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a faction to be picked.
    #[default]
    Menu,
    /// Ticks advance.
    Playing,
    /// Commands are accepted but ticks do nothing.
    Paused,
    /// The player lost every planet.
    GameOver,
}

/// A player intent, validated and applied between ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Start a new game as a faction.
    StartGame {
        /// Faction to play.
        faction: FactionId,
    },
    /// Switch between playing and paused.
    TogglePause,
    /// Order a fleet to a planet.
    SendFleet {
        /// Fleet to move.
        fleet: FleetId,
        /// Target planet.
        destination: PlanetId,
    },
    /// Build one ship at a planet with a shipyard.
    BuildShip {
        /// Shipyard planet.
        planet: PlanetId,
        /// Design id.
        ship_id: String,
    },
    /// Raise a planet structure by one level.
    UpgradeStructure {
        /// Planet to improve.
        planet: PlanetId,
        /// Structure to raise.
        kind: StructureKind,
    },
    /// Claim an unowned planet.
    Colonize {
        /// Target planet.
        planet: PlanetId,
        /// Fleet making the claim.
        fleet: FleetId,
    },
    /// Assault an AI-held planet.
    AttackPlanet {
        /// Attacking fleet.
        fleet: FleetId,
        /// Target planet.
        planet: PlanetId,
    },
    /// Attack an AI fleet.
    AttackFleet {
        /// Attacking fleet.
        attacker: FleetId,
        /// Target fleet.
        defender: FleetId,
    },
    /// Begin a research project.
    StartResearch {
        /// Project id.
        project: String,
    },
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    /// Tick number after advancing.
    pub tick: u64,
    /// Whether the economy pass ran.
    pub economy: bool,
    /// Fleets that reached their destination.
    pub arrivals: Vec<Arrival>,
    /// Battles fought.
    pub combat: Vec<CombatEvent>,
    /// Research projects finished, by owner and project name.
    pub research_completed: Vec<(Owner, String)>,
    /// AI orders that were applied.
    pub ai_orders: Vec<AiOrder>,
    /// AIs knocked out this tick.
    pub eliminated: Vec<AiId>,
    /// Final score, set on the tick the game ends.
    pub final_score: Option<u64>,
}

/// The whole game: phase machine, world, feeds, and the random stream.
///
/// # System Execution Order
///
/// Each tick while [`GamePhase::Playing`]:
/// 1. **Economy** - every `economy_interval` ticks: income, population
///    drift, elimination sweep
/// 2. **Movement** - fleets step and arrivals resolve
/// 3. **Research** - every empire's project advances
/// 4. **AI** - every `ai_interval` ticks: each AI decides and acts
/// 5. **Game over** - the player holds no planet past the grace period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    config: SimConfig,
    registry: FactionRegistry,
    phase: GamePhase,
    tick: u64,
    world: Option<WorldState>,
    notifications: NotificationFeed,
    combat_log: CombatLog,
    final_score: Option<u64>,
    rng: ChaCha8Rng,
}

impl Simulation {
    /// Create a simulation seeded from OS entropy.
    #[must_use]
    pub fn new(config: SimConfig, registry: FactionRegistry) -> Self {
        Self::from_rng(config, registry, ChaCha8Rng::from_entropy())
    }

    /// Create a reproducible simulation.
    ///
    /// # Example
    ///
    /// ```
    /// use fu_core::config::SimConfig;
    /// use fu_core::data::FactionRegistry;
    /// use fu_core::simulation::{GamePhase, Simulation};
    ///
    /// let sim = Simulation::with_seed(SimConfig::default(), FactionRegistry::builtin(), 42);
    /// assert_eq!(sim.phase(), GamePhase::Menu);
    /// assert_eq!(sim.get_tick(), 0);
    /// ```
    #[must_use]
    pub fn with_seed(config: SimConfig, registry: FactionRegistry, seed: u64) -> Self {
        Self::from_rng(config, registry, ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(config: SimConfig, registry: FactionRegistry, rng: ChaCha8Rng) -> Self {
        Self {
            config,
            registry,
            phase: GamePhase::Menu,
            tick: 0,
            world: None,
            notifications: NotificationFeed::default(),
            combat_log: CombatLog::default(),
            final_score: None,
            rng,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Ticks elapsed in the current game.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.tick
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Faction data in use.
    #[must_use]
    pub const fn registry(&self) -> &FactionRegistry {
        &self.registry
    }

    /// The world, once a game has started.
    #[must_use]
    pub const fn world(&self) -> Option<&WorldState> {
        self.world.as_ref()
    }

    /// The player's empire, once a game has started.
    #[must_use]
    pub fn player(&self) -> Option<&Empire> {
        self.world.as_ref().map(|w| &w.player)
    }

    /// Notifications, newest first.
    #[must_use]
    pub const fn notifications(&self) -> &NotificationFeed {
        &self.notifications
    }

    /// Combat log, newest first.
    #[must_use]
    pub const fn combat_log(&self) -> &CombatLog {
        &self.combat_log
    }

    /// Score frozen when the game ended.
    #[must_use]
    pub const fn final_score(&self) -> Option<u64> {
        self.final_score
    }

    /// The player's score if the game ended now.
    #[must_use]
    pub fn current_score(&self) -> Option<u64> {
        let world = self.world.as_ref()?;
        Some(scoring::final_score(
            &world.player.resources,
            world.planets_owned(Owner::Player),
            world.player.score,
            &self.config.scoring,
        ))
    }

    /// Hand the player's score to a leaderboard.
    ///
    /// Returns `Ok(None)` when no game has been played.
    pub fn submit_score<L: Leaderboard + ?Sized>(
        &self,
        player_name: &str,
        leaderboard: &mut L,
    ) -> std::result::Result<Option<ScoreEntry>, L::Error> {
        let (Some(world), Some(score)) = (self.world.as_ref(), self.final_score.or(self.current_score()))
        else {
            return Ok(None);
        };
        let entry = ScoreEntry {
            player_name: player_name.to_string(),
            faction: world.player.faction,
            score,
        };
        leaderboard.submit(entry.clone())?;
        Ok(Some(entry))
    }

    fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.notifications.push(Notification {
            tick: self.tick,
            message: message.into(),
            severity,
        });
    }

    fn ensure_in_game(&self) -> Result<()> {
        match self.phase {
            GamePhase::Playing | GamePhase::Paused => Ok(()),
            phase => Err(GameError::InvalidState(format!("no game in progress ({phase:?})"))),
        }
    }

    /// Validate and apply a command.
    ///
    /// A rejected command changes nothing except adding an error
    /// notification.
    pub fn execute(&mut self, command: Command) -> Result<()> {
        let result = self.apply(command);
        if let Err(err) = &result {
            tracing::warn!(error = %err, tick = self.tick, "Command rejected");
            self.notify(err.to_string(), Severity::Error);
        }
        result
    }

    fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::StartGame { faction } => self.start_game(faction),
            Command::TogglePause => self.toggle_pause(),
            Command::SendFleet { fleet, destination } => {
                self.ensure_in_game()?;
                let world = self.world.as_mut().ok_or_else(no_world)?;
                let name = world.send_fleet(Owner::Player, fleet, destination)?;
                self.notify(format!("Fleet dispatched to {name}"), Severity::Info);
                Ok(())
            }
            Command::BuildShip { planet, ship_id } => {
                self.ensure_in_game()?;
                let world = self.world.as_mut().ok_or_else(no_world)?;
                let built =
                    world.build_ship(Owner::Player, planet, &ship_id, &self.registry, &self.config, false)?;
                self.notify(
                    format!("{} constructed at {}", built.ship_name, built.planet_name),
                    Severity::Success,
                );
                Ok(())
            }
            Command::UpgradeStructure { planet, kind } => {
                self.ensure_in_game()?;
                let world = self.world.as_mut().ok_or_else(no_world)?;
                let name = world.upgrade_structure(Owner::Player, planet, kind)?;
                self.notify(format!("{} upgraded at {name}!", kind.label()), Severity::Success);
                Ok(())
            }
            Command::Colonize { planet, fleet } => {
                self.ensure_in_game()?;
                let world = self.world.as_mut().ok_or_else(no_world)?;
                let name = world.colonize(Owner::Player, planet, fleet, &self.config)?;
                self.notify(format!("{name} colonized!"), Severity::Success);
                Ok(())
            }
            Command::AttackPlanet { fleet, planet } => self.attack_planet(fleet, planet),
            Command::AttackFleet { attacker, defender } => self.attack_fleet(attacker, defender),
            Command::StartResearch { project } => {
                self.ensure_in_game()?;
                let world = self.world.as_mut().ok_or_else(no_world)?;
                let name = world.start_research(Owner::Player, &project)?;
                self.notify(format!("Started researching: {name}"), Severity::Info);
                Ok(())
            }
        }
    }

    fn start_game(&mut self, faction: FactionId) -> Result<()> {
        if matches!(self.phase, GamePhase::Playing | GamePhase::Paused) {
            return Err(GameError::InvalidState("a game is already in progress".into()));
        }
        let world = WorldState::new_game(faction, &self.registry, &self.config, &mut self.rng);
        tracing::info!(
            faction = %faction,
            planets = world.galaxy.len(),
            fleets = world.fleets.len(),
            "Game started"
        );
        self.world = Some(world);
        self.tick = 0;
        self.final_score = None;
        self.notifications.clear();
        self.combat_log.clear();
        self.phase = GamePhase::Playing;
        self.notify("Command initialized. Secure the galaxy, Commander.", Severity::Info);
        Ok(())
    }

    fn toggle_pause(&mut self) -> Result<()> {
        self.phase = match self.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            phase => {
                return Err(GameError::InvalidState(format!("cannot pause from {phase:?}")));
            }
        };
        tracing::debug!(phase = ?self.phase, "Pause toggled");
        Ok(())
    }

    fn attack_planet(&mut self, fleet_id: FleetId, planet_id: PlanetId) -> Result<()> {
        self.ensure_in_game()?;
        let world = self.world.as_mut().ok_or_else(no_world)?;
        let fleet = world
            .fleets
            .get(&fleet_id)
            .ok_or(GameError::FleetNotFound(fleet_id))?;
        if fleet.owner != Owner::Player {
            return Err(GameError::NotOwner(fleet_id.to_string()));
        }
        let planet = world
            .galaxy
            .get(planet_id)
            .ok_or(GameError::PlanetNotFound(planet_id))?;
        if planet.owner.ai().is_none() {
            return Err(GameError::InvalidTarget(planet.name.clone()));
        }

        let report = world
            .assault_planet(fleet_id, planet_id, &self.registry, &self.config, &mut self.rng, self.tick)
            .ok_or(GameError::FleetNotFound(fleet_id))?;
        let location = report.event.location.clone();
        self.combat_log.push(report.event);
        if report.captured {
            self.notify(format!("Victory! {location} captured!"), Severity::Success);
        } else {
            self.notify(format!("Attack on {location} repelled!"), Severity::Error);
        }
        if let Some(ai) = report.eliminated {
            self.notify(format!("{} has been eliminated!", ai.name), Severity::Success);
        }
        Ok(())
    }

    fn attack_fleet(&mut self, attacker: FleetId, defender: FleetId) -> Result<()> {
        self.ensure_in_game()?;
        let world = self.world.as_mut().ok_or_else(no_world)?;
        let own = world
            .fleets
            .get(&attacker)
            .ok_or(GameError::FleetNotFound(attacker))?;
        if own.owner != Owner::Player {
            return Err(GameError::NotOwner(attacker.to_string()));
        }
        let target = world
            .fleets
            .get(&defender)
            .ok_or(GameError::FleetNotFound(defender))?;
        if target.owner.ai().is_none() {
            return Err(GameError::InvalidTarget(defender.to_string()));
        }

        let report = world
            .engage_fleets(attacker, defender, &self.registry, &self.config, &mut self.rng, self.tick)
            .ok_or(GameError::FleetNotFound(defender))?;
        let location = report.event.location.clone();
        self.combat_log.push(report.event);
        match report.victor {
            Victor::Attacker => self.notify(format!("Fleet engagement won in {location}!"), Severity::Success),
            Victor::Defender => self.notify(format!("Fleet engagement lost in {location}!"), Severity::Error),
            Victor::Draw => self.notify(
                format!("Fleet engagement in {location} was inconclusive."),
                Severity::Warning,
            ),
        }
        Ok(())
    }

    /// Advance the game by one tick.
    ///
    /// Does nothing unless the phase is [`GamePhase::Playing`].
    pub fn tick(&mut self) -> TickEvents {
        let mut events = TickEvents {
            tick: self.tick,
            ..TickEvents::default()
        };
        if self.phase != GamePhase::Playing || self.world.is_none() {
            return events;
        }

        self.tick += 1;
        events.tick = self.tick;
        let economy_interval = self.config.tick.economy_interval;
        let ai_interval = self.config.tick.ai_interval;

        if economy_interval > 0 && self.tick % economy_interval == 0 {
            self.run_economy(&mut events);
        }
        self.run_movement(&mut events);
        self.run_research(&mut events);
        if ai_interval > 0 && self.tick % ai_interval == 0 {
            self.run_ai(&mut events);
        }
        if let Some(world) = self.world.as_mut() {
            world.prune_empty_fleets();
        }
        self.check_game_over(&mut events);

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        events
    }

    fn run_economy(&mut self, events: &mut TickEvents) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        world.run_economy(&self.registry, &self.config.economy);
        let eliminated = world.sweep_eliminations();
        events.economy = true;
        for ai in eliminated {
            events.eliminated.push(ai.id);
            self.notify(format!("{} has been eliminated!", ai.name), Severity::Success);
        }
    }

    fn run_movement(&mut self, events: &mut TickEvents) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let speed = Fixed::from_num(self.config.movement.fleet_speed);
        let arrivals = movement::advance_fleets(&mut world.fleets, &world.galaxy, speed);

        for arrival in &arrivals {
            self.resolve_arrival(*arrival, events);
        }
        events.arrivals = arrivals;
    }

    fn resolve_arrival(&mut self, arrival: Arrival, events: &mut TickEvents) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let Some(planet) = world.galaxy.get(arrival.planet) else {
            return;
        };
        let planet_name = planet.name.clone();

        match arrival.action(planet.owner) {
            ArrivalAction::Report => {
                self.notify(format!("Fleet arrived at {planet_name}"), Severity::Info);
            }
            ArrivalAction::Colonize => {
                if let Err(err) = world.colonize(arrival.owner, arrival.planet, arrival.fleet, &self.config) {
                    tracing::debug!(error = %err, "AI colonization skipped");
                }
            }
            ArrivalAction::Assault => {
                let Some(report) = world.assault_planet(
                    arrival.fleet,
                    arrival.planet,
                    &self.registry,
                    &self.config,
                    &mut self.rng,
                    self.tick,
                ) else {
                    return;
                };
                let attacker = report.event.attacker.clone();
                events.combat.push(report.event.clone());
                self.combat_log.push(report.event);
                if report.captured && report.defender.is_player() {
                    self.notify(format!("{attacker} captured {planet_name}!"), Severity::Error);
                }
                if let Some(ai) = report.eliminated {
                    events.eliminated.push(ai.id);
                    self.notify(format!("{} has been eliminated!", ai.name), Severity::Success);
                }
            }
            ArrivalAction::Idle => {}
        }
    }

    fn run_research(&mut self, events: &mut TickEvents) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let finished = world.advance_research(&self.registry, &self.config.research);
        for (owner, name) in &finished {
            if owner.is_player() {
                self.notify(format!("Research complete: {name}! New ship unlocked."), Severity::Success);
            }
        }
        events.research_completed = finished;
    }

    fn run_ai(&mut self, events: &mut TickEvents) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let ids: Vec<AiId> = world.ais.keys().copied().collect();
        for id in ids {
            let Some(player) = world.ais.get(&id) else {
                continue;
            };
            let faction = self.registry.get(player.empire.faction);
            let orders = ai::decide(
                player,
                faction,
                &world.galaxy,
                &world.fleets,
                &self.config.ai,
                &mut self.rng,
            );

            for order in orders {
                let applied = match &order {
                    AiOrder::Build { ai, planet, ship_id } => world
                        .build_ship(Owner::Ai(*ai), *planet, ship_id, &self.registry, &self.config, true)
                        .map(|_| ()),
                    AiOrder::Move {
                        ai,
                        fleet,
                        destination,
                    } => world.send_fleet(Owner::Ai(*ai), *fleet, *destination).map(|_| ()),
                };
                match applied {
                    Ok(()) => events.ai_orders.push(order),
                    Err(err) => tracing::debug!(ai = %id, error = %err, "AI order rejected"),
                }
            }
        }
    }

    fn check_game_over(&mut self, events: &mut TickEvents) {
        let Some(world) = self.world.as_ref() else {
            return;
        };
        if world.planets_owned(Owner::Player) > 0 || self.tick <= self.config.tick.game_over_grace {
            return;
        }
        let score = self.current_score().unwrap_or_default();
        self.phase = GamePhase::GameOver;
        self.final_score = Some(score);
        events.final_score = Some(score);
        tracing::info!(tick = self.tick, score, "Game over");
        self.notify("All planets lost. Game over!", Severity::Error);
    }

    /// Calculate a hash of the current simulation state.
    ///
    /// Two simulations fed the same seed and commands produce identical
    /// hashes tick for tick.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.phase.hash(&mut hasher);

        if let Some(world) = &self.world {
            world.galaxy.len().hash(&mut hasher);
            for planet in world.galaxy.iter() {
                planet.id.hash(&mut hasher);
                planet.owner.hash(&mut hasher);
                planet.population().hash(&mut hasher);
                planet.defense.hash(&mut hasher);
                let s = planet.structures;
                (s.shipyard, s.defense_grid, s.mining_facility, s.research_lab).hash(&mut hasher);
            }

            world.fleets.len().hash(&mut hasher);
            for fleet in world.fleets.values() {
                fleet.id.hash(&mut hasher);
                fleet.owner.hash(&mut hasher);
                fleet.position.x.to_bits().hash(&mut hasher);
                fleet.position.y.to_bits().hash(&mut hasher);
                fleet.destination().hash(&mut hasher);
                fleet.ships().hash(&mut hasher);
            }

            hash_empire(&world.player, &mut hasher);
            for ai in world.ais.values() {
                ai.id.hash(&mut hasher);
                hash_empire(&ai.empire, &mut hasher);
            }
        }

        hasher.finish()
    }

    /// Serialize the whole simulation, random stream included.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::Snapshot(format!("Failed to serialize simulation: {e}")))
    }

    /// Restore a simulation from [`serialize`](Self::serialize) output.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::Snapshot(format!("Failed to deserialize simulation: {e}")))
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimConfig::default(), FactionRegistry::builtin())
    }
}

fn no_world() -> GameError {
    GameError::InvalidState("no game in progress".into())
}

fn hash_empire(empire: &Empire, hasher: &mut DefaultHasher) {
    empire.faction.hash(hasher);
    let Resources {
        credits,
        metal,
        fuel,
        food,
    } = empire.resources;
    (credits, metal, fuel, food).hash(hasher);
    empire.score.hash(hasher);
    empire.research.completed().hash(hasher);
    empire.research.current().hash(hasher);
    empire.research.progress().to_bits().hash(hasher);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::project_id_for_ship;

    fn started(seed: u64) -> Simulation {
        let mut sim = Simulation::with_seed(SimConfig::default(), FactionRegistry::builtin(), seed);
        sim.execute(Command::StartGame {
            faction: FactionId::Tarren,
        })
        .expect("start");
        sim
    }

    fn player_fleet(sim: &Simulation) -> FleetId {
        sim.world()
            .and_then(|w| w.fleets.values().find(|f| f.owner == Owner::Player))
            .map(|f| f.id)
            .expect("player fleet")
    }

    fn latest_message(sim: &Simulation) -> String {
        sim.notifications()
            .latest()
            .map(|n| n.message.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_menu_ignores_ticks_and_rejects_commands() {
        let mut sim = Simulation::with_seed(SimConfig::default(), FactionRegistry::builtin(), 1);
        assert_eq!(sim.tick().tick, 0);
        assert_eq!(sim.phase(), GamePhase::Menu);

        let result = sim.execute(Command::StartResearch {
            project: "research_tarren_wasp".into(),
        });
        assert!(matches!(result, Err(GameError::InvalidState(_))));
        assert_eq!(sim.notifications().latest().map(|n| n.severity), Some(Severity::Error));
    }

    #[test]
    fn test_start_game_sets_up_world() {
        let sim = started(1);
        assert_eq!(sim.phase(), GamePhase::Playing);
        assert_eq!(sim.get_tick(), 0);
        assert_eq!(latest_message(&sim), "Command initialized. Secure the galaxy, Commander.");
        let world = sim.world().expect("world");
        assert_eq!(world.galaxy.len(), 150);
        assert_eq!(world.player.faction, FactionId::Tarren);
    }

    #[test]
    fn test_start_game_twice_is_rejected() {
        let mut sim = started(1);
        let result = sim.execute(Command::StartGame {
            faction: FactionId::Korai,
        });
        assert!(matches!(result, Err(GameError::InvalidState(_))));
        assert_eq!(sim.player().map(|p| p.faction), Some(FactionId::Tarren));
    }

    #[test]
    fn test_pause_freezes_ticks() {
        let mut sim = started(1);
        sim.execute(Command::TogglePause).expect("pause");
        assert_eq!(sim.phase(), GamePhase::Paused);
        let hash = sim.state_hash();
        for _ in 0..5 {
            sim.tick();
        }
        assert_eq!(sim.get_tick(), 0);
        assert_eq!(sim.state_hash(), hash);

        sim.execute(Command::TogglePause).expect("resume");
        sim.tick();
        assert_eq!(sim.get_tick(), 1);
    }

    #[test]
    fn test_economy_runs_on_interval() {
        let mut sim = started(1);
        for _ in 0..4 {
            assert!(!sim.tick().economy);
        }
        assert_eq!(sim.player().map(|p| p.resources.credits), Some(2000));
        assert!(sim.tick().economy);
        // Tarren homeworld: floor((50 + 1000 * 0.5) * 1.2)
        assert_eq!(sim.player().map(|p| p.resources.credits), Some(2660));
    }

    #[test]
    fn test_fleet_travels_and_reports_arrival() {
        let mut sim = started(1);
        let fleet = player_fleet(&sim);
        sim.execute(Command::SendFleet {
            fleet,
            destination: PlanetId(4),
        })
        .expect("send");
        assert!(latest_message(&sim).starts_with("Fleet dispatched to "));

        let mut arrived = false;
        for _ in 0..200 {
            if sim.tick().arrivals.iter().any(|a| a.fleet == fleet) {
                arrived = true;
                break;
            }
        }
        assert!(arrived);
        let world = sim.world().expect("world");
        let target = world.galaxy.get(PlanetId(4)).expect("planet");
        assert_eq!(world.fleets[&fleet].position, target.position);
        assert!(sim
            .notifications()
            .iter()
            .any(|n| n.message == format!("Fleet arrived at {}", target.name)));
    }

    /// A started game whose AIs never take a turn.
    fn quiet_ai_game(seed: u64) -> Simulation {
        let mut config = SimConfig::default();
        config.tick.ai_interval = 0;
        let mut sim = Simulation::with_seed(config, FactionRegistry::builtin(), seed);
        sim.execute(Command::StartGame {
            faction: FactionId::Tarren,
        })
        .expect("start");
        sim
    }

    /// Spawn a fleet at `from` and order it to `to`, bypassing the command surface.
    fn dispatch(
        sim: &mut Simulation,
        owner: Owner,
        from: PlanetId,
        to: PlanetId,
        ships: &[(&str, u32)],
    ) -> FleetId {
        let world = sim.world.as_mut().expect("world");
        let position = world.galaxy.get(from).expect("origin").position;
        let id = world.spawn_fleet(owner, position);
        let fleet = world.fleets.get_mut(&id).expect("fleet");
        for (ship_id, count) in ships {
            fleet.add_ships(ship_id, *count);
        }
        world.send_fleet(owner, id, to).expect("send");
        id
    }

    fn tick_until_arrival(sim: &mut Simulation, fleet: FleetId) -> TickEvents {
        for _ in 0..300 {
            let events = sim.tick();
            if events.arrivals.iter().any(|a| a.fleet == fleet) {
                return events;
            }
        }
        panic!("{fleet} never arrived");
    }

    fn neutral_planet(sim: &Simulation) -> PlanetId {
        sim.world()
            .and_then(|w| w.galaxy.iter().find(|p| !p.owner.is_claimed()))
            .map(|p| p.id)
            .expect("neutral planet")
    }

    fn starter_drone(sim: &Simulation, owner: Owner) -> String {
        let world = sim.world().expect("world");
        let faction = world.faction_of(owner).expect("faction");
        sim.registry()
            .get(faction)
            .cheapest_starter_drone()
            .map(|ship| ship.id.clone())
            .expect("starter drone")
    }

    #[test]
    fn test_ai_arrival_at_player_planet_captures_it() {
        let mut sim = quiet_ai_game(2);
        let world = sim.world().expect("world");
        let home = world.player.homeworld;
        let home_name = world.galaxy.get(home).expect("home").name.clone();
        let raider = &world.ais[&AiId(0)];
        assert_eq!(raider.empire.faction, FactionId::Korai);
        let (raider_home, raider_name) = (raider.empire.homeworld, raider.name.clone());

        let fleet = dispatch(&mut sim, Owner::Ai(AiId(0)), raider_home, home, &[("korai_basilisk", 5)]);
        let events = tick_until_arrival(&mut sim, fleet);

        assert_eq!(events.combat.len(), 1);
        assert_eq!(sim.combat_log().len(), 1);
        let battle = &events.combat[0];
        assert_eq!(battle.attacker, raider_name);
        assert_eq!(battle.defender, "Player");
        assert_eq!(battle.location, home_name);
        assert_eq!(battle.winner, raider_name);

        let world = sim.world().expect("world");
        assert_eq!(world.galaxy.get(home).map(|p| p.owner), Some(Owner::Ai(AiId(0))));
        let captured = sim
            .notifications()
            .iter()
            .find(|n| n.message == format!("{raider_name} captured {home_name}!"))
            .expect("capture notification");
        assert_eq!(captured.severity, Severity::Error);
        assert_eq!(captured.tick, events.tick);
        // the homeworld was the player's only planet
        assert_eq!(sim.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_ai_capture_of_last_planet_eliminates_through_tick() {
        let mut sim = quiet_ai_game(2);
        let world = sim.world().expect("world");
        let attacker_home = world.ais[&AiId(0)].empire.homeworld;
        let victim_home = world.ais[&AiId(1)].empire.homeworld;
        let victim_name = world.ais[&AiId(1)].name.clone();

        let fleet = dispatch(
            &mut sim,
            Owner::Ai(AiId(0)),
            attacker_home,
            victim_home,
            &[("korai_basilisk", 5)],
        );
        let events = tick_until_arrival(&mut sim, fleet);

        assert_eq!(events.combat.len(), 1);
        assert_eq!(events.eliminated, vec![AiId(1)]);
        let world = sim.world().expect("world");
        assert!(!world.ais.contains_key(&AiId(1)));
        assert!(world.fleets.values().all(|f| f.owner != Owner::Ai(AiId(1))));
        assert_eq!(world.galaxy.get(victim_home).map(|p| p.owner), Some(Owner::Ai(AiId(0))));
        assert!(sim
            .notifications()
            .iter()
            .any(|n| n.message == format!("{victim_name} has been eliminated!")));
    }

    #[test]
    fn test_ai_arrival_at_unowned_planet_colonizes() {
        let mut sim = quiet_ai_game(4);
        let target = neutral_planet(&sim);
        let owner = Owner::Ai(AiId(1));
        let drone = starter_drone(&sim, owner);
        let world = sim.world().expect("world");
        let origin = world.ais[&AiId(1)].empire.homeworld;
        let score_before = world.ais[&AiId(1)].empire.score;

        let fleet = dispatch(&mut sim, owner, origin, target, &[(drone.as_str(), 3)]);
        let events = tick_until_arrival(&mut sim, fleet);

        assert!(events.combat.is_empty());
        assert!(sim.combat_log().is_empty());
        let world = sim.world().expect("world");
        let planet = world.galaxy.get(target).expect("planet");
        assert_eq!(planet.owner, owner);
        assert_eq!(
            planet.population(),
            crate::world::COLONY_POPULATION.min(planet.population_cap())
        );
        assert_eq!(
            world.ais[&AiId(1)].empire.score,
            score_before + sim.config().scoring.colonize_award
        );
        assert_eq!(world.fleets[&fleet].total_ships(), 3);
    }

    #[test]
    fn test_player_arrival_at_own_planet_only_reports() {
        let mut sim = quiet_ai_game(6);
        let origin = neutral_planet(&sim);
        let drone = starter_drone(&sim, Owner::Player);
        let world = sim.world().expect("world");
        let home = world.player.homeworld;
        let home_name = world.galaxy.get(home).expect("home").name.clone();
        let fleets_before = world.fleets.len();

        let fleet = dispatch(&mut sim, Owner::Player, origin, home, &[(drone.as_str(), 2)]);
        let events = tick_until_arrival(&mut sim, fleet);

        assert!(events.combat.is_empty());
        assert!(sim.combat_log().is_empty());
        let world = sim.world().expect("world");
        assert_eq!(world.galaxy.get(home).map(|p| p.owner), Some(Owner::Player));
        assert_eq!(world.fleets.len(), fleets_before + 1);
        assert!(!world.fleets[&fleet].is_moving());
        assert_eq!(world.fleets[&fleet].total_ships(), 2);
        assert_eq!(
            sim.notifications().latest().map(|n| n.message.clone()),
            Some(format!("Fleet arrived at {home_name}"))
        );
    }

    #[test]
    fn test_ai_arrival_at_own_planet_goes_idle() {
        let mut sim = quiet_ai_game(6);
        let origin = neutral_planet(&sim);
        let owner = Owner::Ai(AiId(2));
        let drone = starter_drone(&sim, owner);
        let home = sim.world().expect("world").ais[&AiId(2)].empire.homeworld;
        let notes_before = sim.notifications().len();

        let fleet = dispatch(&mut sim, owner, origin, home, &[(drone.as_str(), 4)]);
        let events = tick_until_arrival(&mut sim, fleet);

        assert!(events.combat.is_empty());
        assert!(events.eliminated.is_empty());
        assert_eq!(sim.notifications().len(), notes_before);
        let world = sim.world().expect("world");
        assert_eq!(world.galaxy.get(home).map(|p| p.owner), Some(owner));
        assert!(!world.fleets[&fleet].is_moving());
        assert_eq!(world.fleets[&fleet].total_ships(), 4);
    }

    #[test]
    fn test_rejected_command_only_adds_notification() {
        let mut sim = started(1);
        let hash = sim.state_hash();
        let result = sim.execute(Command::BuildShip {
            planet: PlanetId(0),
            ship_id: "tarren_titan".into(),
        });
        assert!(matches!(result, Err(GameError::ShipLocked(_))));
        assert_eq!(sim.state_hash(), hash);
        assert_eq!(latest_message(&sim), "Titan has not been researched yet");
    }

    #[test]
    fn test_research_unlocks_ship() {
        let mut sim = started(1);
        sim.execute(Command::StartResearch {
            project: project_id_for_ship("tarren_wasp"),
        })
        .expect("research");
        assert_eq!(latest_message(&sim), "Started researching: Wasp");

        // rate (1 + 1 * 0.2) * 1.15 = 1.38 per tick against 20
        for _ in 0..15 {
            sim.tick();
        }
        assert!(sim
            .player()
            .is_some_and(|p| p.research.is_completed("research_tarren_wasp")));
        assert!(sim
            .notifications()
            .iter()
            .any(|n| n.message == "Research complete: Wasp! New ship unlocked."));

        sim.execute(Command::BuildShip {
            planet: PlanetId(0),
            ship_id: "tarren_wasp".into(),
        })
        .expect("build");
        assert_eq!(latest_message(&sim), "Wasp constructed at New Tarra");
    }

    #[test]
    fn test_attack_requires_ai_target() {
        let mut sim = started(1);
        let fleet = player_fleet(&sim);
        let neutral = sim.execute(Command::AttackPlanet {
            fleet,
            planet: PlanetId(20),
        });
        assert!(matches!(neutral, Err(GameError::InvalidTarget(_))));
        let own = sim.execute(Command::AttackFleet {
            attacker: fleet,
            defender: fleet,
        });
        assert!(matches!(own, Err(GameError::InvalidTarget(_))));
    }

    #[test]
    fn test_player_assault_logs_combat() {
        let mut sim = started(3);
        let fleet = player_fleet(&sim);
        sim.execute(Command::AttackPlanet {
            fleet,
            planet: PlanetId(1),
        })
        .expect("attack");
        let event = sim.combat_log().latest().expect("event");
        assert_eq!(event.attacker, "Player");
        assert_eq!(event.defender, "Kor'ai Empire");
        assert_eq!(event.location, "Kora Prime");
        // garrison of 7 against a defended homeworld is always repelled
        assert_eq!(event.winner, "Kor'ai Empire");
        assert!(latest_message(&sim).starts_with("Attack on Kora Prime"));
    }

    #[test]
    fn test_game_over_after_grace() {
        let mut sim = started(1);
        if let Some(world) = sim.world.as_mut() {
            for planet in world.galaxy.owned_by_mut(Owner::Player) {
                planet.owner = Owner::Unclaimed;
            }
        }
        for _ in 0..10 {
            assert!(sim.tick().final_score.is_none());
        }
        let events = sim.tick();
        assert_eq!(sim.phase(), GamePhase::GameOver);
        assert!(events.final_score.is_some());
        assert_eq!(sim.final_score(), events.final_score);

        assert_eq!(sim.tick().tick, 11);
        assert_eq!(sim.get_tick(), 11);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = started(99);
        let mut b = started(99);
        for _ in 0..120 {
            a.tick();
            b.tick();
            assert_eq!(a.state_hash(), b.state_hash());
        }
    }

    #[test]
    fn test_snapshot_resumes_identically() {
        let mut sim = started(5);
        for _ in 0..30 {
            sim.tick();
        }
        let bytes = sim.serialize().expect("serialize");
        let mut restored = Simulation::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored.state_hash(), sim.state_hash());

        for _ in 0..30 {
            sim.tick();
            restored.tick();
        }
        assert_eq!(restored.state_hash(), sim.state_hash());
    }

    #[test]
    fn test_garbage_snapshot_is_rejected() {
        assert!(matches!(
            Simulation::deserialize(&[1, 2, 3]),
            Err(GameError::Snapshot(_))
        ));
    }
}
