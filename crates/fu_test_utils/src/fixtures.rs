//! Test fixtures and helpers.
//!
//! Pre-built planets, fleets and started games for consistent testing.

use fixed::types::I32F32;
use fu_core::components::{Fleet, FleetId, Owner, Planet, PlanetId};
use fu_core::config::SimConfig;
use fu_core::data::{Biome, FactionRegistry, SizeClass};
use fu_core::factions::FactionId;
use fu_core::math::Vec2Fixed;
use fu_core::simulation::{Command, Simulation};

/// Seed used when a test does not care which one.
pub const DEFAULT_SEED: u64 = 42;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// A simulation in the menu, with default config and built-in factions.
#[must_use]
pub fn seeded_sim(seed: u64) -> Simulation {
    Simulation::with_seed(SimConfig::default(), FactionRegistry::builtin(), seed)
}

/// A simulation with a game already started for `faction`.
///
/// # Panics
///
/// Panics if the start command is rejected.
#[must_use]
pub fn started_sim(faction: FactionId, seed: u64) -> Simulation {
    started_sim_with(SimConfig::default(), faction, seed)
}

/// Like [`started_sim`] with a custom configuration.
///
/// # Panics
///
/// Panics if the start command is rejected.
#[must_use]
pub fn started_sim_with(config: SimConfig, faction: FactionId, seed: u64) -> Simulation {
    let mut sim = Simulation::with_seed(config, FactionRegistry::builtin(), seed);
    sim.execute(Command::StartGame { faction })
        .expect("start game from the menu");
    sim
}

/// Tick a simulation `ticks` times.
pub fn run_ticks(sim: &mut Simulation, ticks: u64) {
    for _ in 0..ticks {
        sim.tick();
    }
}

/// A bare planet with no population or structures.
#[must_use]
pub fn planet(id: u32, owner: Owner, x: i32, y: i32, size: SizeClass, biome: Biome) -> Planet {
    let mut planet = Planet::new(
        PlanetId(id),
        format!("Test Planet {id}"),
        Vec2Fixed::new(fixed(x), fixed(y)),
        size,
        biome,
    );
    planet.owner = owner;
    planet
}

/// A planet with homeworld stats: large, balanced, defended and built up.
#[must_use]
pub fn homeworld(id: u32, owner: Owner, x: i32, y: i32) -> Planet {
    let mut planet = planet(id, owner, x, y, SizeClass::Large, Biome::Balanced);
    planet.base_income = 50;
    planet.defense = 100;
    planet.set_population_cap(5000);
    planet.set_population(1000);
    planet.structures.shipyard = 2;
    planet.structures.defense_grid = 2;
    planet.structures.mining_facility = 2;
    planet.structures.research_lab = 1;
    planet
}

/// A stationary fleet built from `(ship id, count)` pairs.
#[must_use]
pub fn fleet(id: u64, owner: Owner, x: i32, y: i32, ships: &[(&str, u32)]) -> Fleet {
    ships.iter().fold(
        Fleet::new(FleetId(id), owner, Vec2Fixed::new(fixed(x), fixed(y))),
        |fleet, (ship_id, count)| fleet.with_ships(ship_id, *count),
    )
}

/// First fleet of `owner` in id order.
#[must_use]
pub fn first_fleet_of(sim: &Simulation, owner: Owner) -> Option<FleetId> {
    sim.world()?
        .fleets
        .values()
        .find(|f| f.owner == owner)
        .map(|f| f.id)
}
