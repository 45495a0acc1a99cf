//! Baseline AI opponent policy.
//!
//! The policy is memoryless and uniform-random. It only reads the world and
//! returns orders; the scheduler applies them through the same validated
//! paths player commands use.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{AiId, AiPlayer, Fleet, FleetId, Owner, PlanetId, Resources};
use crate::config::AiConfig;
use crate::data::FactionData;
use crate::galaxy::Galaxy;

/// An order issued by the AI policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiOrder {
    /// Build one ship at a shipyard planet.
    Build {
        /// Ordering AI.
        ai: AiId,
        /// Planet with a shipyard.
        planet: PlanetId,
        /// Design to build.
        ship_id: String,
    },
    /// Send an idle fleet to a planet.
    Move {
        /// Ordering AI.
        ai: AiId,
        /// Fleet to dispatch.
        fleet: FleetId,
        /// Target planet.
        destination: PlanetId,
    },
}

/// Decide this turn's orders for one AI.
///
/// Draws, in order: the build roll, the move roll, then (when a fleet is
/// eligible) the attack roll and the target pick.
pub fn decide<R: Rng + ?Sized>(
    ai: &AiPlayer,
    faction: &FactionData,
    galaxy: &Galaxy,
    fleets: &BTreeMap<FleetId, Fleet>,
    config: &AiConfig,
    rng: &mut R,
) -> Vec<AiOrder> {
    let owner = Owner::Ai(ai.id);
    let mut orders = Vec::new();

    if rng.gen_bool(config.build_chance.clamp(0.0, 1.0)) {
        let shipyard = galaxy
            .owned_by(owner)
            .find(|p| p.structures.shipyard > 0);
        if let (Some(planet), Some(drone)) = (shipyard, faction.cheapest_starter_drone()) {
            let cost = Resources::credits_metal(drone.cost.credits, drone.cost.metal);
            if ai.empire.resources.can_afford(&cost) {
                orders.push(AiOrder::Build {
                    ai: ai.id,
                    planet: planet.id,
                    ship_id: drone.id.clone(),
                });
            }
        }
    }

    if rng.gen_bool(config.move_chance.clamp(0.0, 1.0)) {
        let candidate = fleets.values().find(|f| {
            f.owner == owner && !f.is_moving() && f.total_ships() >= config.min_fleet_to_move
        });
        if let Some(fleet) = candidate {
            if let Some(destination) = pick_target(owner, fleet, galaxy, config, rng) {
                orders.push(AiOrder::Move {
                    ai: ai.id,
                    fleet: fleet.id,
                    destination,
                });
            }
        }
    }

    orders
}

/// Attack a random foreign planet, or else expand to a random unclaimed one.
fn pick_target<R: Rng + ?Sized>(
    owner: Owner,
    fleet: &Fleet,
    galaxy: &Galaxy,
    config: &AiConfig,
    rng: &mut R,
) -> Option<PlanetId> {
    let enemies: Vec<PlanetId> = galaxy
        .iter()
        .filter(|p| p.owner.is_hostile_to(owner))
        .map(|p| p.id)
        .collect();

    let attack = fleet.total_ships() >= config.min_fleet_to_attack
        && !enemies.is_empty()
        && rng.gen_bool(config.attack_chance.clamp(0.0, 1.0));
    if attack {
        return enemies.choose(rng).copied();
    }

    let unclaimed: Vec<PlanetId> = galaxy.owned_by(Owner::Unclaimed).map(|p| p.id).collect();
    unclaimed.choose(rng).copied()
}
