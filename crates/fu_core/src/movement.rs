//! Straight-line fleet movement and arrival detection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{Fleet, FleetId, Owner, PlanetId};
use crate::galaxy::Galaxy;
use crate::math::Fixed;

/// A fleet reached its destination this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrival {
    /// The fleet that arrived.
    pub fleet: FleetId,
    /// Its owner.
    pub owner: Owner,
    /// Where it arrived.
    pub planet: PlanetId,
}

/// What an arrival leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalAction {
    /// Player fleet: report only.
    Report,
    /// AI fleet at a planet held by another side: planet assault.
    Assault,
    /// AI fleet at an unclaimed planet: colonize.
    Colonize,
    /// AI fleet at its own planet.
    Idle,
}

impl Arrival {
    /// Decide the follow-up for this arrival given the planet's owner.
    #[must_use]
    pub fn action(&self, planet_owner: Owner) -> ArrivalAction {
        match (self.owner, planet_owner) {
            (Owner::Player, _) => ArrivalAction::Report,
            (_, Owner::Unclaimed) => ArrivalAction::Colonize,
            (fleet, planet) if fleet == planet => ArrivalAction::Idle,
            _ => ArrivalAction::Assault,
        }
    }
}

/// Advance every moving fleet one step towards its destination.
///
/// A fleet closer than `speed` snaps onto the planet, stops, and is
/// reported. Stationary fleets are never touched. A fleet whose
/// destination no longer exists simply stops where it is.
pub fn advance_fleets(
    fleets: &mut BTreeMap<FleetId, Fleet>,
    galaxy: &Galaxy,
    speed: Fixed,
) -> Vec<Arrival> {
    let mut arrivals = Vec::new();

    for fleet in fleets.values_mut() {
        let Some(destination) = fleet.destination() else {
            continue;
        };
        let Some(planet) = galaxy.get(destination) else {
            let position = fleet.position;
            fleet.arrive(position);
            continue;
        };

        let (next, arrived) = fleet.position.step_towards(planet.position, speed);
        if arrived {
            fleet.arrive(planet.position);
            arrivals.push(Arrival {
                fleet: fleet.id,
                owner: fleet.owner,
                planet: destination,
            });
        } else {
            fleet.position = next;
        }
    }

    arrivals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{AiId, Planet};
    use crate::data::{Biome, SizeClass};
    use crate::math::Vec2Fixed;

    fn galaxy() -> Galaxy {
        Galaxy::from_planets(vec![
            Planet::new(
                PlanetId(0),
                "Origin".into(),
                Vec2Fixed::ZERO,
                SizeClass::Small,
                Biome::Ice,
            ),
            Planet::new(
                PlanetId(1),
                "Target".into(),
                Vec2Fixed::from_num(100, 0),
                SizeClass::Small,
                Biome::Ice,
            ),
        ])
    }

    fn fleets_with(fleet: Fleet) -> BTreeMap<FleetId, Fleet> {
        BTreeMap::from([(fleet.id, fleet)])
    }

    fn assert_near(actual: Vec2Fixed, expected: Vec2Fixed) {
        assert!(
            actual.distance(expected) < Fixed::from_num(0.001),
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn test_fleet_steps_then_snaps() {
        let galaxy = galaxy();
        let mut fleet = Fleet::new(FleetId(1), Owner::Player, Vec2Fixed::ZERO).with_ships("d", 1);
        fleet.set_destination(PlanetId(1));
        let mut fleets = fleets_with(fleet);
        let speed = Fixed::from_num(40);

        assert!(advance_fleets(&mut fleets, &galaxy, speed).is_empty());
        assert_near(fleets[&FleetId(1)].position, Vec2Fixed::from_num(40, 0));
        assert!(advance_fleets(&mut fleets, &galaxy, speed).is_empty());
        assert_near(fleets[&FleetId(1)].position, Vec2Fixed::from_num(80, 0));

        let arrivals = advance_fleets(&mut fleets, &galaxy, speed);
        assert_eq!(
            arrivals,
            vec![Arrival {
                fleet: FleetId(1),
                owner: Owner::Player,
                planet: PlanetId(1)
            }]
        );
        let fleet = &fleets[&FleetId(1)];
        assert_eq!(fleet.position, Vec2Fixed::from_num(100, 0));
        assert!(!fleet.is_moving());
    }

    #[test]
    fn test_arrived_fleet_is_not_advanced_again() {
        let galaxy = galaxy();
        let mut fleet = Fleet::new(FleetId(1), Owner::Player, Vec2Fixed::from_num(90, 0));
        fleet.set_destination(PlanetId(1));
        let mut fleets = fleets_with(fleet);
        let speed = Fixed::from_num(40);

        assert_eq!(advance_fleets(&mut fleets, &galaxy, speed).len(), 1);
        for _ in 0..3 {
            assert!(advance_fleets(&mut fleets, &galaxy, speed).is_empty());
        }
        assert_eq!(fleets[&FleetId(1)].position, Vec2Fixed::from_num(100, 0));
    }

    #[test]
    fn test_missing_destination_stops_fleet() {
        let galaxy = galaxy();
        let mut fleet = Fleet::new(FleetId(1), Owner::Player, Vec2Fixed::ZERO);
        fleet.set_destination(PlanetId(99));
        let mut fleets = fleets_with(fleet);
        assert!(advance_fleets(&mut fleets, &galaxy, Fixed::from_num(40)).is_empty());
        assert!(!fleets[&FleetId(1)].is_moving());
    }

    #[test]
    fn test_arrival_actions() {
        let ai = Owner::Ai(AiId(0));
        let arrival = |owner| Arrival {
            fleet: FleetId(1),
            owner,
            planet: PlanetId(0),
        };
        assert_eq!(arrival(Owner::Player).action(ai), ArrivalAction::Report);
        assert_eq!(arrival(ai).action(Owner::Unclaimed), ArrivalAction::Colonize);
        assert_eq!(arrival(ai).action(ai), ArrivalAction::Idle);
        assert_eq!(arrival(ai).action(Owner::Player), ArrivalAction::Assault);
        assert_eq!(arrival(ai).action(Owner::Ai(AiId(1))), ArrivalAction::Assault);
    }
}
