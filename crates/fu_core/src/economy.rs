//! Resource income and population drift.
//!
//! Runs on the economy cadence. For each owner the engine sums yields over
//! owned planets, charges food upkeep, and then drifts every owned planet's
//! population using that same net food figure.

use serde::{Deserialize, Serialize};

use crate::components::{Owner, Planet, Resources};
use crate::config::EconomyConfig;
use crate::data::PlanetModifier;
use crate::galaxy::Galaxy;

/// Yields of a single planet for one economy tick.
///
/// Every component is floored per planet and never negative.
#[must_use]
pub fn planet_yield(
    planet: &Planet,
    economy_multiplier: f64,
    config: &EconomyConfig,
) -> Resources {
    let modifier = planet.biome.modifier();
    let scaled = |base: f64, percent: i32| -> u64 {
        (base * PlanetModifier::factor(percent) * economy_multiplier)
            .floor()
            .max(0.0) as u64
    };

    let credits = ((f64::from(planet.base_income)
        + f64::from(planet.population()) * config.credits_per_population)
        * economy_multiplier)
        .floor()
        .max(0.0) as u64;
    let mining = f64::from(
        planet.structures.mining_facility * config.mining_per_level + config.mining_base,
    );

    Resources {
        credits,
        metal: scaled(mining, modifier.metal),
        fuel: scaled(f64::from(config.fuel_base), modifier.fuel),
        food: scaled(f64::from(config.food_base), modifier.food),
    }
}

/// Outcome of one economy pass for one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EconomyReport {
    /// Gross income added to the stockpile (food shown before upkeep).
    pub income: Resources,
    /// Population across owned planets.
    pub population: u64,
    /// Food eaten by that population.
    pub food_upkeep: u64,
    /// Food income minus upkeep.
    pub net_food: i64,
}

/// Sum yields and upkeep over every planet an owner controls.
#[must_use]
pub fn assess(
    galaxy: &Galaxy,
    owner: Owner,
    economy_multiplier: f64,
    config: &EconomyConfig,
) -> EconomyReport {
    let mut report = EconomyReport::default();
    for planet in galaxy.owned_by(owner) {
        let planet_income = planet_yield(planet, economy_multiplier, config);
        report.income.credits += planet_income.credits;
        report.income.metal += planet_income.metal;
        report.income.fuel += planet_income.fuel;
        report.income.food += planet_income.food;
        report.population += u64::from(planet.population());
    }
    report.food_upkeep = report.population / u64::from(config.population_per_food.max(1));
    report.net_food = report.income.food as i64 - report.food_upkeep as i64;
    report
}

/// Credit an owner's stockpile with one economy pass.
///
/// Food is adjusted by net food and clamped at zero; a deficit does not
/// carry over.
pub fn collect(resources: &mut Resources, report: &EconomyReport) {
    resources.credits += report.income.credits;
    resources.metal += report.income.metal;
    resources.fuel += report.income.fuel;
    resources.food = (resources.food as i64 + report.net_food).max(0) as u64;
}

/// Grow or shrink population on every planet an owner controls.
///
/// Surplus food grows each planet below its cap by up to the growth step.
/// Severe shortage shrinks each planet above 1 inhabitant, never below 1.
/// Returns the total population change.
pub fn drift_population(
    galaxy: &mut Galaxy,
    owner: Owner,
    net_food: i64,
    config: &EconomyConfig,
) -> i64 {
    let mut delta = 0i64;
    if net_food > 0 {
        for planet in galaxy.owned_by_mut(owner) {
            let growth = config.growth_step.min(planet.capacity_remaining());
            planet.set_population(planet.population() + growth);
            delta += i64::from(growth);
        }
    } else if net_food < config.starvation_threshold {
        for planet in galaxy.owned_by_mut(owner) {
            if planet.population() > 1 {
                let shrunk = planet.population().saturating_sub(config.starvation_step).max(1);
                delta -= i64::from(planet.population() - shrunk);
                planet.set_population(shrunk);
            }
        }
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{AiId, PlanetId};
    use crate::data::{Biome, SizeClass};
    use crate::math::Vec2Fixed;

    fn planet(id: u32, owner: Owner, biome: Biome, population: u32) -> Planet {
        let mut planet = Planet::new(
            PlanetId(id),
            format!("P{id}"),
            Vec2Fixed::ZERO,
            SizeClass::Large,
            biome,
        );
        planet.owner = owner;
        planet.set_population_cap(5000);
        planet.set_population(population);
        planet
    }

    #[test]
    fn test_homeworld_yield() {
        let mut home = planet(0, Owner::Player, Biome::Balanced, 1000);
        home.base_income = 50;
        home.structures.mining_facility = 2;

        let income = planet_yield(&home, 1.2, &EconomyConfig::default());
        // (50 + 500) * 1.2
        assert_eq!(income.credits, 660);
        // 35 * 0.75 * 1.2 = 31.5
        assert_eq!(income.metal, 31);
        // 10 * 0.5 * 1.2
        assert_eq!(income.fuel, 6);
        // 10 * 1.5 * 1.2
        assert_eq!(income.food, 18);
    }

    #[test]
    fn test_negative_modifiers_floor_at_zero() {
        let gas = planet(0, Owner::Player, Biome::Gas, 0);
        let income = planet_yield(&gas, 1.0, &EconomyConfig::default());
        assert_eq!(income.metal, 0);
        assert_eq!(income.food, 0);
        assert_eq!(income.fuel, 20);
    }

    #[test]
    fn test_food_stock_never_negative() {
        let galaxy = Galaxy::from_planets(vec![planet(0, Owner::Player, Biome::Desert, 5000)]);
        let report = assess(&galaxy, Owner::Player, 1.0, &EconomyConfig::default());
        assert_eq!(report.food_upkeep, 500);
        assert_eq!(report.net_food, -500);

        let mut resources = Resources {
            food: 20,
            ..Resources::default()
        };
        collect(&mut resources, &report);
        assert_eq!(resources.food, 0);
    }

    #[test]
    fn test_surplus_grows_up_to_cap() {
        let mut galaxy = Galaxy::from_planets(vec![
            planet(0, Owner::Player, Biome::Forest, 4999),
            planet(1, Owner::Player, Biome::Forest, 100),
            planet(2, Owner::Ai(AiId(0)), Biome::Forest, 100),
        ]);
        let delta = drift_population(&mut galaxy, Owner::Player, 5, &EconomyConfig::default());
        assert_eq!(delta, 3);
        assert_eq!(galaxy.get(PlanetId(0)).unwrap().population(), 5000);
        assert_eq!(galaxy.get(PlanetId(1)).unwrap().population(), 102);
        assert_eq!(galaxy.get(PlanetId(2)).unwrap().population(), 100);
    }

    #[test]
    fn test_starvation_shrinks_but_never_empties() {
        let mut galaxy = Galaxy::from_planets(vec![
            planet(0, Owner::Player, Biome::Desert, 1),
            planet(1, Owner::Player, Biome::Desert, 50),
        ]);
        let config = EconomyConfig::default();

        // -10 is not below the threshold
        assert_eq!(drift_population(&mut galaxy, Owner::Player, -10, &config), 0);

        let delta = drift_population(&mut galaxy, Owner::Player, -11, &config);
        assert_eq!(delta, -1);
        assert_eq!(galaxy.get(PlanetId(0)).unwrap().population(), 1);
        assert_eq!(galaxy.get(PlanetId(1)).unwrap().population(), 49);
    }

    #[test]
    fn test_drift_reads_same_net_food_as_collection() {
        let mut galaxy = Galaxy::from_planets(vec![planet(0, Owner::Player, Biome::Forest, 150)]);
        let config = EconomyConfig::default();
        // food 20 against upkeep 15
        let report = assess(&galaxy, Owner::Player, 1.0, &config);
        assert_eq!(report.net_food, 5);
        drift_population(&mut galaxy, Owner::Player, report.net_food, &config);
        assert_eq!(galaxy.get(PlanetId(0)).unwrap().population(), 152);
    }
}
