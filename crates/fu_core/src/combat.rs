//! Stochastic combat resolution.
//!
//! Two engagement shapes share one power model:
//! - Base power is a fleet's summed attack or defense, scaled by its
//!   faction's combat multiplier and floored.
//! - Each side rolls `max(1, power + U(0, power * jitter))`.
//! - The attacker/defender ratio is clamped before deriving loss ratios.
//!
//! Fleet engagements may end in a draw. Planet assaults are binary: the
//! planet is captured or the attack is repelled.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{Fleet, Owner, Planet};
use crate::config::CombatConfig;
use crate::data::FactionData;

/// Ship losses by design id. Only non-zero entries are recorded.
pub type Losses = BTreeMap<String, u32>;

/// Unrolled attack and defense of a fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FleetPower {
    /// Attack power.
    pub attack: u64,
    /// Defense power.
    pub defense: u64,
}

impl FleetPower {
    /// Sum a fleet's stats using its owner's roster and combat multiplier.
    ///
    /// Ships missing from the roster contribute nothing.
    #[must_use]
    pub fn of(fleet: &Fleet, faction: &FactionData) -> Self {
        let (attack, defense) = fleet
            .ships()
            .iter()
            .filter_map(|(id, &count)| faction.get_ship(id).map(|ship| (ship, u64::from(count))))
            .fold((0u64, 0u64), |(a, d), (ship, count)| {
                (
                    a + u64::from(ship.attack) * count,
                    d + u64::from(ship.defense) * count,
                )
            });
        let multiplier = faction.bonuses.combat;
        Self {
            attack: (attack as f64 * multiplier).floor() as u64,
            defense: (defense as f64 * multiplier).floor() as u64,
        }
    }
}

/// Roll a randomized power figure, never below 1.
pub fn roll_power<R: Rng + ?Sized>(power: u64, jitter: f64, rng: &mut R) -> f64 {
    let base = power as f64;
    (base + rng.gen::<f64>() * base * jitter).max(1.0)
}

/// Attacker/defender power ratio clamped to the configured bounds.
#[must_use]
pub fn power_ratio(attacker: f64, defender: f64, config: &CombatConfig) -> f64 {
    (attacker / defender.max(1.0)).clamp(config.min_ratio, config.max_ratio)
}

/// How fractional losses are rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round down.
    Floor,
    /// Round up, so any non-zero ratio costs at least one ship per design.
    Ceil,
}

/// Remove `ratio` of every ship entry from a fleet.
///
/// Returns the losses actually applied; emptied entries are pruned.
pub fn apply_losses(fleet: &mut Fleet, ratio: f64, rounding: Rounding) -> Losses {
    let planned: Vec<(String, u32)> = fleet
        .ships()
        .iter()
        .map(|(id, &count)| {
            let raw = f64::from(count) * ratio;
            let lost = match rounding {
                Rounding::Floor => raw.floor(),
                Rounding::Ceil => raw.ceil(),
            };
            (id.clone(), (lost.max(0.0) as u32).min(count))
        })
        .filter(|(_, lost)| *lost > 0)
        .collect();

    planned
        .into_iter()
        .map(|(id, lost)| {
            let removed = fleet.remove_ships(&id, lost);
            (id, removed)
        })
        .collect()
}

/// Who came out ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Victor {
    /// The attacking side.
    Attacker,
    /// The defending side.
    Defender,
    /// Neither side was decisively stronger.
    Draw,
}

/// Result of a fleet-versus-fleet engagement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetEngagement {
    /// Rolled attacker power.
    pub attacker_power: f64,
    /// Rolled defender power.
    pub defender_power: f64,
    /// Clamped ratio used for losses.
    pub ratio: f64,
    /// Outcome.
    pub victor: Victor,
    /// Attacker ships lost.
    pub attacker_losses: Losses,
    /// Defender ships lost.
    pub defender_losses: Losses,
}

/// Resolve an attack by one fleet on another, applying losses to both.
///
/// The attacker rolls its attack, the defender its defense.
pub fn resolve_fleet_engagement<R: Rng + ?Sized>(
    attacker: &mut Fleet,
    attacker_faction: &FactionData,
    defender: &mut Fleet,
    defender_faction: &FactionData,
    config: &CombatConfig,
    rng: &mut R,
) -> FleetEngagement {
    let attacker_base = FleetPower::of(attacker, attacker_faction).attack;
    let defender_base = FleetPower::of(defender, defender_faction).defense;
    let attacker_power = roll_power(attacker_base, config.jitter, rng);
    let defender_power = roll_power(defender_base, config.jitter, rng);

    let ratio = power_ratio(attacker_power, defender_power, config);
    let coeffs = &config.fleet;
    let defender_ratio = (ratio * coeffs.defender_loss).clamp(coeffs.min_loss, coeffs.max_loss);
    let attacker_ratio = (ratio.recip() * coeffs.attacker_loss).clamp(coeffs.min_loss, coeffs.max_loss);

    let defender_losses = apply_losses(defender, defender_ratio, Rounding::Floor);
    let attacker_losses = apply_losses(attacker, attacker_ratio, Rounding::Floor);

    let threshold = coeffs.decisive_threshold;
    let victor = if attacker_power > defender_power * threshold {
        Victor::Attacker
    } else if defender_power > attacker_power * threshold {
        Victor::Defender
    } else {
        Victor::Draw
    };

    FleetEngagement {
        attacker_power,
        defender_power,
        ratio,
        victor,
        attacker_losses,
        defender_losses,
    }
}

/// Result of a fleet assaulting a planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetAssault {
    /// Rolled attacker power.
    pub attacker_power: f64,
    /// Rolled composite defense.
    pub defender_power: f64,
    /// Clamped ratio used for losses.
    pub ratio: f64,
    /// Whether the attacker takes the planet.
    pub captured: bool,
    /// Attacker ships lost.
    pub attacker_losses: Losses,
    /// Defending fleet ships lost.
    pub defender_losses: Losses,
}

/// Planet defense before any fleet support.
#[must_use]
pub fn planet_defense(planet: &Planet, config: &CombatConfig) -> u64 {
    u64::from(planet.defense)
        + u64::from(planet.structures.defense_grid) * u64::from(config.planet.defense_grid_bonus)
}

/// Resolve an assault on a planet, optionally backed by a defending fleet.
///
/// Applies losses to the attacker (rounded up) and to the defending fleet
/// (rounded down). Ownership is not changed here; see [`capture`].
pub fn resolve_planet_assault<R: Rng + ?Sized>(
    attacker: &mut Fleet,
    attacker_faction: &FactionData,
    planet: &Planet,
    defender: Option<(&mut Fleet, &FactionData)>,
    config: &CombatConfig,
    rng: &mut R,
) -> PlanetAssault {
    let attacker_base = FleetPower::of(attacker, attacker_faction).attack;
    let fleet_defense = defender
        .as_ref()
        .map_or(0, |(fleet, faction)| FleetPower::of(fleet, faction).defense);
    let defender_base = planet_defense(planet, config) + fleet_defense;

    let attacker_power = roll_power(attacker_base, config.jitter, rng);
    let defender_power = roll_power(defender_base, config.jitter, rng);
    let ratio = power_ratio(attacker_power, defender_power, config);

    let coeffs = &config.planet;
    let attacker_ratio =
        (ratio.recip() * coeffs.attacker_loss).clamp(coeffs.min_loss, coeffs.attacker_max_loss);
    let attacker_losses = apply_losses(attacker, attacker_ratio, Rounding::Ceil);

    let defender_losses = match defender {
        Some((fleet, _)) => {
            // binds only when min_ratio * defender_fleet_loss < min_loss
            let defender_ratio =
                (ratio * coeffs.defender_fleet_loss).clamp(coeffs.min_loss, coeffs.defender_max_loss);
            apply_losses(fleet, defender_ratio, Rounding::Floor)
        }
        None => Losses::new(),
    };

    PlanetAssault {
        attacker_power,
        defender_power,
        ratio,
        captured: attacker_power > defender_power * coeffs.win_threshold,
        attacker_losses,
        defender_losses,
    }
}

/// Hand a planet to its conqueror, keeping a fraction of its population.
pub fn capture(planet: &mut Planet, new_owner: Owner, config: &CombatConfig) {
    planet.owner = new_owner;
    let survivors =
        (f64::from(planet.population()) * config.planet.capture_population_factor).floor();
    planet.set_population(survivors.max(0.0) as u32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{AiId, FleetId, PlanetId};
    use crate::data::{Biome, FactionRegistry, SizeClass};
    use crate::factions::FactionId;
    use crate::math::Vec2Fixed;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Draws 0.0 from `gen::<f64>()`, so rolls equal base power.
    fn no_jitter() -> StepRng {
        StepRng::new(0, 0)
    }

    fn tarren_starter(owner: Owner) -> Fleet {
        Fleet::new(FleetId(1), owner, Vec2Fixed::ZERO)
            .with_ships("tarren_drone_fodder", 5)
            .with_ships("tarren_wasp", 2)
    }

    fn target_planet(defense: u32, grid: u32) -> Planet {
        let mut planet = Planet::new(
            PlanetId(5),
            "Target".into(),
            Vec2Fixed::ZERO,
            SizeClass::Large,
            Biome::Balanced,
        );
        planet.owner = Owner::Ai(AiId(0));
        planet.defense = defense;
        planet.structures.defense_grid = grid;
        planet.set_population_cap(5000);
        planet.set_population(800);
        planet
    }

    #[test]
    fn test_fleet_power_applies_multiplier() {
        let registry = FactionRegistry::builtin();
        let fleet = Fleet::new(FleetId(1), Owner::Player, Vec2Fixed::ZERO)
            .with_ships("korai_drone_bomber", 3)
            .with_ships("korai_ray", 1)
            .with_ships("tarren_wasp", 9);
        let power = FleetPower::of(&fleet, registry.get(FactionId::Korai));
        // attack (3*2 + 3) * 1.4 = 12.6, defense (3 + 5) * 1.4 = 11.2
        assert_eq!(power, FleetPower { attack: 12, defense: 11 });
    }

    #[test]
    fn test_roll_power_bounds() {
        assert!((roll_power(0, 0.3, &mut no_jitter()) - 1.0).abs() < f64::EPSILON);
        assert!((roll_power(100, 0.3, &mut no_jitter()) - 100.0).abs() < f64::EPSILON);
        let mut max = StepRng::new(u64::MAX, 0);
        let rolled = roll_power(100, 0.3, &mut max);
        assert!(rolled > 129.9 && rolled <= 130.0);
    }

    #[test]
    fn test_ratio_is_clamped() {
        let config = CombatConfig::default();
        assert!((power_ratio(1000.0, 1.0, &config) - 10.0).abs() < f64::EPSILON);
        assert!((power_ratio(1.0, 1000.0, &config) - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_losses_rounding() {
        let mut fleet = tarren_starter(Owner::Player);
        let losses = apply_losses(&mut fleet.clone(), 0.3, Rounding::Floor);
        // floor(1.5) = 1, floor(0.6) = 0
        assert_eq!(losses, Losses::from([("tarren_drone_fodder".to_string(), 1)]));

        let losses = apply_losses(&mut fleet, 0.3, Rounding::Ceil);
        assert_eq!(losses["tarren_drone_fodder"], 2);
        assert_eq!(losses["tarren_wasp"], 1);
        assert_eq!(fleet.total_ships(), 4);
    }

    #[test]
    fn test_undersized_assault_is_repelled_with_bounded_losses() {
        let registry = FactionRegistry::builtin();
        let config = CombatConfig::default();
        let planet = target_planet(20, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..50 {
            let mut attacker = tarren_starter(Owner::Player);
            let result = resolve_planet_assault(
                &mut attacker,
                registry.get(FactionId::Tarren),
                &planet,
                None,
                &config,
                &mut rng,
            );
            assert!(!result.captured);
            assert!((0.1..=10.0).contains(&result.ratio));
            // attack 4 vs defense 20: loss ratio hits the 0.8 cap, ceil(4.0), ceil(1.6)
            assert_eq!(result.attacker_losses["tarren_drone_fodder"], 4);
            assert_eq!(result.attacker_losses["tarren_wasp"], 2);
            assert_eq!(attacker.total_ships(), 1);
            assert!(result.defender_losses.is_empty());
        }
    }

    #[test]
    fn test_overwhelming_assault_captures() {
        let registry = FactionRegistry::builtin();
        let config = CombatConfig::default();
        let mut planet = target_planet(20, 0);
        let mut attacker = Fleet::new(FleetId(1), Owner::Player, Vec2Fixed::ZERO)
            .with_ships("tarren_drone_fodder", 5)
            .with_ships("tarren_wasp", 20);
        let mut rng = no_jitter();

        let result = resolve_planet_assault(
            &mut attacker,
            registry.get(FactionId::Tarren),
            &planet,
            None,
            &config,
            &mut rng,
        );
        // 40 vs 20: ratio 2.0, loss ratio max(0.175, 0.05)
        assert!(result.captured);
        assert!((result.ratio - 2.0).abs() < 1e-9);
        assert_eq!(result.attacker_losses["tarren_drone_fodder"], 1);
        assert_eq!(result.attacker_losses["tarren_wasp"], 4);

        capture(&mut planet, Owner::Player, &config);
        assert_eq!(planet.owner, Owner::Player);
        assert_eq!(planet.population(), 400);
    }

    #[test]
    fn test_defending_fleet_adds_defense_and_takes_losses() {
        let registry = FactionRegistry::builtin();
        let config = CombatConfig::default();
        let planet = target_planet(10, 2);
        assert_eq!(planet_defense(&planet, &config), 60);

        let mut attacker = Fleet::new(FleetId(1), Owner::Player, Vec2Fixed::ZERO)
            .with_ships("tarren_tiger", 10);
        let mut garrison = Fleet::new(FleetId(2), Owner::Ai(AiId(0)), Vec2Fixed::ZERO)
            .with_ships("korai_drone_fodder", 10);
        let result = resolve_planet_assault(
            &mut attacker,
            registry.get(FactionId::Tarren),
            &planet,
            Some((&mut garrison, registry.get(FactionId::Korai))),
            &config,
            &mut no_jitter(),
        );
        // 100 vs 60 + floor(10 * 1.4) = 74
        assert!((result.defender_power - 74.0).abs() < f64::EPSILON);
        assert!(result.captured);
        // ratio 1.35 * 0.5 = 0.675 -> floor(6.75)
        assert_eq!(result.defender_losses["korai_drone_fodder"], 6);
        assert_eq!(garrison.total_ships(), 4);
    }

    #[test]
    fn test_defending_fleet_loss_floor_with_low_min_ratio() {
        let registry = FactionRegistry::builtin();
        let config = CombatConfig {
            min_ratio: 0.01,
            ..CombatConfig::default()
        };
        let planet = target_planet(1000, 0);
        let mut attacker = Fleet::new(FleetId(1), Owner::Player, Vec2Fixed::ZERO)
            .with_ships("tarren_drone_fodder", 1);
        let mut garrison = Fleet::new(FleetId(2), Owner::Ai(AiId(0)), Vec2Fixed::ZERO)
            .with_ships("korai_drone_fodder", 100);
        let result = resolve_planet_assault(
            &mut attacker,
            registry.get(FactionId::Tarren),
            &planet,
            Some((&mut garrison, registry.get(FactionId::Korai))),
            &config,
            &mut no_jitter(),
        );
        // 1 vs 1140 clamps to 0.01; 0.01 * 0.5 lifts to the 0.05 floor
        assert!((result.ratio - 0.01).abs() < 1e-9);
        assert!(!result.captured);
        assert_eq!(result.defender_losses["korai_drone_fodder"], 5);
        assert_eq!(garrison.total_ships(), 95);
    }

    #[test]
    fn test_fleet_engagement_outcomes() {
        let registry = FactionRegistry::builtin();
        let config = CombatConfig::default();
        let light = registry.get(FactionId::Ascendancy);
        let fleet = |id, owner| {
            Fleet::new(FleetId(id), owner, Vec2Fixed::ZERO).with_ships("ascendancy_light", 10)
        };

        // identical 4/4 fleets with no jitter tie exactly
        let mut a = fleet(1, Owner::Player);
        let mut d = fleet(2, Owner::Ai(AiId(0)));
        let result = resolve_fleet_engagement(&mut a, light, &mut d, light, &config, &mut no_jitter());
        assert_eq!(result.victor, Victor::Draw);
        // ratio 1: defender floor(10 * 0.4), attacker floor(10 * 0.3)
        assert_eq!(result.defender_losses["ascendancy_light"], 4);
        assert_eq!(result.attacker_losses["ascendancy_light"], 3);

        let mut a = fleet(1, Owner::Player).with_ships("ascendancy_vision", 5);
        let mut d = fleet(2, Owner::Ai(AiId(0)));
        let result = resolve_fleet_engagement(&mut a, light, &mut d, light, &config, &mut no_jitter());
        assert_eq!(result.victor, Victor::Attacker);
        assert!((0.1..=10.0).contains(&result.ratio));
    }

    #[test]
    fn test_fleet_engagement_defender_win() {
        let registry = FactionRegistry::builtin();
        let config = CombatConfig::default();
        let tarren = registry.get(FactionId::Tarren);
        let mut a = Fleet::new(FleetId(1), Owner::Player, Vec2Fixed::ZERO)
            .with_ships("tarren_drone_striker", 2);
        let mut d = Fleet::new(FleetId(2), Owner::Ai(AiId(0)), Vec2Fixed::ZERO)
            .with_ships("tarren_tiger", 3);
        let result = resolve_fleet_engagement(&mut a, tarren, &mut d, tarren, &config, &mut no_jitter());
        assert_eq!(result.victor, Victor::Defender);
        // ratio clamps at 0.1: attacker ratio min(0.9, 3.0)
        assert!((result.ratio - 0.1).abs() < 1e-9);
        assert_eq!(result.attacker_losses["tarren_drone_striker"], 1);
        assert!(d.total_ships() == 3);
    }
}
