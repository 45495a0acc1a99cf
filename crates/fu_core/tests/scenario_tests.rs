//! End-to-end scenarios over the world and the scheduler.
//!
//! These drive the same validated paths the command surface uses, with
//! seeded generators so every outcome is reproducible.

use fu_core::components::{AiId, Owner, PlanetId, Resources};
use fu_core::config::{CombatConfig, SimConfig};
use fu_core::data::{project_id_for_ship, FactionRegistry};
use fu_core::error::GameError;
use fu_core::factions::FactionId;
use fu_core::simulation::{Command, GamePhase};
use fu_core::world::WorldState;
use fu_test_utils::balance::fleet_trials;
use fu_test_utils::fixtures::{self, fleet, started_sim, started_sim_with, DEFAULT_SEED};
use fu_test_utils::leaderboard::InMemoryLeaderboard;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn new_world(seed: u64) -> (WorldState, FactionRegistry, SimConfig, ChaCha8Rng) {
    let registry = FactionRegistry::builtin();
    let config = SimConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let world = WorldState::new_game(FactionId::Tarren, &registry, &config, &mut rng);
    (world, registry, config, rng)
}

/// Hand a neutral planet to AI 0 with the given defense and population.
fn hostile_outpost(world: &mut WorldState, id: PlanetId, defense: u32) {
    let planet = world.galaxy.get_mut(id).expect("planet");
    planet.owner = Owner::Ai(AiId(0));
    planet.defense = defense;
    planet.structures.defense_grid = 0;
    planet.set_population_cap(5000);
    planet.set_population(800);
}

// =============================================================================
// Planet assaults
// =============================================================================

mod assault {
    use super::*;

    #[test]
    fn test_starter_fleet_is_repelled_by_defense_twenty() {
        // 5 drones (0/1) and 2 frigates (2/4) roll at most 5.2 attack
        let (mut world, registry, config, mut rng) = new_world(DEFAULT_SEED);
        hostile_outpost(&mut world, PlanetId(20), 20);
        let attacker = world.spawn_fleet(Owner::Player, Default::default());
        world.fleets.insert(
            attacker,
            fleet(attacker.0, Owner::Player, 0, 0, &[("tarren_drone_fodder", 5), ("tarren_wasp", 2)]),
        );

        let report = world
            .assault_planet(attacker, PlanetId(20), &registry, &config, &mut rng, 1)
            .expect("assault");
        assert!(!report.captured);
        assert_eq!(report.event.attacker_losses["tarren_drone_fodder"], 4);
        assert_eq!(report.event.attacker_losses["tarren_wasp"], 2);
        assert_eq!(world.fleets[&attacker].total_ships(), 1);
        assert_eq!(world.galaxy.get(PlanetId(20)).map(|p| p.owner), Some(Owner::Ai(AiId(0))));
    }

    #[test]
    fn test_superior_fleet_captures_with_bounded_losses() {
        let (mut world, registry, config, mut rng) = new_world(DEFAULT_SEED);
        hostile_outpost(&mut world, PlanetId(20), 20);
        let attacker = world.spawn_fleet(Owner::Player, Default::default());
        world.fleets.insert(
            attacker,
            fleet(attacker.0, Owner::Player, 0, 0, &[("tarren_drone_fodder", 5), ("tarren_wasp", 20)]),
        );

        let report = world
            .assault_planet(attacker, PlanetId(20), &registry, &config, &mut rng, 1)
            .expect("assault");
        assert!(report.captured);
        assert_eq!(report.defender, Owner::Ai(AiId(0)));
        let lost: u32 = report.event.attacker_losses.values().sum();
        assert!(lost > 0 && lost < 25, "lost {lost}");
        assert_eq!(report.event.winner, "Player");

        let planet = world.galaxy.get(PlanetId(20)).expect("planet");
        assert_eq!(planet.owner, Owner::Player);
        assert_eq!(planet.population(), 400);
        assert_eq!(world.player.score, config.scoring.capture_award);
        assert!(report.eliminated.is_none());
    }

    #[test]
    fn test_losing_last_planet_eliminates_ai() {
        let (mut world, registry, config, mut rng) = new_world(DEFAULT_SEED);
        let victim = Owner::Ai(AiId(2));
        let home = world.ais[&AiId(2)].empire.homeworld;
        if let Some(planet) = world.galaxy.get_mut(home) {
            planet.defense = 0;
            planet.structures.defense_grid = 0;
        }
        world.fleets.retain(|_, f| f.owner != victim);
        // park one fleet far away to check it is removed too
        let stray = world.spawn_fleet(victim, Default::default());
        world.fleets.insert(stray, fleet(stray.0, victim, 0, 0, &[("ascendancy_light", 3)]));

        let attacker = world.spawn_fleet(Owner::Player, Default::default());
        world
            .fleets
            .insert(attacker, fleet(attacker.0, Owner::Player, 0, 0, &[("tarren_tiger", 50)]));

        let report = world
            .assault_planet(attacker, home, &registry, &config, &mut rng, 1)
            .expect("assault");
        assert!(report.captured);
        assert_eq!(report.eliminated.map(|ai| ai.id), Some(AiId(2)));
        assert!(!world.ais.contains_key(&AiId(2)));
        assert!(world.fleets.values().all(|f| f.owner != victim));
        assert_eq!(
            world.player.score,
            config.scoring.capture_award + config.scoring.elimination_award
        );
    }
}

// =============================================================================
// Fleet engagements
// =============================================================================

mod engagement {
    use super::*;

    #[test]
    fn test_identical_fleets_produce_every_outcome() {
        let registry = FactionRegistry::builtin();
        let faction = registry.get(FactionId::Ascendancy);
        let ships = [("ascendancy_light", 10)];
        let a = fleet(1, Owner::Player, 0, 0, &ships);
        let d = fleet(2, Owner::Ai(AiId(0)), 0, 0, &ships);

        let stats = fleet_trials(&a, faction, &d, faction, &CombatConfig::default(), 500, DEFAULT_SEED);
        assert!(stats.draws > 0);
        assert!(stats.attacker_wins > 0);
        assert!(stats.defender_wins > 0);
        assert!(stats.min_ratio >= 0.1 && stats.max_ratio <= 10.0);
    }

    #[test]
    fn test_garrisons_clash_without_panicking_for_any_seed() {
        let registry = FactionRegistry::builtin();
        for seed in 0..50 {
            let (mut world, _, config, mut rng) = new_world(seed);
            let player = fixtures_first(&world, Owner::Player);
            let enemy = fixtures_first(&world, Owner::Ai(AiId(0)));
            let report = world
                .engage_fleets(player, enemy, &registry, &config, &mut rng, 1)
                .expect("engagement");
            assert!(["Player", "Kor'ai Empire", "Draw"].contains(&report.event.winner.as_str()));
            assert!(world.fleets.values().all(|f| !f.is_empty()));
        }
    }

    fn fixtures_first(world: &WorldState, owner: Owner) -> fu_core::components::FleetId {
        world
            .fleets
            .values()
            .find(|f| f.owner == owner)
            .map(|f| f.id)
            .expect("garrison")
    }
}

// =============================================================================
// Commands through the scheduler
// =============================================================================

mod commands {
    use super::*;

    #[test]
    fn test_research_without_credits_changes_nothing() {
        let mut config = SimConfig::default();
        config.start.resources = Resources {
            credits: 5,
            metal: 1000,
            fuel: 500,
            food: 500,
        };
        let mut sim = started_sim_with(config, FactionId::Tarren, DEFAULT_SEED);
        let before = sim.player().map(|p| p.resources);

        let result = sim.execute(Command::StartResearch {
            project: project_id_for_ship("tarren_wasp"),
        });
        assert!(matches!(
            result,
            Err(GameError::InsufficientResources {
                resource: "credits",
                ..
            })
        ));
        let player = sim.player().expect("player");
        assert!(player.research.current().is_none());
        assert_eq!(Some(player.resources), before);
    }

    #[test]
    fn test_arrived_fleet_stays_put() {
        let mut sim = started_sim(FactionId::Korai, DEFAULT_SEED);
        let fleet = fixtures::first_fleet_of(&sim, Owner::Player).expect("fleet");
        sim.execute(Command::SendFleet {
            fleet,
            destination: PlanetId(12),
        })
        .expect("send");

        let mut arrivals = 0;
        for _ in 0..250 {
            arrivals += sim.tick().arrivals.iter().filter(|a| a.fleet == fleet).count();
        }
        assert_eq!(arrivals, 1);
        let world = sim.world().expect("world");
        let target = world.galaxy.get(PlanetId(12)).expect("planet").position;
        let parked = &world.fleets[&fleet];
        assert_eq!(parked.position, target);
        assert!(!parked.is_moving());
    }

    #[test]
    fn test_colonize_command_claims_planet() {
        let mut sim = started_sim(FactionId::Reapers, DEFAULT_SEED);
        let fleet = fixtures::first_fleet_of(&sim, Owner::Player).expect("fleet");
        sim.execute(Command::Colonize {
            planet: PlanetId(40),
            fleet,
        })
        .expect("colonize");
        let world = sim.world().expect("world");
        assert_eq!(world.planets_owned(Owner::Player), 2);
        assert_eq!(
            sim.notifications().latest().map(|n| n.message.clone()),
            world.galaxy.get(PlanetId(40)).map(|p| format!("{} colonized!", p.name))
        );
    }

    #[test]
    fn test_repelled_attack_keeps_game_running_and_scores() {
        let mut sim = started_sim(FactionId::Tarren, DEFAULT_SEED);
        let mut board = InMemoryLeaderboard::new();

        sim.execute(Command::AttackPlanet {
            fleet: fixtures::first_fleet_of(&sim, Owner::Player).expect("fleet"),
            planet: PlanetId(1),
        })
        .expect("attack");
        assert_eq!(sim.phase(), GamePhase::Playing);

        let entry = sim
            .submit_score("Commander", &mut board)
            .expect("infallible")
            .expect("entry");
        assert_eq!(entry.faction, FactionId::Tarren);
        assert_eq!(board.entries(), &[entry]);
    }
}
