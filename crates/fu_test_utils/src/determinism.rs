//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation produces identical
//! results given the same seed and the same commands.
//!
//! # Testing Strategy
//!
//! Every random draw in `fu_core` comes from the simulation's own seeded
//! `ChaCha8Rng`. Sources of non-determinism to guard against:
//!
//! - **Unordered iteration**: fleets, AIs and tech trees live in `BTreeMap`s
//!   so every pass walks them in id order.
//!
//! - **Ambient randomness**: nothing may call `thread_rng()`; all draws go
//!   through the injected generator.
//!
//! - **Snapshot gaps**: any state missing from the bincode snapshot
//!   (including the generator) makes restored games diverge.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual subsystems with pinned generators
//! 2. **Property tests**: random seeds and command sequences replay exactly
//! 3. **Integration tests**: full games are reproducible
//! 4. **Parallel tests**: N simulations on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use fu_core::simulation::{Command, Simulation};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a [`Simulation`] twice from the same setup and compare final hashes.
///
/// # Example
///
/// ```
/// use fu_core::factions::FactionId;
/// use fu_test_utils::determinism::verify_simulation_determinism;
/// use fu_test_utils::fixtures::started_sim;
///
/// assert!(verify_simulation_determinism(|| started_sim(FactionId::Reapers, 7), 50));
/// ```
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim| {
            sim.tick();
        },
        |sim| sim.state_hash(),
    );
    result.is_deterministic
}

/// Replay a command script twice and compare final hashes.
///
/// Each `(tick, command)` is executed right before the simulation reaches
/// that tick. Rejected commands are part of the script and must be
/// rejected identically.
pub fn verify_replay_determinism<F>(setup_fn: F, script: &[(u64, Command)], num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let replay = || {
        let mut sim = setup_fn();
        let mut rejected = 0usize;
        for tick in 0..num_ticks {
            for (_, command) in script.iter().filter(|(at, _)| *at == tick) {
                if sim.execute(command.clone()).is_err() {
                    rejected += 1;
                }
            }
            sim.tick();
        }
        (sim.state_hash(), rejected)
    };
    replay() == replay()
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of ticks each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> ParallelSimResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        sim.tick();
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two simulation runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if simulations are deterministic, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        sim1.tick();
        sim2.tick();

        if sim1.state_hash() != sim2.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Verify that a snapshot taken after `num_ticks` restores the same state
/// and keeps evolving identically for `resume_ticks` more.
pub fn verify_serialization_determinism<F>(setup_fn: F, num_ticks: u64, resume_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let mut sim = setup_fn();
    for _ in 0..num_ticks {
        sim.tick();
    }

    let Ok(bytes) = sim.serialize() else {
        return false;
    };
    let Ok(mut restored) = Simulation::deserialize(&bytes) else {
        return false;
    };
    if restored.state_hash() != sim.state_hash() {
        return false;
    }

    for _ in 0..resume_ticks {
        sim.tick();
        restored.tick();
    }
    restored.state_hash() == sim.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
pub mod strategies {
    use fu_core::components::{FleetId, PlanetId, StructureKind};
    use fu_core::data::project_id_for_ship;
    use fu_core::factions::FactionId;
    use fu_core::simulation::Command;
    use proptest::prelude::*;

    /// Any seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Any faction.
    pub fn arb_faction() -> impl Strategy<Value = FactionId> {
        prop::sample::select(FactionId::ALL.to_vec())
    }

    /// Any structure.
    pub fn arb_structure() -> impl Strategy<Value = StructureKind> {
        prop::sample::select(StructureKind::ALL.to_vec())
    }

    /// A planet id inside the default galaxy.
    pub fn arb_planet() -> impl Strategy<Value = PlanetId> {
        (0u32..150).prop_map(PlanetId)
    }

    /// A fleet id likely to exist early in a game.
    pub fn arb_fleet() -> impl Strategy<Value = FleetId> {
        (1u64..8).prop_map(FleetId)
    }

    /// A design id from any roster, valid or not for the player.
    pub fn arb_ship_id() -> impl Strategy<Value = String> {
        prop::sample::select(vec![
            "tarren_drone_fodder",
            "tarren_wasp",
            "korai_drone_fodder",
            "korai_ray",
            "reapers_drone_fodder",
            "ascendancy_light",
            "not_a_ship",
        ])
        .prop_map(String::from)
    }

    /// Any in-game command; many will be rejected, which is fine.
    pub fn arb_command() -> impl Strategy<Value = Command> {
        prop_oneof![
            (arb_fleet(), arb_planet())
                .prop_map(|(fleet, destination)| Command::SendFleet { fleet, destination }),
            (arb_planet(), arb_ship_id())
                .prop_map(|(planet, ship_id)| Command::BuildShip { planet, ship_id }),
            (arb_planet(), arb_structure())
                .prop_map(|(planet, kind)| Command::UpgradeStructure { planet, kind }),
            (arb_planet(), arb_fleet()).prop_map(|(planet, fleet)| Command::Colonize { planet, fleet }),
            (arb_fleet(), arb_planet()).prop_map(|(fleet, planet)| Command::AttackPlanet { fleet, planet }),
            (arb_fleet(), arb_fleet())
                .prop_map(|(attacker, defender)| Command::AttackFleet { attacker, defender }),
            arb_ship_id().prop_map(|ship| Command::StartResearch {
                project: project_id_for_ship(&ship)
            }),
            Just(Command::TogglePause),
        ]
    }

    /// A script of `(tick, command)` pairs within the first `max_tick` ticks.
    pub fn arb_command_script(max_len: usize, max_tick: u64) -> impl Strategy<Value = Vec<(u64, Command)>> {
        proptest::collection::vec((0..max_tick, arb_command()), 0..max_len)
    }
}
