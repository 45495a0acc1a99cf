//! Galaxy generation and planet lookup.
//!
//! A galaxy holds one homeworld per faction at fixed anchor points plus
//! neutral planets scattered with a minimum-separation rule. Placement uses
//! a bounded retry budget: once it is spent the last candidate is accepted
//! even if it crowds a neighbour, so generation always terminates.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{AiId, Owner, Planet, PlanetId};
use crate::config::GalaxyConfig;
use crate::data::{Biome, SizeClass};
use crate::factions::FactionId;
use crate::math::{Fixed, Vec2Fixed};

const PLANET_PREFIXES: [&str; 25] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Theta", "Omega", "Nova", "Proxima",
    "Kepler", "Gliese", "Tau", "Sigma", "Vega", "Rigel", "Altair", "Deneb", "Sirius", "Arcturus",
    "Polaris", "Antares", "Betelgeuse", "Capella", "Aldebaran",
];

const PLANET_SUFFIXES: [&str; 15] = [
    "Prime", "Major", "Minor", "Station", "Colony", "Outpost", "Haven", "Reach", "Frontier",
    "Gate", "Hub", "Nexus", "Core", "Edge", "Point",
];

const ROMAN_NUMERALS: [&str; 12] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
];

/// Name of the `index`-th neutral planet.
///
/// Cycles prefixes fastest, then suffixes, then numerals.
#[must_use]
pub fn planet_name(index: usize) -> String {
    let prefix = PLANET_PREFIXES[index % PLANET_PREFIXES.len()];
    let suffix = PLANET_SUFFIXES[(index / PLANET_PREFIXES.len()) % PLANET_SUFFIXES.len()];
    let numeral = ROMAN_NUMERALS
        [(index / (PLANET_PREFIXES.len() * PLANET_SUFFIXES.len())) % ROMAN_NUMERALS.len()];
    format!("{prefix} {suffix} {numeral}")
}

/// The set of planets in play. Planet ids are indices into this list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Galaxy {
    planets: Vec<Planet>,
}

impl Galaxy {
    /// Wrap an existing planet list, renumbering ids to match positions.
    #[must_use]
    pub fn from_planets(mut planets: Vec<Planet>) -> Self {
        for (index, planet) in planets.iter_mut().enumerate() {
            planet.id = PlanetId(index as u32);
        }
        Self { planets }
    }

    /// Generate a galaxy for a player faction.
    ///
    /// Planet 0 is the player's homeworld, planets 1..=3 are the AI
    /// homeworlds in faction order, the rest are neutral.
    pub fn generate<R: Rng + ?Sized>(
        player_faction: FactionId,
        config: &GalaxyConfig,
        rng: &mut R,
    ) -> Self {
        let width = f64::from(config.width);
        let height = f64::from(config.height);
        let mut planets = Vec::with_capacity(config.total_planets as usize);

        let player_anchor = Vec2Fixed::from_num(300.0, height / 2.0);
        planets.push(homeworld(PlanetId(0), player_faction, Owner::Player, player_anchor, config));

        let ai_anchors = [
            Vec2Fixed::from_num(width - 300.0, 400.0),
            Vec2Fixed::from_num(width - 300.0, height - 400.0),
            Vec2Fixed::from_num(width / 2.0, 200.0),
        ];
        for (i, (faction, anchor)) in FactionId::opponents_of(player_faction)
            .zip(ai_anchors)
            .enumerate()
        {
            let owner = Owner::Ai(AiId(i as u8));
            planets.push(homeworld(PlanetId(planets.len() as u32), faction, owner, anchor, config));
        }

        let homeworld_count = planets.len();
        let neutrals = (config.total_planets as usize).saturating_sub(homeworld_count);
        for index in 0..neutrals {
            let position = place(&planets, config, rng);
            let size = SizeClass::ALL[rng.gen_range(0..SizeClass::ALL.len())];
            let biome = Biome::ALL[rng.gen_range(0..Biome::ALL.len())];
            let id = PlanetId(planets.len() as u32);

            let mut planet = Planet::new(id, planet_name(index), position, size, biome);
            planet.base_income = size.base_income() + rng.gen_range(0..10);
            planet.defense = 10 + rng.gen_range(0..30);
            planets.push(planet);
        }

        tracing::debug!(
            planets = planets.len(),
            homeworlds = homeworld_count,
            "Generated galaxy"
        );
        Self { planets }
    }

    /// Look up a planet.
    #[must_use]
    pub fn get(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(id.0 as usize)
    }

    /// Look up a planet mutably.
    #[must_use]
    pub fn get_mut(&mut self, id: PlanetId) -> Option<&mut Planet> {
        self.planets.get_mut(id.0 as usize)
    }

    /// All planets in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Planet> {
        self.planets.iter()
    }

    /// All planets mutably in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Planet> {
        self.planets.iter_mut()
    }

    /// Planets controlled by `owner`.
    pub fn owned_by(&self, owner: Owner) -> impl Iterator<Item = &Planet> {
        self.planets.iter().filter(move |p| p.owner == owner)
    }

    /// Planets controlled by `owner`, mutably.
    pub fn owned_by_mut(&mut self, owner: Owner) -> impl Iterator<Item = &mut Planet> {
        self.planets.iter_mut().filter(move |p| p.owner == owner)
    }

    /// Number of planets controlled by `owner`.
    #[must_use]
    pub fn count_owned(&self, owner: Owner) -> usize {
        self.owned_by(owner).count()
    }

    /// First planet whose proximity box contains `position`.
    #[must_use]
    pub fn planet_near(&self, position: Vec2Fixed, radius: Fixed) -> Option<&Planet> {
        self.planets
            .iter()
            .find(|p| p.position.within_box(position, radius))
    }

    /// Number of planets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.planets.len()
    }

    /// Whether the galaxy has no planets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }
}

fn homeworld(
    id: PlanetId,
    faction: FactionId,
    owner: Owner,
    position: Vec2Fixed,
    config: &GalaxyConfig,
) -> Planet {
    let template = &config.homeworld;
    let mut planet = Planet::new(
        id,
        faction.homeworld_name().to_string(),
        position,
        SizeClass::Large,
        Biome::Balanced,
    );
    planet.owner = owner;
    planet.base_income = template.base_income;
    planet.defense = template.defense;
    planet.set_population_cap(template.population_cap);
    planet.set_population(template.population);
    planet.structures = template.structures;
    planet
}

/// Sample a neutral position, retrying while it crowds an existing planet.
fn place<R: Rng + ?Sized>(placed: &[Planet], config: &GalaxyConfig, rng: &mut R) -> Vec2Fixed {
    let margin = f64::from(config.margin);
    let max_x = (f64::from(config.width) - margin).max(margin + 1.0);
    let max_y = (f64::from(config.height) - margin).max(margin + 1.0);
    let min_sq = Fixed::from_num(config.min_separation) * Fixed::from_num(config.min_separation);

    let mut sample = || Vec2Fixed::from_num(rng.gen_range(margin..max_x), rng.gen_range(margin..max_y));

    for _ in 0..config.placement_attempts {
        let candidate = sample();
        if placed
            .iter()
            .all(|p| p.position.distance_squared(candidate) >= min_sq)
        {
            return candidate;
        }
    }
    sample()
}
