//! Planet type tables: biome modifiers and size classes.

use serde::{Deserialize, Serialize};

/// Percentage adjustments a biome applies to base yields.
///
/// `-100` means the yield is zero (and for population: uninhabitable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetModifier {
    /// Metal yield percentage.
    pub metal: i32,
    /// Fuel yield percentage.
    pub fuel: i32,
    /// Population capacity percentage.
    pub population: i32,
    /// Food yield percentage.
    pub food: i32,
}

impl PlanetModifier {
    /// Convert a percentage modifier into a multiplicative factor.
    #[must_use]
    pub fn factor(percent: i32) -> f64 {
        1.0 + f64::from(percent) / 100.0
    }
}

/// Planet biome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    /// Temperate, balanced world.
    Balanced,
    /// Arid desert.
    Desert,
    /// Ocean world.
    Water,
    /// Frozen world.
    Ice,
    /// Forest world.
    Forest,
    /// Airless rock.
    Barren,
    /// Gas giant.
    Gas,
}

impl Biome {
    /// Every biome, in the order galaxy generation samples from.
    pub const ALL: [Biome; 7] = [
        Biome::Balanced,
        Biome::Desert,
        Biome::Water,
        Biome::Ice,
        Biome::Forest,
        Biome::Barren,
        Biome::Gas,
    ];

    /// Yield modifiers for this biome.
    #[must_use]
    pub const fn modifier(self) -> PlanetModifier {
        let (metal, fuel, population, food) = match self {
            Biome::Balanced => (-25, -50, 75, 50),
            Biome::Desert => (25, -50, -100, -100),
            Biome::Water => (25, -100, -100, 25),
            Biome::Ice => (-25, 50, -100, -100),
            Biome::Forest => (25, -50, 50, 100),
            Biome::Barren => (75, -25, 50, -100),
            Biome::Gas => (-100, 100, -100, -100),
        };
        PlanetModifier {
            metal,
            fuel,
            population,
            food,
        }
    }
}

/// Planet size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    /// Small world.
    Small,
    /// Medium world.
    Medium,
    /// Large world.
    Large,
}

impl SizeClass {
    /// Every size class.
    pub const ALL: [SizeClass; 3] = [SizeClass::Small, SizeClass::Medium, SizeClass::Large];

    /// Base credit income before jitter.
    #[must_use]
    pub const fn base_income(self) -> u32 {
        match self {
            SizeClass::Small => 10,
            SizeClass::Medium => 20,
            SizeClass::Large => 35,
        }
    }

    /// Population capacity before the biome modifier.
    #[must_use]
    pub const fn base_population(self) -> u32 {
        match self {
            SizeClass::Small => 500,
            SizeClass::Medium => 1500,
            SizeClass::Large => 3000,
        }
    }

    /// Population capacity after applying a biome's population modifier,
    /// floored at zero.
    #[must_use]
    pub fn population_capacity(self, biome: Biome) -> u32 {
        let factor = PlanetModifier::factor(biome.modifier().population);
        (f64::from(self.base_population()) * factor).floor().max(0.0) as u32
    }
}
