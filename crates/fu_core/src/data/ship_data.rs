//! Ship data structures for data-driven roster definitions.

use serde::{Deserialize, Serialize};

/// Size category a ship design belongs to.
///
/// The declaration order is the roster order used to derive the research
/// chain, so `Ord` is meaningful here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShipCategory {
    /// Expendable drones, always buildable.
    Drone,
    /// Light escorts.
    Frigate,
    /// Line cruisers.
    Cruiser,
    /// Heavy battleships.
    Battleship,
    /// Capital flagships.
    Capital,
}

impl ShipCategory {
    /// All categories in roster order.
    pub const ALL: [ShipCategory; 5] = [
        ShipCategory::Drone,
        ShipCategory::Frigate,
        ShipCategory::Cruiser,
        ShipCategory::Battleship,
        ShipCategory::Capital,
    ];

    /// Lowercase label used in descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Drone => "drone",
            Self::Frigate => "frigate",
            Self::Cruiser => "cruiser",
            Self::Battleship => "battleship",
            Self::Capital => "capital ship",
        }
    }
}

/// Construction cost of one ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShipCost {
    /// Credits required.
    pub credits: u64,
    /// Metal required.
    pub metal: u64,
}

/// Data-driven ship definition.
///
/// # Example RON
///
/// ```ron
/// ShipData(
///     id: "tarren_wasp",
///     name: "Wasp",
///     attack: 2,
///     defense: 4,
///     cost: ShipCost(credits: 15, metal: 8),
///     build_time: 2,
///     tier: 1,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipData {
    /// Unique string identifier, also the key in fleet ship maps.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Attack contribution per ship.
    pub attack: u32,

    /// Defense contribution per ship.
    pub defense: u32,

    /// Credits and metal needed to build one.
    pub cost: ShipCost,

    /// Nominal build time in ticks.
    #[serde(default = "default_build_time")]
    pub build_time: u32,

    /// Research tier. Tier 0 is always available; higher tiers need the
    /// matching research project.
    #[serde(default)]
    pub tier: u8,
}

const fn default_build_time() -> u32 {
    1
}

impl ShipData {
    /// Create a ship definition.
    #[must_use]
    pub fn new(
        id: &str,
        name: &str,
        attack: u32,
        defense: u32,
        cost: (u64, u64),
        build_time: u32,
        tier: u8,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            attack,
            defense,
            cost: ShipCost {
                credits: cost.0,
                metal: cost.1,
            },
            build_time,
            tier,
        }
    }

    /// Whether this design can be built without research.
    #[must_use]
    pub const fn is_starter(&self) -> bool {
        self.tier == 0
    }
}
