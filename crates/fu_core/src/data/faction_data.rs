//! Faction data structure combining all faction-specific definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::roster;
use super::ship_data::{ShipCategory, ShipData};
use crate::error::{GameError, Result};
use crate::factions::FactionId;

/// Multipliers a faction applies to economy, combat and research.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactionBonuses {
    /// Multiplier on every resource yield.
    pub economy: f64,
    /// Multiplier on fleet attack and defense power.
    pub combat: f64,
    /// Multiplier on research progress per tick.
    pub research: f64,
}

impl Default for FactionBonuses {
    fn default() -> Self {
        Self {
            economy: 1.0,
            combat: 1.0,
            research: 1.0,
        }
    }
}

/// Complete faction data definition.
///
/// # Example RON
///
/// ```ron
/// FactionData(
///     id: Tarren,
///     name: "Tarren Republic",
///     color: "#38bdf8",
///     secondary_color: "#0ea5e9",
///     description: "...",
///     motto: "...",
///     bonuses: FactionBonuses(economy: 1.2, combat: 1.0, research: 1.15),
///     ships: { Drone: [...], Frigate: [...] },
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionData {
    /// Faction identifier.
    pub id: FactionId,

    /// Display name.
    pub name: String,

    /// Primary UI color (hex).
    #[serde(default = "default_color")]
    pub color: String,

    /// Secondary UI color (hex).
    #[serde(default = "default_color")]
    pub secondary_color: String,

    /// One-line description.
    #[serde(default)]
    pub description: String,

    /// Faction motto.
    #[serde(default)]
    pub motto: String,

    /// Economic, combat and research multipliers.
    #[serde(default)]
    pub bonuses: FactionBonuses,

    /// Ship designs grouped by category, each group in roster order.
    pub ships: BTreeMap<ShipCategory, Vec<ShipData>>,
}

fn default_color() -> String {
    "#ffffff".to_string()
}

impl FactionData {
    /// Iterate every ship design in (category, roster) order.
    pub fn ships(&self) -> impl Iterator<Item = (ShipCategory, &ShipData)> {
        self.ships
            .iter()
            .flat_map(|(category, ships)| ships.iter().map(move |ship| (*category, ship)))
    }

    /// Find a ship design by its ID.
    #[must_use]
    pub fn get_ship(&self, id: &str) -> Option<&ShipData> {
        self.ships().map(|(_, ship)| ship).find(|ship| ship.id == id)
    }

    /// Ships of a single category in roster order.
    #[must_use]
    pub fn ships_in(&self, category: ShipCategory) -> &[ShipData] {
        self.ships.get(&category).map_or(&[], Vec::as_slice)
    }

    /// The cheapest drone buildable without research.
    #[must_use]
    pub fn cheapest_starter_drone(&self) -> Option<&ShipData> {
        self.ships_in(ShipCategory::Drone)
            .iter()
            .filter(|ship| ship.is_starter())
            .min_by_key(|ship| ship.cost.credits + ship.cost.metal)
    }

    /// Validate internal consistency of faction data.
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.cheapest_starter_drone().is_none() {
            errors.push(format!("Faction '{}' has no tier-0 drone", self.name));
        }

        let mut seen = std::collections::BTreeSet::new();
        for (_, ship) in self.ships() {
            if !seen.insert(ship.id.as_str()) {
                errors.push(format!("Ship id '{}' is defined twice", ship.id));
            }
        }

        let bonuses = [
            ("economy", self.bonuses.economy),
            ("combat", self.bonuses.combat),
            ("research", self.bonuses.research),
        ];
        for (name, value) in bonuses {
            if !(value >= 0.0 && value.is_finite()) {
                errors.push(format!(
                    "Faction '{}' has invalid {name} bonus {value}",
                    self.name
                ));
            }
        }

        errors
    }
}

/// The immutable set of faction tables a game is played with.
///
/// Always holds exactly one entry per [`FactionId`], which is checked on
/// construction and on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FactionData>", into = "Vec<FactionData>")]
pub struct FactionRegistry {
    factions: Vec<FactionData>,
}

impl FactionRegistry {
    /// The built-in faction tables.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            factions: FactionId::ALL.into_iter().map(roster::builtin_faction).collect(),
        }
    }

    /// Parse a registry from a RON list of [`FactionData`].
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let factions: Vec<FactionData> =
            ron::from_str(source).map_err(|e| GameError::DataParseError {
                what: "faction tables".to_string(),
                message: e.to_string(),
            })?;
        Self::try_from(factions).map_err(|message| GameError::DataParseError {
            what: "faction tables".to_string(),
            message,
        })
    }

    /// Look up a faction's data.
    #[must_use]
    pub fn get(&self, id: FactionId) -> &FactionData {
        &self.factions[id as usize]
    }

    /// Iterate all factions in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &FactionData> {
        self.factions.iter()
    }
}

impl Default for FactionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TryFrom<Vec<FactionData>> for FactionRegistry {
    type Error = String;

    fn try_from(mut factions: Vec<FactionData>) -> std::result::Result<Self, Self::Error> {
        factions.sort_by_key(|f| f.id);
        let ids: Vec<FactionId> = factions.iter().map(|f| f.id).collect();
        if ids != FactionId::ALL {
            return Err(format!(
                "expected exactly one table per faction {:?}, got {:?}",
                FactionId::ALL,
                ids
            ));
        }

        let errors: Vec<String> = factions.iter().flat_map(FactionData::validate).collect();
        if !errors.is_empty() {
            return Err(errors.join("; "));
        }

        Ok(Self { factions })
    }
}

impl From<FactionRegistry> for Vec<FactionData> {
    fn from(registry: FactionRegistry) -> Self {
        registry.factions
    }
}
