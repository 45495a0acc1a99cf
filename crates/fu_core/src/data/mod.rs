//! Static game data: faction rosters, planet tables and tech trees.
//!
//! Everything here is plain data that can be deserialized from RON. The
//! built-in tables live in code so the core needs no files at runtime.

mod faction_data;
mod planet_data;
mod roster;
mod ship_data;
mod tech_data;

pub use faction_data::{FactionBonuses, FactionData, FactionRegistry};
pub use planet_data::{Biome, PlanetModifier, SizeClass};
pub use ship_data::{ShipCategory, ShipCost, ShipData};
pub use tech_data::{project_id_for_ship, ResearchCost, ResearchProject, TechTree};
