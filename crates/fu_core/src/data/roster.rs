//! Built-in faction tables.

use std::collections::BTreeMap;

use super::faction_data::{FactionBonuses, FactionData};
use super::ship_data::{ShipCategory, ShipData};
use crate::factions::FactionId;

/// Build the shipped table for one faction.
#[must_use]
pub fn builtin_faction(id: FactionId) -> FactionData {
    match id {
        FactionId::Tarren => tarren(),
        FactionId::Korai => korai(),
        FactionId::Reapers => reapers(),
        FactionId::Ascendancy => ascendancy(),
    }
}

fn faction(
    id: FactionId,
    colors: (&str, &str),
    description: &str,
    motto: &str,
    bonuses: (f64, f64, f64),
    ships: [(ShipCategory, Vec<ShipData>); 5],
) -> FactionData {
    FactionData {
        id,
        name: id.display_name().to_string(),
        color: colors.0.to_string(),
        secondary_color: colors.1.to_string(),
        description: description.to_string(),
        motto: motto.to_string(),
        bonuses: FactionBonuses {
            economy: bonuses.0,
            combat: bonuses.1,
            research: bonuses.2,
        },
        ships: BTreeMap::from(ships),
    }
}

fn tarren() -> FactionData {
    use ShipCategory::*;
    faction(
        FactionId::Tarren,
        ("#38bdf8", "#0ea5e9"),
        "Humanity's descendants who left Earth for the stars.",
        "Ad Astra Per Aspera - Through hardships to the stars.",
        (1.2, 1.0, 1.15),
        [
            (
                Drone,
                vec![
                    ShipData::new("tarren_drone_fodder", "Drone Fodder", 0, 1, (2, 2), 1, 0),
                    ShipData::new("tarren_drone_striker", "Drone Striker", 1, 1, (5, 2), 1, 0),
                ],
            ),
            (
                Frigate,
                vec![
                    ShipData::new("tarren_wasp", "Wasp", 2, 4, (15, 8), 2, 1),
                    ShipData::new("tarren_hornet", "Hornet", 3, 5, (19, 11), 2, 2),
                ],
            ),
            (
                Cruiser,
                vec![
                    ShipData::new("tarren_tiger", "Tiger", 10, 15, (100, 18), 4, 3),
                    ShipData::new("tarren_wolf", "Wolf", 12, 18, (125, 20), 4, 4),
                    ShipData::new("tarren_eagle", "Eagle", 15, 20, (150, 22), 4, 5),
                ],
            ),
            (
                Battleship,
                vec![ShipData::new("tarren_freedom", "Freedom", 75, 120, (50_000, 1025), 8, 6)],
            ),
            (
                Capital,
                vec![ShipData::new("tarren_titan", "Titan", 225, 300, (106_000, 9550), 15, 7)],
            ),
        ],
    )
}

fn korai() -> FactionData {
    use ShipCategory::*;
    faction(
        FactionId::Korai,
        ("#ef4444", "#dc2626"),
        "Reptilian warriors who believe in strength through contest.",
        "Kelash Mor'kai - The strong stars shine brightest.",
        (0.9, 1.4, 0.95),
        [
            (
                Drone,
                vec![
                    ShipData::new("korai_drone_fodder", "Drone Fodder", 0, 1, (2, 2), 1, 0),
                    ShipData::new("korai_drone_bomber", "Drone Bomber", 2, 1, (5, 3), 1, 0),
                ],
            ),
            (
                Frigate,
                vec![
                    ShipData::new("korai_solar", "Solar", 2, 4, (16, 7), 2, 1),
                    ShipData::new("korai_ray", "Ray", 3, 5, (20, 9), 2, 2),
                ],
            ),
            (
                Cruiser,
                vec![
                    ShipData::new("korai_fang", "Fang", 10, 12, (140, 22), 4, 3),
                    ShipData::new("korai_thorn", "Thorn", 12, 15, (160, 25), 4, 4),
                ],
            ),
            (
                Battleship,
                vec![ShipData::new("korai_basilisk", "Basilisk", 150, 125, (75_000, 1550), 8, 5)],
            ),
            (
                Capital,
                vec![ShipData::new("korai_venom", "Venom", 180, 250, (100_500, 6000), 15, 6)],
            ),
        ],
    )
}

fn reapers() -> FactionData {
    use ShipCategory::*;
    faction(
        FactionId::Reapers,
        ("#a855f7", "#9333ea"),
        "Scavenger pirates who became the galaxy's ultimate predators.",
        "Kesh vek marr - Fortune favors the bold.",
        (1.1, 1.2, 1.0),
        [
            (
                Drone,
                vec![ShipData::new("reapers_drone_fodder", "Drone Fodder", 0, 1, (2, 2), 1, 0)],
            ),
            (
                Frigate,
                vec![
                    ShipData::new("reapers_diy_dart", "DIY Dart", 5, 2, (12, 14), 2, 1),
                    ShipData::new("reapers_duct_taped_zero", "Duct Taped Zero", 7, 3, (15, 17), 2, 2),
                ],
            ),
            (
                Cruiser,
                vec![
                    ShipData::new(
                        "reapers_reinforced_rusty",
                        "Reinforced Rusty Cruiser",
                        18,
                        20,
                        (250, 45),
                        4,
                        3,
                    ),
                    ShipData::new("reapers_papst", "Papst", 22, 25, (300, 55), 4, 4),
                ],
            ),
            (
                Battleship,
                vec![ShipData::new("reapers_winnebago", "Winnebago", 90, 85, (38_000, 1150), 8, 5)],
            ),
            (
                Capital,
                vec![ShipData::new(
                    "reapers_confederacy",
                    "Confederacy",
                    230,
                    225,
                    (100_500, 10_000),
                    15,
                    6,
                )],
            ),
        ],
    )
}

fn ascendancy() -> FactionData {
    use ShipCategory::*;
    faction(
        FactionId::Ascendancy,
        ("#fbbf24", "#f59e0b"),
        "Religious zealots seeking transcendence through Ancient technology.",
        "Unity through Convergence. Transcendence through Faith.",
        (1.0, 1.1, 1.3),
        [
            (
                Drone,
                vec![ShipData::new("ascendancy_drone_fodder", "Drone Fodder", 0, 1, (2, 2), 1, 0)],
            ),
            (
                Frigate,
                vec![
                    ShipData::new("ascendancy_light", "Light", 4, 4, (14, 6), 2, 1),
                    ShipData::new("ascendancy_acolyte", "Acolyte", 5, 5, (18, 8), 2, 2),
                ],
            ),
            (
                Cruiser,
                vec![
                    ShipData::new("ascendancy_vision", "Vision", 20, 20, (160, 28), 4, 3),
                    ShipData::new("ascendancy_divine", "Divine", 22, 22, (180, 32), 4, 4),
                    ShipData::new("ascendancy_truth", "Truth", 25, 25, (200, 35), 4, 5),
                ],
            ),
            (
                Battleship,
                vec![
                    ShipData::new("ascendancy_tempest", "Tempest", 100, 100, (40_000, 800), 8, 6),
                    ShipData::new(
                        "ascendancy_transcendence",
                        "Transcendence",
                        120,
                        115,
                        (45_000, 875),
                        8,
                        7,
                    ),
                    ShipData::new("ascendancy_rebirth", "Rebirth", 135, 130, (50_000, 950), 8, 8),
                ],
            ),
            (
                Capital,
                vec![ShipData::new(
                    "ascendancy_holy_endeavour",
                    "Holy Endeavour",
                    225,
                    250,
                    (95_000, 9000),
                    15,
                    9,
                )],
            ),
        ],
    )
}
