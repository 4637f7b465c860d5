//! Static content catalog: the five districts and every building archetype.
//!
//! The catalog is the single source of truth for base costs, incomes, and
//! display copy. Saved games store progress only; on load the save layer
//! re-derives the full state from these tables so balance changes apply to
//! existing towns.

use crate::{Building, BuildingId, DistrictId, Tier};

/// Static definition of a district.
#[derive(Clone, Copy, Debug)]
pub struct DistrictDef {
    pub id: DistrictId,
    pub name: &'static str,
    pub description: &'static str,
    pub unlock_cost: u64,
    pub income_multiplier: f64,
}

/// Static definition of a building archetype.
#[derive(Clone, Copy, Debug)]
pub struct BuildingDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub district: DistrictId,
    pub tier: Tier,
    pub base_cost: f64,
    pub base_income: f64,
    pub diamond_cost: Option<u64>,
}

impl BuildingDef {
    /// Creates the runtime building record for a fresh or reloaded town.
    pub fn instantiate(&self, now_ms: i64) -> Building {
        Building {
            id: BuildingId(self.id.to_string()),
            name: self.name.to_string(),
            description: self.description.to_string(),
            district: self.district,
            tier: self.tier,
            base_cost: self.base_cost,
            base_income: self.base_income,
            diamond_cost: self.diamond_cost,
            owned: 0,
            level: 1,
            accumulated_coins: 0.0,
            last_collected_ms: now_ms,
        }
    }
}

/// Districts in unlock order. Unlock costs are tuned so each district opens
/// after a few minutes of active play in the previous one.
pub const DISTRICTS: [DistrictDef; 5] = [
    DistrictDef {
        id: DistrictId::Forest,
        name: "Whispering Forest",
        description: "A quiet clearing where every town begins.",
        unlock_cost: 0,
        income_multiplier: 1.0,
    },
    DistrictDef {
        id: DistrictId::Meadow,
        name: "Sunny Meadow",
        description: "Open fields buzzing with bees and windmills.",
        unlock_cost: 1_000,
        income_multiplier: 1.25,
    },
    DistrictDef {
        id: DistrictId::Riverside,
        name: "Riverside Wharf",
        description: "Docks and mills along the slow green river.",
        unlock_cost: 50_000,
        income_multiplier: 1.5,
    },
    DistrictDef {
        id: DistrictId::Hills,
        name: "Windy Hills",
        description: "Terraced slopes under a sky full of kites.",
        unlock_cost: 1_500_000,
        income_multiplier: 2.0,
    },
    DistrictDef {
        id: DistrictId::Peaks,
        name: "Starlight Peaks",
        description: "Snowfields where the aurora touches the ground.",
        unlock_cost: 40_000_000,
        income_multiplier: 3.0,
    },
];

/// Buildings grouped by district, cheapest first within each group. Rare and
/// legendary entries charge diamonds for the first unit only.
pub const BUILDINGS: [BuildingDef; 25] = [
    // Whispering Forest
    BuildingDef {
        id: "cottage",
        name: "Cottage",
        description: "A mossy-roofed starter home.",
        district: DistrictId::Forest,
        tier: Tier::Common,
        base_cost: 15.0,
        base_income: 1.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "lumber_hut",
        name: "Lumber Hut",
        description: "Saws humming from dawn to dusk.",
        district: DistrictId::Forest,
        tier: Tier::Common,
        base_cost: 120.0,
        base_income: 5.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "bakery",
        name: "Bakery",
        description: "The smell of pine-nut bread carries far.",
        district: DistrictId::Forest,
        tier: Tier::Common,
        base_cost: 750.0,
        base_income: 20.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "sawmill",
        name: "Sawmill",
        description: "Industrial-grade planks for growing towns.",
        district: DistrictId::Forest,
        tier: Tier::Rare,
        base_cost: 4_200.0,
        base_income: 80.0,
        diamond_cost: Some(5),
    },
    BuildingDef {
        id: "elder_tree_inn",
        name: "Elder Tree Inn",
        description: "Rooms carved inside a living thousand-year oak.",
        district: DistrictId::Forest,
        tier: Tier::Legendary,
        base_cost: 18_000.0,
        base_income: 260.0,
        diamond_cost: Some(15),
    },
    // Sunny Meadow
    BuildingDef {
        id: "flower_stand",
        name: "Flower Stand",
        description: "Bouquets sold by the armful.",
        district: DistrictId::Meadow,
        tier: Tier::Common,
        base_cost: 2_500.0,
        base_income: 45.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "apiary",
        name: "Apiary",
        description: "Rows of hives heavy with clover honey.",
        district: DistrictId::Meadow,
        tier: Tier::Common,
        base_cost: 11_000.0,
        base_income: 150.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "windmill",
        name: "Windmill",
        description: "Grinds grain for half the valley.",
        district: DistrictId::Meadow,
        tier: Tier::Common,
        base_cost: 48_000.0,
        base_income: 500.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "dairy_farm",
        name: "Dairy Farm",
        description: "Prize cows and the creamiest cheese around.",
        district: DistrictId::Meadow,
        tier: Tier::Rare,
        base_cost: 180_000.0,
        base_income: 1_500.0,
        diamond_cost: Some(8),
    },
    BuildingDef {
        id: "sunflower_manor",
        name: "Sunflower Manor",
        description: "A golden estate that turns to face the sun.",
        district: DistrictId::Meadow,
        tier: Tier::Legendary,
        base_cost: 700_000.0,
        base_income: 4_800.0,
        diamond_cost: Some(20),
    },
    // Riverside Wharf
    BuildingDef {
        id: "fish_stall",
        name: "Fish Stall",
        description: "Fresh catch iced before sunrise.",
        district: DistrictId::Riverside,
        tier: Tier::Common,
        base_cost: 60_000.0,
        base_income: 950.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "boathouse",
        name: "Boathouse",
        description: "Rowboats, ferries, and the occasional regatta.",
        district: DistrictId::Riverside,
        tier: Tier::Common,
        base_cost: 240_000.0,
        base_income: 3_000.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "water_mill",
        name: "Water Mill",
        description: "The river does the heavy lifting.",
        district: DistrictId::Riverside,
        tier: Tier::Common,
        base_cost: 900_000.0,
        base_income: 9_000.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "ferry_dock",
        name: "Ferry Dock",
        description: "Connects both banks and three villages.",
        district: DistrictId::Riverside,
        tier: Tier::Rare,
        base_cost: 3_200_000.0,
        base_income: 26_000.0,
        diamond_cost: Some(12),
    },
    BuildingDef {
        id: "lighthouse",
        name: "Lighthouse",
        description: "Its beam reaches the far hills on clear nights.",
        district: DistrictId::Riverside,
        tier: Tier::Legendary,
        base_cost: 9_500_000.0,
        base_income: 70_000.0,
        diamond_cost: Some(30),
    },
    // Windy Hills
    BuildingDef {
        id: "goat_farm",
        name: "Goat Farm",
        description: "Sure-footed goats and sharp cheese.",
        district: DistrictId::Hills,
        tier: Tier::Common,
        base_cost: 1_200_000.0,
        base_income: 11_000.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "quarry",
        name: "Quarry",
        description: "Granite blocks for every new town hall.",
        district: DistrictId::Hills,
        tier: Tier::Common,
        base_cost: 4_500_000.0,
        base_income: 34_000.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "vineyard",
        name: "Vineyard",
        description: "Terraces of vines older than the town itself.",
        district: DistrictId::Hills,
        tier: Tier::Common,
        base_cost: 16_000_000.0,
        base_income: 100_000.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "observatory",
        name: "Observatory",
        description: "Charts the stars the peaks will soon touch.",
        district: DistrictId::Hills,
        tier: Tier::Rare,
        base_cost: 55_000_000.0,
        base_income: 300_000.0,
        diamond_cost: Some(18),
    },
    BuildingDef {
        id: "mountain_keep",
        name: "Mountain Keep",
        description: "A fortress grown from the hillside rock.",
        district: DistrictId::Hills,
        tier: Tier::Legendary,
        base_cost: 180_000_000.0,
        base_income: 900_000.0,
        diamond_cost: Some(45),
    },
    // Starlight Peaks
    BuildingDef {
        id: "aurora_camp",
        name: "Aurora Camp",
        description: "Heated tents under curtains of light.",
        district: DistrictId::Peaks,
        tier: Tier::Common,
        base_cost: 30_000_000.0,
        base_income: 170_000.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "crystal_mine",
        name: "Crystal Mine",
        description: "Veins of quartz that glow after dark.",
        district: DistrictId::Peaks,
        tier: Tier::Common,
        base_cost: 110_000_000.0,
        base_income: 550_000.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "cloud_harbor",
        name: "Cloud Harbor",
        description: "Airships moor above the snowline.",
        district: DistrictId::Peaks,
        tier: Tier::Common,
        base_cost: 400_000_000.0,
        base_income: 1_800_000.0,
        diamond_cost: None,
    },
    BuildingDef {
        id: "aurora_hall",
        name: "Aurora Hall",
        description: "Concerts played on instruments of ice.",
        district: DistrictId::Peaks,
        tier: Tier::Rare,
        base_cost: 1_400_000_000.0,
        base_income: 5_500_000.0,
        diamond_cost: Some(25),
    },
    BuildingDef {
        id: "stardust_spire",
        name: "Stardust Spire",
        description: "The tallest tower a tiny town can dream of.",
        district: DistrictId::Peaks,
        tier: Tier::Legendary,
        base_cost: 5_000_000_000.0,
        base_income: 17_000_000.0,
        diamond_cost: Some(60),
    },
];

/// Looks up a building definition by id.
pub fn building_def(id: &str) -> Option<&'static BuildingDef> {
    BUILDINGS.iter().find(|b| b.id == id)
}

/// Looks up a district definition by id.
pub fn district_def(id: DistrictId) -> &'static DistrictDef {
    // DISTRICTS is laid out in enum order; a test pins this.
    &DISTRICTS[id as usize]
}
