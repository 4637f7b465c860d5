#![deny(warnings)]

//! Core domain models and invariants for the Tiny Town engine.
//!
//! This crate defines the serializable game state shared by the economy
//! functions, the save layer, and the engine, plus validation helpers that
//! guarantee the structural invariants the rest of the workspace assumes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

pub mod catalog;

/// Maximum building level; upgrades past this are rejected by the engine.
pub const MAX_LEVEL: u8 = 5;

/// Identifier for a themed district. The set is closed: content updates may
/// add buildings, but the five districts are fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistrictId {
    Forest,
    Meadow,
    Riverside,
    Hills,
    Peaks,
}

impl DistrictId {
    /// All districts in progression (and display) order. The first entry is
    /// the district every new game starts with.
    pub const ALL: [DistrictId; 5] = [
        DistrictId::Forest,
        DistrictId::Meadow,
        DistrictId::Riverside,
        DistrictId::Hills,
        DistrictId::Peaks,
    ];

    /// Stable string form, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            DistrictId::Forest => "forest",
            DistrictId::Meadow => "meadow",
            DistrictId::Riverside => "riverside",
            DistrictId::Hills => "hills",
            DistrictId::Peaks => "peaks",
        }
    }

    /// Inverse of [`as_str`](Self::as_str); `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == s)
    }
}

impl std::fmt::Display for DistrictId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identifier for a building archetype, e.g. "cottage".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub String);

impl BuildingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Rarity class of a building; gates diamond costs and visual treatment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Common,
    Rare,
    Legendary,
}

/// A themed unlockable zone. Unlocking is paid once and is irreversible.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct District {
    /// District identifier.
    pub id: DistrictId,
    /// Display name.
    pub name: String,
    /// Flavor description.
    pub description: String,
    /// One-time unlock cost in coins (0 for the starting district).
    pub unlock_cost: u64,
    /// Multiplier applied to the income of every building in the district
    /// (>= 1.0).
    pub income_multiplier: f64,
    /// Whether the player has unlocked this district.
    pub unlocked: bool,
}

/// A purchasable, stackable, levelable income-generating unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Building {
    /// Building identifier.
    pub id: BuildingId,
    /// Display name.
    pub name: String,
    /// Flavor description.
    pub description: String,
    /// District this building belongs to.
    pub district: DistrictId,
    /// Rarity tier.
    pub tier: Tier,
    /// Cost in coins of the first unit; later units scale exponentially.
    pub base_cost: f64,
    /// Coins per second produced by one unit at level 1.
    pub base_income: f64,
    /// Diamond cost charged for the first unit only, if any.
    pub diamond_cost: Option<u64>,
    /// Units owned. Only increases; there is no selling.
    pub owned: u32,
    /// Upgrade level in 1..=[`MAX_LEVEL`]. Only increases.
    pub level: u8,
    /// Uncollected per-building income ledger (fractional; floored only at
    /// collection time).
    pub accumulated_coins: f64,
    /// Epoch milliseconds of the last collection.
    pub last_collected_ms: i64,
}

/// The aggregate game state owned by the engine.
///
/// `income_per_second` is a derived cache: it is recomputed after every
/// mutation that can change it and must never be treated as authoritative by
/// economy math that needs the current number. Offline reconciliation reads
/// it deliberately (the save-time value is what offline earnings are paid
/// from).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    /// Spendable coin balance. Fractional while accruing; floored at display.
    pub coins: f64,
    /// Premium currency balance.
    pub diamonds: u64,
    /// Lifetime coins earned; monotonic non-decreasing.
    pub total_earned: f64,
    /// Cached whole-coins-per-second income. Derived, never authoritative.
    pub income_per_second: u64,
    /// District currently selected in the UI. No economy effect.
    pub current_district: DistrictId,
    /// All districts, in catalog order.
    pub districts: Vec<District>,
    /// All buildings, in catalog order (owned or not).
    pub buildings: Vec<Building>,
    /// Epoch milliseconds when the game was last played (stamped on save and
    /// on offline reconciliation).
    pub last_played_ms: i64,
    /// Whether a timed ad boost is active.
    pub ad_boost_active: bool,
    /// Epoch milliseconds when the ad boost expires.
    pub ad_boost_end_ms: i64,
    /// Permanent x1.5 income boost purchased.
    pub golden_boost_purchased: bool,
    /// Ad-free purchase flag. No economy effect; persisted for the shell.
    pub ad_free_purchased: bool,
    /// Lifetime tap count.
    pub tap_count: u64,
}

impl GameState {
    /// Builds the default new-game state from the catalog: nothing owned,
    /// only the first district unlocked, all clocks set to `now_ms`.
    pub fn new_game(now_ms: i64) -> Self {
        let districts = catalog::DISTRICTS
            .iter()
            .map(|d| District {
                id: d.id,
                name: d.name.to_string(),
                description: d.description.to_string(),
                unlock_cost: d.unlock_cost,
                income_multiplier: d.income_multiplier,
                unlocked: d.id == DistrictId::ALL[0],
            })
            .collect();
        let buildings = catalog::BUILDINGS
            .iter()
            .map(|b| b.instantiate(now_ms))
            .collect();
        GameState {
            coins: 0.0,
            diamonds: 0,
            total_earned: 0.0,
            income_per_second: 0,
            current_district: DistrictId::ALL[0],
            districts,
            buildings,
            last_played_ms: now_ms,
            ad_boost_active: false,
            ad_boost_end_ms: 0,
            golden_boost_purchased: false,
            ad_free_purchased: false,
            tap_count: 0,
        }
    }

    /// Looks up a district by id.
    pub fn district(&self, id: DistrictId) -> Option<&District> {
        self.districts.iter().find(|d| d.id == id)
    }

    /// Mutable district lookup.
    pub fn district_mut(&mut self, id: DistrictId) -> Option<&mut District> {
        self.districts.iter_mut().find(|d| d.id == id)
    }

    /// Looks up a building by string id.
    pub fn building(&self, id: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id.as_str() == id)
    }

    /// Mutable building lookup.
    pub fn building_mut(&mut self, id: &str) -> Option<&mut Building> {
        self.buildings.iter_mut().find(|b| b.id.as_str() == id)
    }

    /// Number of unlocked districts (>= 1 in any valid state).
    pub fn unlocked_districts(&self) -> usize {
        self.districts.iter().filter(|d| d.unlocked).count()
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Coin or total-earned balance is negative or not finite.
    #[error("balance must be finite and non-negative")]
    InvalidBalance,
    /// Building level outside 1..=MAX_LEVEL.
    #[error("building {0} has level {1} outside 1..={max}", max = MAX_LEVEL)]
    LevelOutOfRange(String, u8),
    /// Per-building accumulator is negative or not finite.
    #[error("building {0} has an invalid accumulator")]
    InvalidAccumulator(String),
    /// District multiplier below 1.0 or not finite.
    #[error("district {0} has an invalid income multiplier")]
    InvalidMultiplier(DistrictId),
    /// The starting district must always be unlocked.
    #[error("the starting district is locked")]
    StartingDistrictLocked,
    /// Duplicate building id in the state.
    #[error("duplicate building id: {0}")]
    DuplicateBuilding(String),
    /// A referenced district id is missing from the state.
    #[error("district not present in state: {0}")]
    DistrictNotFound(DistrictId),
}

/// Validates the structural invariants of a state, including the catalog-order
/// cross-references. Economy-level consistency (cached income vs derived) is
/// the engine's concern, not checked here.
pub fn validate(state: &GameState) -> Result<(), ValidationError> {
    for v in [state.coins, state.total_earned] {
        if !v.is_finite() || v < 0.0 {
            return Err(ValidationError::InvalidBalance);
        }
    }

    for d in &state.districts {
        if !d.income_multiplier.is_finite() || d.income_multiplier < 1.0 {
            return Err(ValidationError::InvalidMultiplier(d.id));
        }
    }
    match state.district(DistrictId::ALL[0]) {
        Some(first) if first.unlocked => {}
        Some(_) => return Err(ValidationError::StartingDistrictLocked),
        None => return Err(ValidationError::DistrictNotFound(DistrictId::ALL[0])),
    }
    if state.district(state.current_district).is_none() {
        return Err(ValidationError::DistrictNotFound(state.current_district));
    }

    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for b in &state.buildings {
        if !ids.insert(b.id.as_str()) {
            return Err(ValidationError::DuplicateBuilding(b.id.0.clone()));
        }
        if b.level < 1 || b.level > MAX_LEVEL {
            return Err(ValidationError::LevelOutOfRange(b.id.0.clone(), b.level));
        }
        if !b.accumulated_coins.is_finite() || b.accumulated_coins < 0.0 {
            return Err(ValidationError::InvalidAccumulator(b.id.0.clone()));
        }
        if state.district(b.district).is_none() {
            return Err(ValidationError::DistrictNotFound(b.district));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_game_is_valid_and_fresh() {
        let state = GameState::new_game(1_000);
        validate(&state).unwrap();
        assert_eq!(state.coins, 0.0);
        assert_eq!(state.diamonds, 0);
        assert_eq!(state.unlocked_districts(), 1);
        assert_eq!(state.current_district, DistrictId::Forest);
        assert_eq!(state.buildings.len(), catalog::BUILDINGS.len());
        assert!(state.buildings.iter().all(|b| b.owned == 0 && b.level == 1));
        assert!(state
            .buildings
            .iter()
            .all(|b| b.last_collected_ms == 1_000 && b.accumulated_coins == 0.0));
    }

    #[test]
    fn district_id_parse_roundtrip() {
        for d in DistrictId::ALL {
            assert_eq!(DistrictId::parse(d.as_str()), Some(d));
        }
        assert_eq!(DistrictId::parse("atlantis"), None);
    }

    #[test]
    fn serde_roundtrip_state() {
        let state = GameState::new_game(42);
        let s = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&s).unwrap();
        assert_eq!(back.buildings.len(), state.buildings.len());
        assert_eq!(back.current_district, DistrictId::Forest);
        assert_eq!(back.last_played_ms, 42);
        validate(&back).unwrap();
    }

    #[test]
    fn district_id_serializes_snake_case() {
        let s = serde_json::to_string(&DistrictId::Riverside).unwrap();
        assert_eq!(s, "\"riverside\"");
    }

    #[test]
    fn validate_rejects_negative_coins() {
        let mut state = GameState::new_game(0);
        state.coins = -1.0;
        assert_eq!(validate(&state), Err(ValidationError::InvalidBalance));
    }

    #[test]
    fn validate_rejects_locked_starting_district() {
        let mut state = GameState::new_game(0);
        state.districts[0].unlocked = false;
        assert_eq!(validate(&state), Err(ValidationError::StartingDistrictLocked));
    }

    #[test]
    fn validate_rejects_duplicate_building() {
        let mut state = GameState::new_game(0);
        let dup = state.buildings[0].clone();
        state.buildings.push(dup);
        assert!(matches!(
            validate(&state),
            Err(ValidationError::DuplicateBuilding(_))
        ));
    }

    #[test]
    fn validate_rejects_nan_accumulator() {
        let mut state = GameState::new_game(0);
        state.buildings[0].accumulated_coins = f64::NAN;
        assert!(matches!(
            validate(&state),
            Err(ValidationError::InvalidAccumulator(_))
        ));
    }

    proptest! {
        #[test]
        fn levels_within_cap_validate(level in 1u8..=MAX_LEVEL) {
            let mut state = GameState::new_game(0);
            state.buildings[0].level = level;
            prop_assert!(validate(&state).is_ok());
        }

        #[test]
        fn levels_outside_cap_rejected(level in (MAX_LEVEL + 1)..=u8::MAX) {
            let mut state = GameState::new_game(0);
            state.buildings[0].level = level;
            prop_assert!(matches!(
                validate(&state),
                Err(ValidationError::LevelOutOfRange(_, _))
            ));
        }
    }
}
