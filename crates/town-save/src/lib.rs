#![deny(warnings)]

//! Save-game schema, codec, and storage gateways for Tiny Town.
//!
//! Saves are versioned JSON blobs that record player progress only; display
//! copy, costs, and incomes are re-derived from the catalog on load, so
//! balance patches reach existing towns. Decoding is shape-tolerant: missing
//! fields fall back to defaults, out-of-range values are clamped, and rows
//! referring to content that no longer exists are dropped with a warning.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use town_core::{DistrictId, GameState, MAX_LEVEL};
use tracing::warn;

mod debounce;
mod gateway;

pub use debounce::DebouncedSaver;
pub use gateway::{JsonFileGateway, MemoryGateway, SaveGateway};

/// Current save schema version, stored in every blob.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors produced by the save layer.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Underlying storage failed.
    #[error("save storage error: {0}")]
    Io(#[from] std::io::Error),
    /// The state could not be serialized.
    #[error("could not encode save: {0}")]
    Encode(String),
    /// The blob is not valid save JSON.
    #[error("corrupt save data: {0}")]
    Decode(String),
}

/// Persisted progress for one building. Unknown ids are dropped on restore.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedBuilding {
    pub id: String,
    pub owned: u32,
    pub level: u8,
    pub accumulated_coins: f64,
    pub last_collected_ms: i64,
}

/// Persisted unlock flag for one district.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedDistrict {
    pub id: String,
    pub unlocked: bool,
}

/// The full save blob. Every field has a default so older or hand-edited
/// blobs still load.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedState {
    pub schema_version: u32,
    pub coins: f64,
    pub diamonds: u64,
    pub total_earned: f64,
    pub income_per_second: u64,
    pub current_district: String,
    pub districts: Vec<SavedDistrict>,
    pub buildings: Vec<SavedBuilding>,
    pub last_played_ms: i64,
    pub ad_boost_active: bool,
    pub ad_boost_end_ms: i64,
    pub golden_boost_purchased: bool,
    pub ad_free_purchased: bool,
    pub tap_count: u64,
}

/// Captures the persistable progress of a state.
pub fn snapshot(state: &GameState) -> SavedState {
    SavedState {
        schema_version: SCHEMA_VERSION,
        coins: state.coins,
        diamonds: state.diamonds,
        total_earned: state.total_earned,
        income_per_second: state.income_per_second,
        current_district: state.current_district.as_str().to_string(),
        districts: state
            .districts
            .iter()
            .map(|d| SavedDistrict {
                id: d.id.as_str().to_string(),
                unlocked: d.unlocked,
            })
            .collect(),
        buildings: state
            .buildings
            .iter()
            .map(|b| SavedBuilding {
                id: b.id.0.clone(),
                owned: b.owned,
                level: b.level,
                accumulated_coins: b.accumulated_coins,
                last_collected_ms: b.last_collected_ms,
            })
            .collect(),
        last_played_ms: state.last_played_ms,
        ad_boost_active: state.ad_boost_active,
        ad_boost_end_ms: state.ad_boost_end_ms,
        golden_boost_purchased: state.golden_boost_purchased,
        ad_free_purchased: state.ad_free_purchased,
        tap_count: state.tap_count,
    }
}

/// Serializes a state to its JSON blob form.
pub fn encode(state: &GameState) -> Result<String, SaveError> {
    serde_json::to_string(&snapshot(state)).map_err(|e| SaveError::Encode(e.to_string()))
}

/// Parses a JSON blob into the save schema without interpreting it.
pub fn decode(blob: &str) -> Result<SavedState, SaveError> {
    serde_json::from_str(blob).map_err(|e| SaveError::Decode(e.to_string()))
}

fn sane_or_zero(v: f64) -> f64 {
    if v.is_finite() && v >= 0.0 {
        v
    } else {
        0.0
    }
}

/// Rebuilds a full game state from saved progress.
///
/// The result is always valid: the state is reconstructed from the catalog
/// and the save only overlays progress onto it. Rows for removed content are
/// dropped, levels are clamped into range, non-finite balances reset to
/// zero, and rows without a collection stamp get the load time. A blob
/// written by a newer build is still loaded on a best-effort basis (unknown
/// fields were already ignored at decode time).
pub fn restore(saved: &SavedState, now_ms: i64) -> GameState {
    if saved.schema_version > SCHEMA_VERSION {
        warn!(
            found = saved.schema_version,
            supported = SCHEMA_VERSION,
            "save blob is from a newer build; loading best-effort"
        );
    }

    let mut state = GameState::new_game(now_ms);
    state.coins = sane_or_zero(saved.coins);
    state.diamonds = saved.diamonds;
    state.total_earned = sane_or_zero(saved.total_earned);
    state.income_per_second = saved.income_per_second;
    state.tap_count = saved.tap_count;
    state.golden_boost_purchased = saved.golden_boost_purchased;
    state.ad_free_purchased = saved.ad_free_purchased;
    state.ad_boost_active = saved.ad_boost_active;
    state.ad_boost_end_ms = saved.ad_boost_end_ms;
    // A blob without a last-played stamp is treated as just played rather
    // than granting a full offline window.
    state.last_played_ms = if saved.last_played_ms > 0 {
        saved.last_played_ms
    } else {
        now_ms
    };

    if let Some(current) = DistrictId::parse(&saved.current_district) {
        state.current_district = current;
    }

    for sd in &saved.districts {
        match DistrictId::parse(&sd.id) {
            Some(id) => {
                if let Some(d) = state.district_mut(id) {
                    d.unlocked = sd.unlocked;
                }
            }
            None => warn!(id = %sd.id, "dropping unknown district from save"),
        }
    }
    // The starting district can never lock, whatever the blob says.
    state.districts[0].unlocked = true;

    for sb in &saved.buildings {
        match state.building_mut(&sb.id) {
            Some(b) => {
                b.owned = sb.owned;
                b.level = sb.level.clamp(1, MAX_LEVEL);
                b.accumulated_coins = sane_or_zero(sb.accumulated_coins);
                // Rows from before the collection schema carry no stamp.
                b.last_collected_ms = if sb.last_collected_ms > 0 {
                    sb.last_collected_ms
                } else {
                    now_ms
                };
            }
            None => warn!(id = %sb.id, "dropping unknown building from save"),
        }
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use town_core::validate;

    fn played_state() -> GameState {
        let mut state = GameState::new_game(1_000);
        state.coins = 5_432.5;
        state.diamonds = 7;
        state.total_earned = 99_000.0;
        state.income_per_second = 123;
        state.tap_count = 456;
        state.building_mut("cottage").unwrap().owned = 12;
        state.building_mut("cottage").unwrap().level = 3;
        state.building_mut("cottage").unwrap().accumulated_coins = 9.75;
        state.district_mut(DistrictId::Meadow).unwrap().unlocked = true;
        state.current_district = DistrictId::Meadow;
        state.golden_boost_purchased = true;
        state.last_played_ms = 50_000;
        state
    }

    #[test]
    fn roundtrip_preserves_progress() {
        let state = played_state();
        let blob = encode(&state).unwrap();
        let back = restore(&decode(&blob).unwrap(), 999_999);
        validate(&back).unwrap();
        assert_eq!(back.coins, state.coins);
        assert_eq!(back.diamonds, 7);
        assert_eq!(back.total_earned, 99_000.0);
        assert_eq!(back.income_per_second, 123);
        assert_eq!(back.tap_count, 456);
        assert_eq!(back.current_district, DistrictId::Meadow);
        assert_eq!(back.last_played_ms, 50_000);
        assert!(back.golden_boost_purchased);
        let cottage = back.building("cottage").unwrap();
        assert_eq!(cottage.owned, 12);
        assert_eq!(cottage.level, 3);
        assert_eq!(cottage.accumulated_coins, 9.75);
    }

    #[test]
    fn empty_blob_restores_to_new_game() {
        let saved = decode("{}").unwrap();
        assert_eq!(saved.schema_version, 0);
        let state = restore(&saved, 77_000);
        validate(&state).unwrap();
        assert_eq!(state.coins, 0.0);
        assert_eq!(state.unlocked_districts(), 1);
        // No last-played stamp means no offline window.
        assert_eq!(state.last_played_ms, 77_000);
    }

    #[test]
    fn orphan_rows_are_dropped() {
        let mut saved = snapshot(&played_state());
        saved.buildings.push(SavedBuilding {
            id: "moon_base".to_string(),
            owned: 40,
            level: 5,
            accumulated_coins: 1e9,
            last_collected_ms: 1,
        });
        saved.districts.push(SavedDistrict {
            id: "atlantis".to_string(),
            unlocked: true,
        });
        let state = restore(&saved, 0);
        validate(&state).unwrap();
        assert!(state.building("moon_base").is_none());
        assert_eq!(state.buildings.len(), town_core::catalog::BUILDINGS.len());
        assert_eq!(state.districts.len(), 5);
    }

    #[test]
    fn blob_from_an_older_catalog_gains_new_buildings() {
        // A save written before most of the catalog existed: one cottage row.
        let saved = SavedState {
            schema_version: SCHEMA_VERSION,
            coins: 800.0,
            buildings: vec![SavedBuilding {
                id: "cottage".to_string(),
                owned: 5,
                level: 3,
                ..SavedBuilding::default()
            }],
            last_played_ms: 1_000,
            ..SavedState::default()
        };
        let state = restore(&saved, 2_000);
        validate(&state).unwrap();
        let cottage = state.building("cottage").unwrap();
        assert_eq!(cottage.owned, 5);
        assert_eq!(cottage.level, 3);
        assert_eq!(state.buildings.len(), town_core::catalog::BUILDINGS.len());
        for (b, def) in state.buildings.iter().zip(town_core::catalog::BUILDINGS.iter()) {
            assert_eq!(b.id.as_str(), def.id);
        }
        for b in state.buildings.iter().filter(|b| b.id.as_str() != "cottage") {
            assert_eq!(b.owned, 0);
            assert_eq!(b.level, 1);
        }
    }

    #[test]
    fn missing_collection_stamps_default_to_now() {
        // Building rows from before the accumulator schema have no
        // last_collected_ms key at all; restore must not backdate them to
        // the epoch.
        let blob = r#"{"schema_version":1,"buildings":[{"id":"cottage","owned":5,"level":3}]}"#;
        let state = restore(&decode(blob).unwrap(), 50_000);
        let cottage = state.building("cottage").unwrap();
        assert_eq!(cottage.owned, 5);
        assert_eq!(cottage.last_collected_ms, 50_000);
        assert_eq!(cottage.accumulated_coins, 0.0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut saved = snapshot(&GameState::new_game(0));
        saved.coins = f64::NAN;
        saved.total_earned = -5.0;
        saved.buildings[0].level = 200;
        saved.buildings[0].accumulated_coins = f64::NEG_INFINITY;
        saved.buildings[1].level = 0;
        let state = restore(&saved, 0);
        validate(&state).unwrap();
        assert_eq!(state.coins, 0.0);
        assert_eq!(state.total_earned, 0.0);
        assert_eq!(state.buildings[0].level, MAX_LEVEL);
        assert_eq!(state.buildings[0].accumulated_coins, 0.0);
        assert_eq!(state.buildings[1].level, 1);
    }

    #[test]
    fn starting_district_cannot_be_locked_by_blob() {
        let mut saved = snapshot(&GameState::new_game(0));
        saved.districts[0].unlocked = false;
        let state = restore(&saved, 0);
        assert!(state.districts[0].unlocked);
    }

    #[test]
    fn unknown_current_district_falls_back_to_start() {
        let mut saved = snapshot(&GameState::new_game(0));
        saved.current_district = "atlantis".to_string();
        let state = restore(&saved, 0);
        assert_eq!(state.current_district, DistrictId::Forest);
    }

    #[test]
    fn newer_schema_still_loads() {
        let mut saved = snapshot(&played_state());
        saved.schema_version = SCHEMA_VERSION + 5;
        let state = restore(&saved, 0);
        validate(&state).unwrap();
        assert_eq!(state.diamonds, 7);
    }

    #[test]
    fn unknown_json_fields_are_ignored() {
        let blob = r#"{"schema_version":1,"coins":10.0,"weather":"sunny"}"#;
        let saved = decode(blob).unwrap();
        assert_eq!(saved.coins, 10.0);
    }

    #[test]
    fn garbage_blob_is_a_decode_error() {
        assert!(matches!(decode("not json"), Err(SaveError::Decode(_))));
        assert!(matches!(decode("[1,2,3]"), Err(SaveError::Decode(_))));
    }

    proptest! {
        #[test]
        fn restore_never_panics_and_validates(
            coins in prop::num::f64::ANY,
            total in prop::num::f64::ANY,
            level in any::<u8>(),
            owned in any::<u32>(),
            acc in prop::num::f64::ANY,
            last_played in any::<i64>(),
            district in "[a-z]{1,12}",
        ) {
            let saved = SavedState {
                schema_version: SCHEMA_VERSION,
                coins,
                total_earned: total,
                current_district: district,
                buildings: vec![SavedBuilding {
                    id: "cottage".to_string(),
                    owned,
                    level,
                    accumulated_coins: acc,
                    last_collected_ms: last_played,
                }],
                last_played_ms: last_played,
                ..SavedState::default()
            };
            let state = restore(&saved, 123_456);
            prop_assert!(validate(&state).is_ok());
        }

        #[test]
        fn roundtrip_keeps_owned_counts(owned in 0u32..1_000_000, level in 1u8..=MAX_LEVEL) {
            let mut state = GameState::new_game(0);
            state.building_mut("windmill").unwrap().owned = owned;
            state.building_mut("windmill").unwrap().level = level;
            let back = restore(&decode(&encode(&state).unwrap()).unwrap(), 0);
            let w = back.building("windmill").unwrap();
            prop_assert_eq!(w.owned, owned);
            prop_assert_eq!(w.level, level);
        }
    }
}
