#![deny(warnings)]

//! Economy math for Tiny Town: pricing, income, taps, and offline earnings.
//!
//! This module provides the pure formulas the engine applies:
//! - Exponential unit pricing and level upgrade pricing
//! - Per-building and town-wide income rates with boost multipliers
//! - Tap rewards scaled by progression
//! - Capped offline earnings
//!
//! All functions are deterministic and clock-free. Inputs come from the
//! validated state; out-of-range values saturate instead of panicking.

use town_core::{Building, GameState};

/// Per-unit price growth factor: each copy of a building costs 15% more.
pub const COST_GROWTH: f64 = 1.15;

/// Upgrade price factor: upgrading from level N costs base_cost * 10^N.
pub const UPGRADE_GROWTH: f64 = 10.0;

/// Additional income fraction granted by each level past the first.
pub const LEVEL_BONUS: f64 = 0.5;

/// Permanent income multiplier from the golden boost purchase.
pub const GOLDEN_MULTIPLIER: f64 = 1.5;

/// Temporary income multiplier while an ad boost is active.
pub const AD_MULTIPLIER: f64 = 2.0;

/// Offline earnings accrue for at most this many seconds (24 hours).
pub const OFFLINE_CAP_SECONDS: u64 = 86_400;

/// Coin price of the next unit of a building.
///
/// cost = floor(base_cost * 1.15^owned). The first unit costs exactly
/// `base_cost`. Overflow clamps to `f64::MAX`, which no balance can reach.
///
/// Example:
/// assert_eq!(building_cost(15.0, 0), 15.0);
/// assert_eq!(building_cost(15.0, 1), 17.0); // floor(17.25)
pub fn building_cost(base_cost: f64, owned: u32) -> f64 {
    let raw = base_cost * COST_GROWTH.powf(f64::from(owned));
    if !raw.is_finite() {
        return f64::MAX;
    }
    raw.floor()
}

/// Coin price of upgrading a building from its current level.
///
/// cost = floor(base_cost * 10^level), so each level costs ten times the
/// last. The level 4 -> 5 upgrade additionally charges diamonds; that is the
/// engine's concern, not priced here.
pub fn upgrade_cost(base_cost: f64, level: u8) -> f64 {
    let raw = base_cost * UPGRADE_GROWTH.powf(f64::from(level));
    if !raw.is_finite() {
        return f64::MAX;
    }
    raw.floor()
}

/// Income scale from a building's level: 1.0 at level 1, +0.5 per level.
pub fn level_factor(level: u8) -> f64 {
    1.0 + f64::from(level.saturating_sub(1)) * LEVEL_BONUS
}

/// Combined boost multiplier. Boosts stack multiplicatively.
pub fn boost_multiplier(golden: bool, ad_active: bool) -> f64 {
    let mut m = 1.0;
    if golden {
        m *= GOLDEN_MULTIPLIER;
    }
    if ad_active {
        m *= AD_MULTIPLIER;
    }
    m
}

/// Unfloored per-second rate of one building stack, before boosts.
///
/// rate = base_income * owned * district_multiplier * level_factor. Zero for
/// unowned buildings.
pub fn building_rate(building: &Building, district_multiplier: f64) -> f64 {
    if building.owned == 0 {
        return 0.0;
    }
    building.base_income
        * f64::from(building.owned)
        * district_multiplier
        * level_factor(building.level)
}

/// Total whole-coins-per-second income of the town.
///
/// Sums every building's rate, applies the boost multiplier once over the
/// total, and floors at the end, so fractional contributions from separate
/// buildings add up before truncation. Saturates at `u64::MAX`.
///
/// Trusts `state.ad_boost_active` as-is; callers expire lapsed boosts before
/// recomputing.
pub fn income_per_second(state: &GameState) -> u64 {
    let mut total = 0.0;
    for b in &state.buildings {
        let mult = state
            .district(b.district)
            .map_or(1.0, |d| d.income_multiplier);
        total += building_rate(b, mult);
    }
    total *= boost_multiplier(state.golden_boost_purchased, state.ad_boost_active);
    if !total.is_finite() {
        return u64::MAX;
    }
    let floored = total.floor();
    if floored <= 0.0 {
        return 0;
    }
    if floored > (u64::MAX as f64) {
        return u64::MAX;
    }
    floored as u64
}

/// Coins granted per tap, stepped by how many districts are unlocked.
///
/// Always at least 1 so a brand-new town can afford its first cottage.
pub fn tap_amount(unlocked_districts: usize) -> u64 {
    match unlocked_districts {
        0 | 1 => 1,
        2 => 100,
        3 => 500,
        4 => 800,
        _ => 1_000,
    }
}

/// Whole coins earned while away, based on the income rate at save time.
///
/// Elapsed time below one second earns nothing; time past the 24 hour cap is
/// forfeited; negative elapsed (clock moved backwards) earns nothing.
pub fn offline_earnings(income_per_second: u64, elapsed_ms: i64) -> u64 {
    if elapsed_ms <= 0 {
        return 0;
    }
    let seconds = (elapsed_ms / 1_000) as u64;
    income_per_second.saturating_mul(seconds.min(OFFLINE_CAP_SECONDS))
}
