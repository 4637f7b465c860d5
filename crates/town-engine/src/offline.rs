//! Offline earnings reconciliation, run once per boot on the loaded state.

use town_core::GameState;
use tracing::debug;

/// Credits earnings for time spent away and refreshes the time-derived flags.
///
/// Earnings are paid from the cached `income_per_second` recorded at save
/// time, not from a fresh recompute. That staleness is deliberate: the cached
/// value is the rate the town actually had while the app was closed. Callers
/// recompute the cache after this returns so live play continues from current
/// buildings.
///
/// Whole elapsed seconds are clamped to the 24 hour cap; a clock that moved
/// backwards earns nothing. `last_played_ms` is stamped to `now_ms` in the
/// same call as the credit, so running this twice with the same clock credits
/// nothing the second time. A lapsed ad boost is expired here as well, before
/// anyone recomputes income from the flags.
///
/// Returns the whole coins credited.
pub fn reconcile(state: &mut GameState, now_ms: i64) -> u64 {
    let elapsed_ms = now_ms.saturating_sub(state.last_played_ms);
    let earned = town_econ::offline_earnings(state.income_per_second, elapsed_ms);
    if earned > 0 {
        state.coins += earned as f64;
        state.total_earned += earned as f64;
    }
    state.last_played_ms = now_ms;

    if state.ad_boost_active && state.ad_boost_end_ms <= now_ms {
        state.ad_boost_active = false;
        debug!("ad boost expired while away");
    }

    debug!(earned, elapsed_ms, "offline reconciliation");
    earned
}

#[cfg(test)]
mod tests {
    use super::*;
    use town_econ::OFFLINE_CAP_SECONDS;

    fn saved_state(income: u64, last_played_ms: i64) -> GameState {
        let mut state = GameState::new_game(last_played_ms);
        state.income_per_second = income;
        state.last_played_ms = last_played_ms;
        state
    }

    #[test]
    fn credits_elapsed_seconds() {
        let mut state = saved_state(50, 10_000);
        let earned = reconcile(&mut state, 10_000 + 120_000);
        assert_eq!(earned, 50 * 120);
        assert_eq!(state.coins, (50 * 120) as f64);
        assert_eq!(state.total_earned, (50 * 120) as f64);
        assert_eq!(state.last_played_ms, 130_000);
    }

    #[test]
    fn caps_at_twenty_four_hours() {
        // 100 days away still pays only one day.
        let hundred_days_ms = 100 * 86_400_000;
        let mut state = saved_state(7, 0);
        state.last_played_ms = 1;
        let earned = reconcile(&mut state, 1 + hundred_days_ms);
        assert_eq!(earned, 7 * OFFLINE_CAP_SECONDS);
    }

    #[test]
    fn uses_cached_income_not_current_buildings() {
        let mut state = saved_state(0, 0);
        state.last_played_ms = 1;
        // The town has buildings, but the save-time cache said zero.
        state.building_mut("cottage").unwrap().owned = 100;
        let earned = reconcile(&mut state, 3_600_001);
        assert_eq!(earned, 0);
        assert_eq!(state.coins, 0.0);
    }

    #[test]
    fn stamps_even_when_nothing_earned() {
        let mut state = saved_state(0, 5_000);
        reconcile(&mut state, 90_000);
        assert_eq!(state.last_played_ms, 90_000);
    }

    #[test]
    fn backwards_clock_earns_nothing_but_still_stamps() {
        let mut state = saved_state(50, 100_000);
        let earned = reconcile(&mut state, 40_000);
        assert_eq!(earned, 0);
        assert_eq!(state.coins, 0.0);
        assert_eq!(state.last_played_ms, 40_000);
    }

    #[test]
    fn second_run_with_same_clock_credits_nothing() {
        let mut state = saved_state(10, 1_000);
        let first = reconcile(&mut state, 61_000);
        let second = reconcile(&mut state, 61_000);
        assert_eq!(first, 600);
        assert_eq!(second, 0);
    }

    #[test]
    fn expires_lapsed_ad_boost() {
        let mut state = saved_state(1, 1_000);
        state.ad_boost_active = true;
        state.ad_boost_end_ms = 2_000;
        reconcile(&mut state, 10_000);
        assert!(!state.ad_boost_active);

        let mut state = saved_state(1, 1_000);
        state.ad_boost_active = true;
        state.ad_boost_end_ms = 999_999;
        reconcile(&mut state, 10_000);
        assert!(state.ad_boost_active);
    }
}
