#![deny(warnings)]

//! The Tiny Town game engine.
//!
//! Owns the canonical [`GameState`] and applies every mutation: taps,
//! purchases, upgrades, district unlocks, boosts, per-building collection,
//! and the once-per-second income tick. The UI shell is a read-only
//! subscriber that issues intents through the methods here and renders
//! whatever state comes back.
//!
//! Everything is single-threaded and synchronous: operations are atomic
//! read-modify-write transitions that either fully apply or leave the state
//! untouched, signalled by a `bool`/zero sentinel rather than an error. The
//! engine never panics or propagates across this boundary; storage failures
//! are logged and swallowed.

use town_core::{Building, DistrictId, GameState, MAX_LEVEL};
use town_save::{DebouncedSaver, SaveGateway};
use tracing::{debug, info, warn};

pub mod clock;
pub mod offline;

use clock::Clock;

/// How long one ad boost lasts (1 hour).
pub const AD_BOOST_DURATION_MS: i64 = 3_600_000;

/// Diamonds charged for the final (level 4 to 5) upgrade.
pub const UPGRADE_DIAMOND_COST: u64 = 3;

/// Engine tuning knobs. Defaults match the shipped game.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Gateway key the whole state blob is stored under.
    pub storage_key: String,
    /// Trailing delay before a mutation burst is flushed to storage.
    pub save_debounce_ms: i64,
    /// Minimum offline earning that surfaces a welcome-back notice.
    pub offline_notice_threshold: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_key: "tiny_town_state_v1".to_string(),
            save_debounce_ms: 1_000,
            offline_notice_threshold: 100,
        }
    }
}

/// Engine lifecycle. `Ready` is terminal; persistence happens
/// opportunistically rather than through a shutdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
}

/// The state machine at the heart of the game.
///
/// Generic over its storage gateway and clock so tests can run the whole
/// stack deterministically with [`MemoryGateway`](town_save::MemoryGateway)
/// and [`ManualClock`](clock::ManualClock).
///
/// Until [`boot`](Self::boot) completes, every operation is a no-op
/// returning its failure sentinel.
pub struct GameEngine<G, C> {
    config: EngineConfig,
    gateway: G,
    clock: C,
    saver: DebouncedSaver,
    state: GameState,
    phase: Phase,
    offline_notice: Option<u64>,
}

impl<G: SaveGateway, C: Clock> GameEngine<G, C> {
    pub fn new(config: EngineConfig, gateway: G, clock: C) -> Self {
        let state = GameState::new_game(clock.now_ms());
        let saver = DebouncedSaver::new(config.save_debounce_ms);
        Self {
            config,
            gateway,
            clock,
            saver,
            state,
            phase: Phase::Uninitialized,
            offline_notice: None,
        }
    }

    /// Loads the saved town (or starts a fresh one), credits offline
    /// earnings, and enters `Ready`.
    ///
    /// Infallible on purpose: a failed read or a corrupt blob logs a warning
    /// and falls back to a new game, never a crash. Calling `boot` again
    /// after it has run does nothing.
    pub fn boot(&mut self) {
        if self.phase != Phase::Uninitialized {
            warn!("boot called twice; ignoring");
            return;
        }
        self.phase = Phase::Loading;
        let now = self.clock.now_ms();

        let blob = match self.gateway.load(&self.config.storage_key) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "could not read save; starting fresh");
                None
            }
        };
        match blob.as_deref().map(town_save::decode) {
            Some(Ok(saved)) => {
                let mut state = town_save::restore(&saved, now);
                let earned = offline::reconcile(&mut state, now);
                self.offline_notice =
                    (earned >= self.config.offline_notice_threshold).then_some(earned);
                self.state = state;
            }
            Some(Err(e)) => {
                warn!(error = %e, "save blob unreadable; starting fresh");
                self.state = GameState::new_game(now);
            }
            None => {
                info!("no saved town; starting a new one");
                self.state = GameState::new_game(now);
            }
        }

        self.recompute_income();
        self.phase = Phase::Ready;
        info!(
            coins = self.state.coins.floor(),
            income = self.state.income_per_second,
            offline = self.offline_notice.unwrap_or(0),
            "town ready"
        );
    }

    /// Advances the economy by one second and services the save schedule.
    ///
    /// The shell calls this once per second while the engine is `Ready`.
    /// Overlapping ticks cannot happen: the call needs `&mut self`, and the
    /// whole model is single-threaded.
    ///
    /// Income lands in two places at once: the full per-second total goes to
    /// the spendable balance, and each owned building's own share also grows
    /// its `accumulated_coins` ledger. The ledger is a collection affordance
    /// for the UI (see [`collect_building_coins`](Self::collect_building_coins)),
    /// not a second pool of spendable coins.
    ///
    /// Tick credit alone does not arm the save debounce; player mutations
    /// do. A crash with no write pending costs no balance, because the next
    /// boot pays the same window at the cached rate, but ledger growth since
    /// the last write is lost. The shell bounds that window by calling
    /// [`save_now`](Self::save_now) when the app goes to the background.
    pub fn tick(&mut self) {
        if self.phase != Phase::Ready {
            return;
        }
        let now = self.clock.now_ms();

        if self.state.ad_boost_active && self.state.ad_boost_end_ms <= now {
            self.state.ad_boost_active = false;
            debug!("ad boost expired");
            self.mark_dirty();
        }

        self.recompute_income();
        let income = self.state.income_per_second;
        if income > 0 {
            self.state.coins += income as f64;
            self.state.total_earned += income as f64;

            let boost = town_econ::boost_multiplier(
                self.state.golden_boost_purchased,
                self.state.ad_boost_active,
            );
            let mut multipliers = [1.0f64; 5];
            for d in &self.state.districts {
                multipliers[d.id as usize] = d.income_multiplier;
            }
            for b in &mut self.state.buildings {
                if b.owned > 0 {
                    b.accumulated_coins +=
                        town_econ::building_rate(b, multipliers[b.district as usize]) * boost;
                }
            }
        }

        if self.saver.take_due(now) {
            self.persist(now);
        }
    }

    /// The primary interaction: credits the current tap reward.
    pub fn tap(&mut self) {
        if self.phase != Phase::Ready {
            return;
        }
        let amount = town_econ::tap_amount(self.state.unlocked_districts()) as f64;
        self.state.coins += amount;
        self.state.total_earned += amount;
        self.state.tap_count += 1;
        self.mark_dirty();
    }

    /// Buys one unit of a building.
    ///
    /// Fails (returning `false`, state untouched) when the id is unknown,
    /// the district is locked, coins do not cover the scaled price, or the
    /// first unit's diamond cost is unmet. Diamonds gate the first unit
    /// only; further copies are coin-only.
    pub fn buy_building(&mut self, id: &str) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        let Some(b) = self.state.building(id) else {
            return false;
        };
        let (district, base_cost, owned, first_unit_diamonds) =
            (b.district, b.base_cost, b.owned, b.diamond_cost);
        if !self.state.district(district).is_some_and(|d| d.unlocked) {
            return false;
        }
        let cost = town_econ::building_cost(base_cost, owned);
        if self.state.coins < cost {
            return false;
        }
        let diamonds_due = if owned == 0 {
            first_unit_diamonds.unwrap_or(0)
        } else {
            0
        };
        if self.state.diamonds < diamonds_due {
            return false;
        }

        self.state.coins -= cost;
        self.state.diamonds -= diamonds_due;
        if let Some(b) = self.state.building_mut(id) {
            // Hand-edited blobs can arrive at the numeric limit.
            b.owned = b.owned.saturating_add(1);
        }
        self.recompute_income();
        self.mark_dirty();
        debug!(id, cost, owned = owned.saturating_add(1), "building purchased");
        true
    }

    /// Raises a building one level, up to [`MAX_LEVEL`].
    ///
    /// Fails when the id is unknown, nothing is owned, the level cap is
    /// reached, coins do not cover the upgrade price, or the final upgrade's
    /// diamond charge is unmet.
    pub fn upgrade_building(&mut self, id: &str) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        let Some(b) = self.state.building(id) else {
            return false;
        };
        if b.owned == 0 || b.level >= MAX_LEVEL {
            return false;
        }
        let (base_cost, level) = (b.base_cost, b.level);
        let cost = town_econ::upgrade_cost(base_cost, level);
        if self.state.coins < cost {
            return false;
        }
        let diamonds_due = if level == MAX_LEVEL - 1 {
            UPGRADE_DIAMOND_COST
        } else {
            0
        };
        if self.state.diamonds < diamonds_due {
            return false;
        }

        self.state.coins -= cost;
        self.state.diamonds -= diamonds_due;
        if let Some(b) = self.state.building_mut(id) {
            b.level += 1;
        }
        self.recompute_income();
        self.mark_dirty();
        debug!(id, cost, level = level + 1, "building upgraded");
        true
    }

    /// Pays the one-time unlock cost for a district.
    ///
    /// Fails when already unlocked or unaffordable. Unlocking is
    /// irreversible.
    pub fn unlock_district(&mut self, id: DistrictId) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        let Some(d) = self.state.district(id) else {
            return false;
        };
        if d.unlocked {
            return false;
        }
        let cost = d.unlock_cost as f64;
        if self.state.coins < cost {
            return false;
        }

        self.state.coins -= cost;
        if let Some(d) = self.state.district_mut(id) {
            d.unlocked = true;
        }
        self.recompute_income();
        self.mark_dirty();
        info!(district = %id, "district unlocked");
        true
    }

    /// Changes which district the UI is looking at. No economy effect;
    /// locked districts may be browsed.
    pub fn set_current_district(&mut self, id: DistrictId) {
        if self.phase != Phase::Ready {
            return;
        }
        self.state.current_district = id;
        self.mark_dirty();
    }

    /// Cashes out a building's accumulated ledger for the collection
    /// animation.
    ///
    /// Returns the floored ledger amount and resets it, stamping the
    /// collection time. The coins themselves already reached the balance
    /// through the tick, so nothing further is credited here. Returns 0
    /// (and keeps any sub-coin fraction) when there is under one whole coin,
    /// when nothing is owned, or when the id is unknown.
    pub fn collect_building_coins(&mut self, id: &str) -> u64 {
        if self.phase != Phase::Ready {
            return 0;
        }
        let now = self.clock.now_ms();
        let Some(b) = self.state.building_mut(id) else {
            return 0;
        };
        if b.owned == 0 {
            return 0;
        }
        let whole = b.accumulated_coins.floor();
        if whole < 1.0 {
            return 0;
        }
        b.accumulated_coins = 0.0;
        b.last_collected_ms = now;
        self.mark_dirty();
        let collected = if whole > (u64::MAX as f64) {
            u64::MAX
        } else {
            whole as u64
        };
        debug!(id, collected, "building coins collected");
        collected
    }

    /// Starts (or restarts) the one-hour double-income boost.
    ///
    /// Re-activating while active resets the window to a full hour from now;
    /// remaining time does not stack.
    pub fn activate_ad_boost(&mut self) {
        if self.phase != Phase::Ready {
            return;
        }
        let now = self.clock.now_ms();
        self.state.ad_boost_active = true;
        self.state.ad_boost_end_ms = now.saturating_add(AD_BOOST_DURATION_MS);
        self.recompute_income();
        self.mark_dirty();
        info!("ad boost active for the next hour");
    }

    /// Grants the permanent x1.5 income boost. Idempotent.
    pub fn purchase_golden_boost(&mut self) {
        if self.phase != Phase::Ready {
            return;
        }
        self.state.golden_boost_purchased = true;
        self.recompute_income();
        self.mark_dirty();
        info!("golden boost purchased");
    }

    /// Marks the ad-free purchase. Idempotent; no economy effect.
    pub fn purchase_ad_free(&mut self) {
        if self.phase != Phase::Ready {
            return;
        }
        self.state.ad_free_purchased = true;
        self.mark_dirty();
    }

    /// Credits diamonds after an external payment. The transaction itself
    /// is the shell's responsibility; the engine trusts the caller.
    pub fn purchase_diamonds(&mut self, amount: u64) {
        if self.phase != Phase::Ready {
            return;
        }
        self.state.diamonds = self.state.diamonds.saturating_add(amount);
        self.mark_dirty();
        debug!(amount, total = self.state.diamonds, "diamonds credited");
    }

    /// Credits the single diamond earned by watching a rewarded ad.
    pub fn watch_ad_for_diamond(&mut self) {
        self.purchase_diamonds(1);
    }

    /// Writes the current state immediately, bypassing the debounce. The
    /// shell calls this when the app is backgrounded.
    pub fn save_now(&mut self) {
        if self.phase != Phase::Ready {
            return;
        }
        self.saver.cancel();
        self.persist(self.clock.now_ms());
    }

    /// Immutable view of the canonical state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Building lookup for the UI.
    pub fn building(&self, id: &str) -> Option<&Building> {
        self.state.building(id)
    }

    /// Coins credited by the boot-time offline reconciliation, if they
    /// cleared the notice threshold and have not been dismissed.
    pub fn offline_earnings(&self) -> Option<u64> {
        self.offline_notice
    }

    /// Clears the welcome-back notice once the UI has shown it.
    pub fn dismiss_offline_earnings(&mut self) {
        self.offline_notice = None;
    }

    /// Current coins-per-tap reward.
    pub fn tap_amount(&self) -> u64 {
        town_econ::tap_amount(self.state.unlocked_districts())
    }

    fn recompute_income(&mut self) {
        self.state.income_per_second = town_econ::income_per_second(&self.state);
    }

    fn mark_dirty(&mut self) {
        self.saver.mark_dirty(self.clock.now_ms());
    }

    /// Stamps the played clock and writes the blob. Failures are logged and
    /// swallowed; the next mutation schedules another attempt.
    fn persist(&mut self, now_ms: i64) {
        self.state.last_played_ms = now_ms;
        match town_save::encode(&self.state) {
            Ok(blob) => {
                if let Err(e) = self.gateway.save(&self.config.storage_key, &blob) {
                    warn!(error = %e, "save failed; will retry on a later write");
                }
            }
            Err(e) => warn!(error = %e, "could not encode save"),
        }
    }
}
