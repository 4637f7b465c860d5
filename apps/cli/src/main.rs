#![deny(warnings)]

//! Headless CLI: boots a town from disk, autoplays a session at full speed,
//! and prints the resulting KPIs. Useful for balance checks and for
//! exercising the whole engine/save stack without the app shell.

use anyhow::Result;
use town_core::DistrictId;
use town_engine::clock::ManualClock;
use town_engine::{EngineConfig, GameEngine};
use town_save::JsonFileGateway;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

fn parse_args() -> (Option<String>, Option<u64>, Option<u64>) {
    let mut save_dir: Option<String> = None;
    let mut seconds: Option<u64> = None;
    let mut taps: Option<u64> = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--save-dir" => save_dir = it.next(),
            "--seconds" => seconds = it.next().and_then(|s| s.parse().ok()),
            "--taps-per-second" => taps = it.next().and_then(|s| s.parse().ok()),
            _ => {}
        }
    }
    (save_dir, seconds, taps)
}

/// One second of greedy play: tap, open the next district when affordable,
/// then buy the cheapest building in reach.
fn autoplay_step(engine: &mut GameEngine<JsonFileGateway, ManualClock>, taps: u64) {
    for _ in 0..taps {
        engine.tap();
    }
    for district in DistrictId::ALL {
        if engine.unlock_district(district) {
            break;
        }
    }
    let coins = engine.state().coins;
    let cheapest = engine
        .state()
        .buildings
        .iter()
        .filter(|b| {
            engine
                .state()
                .district(b.district)
                .is_some_and(|d| d.unlocked)
        })
        .map(|b| (town_econ::building_cost(b.base_cost, b.owned), b.id.clone()))
        .filter(|(cost, _)| *cost <= coins)
        .min_by(|a, b| a.0.total_cmp(&b.0));
    if let Some((_, id)) = cheapest {
        engine.buy_building(id.as_str());
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let (save_dir, seconds, taps) = parse_args();
    let save_dir = save_dir.unwrap_or_else(|| "./saves".to_string());
    let seconds = seconds.unwrap_or(60);
    let taps = taps.unwrap_or(3);
    info!(sha = env!("GIT_SHA"), %save_dir, seconds, taps, "starting tiny-town session");

    // Boot at real wall time so returning players get their offline credit,
    // then advance simulated seconds at full speed.
    let clock = ManualClock::new(chrono::Utc::now().timestamp_millis());
    let gateway = JsonFileGateway::new(&save_dir);
    let mut engine = GameEngine::new(EngineConfig::default(), gateway, clock.clone());
    engine.boot();

    if let Some(earned) = engine.offline_earnings() {
        println!("Welcome back! Your town earned {earned} coins while you were away.");
        engine.dismiss_offline_earnings();
    }

    for _ in 0..seconds {
        autoplay_step(&mut engine, taps);
        clock.advance(1_000);
        engine.tick();
    }
    engine.save_now();

    let state = engine.state();
    town_core::validate(state)?;

    let owned_kinds = state.buildings.iter().filter(|b| b.owned > 0).count();
    let units: u64 = state.buildings.iter().map(|b| u64::from(b.owned)).sum();
    println!(
        "Town OK | districts: {}/{} | building kinds: {} | units: {}",
        state.unlocked_districts(),
        state.districts.len(),
        owned_kinds,
        units
    );
    println!(
        "KPI | seconds: {} | coins: {} | income/s: {} | earned: {} | taps: {} | diamonds: {}",
        seconds,
        state.coins.floor(),
        state.income_per_second,
        state.total_earned.floor(),
        state.tap_count,
        state.diamonds
    );

    Ok(())
}
