use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_income(c: &mut Criterion) {
    let mut state = town_core::GameState::new_game(0);
    for d in &mut state.districts {
        d.unlocked = true;
    }
    for (i, b) in state.buildings.iter_mut().enumerate() {
        b.owned = (i as u32 + 1) * 10;
        b.level = ((i % 5) + 1) as u8;
    }
    state.golden_boost_purchased = true;
    c.bench_function("income_per_second_full_catalog", |b| {
        b.iter(|| town_econ::income_per_second(black_box(&state)))
    });
}

fn bench_building_cost(c: &mut Criterion) {
    c.bench_function("building_cost", |b| {
        b.iter(|| town_econ::building_cost(black_box(15.0), black_box(250)))
    });
}

criterion_group!(benches, bench_income, bench_building_cost);
criterion_main!(benches);
