//! Simulation benchmarks for galaxy_core.
//!
//! Run with: `cargo bench -p galaxy_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use galaxy_core::config::GalaxyConfig;
use galaxy_core::route_planner::{plan_route, PlannerInput};
use galaxy_core::simulation::Galaxy;

fn warmed_galaxy(planets: u32) -> Galaxy {
    let config = GalaxyConfig::default()
        .with_planet_count(planets)
        .with_player(false);
    let mut galaxy = Galaxy::generate(config, 42).expect("generate");
    // Past the first big tick so prices have spread.
    for _ in 0..30 {
        galaxy.tick().expect("tick");
    }
    galaxy
}

/// Ticks of whole galaxies at a few sizes.
pub fn tick_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("galaxy_tick");
    for planets in [10, 35, 100] {
        let galaxy = warmed_galaxy(planets);
        group.bench_with_input(BenchmarkId::from_parameter(planets), &galaxy, |b, galaxy| {
            b.iter_batched(
                || galaxy.clone(),
                |mut galaxy| {
                    for _ in 0..14 {
                        black_box(galaxy.tick().expect("tick"));
                    }
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

/// Route searches at increasing depth.
pub fn route_benchmark(c: &mut Criterion) {
    let galaxy = warmed_galaxy(35);
    let mut group = c.benchmark_group("plan_route");
    for depth in [1, 3, 5] {
        let input = PlannerInput {
            origin: 0,
            credits: 1500,
            free_cargo: 40,
            fuel_cost: 3,
            max_units: 10,
            max_depth: depth,
        };
        group.bench_with_input(BenchmarkId::from_parameter(depth), &input, |b, input| {
            b.iter(|| black_box(plan_route(galaxy.world(), input).expect("plan")));
        });
    }
    group.finish();
}

criterion_group!(benches, tick_benchmark, route_benchmark);
criterion_main!(benches);
