/*
 * Boid Simulation Benchmark
 *
 * Measures the stages of a tick separately (quadtree build, neighbor
 * queries against a linear scan, steering) and the full tick, for a few
 * flock sizes.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use quadboids::flocking;
use quadboids::quadtree::scan_range;
use quadboids::{Flock, QuadTree, Rect, Simulation, SimulationParams};

const SIZES: [usize; 4] = [100, 500, 1000, 2000];
const SEED: u64 = 0xB01D;

fn build_tree(tree: &mut QuadTree, flock: &Flock, params: &SimulationParams) {
    tree.build(Rect::world(params.world_width, params.world_height));
    for (id, &position) in flock.positions().iter().enumerate() {
        tree.insert(position, id);
    }
}

fn bench_quadtree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_build");
    let params = SimulationParams::default();

    for &n in SIZES.iter() {
        let flock = Flock::spawn(n, SEED, &params);
        let mut tree = QuadTree::new();

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                build_tree(&mut tree, &flock, &params);
                black_box(tree.node_count());
                tree.reset();
            });
        });
    }

    group.finish();
}

fn bench_neighbor_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_queries");
    let params = SimulationParams::default();

    for &n in SIZES.iter() {
        let flock = Flock::spawn(n, SEED, &params);
        let mut tree = QuadTree::new();
        build_tree(&mut tree, &flock, &params);
        let windows: Vec<Rect> = flock
            .positions()
            .iter()
            .map(|&p| Rect::around(p, params.neighborhood_range))
            .collect();

        group.bench_with_input(BenchmarkId::new("quadtree", n), &n, |b, _| {
            let mut found = Vec::new();
            b.iter(|| {
                for window in &windows {
                    found.clear();
                    tree.query_into(window, flock.positions(), &mut found);
                    black_box(found.len());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("linear_scan", n), &n, |b, _| {
            b.iter(|| {
                for window in &windows {
                    black_box(scan_range(window, flock.positions()).len());
                }
            });
        });
    }

    group.finish();
}

fn bench_steering(c: &mut Criterion) {
    let mut group = c.benchmark_group("steering");

    for parallel in [false, true] {
        let params = SimulationParams {
            enable_parallel: parallel,
            ..SimulationParams::default()
        };
        let label = if parallel { "parallel" } else { "sequential" };

        for &n in SIZES.iter() {
            let mut flock = Flock::spawn(n, SEED, &params);
            let mut tree = QuadTree::new();
            build_tree(&mut tree, &flock, &params);

            group.bench_with_input(BenchmarkId::new(label, n), &n, |b, _| {
                b.iter(|| black_box(flocking::steer(&mut flock, &tree, &params)));
            });
        }
    }

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for &n in SIZES.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut sim = match Simulation::new(SimulationParams::default()) {
                Ok(sim) => sim,
                Err(err) => panic!("default parameters rejected: {err}"),
            };
            sim.spawn(n, SEED);
            b.iter(|| black_box(sim.tick().map(|stats| stats.neighbor_pairs)));
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));
    targets = bench_quadtree_build, bench_neighbor_queries, bench_steering, bench_tick
}

criterion_main!(benches);
