//! Benchmarks for girder bridge simulation.

use criterion::{criterion_group, criterion_main, Criterion};
use girder::*;

fn bench_truss_simulation(c: &mut Criterion) {
    c.bench_function("truss_4_panels_60_steps", |b| {
        b.iter(|| {
            let mut env = Environment::new(9.8, 50.0, 0.0, 500.0).unwrap();
            place_truss(&mut env, &TrussConfig::new(Vector::new(8.0, 4.0))).unwrap();
            env.start();
            for _ in 0..60 {
                env.update(1.0 / 60.0, 800.0, 500.0);
            }
            env.node_count()
        });
    });
}

fn bench_weight_pile(c: &mut Criterion) {
    c.bench_function("weights_100_on_terrain_60_steps", |b| {
        b.iter(|| {
            let mut env = Environment::new(9.8, 50.0, 0.0, 500.0).unwrap();
            let terrain = Terrain {
                points: vec![Vector::new(-1.0, 1.0), Vector::new(17.0, 1.0)],
                segments: vec![(0, 1)],
                start_nodes: vec![],
            };
            terrain.place(&mut env).unwrap();
            for i in 0..100 {
                let x = 50.0 + 7.0 * (i % 100) as f64;
                let y = 50.0 + 3.0 * (i / 10) as f64;
                env.drop_weight(x, y).unwrap();
            }
            env.start();
            for _ in 0..60 {
                env.update(1.0 / 60.0, 800.0, 500.0);
            }
            env.weight_count()
        });
    });
}

fn bench_connectivity(c: &mut Criterion) {
    let mut env = Environment::new(9.8, 1.0, 0.0, 100.0).unwrap();
    let nodes: Vec<NodeId> = (0..=200)
        .map(|i| env.add_node(Node::fixed(Vector::new(0.1 * i as f64, 50.0), 10.0).unwrap()))
        .collect();
    for pair in nodes.windows(2) {
        env.add_constraint(ConstraintKind::Bed, pair[0], pair[1], 0.05).unwrap();
    }
    c.bench_function("bridge_cover_200_links", |b| {
        b.iter(|| env.does_bridge_cover(20.0));
    });
}

criterion_group!(benches, bench_truss_simulation, bench_weight_pile, bench_connectivity);
criterion_main!(benches);
