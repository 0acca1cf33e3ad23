use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use deadlock_detector::{has_cycle, ResourceGraph, ResourceState, SafetyEvaluator, ScanOrder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_dag(nodes: usize, edges: usize, seed: u64) -> ResourceGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = ResourceGraph::new();
    for _ in 0..edges {
        let a = rng.gen_range(0..nodes - 1);
        let b = rng.gen_range(a + 1..nodes);
        graph.add_edge(format!("N{}", a), format!("N{}", b));
    }
    graph
}

fn bench_cycle_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("cycle_detection");
    group.sample_size(50);

    let dag = random_dag(10_000, 50_000, 42);
    group.bench_function("dag_10k_nodes_50k_edges", |b| {
        b.iter(|| black_box(has_cycle(&dag)))
    });

    group.bench_function("ring_10k_nodes", |b| {
        b.iter_batched(
            || {
                ResourceGraph::from_edges(
                    (0..10_000).map(|i| (format!("P{}", i), format!("P{}", (i + 1) % 10_000))),
                )
            },
            |ring| black_box(has_cycle(&ring)),
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

fn random_state(processes: usize, resources: usize, seed: u64) -> ResourceState {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut allocation = Vec::with_capacity(processes);
    let mut maximum = Vec::with_capacity(processes);
    for _ in 0..processes {
        let alloc: Vec<u64> = (0..resources).map(|_| rng.gen_range(0..10)).collect();
        let max: Vec<u64> = alloc.iter().map(|a| a + rng.gen_range(0..10)).collect();
        allocation.push(alloc);
        maximum.push(max);
    }
    let available = (0..resources).map(|_| rng.gen_range(5..15)).collect();
    ResourceState::new(allocation, maximum, available).unwrap()
}

fn bench_safety_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("safety_check");
    group.sample_size(50);

    let state = random_state(200, 16, 1337);
    for order in [ScanOrder::Continue, ScanOrder::Restart] {
        let evaluator = SafetyEvaluator::new(order);
        group.bench_function(format!("200_processes_16_resources_{}", order), |b| {
            b.iter(|| black_box(evaluator.evaluate(&state)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cycle_detection, bench_safety_check);
criterion_main!(benches);
