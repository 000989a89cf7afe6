use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use stratumlib::cache::CacheSpec;
use stratumlib::config::ReplacementPolicyConfig;
use stratumlib::hierarchy::HierarchyBuilder;
use stratumlib::simulator::Simulator;
use stratumlib::util::{mixed_workload, sequential_loads};

/// Runs the same workloads through a three level hierarchy with each provided policy
pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Hierarchy");
    let workloads = [
        ("sequential", sequential_loads(0, 8, 200_000)),
        ("mixed", mixed_workload(200_000, 1 << 22, 4, 17)),
    ];
    let policies = [
        ReplacementPolicyConfig::LeastRecentlyUsed,
        ReplacementPolicyConfig::RoundRobin,
        ReplacementPolicyConfig::LeastFrequentlyUsed,
        ReplacementPolicyConfig::Random,
    ];
    for (name, accesses) in &workloads {
        for policy in policies {
            group.bench_with_input(BenchmarkId::new(*name, format!("{policy:?}")), accesses, |bench, accesses| {
                bench.iter(|| {
                    let hierarchy = HierarchyBuilder::new()
                        .cache(CacheSpec::new("L1", 64, 8, 64, 4), policy)
                        .cache(CacheSpec::new("L2", 512, 8, 64, 12), policy)
                        .cache(CacheSpec::new("L3", 4096, 16, 64, 40), policy)
                        .main_memory("MainMemory", 200)
                        .build()
                        .unwrap();
                    Simulator::new(hierarchy).simulate(accesses.iter().copied()).len()
                });
            });
        }
    }
}

criterion_group!(
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = criterion_benchmark
);
criterion_main!(benches);
