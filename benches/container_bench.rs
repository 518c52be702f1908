#![allow(clippy::uninlined_format_args)]
//! 容器解析的性能基准测试

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nestdi::{Container, ContainerConfig, Identifier};
use std::sync::Arc;

/// 测试用的简单服务
struct SimpleService {
    value: i32,
}

/// 基准测试：各绑定策略的单次解析
fn bench_binding_strategies(c: &mut Criterion) {
    let container = Container::new();
    let constant = Identifier::new("constant");
    let dynamic = Identifier::new("dynamic");
    let memoized = Identifier::new("memoized");
    let alias = Identifier::new("alias");

    container
        .bind_constant(&constant, SimpleService { value: 1 })
        .bind_dynamic(&dynamic, |_| SimpleService { value: 2 })
        .bind_memoized(&memoized, |_| SimpleService { value: 3 })
        .alias(&alias, &constant)
        .unwrap();

    let mut group = c.benchmark_group("binding_strategies");
    for (label, id) in [
        ("constant", &constant),
        ("dynamic", &dynamic),
        ("memoized", &memoized),
        ("alias", &alias),
    ] {
        group.bench_function(label, |b| {
            b.iter(|| black_box(container.resolve(id).unwrap().value));
        });
    }
    group.finish();
}

/// 基准测试：沿父容器链回退的解析
fn bench_parent_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("parent_chain_resolution");

    for depth in [1usize, 4, 16, 64].iter() {
        let root = Arc::new(Container::new());
        let id = Identifier::new("root_service");
        root.bind_constant(&id, SimpleService { value: 42 });

        let mut leaf = Arc::clone(&root);
        for _ in 0..*depth {
            leaf = Arc::new(leaf.child());
        }

        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, _| {
            b.iter(|| black_box(leaf.resolve(&id).unwrap().value));
        });
    }
    group.finish();
}

/// 基准测试：关闭统计与循环检测时的开销对比
fn bench_guard_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("guard_overhead");

    for (label, config) in [
        ("default", ContainerConfig::default()),
        ("unguarded", ContainerConfig::unguarded()),
        (
            "no_stats",
            ContainerConfig {
                track_stats: false,
                ..Default::default()
            },
        ),
    ] {
        let container = Container::with_config(config);
        let id = Identifier::new("service");
        container.bind_constant(&id, SimpleService { value: 7 });

        group.bench_function(label, |b| {
            b.iter(|| black_box(container.resolve(&id).unwrap().value));
        });
    }
    group.finish();
}

/// 基准测试：大量绑定下的注册与解析
fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    for count in [10usize, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let container = Container::new();
                let ids: Vec<Identifier<SimpleService>> = (0..count)
                    .map(|i| Identifier::new(format!("service_{}", i)))
                    .collect();

                for (i, id) in ids.iter().enumerate() {
                    container.bind_memoized(id, move |_| SimpleService { value: i as i32 });
                }

                let total: i32 = ids
                    .iter()
                    .map(|id| container.resolve(id).unwrap().value)
                    .sum();
                black_box(total)
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_binding_strategies,
    bench_parent_chain,
    bench_guard_overhead,
    bench_registration
);
criterion_main!(benches);
