//! Benchmarks for brook-reactive operators.
//!
//! Measures one query execution per iteration, including the hop to the
//! blocking pool.

use brook_core::Result;
use brook_reactive::{collect_list, execute_one, observe, Cancellation, QueryExt, QueryStreamExt};
use brook_testing::{employees_query, EmployeesQuery, InMemoryProvider, MAPPER};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use futures::{stream, StreamExt};

fn employees(n: usize) -> EmployeesQuery {
    let values: Vec<String> = (0..n)
        .flat_map(|i| [format!("user{}", i), format!("User {}", i)])
        .collect();
    let refs: Vec<&str> = values.iter().map(String::as_str).collect();
    employees_query(&refs)
}

fn once(query: EmployeesQuery) -> stream::Iter<std::vec::IntoIter<Result<EmployeesQuery>>> {
    stream::iter(vec![Ok(query)])
}

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");

    let single = employees(1);
    group.bench_function("one", |b| {
        b.iter(|| execute_one(black_box(&single), &MAPPER, None))
    });

    for size in [10, 100, 1000] {
        let query = employees(size);
        let cancel = Cancellation::new();
        group.bench_with_input(BenchmarkId::new("list", size), &query, |b, query| {
            b.iter(|| collect_list(black_box(query), &MAPPER, &cancel))
        });
    }

    group.finish();
}

fn bench_operators(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("operators");

    let single = employees(1);
    group.bench_function("map_to_one", |b| {
        b.iter(|| {
            runtime.block_on(once(single.clone()).map_to_one(MAPPER).next())
        })
    });

    for size in [10, 100, 1000] {
        let query = employees(size);
        group.bench_with_input(BenchmarkId::new("map_to_list", size), &query, |b, query| {
            b.iter(|| runtime.block_on(once(query.clone()).map_to_list(MAPPER).next()))
        });
        group.bench_with_input(BenchmarkId::new("as_rows", size), &query, |b, query| {
            b.iter(|| {
                runtime.block_on(async {
                    query.clone().as_rows(MAPPER).fold(0usize, |n, _| async move { n + 1 }).await
                })
            })
        });
    }

    group.finish();
}

fn bench_notify(c: &mut Criterion) {
    let mut group = c.benchmark_group("notify");

    for observers in [1, 10, 100] {
        let provider = InMemoryProvider::new();
        let registry = provider.registry();
        let table = InMemoryProvider::table();
        let mut streams: Vec<_> = (0..observers)
            .map(|_| observe(registry.clone(), table.clone(), false, employees(0)))
            .collect();
        for stream in streams.iter_mut() {
            let _ = futures::executor::block_on(stream.next());
        }

        group.bench_with_input(BenchmarkId::new("notify_change", observers), &table, |b, table| {
            b.iter(|| registry.notify_change(black_box(table)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_execute, bench_operators, bench_notify);
criterion_main!(benches);
