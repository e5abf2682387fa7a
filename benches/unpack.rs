#![allow(unused)]
extern crate snapscope;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use snapscope::prelude::*;
use std::hint::black_box;

/// Builds a synthetic capture with `objects` managed objects.
///
/// Every tenth object hangs off a GC handle; each object references the next two, and every
/// third edge is dropped so that a share of the heap is unreachable.
fn synthetic_capture(objects: usize) -> PackedCrawlerData {
    let handles = objects / 10;
    let snapshot = PackedMemorySnapshot {
        gc_handles: (0..handles)
            .map(|i| PackedGcHandle {
                target: 0x1000 + (i as u64) * 0x100,
            })
            .collect(),
        type_descriptions: vec![TypeDescription {
            name: "System.Object".to_string(),
            size: 16,
            ..TypeDescription::default()
        }],
        ..PackedMemorySnapshot::default()
    };

    let managed: Vec<PackedManagedObject> = (0..objects)
        .map(|i| PackedManagedObject {
            address: 0x1000 + (i as u64) * 0x10,
            type_index: 0,
            size: 16,
        })
        .collect();

    let first_managed = handles;
    let mut connections = Vec::with_capacity(handles + objects * 2);
    for h in 0..handles {
        connections.push(Connection::new(h, first_managed + h * 10));
    }
    for i in 0..objects {
        for step in 1..=2 {
            let target = i + step;
            if target < objects && (i + step) % 3 != 0 {
                connections.push(Connection::new(first_managed + i, first_managed + target));
            }
        }
    }

    PackedCrawlerData::new(snapshot)
        .with_managed_objects(managed)
        .with_connections(connections)
}

/// Benchmark unpacking packed tables into the linked graph
fn bench_unpack(c: &mut Criterion) {
    let mut group = c.benchmark_group("unpack");
    for objects in [1_000usize, 10_000, 100_000] {
        let data = synthetic_capture(objects);
        group.throughput(Throughput::Elements(data.connections.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(objects), &data, |b, data| {
            b.iter(|| {
                let snapshot = unpack(black_box(data.clone())).unwrap();
                black_box(snapshot)
            });
        });
    }
    group.finish();
}

/// Benchmark the reachability and differential filters together
fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");
    for objects in [1_000usize, 10_000, 100_000] {
        let baseline = unpack(synthetic_capture(objects / 2)).unwrap();
        let mut current = unpack(synthetic_capture(objects)).unwrap();
        group.throughput(Throughput::Elements(current.len() as u64));
        group.bench_function(BenchmarkId::from_parameter(objects), |b| {
            b.iter(|| {
                let summary = apply_filter(
                    black_box(&mut current),
                    FilterSet::all(),
                    Some(&baseline),
                    &DefaultRoots,
                );
                black_box(summary)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_unpack, bench_filters);
criterion_main!(benches);
