//! Benchmark for full map generation.
//!
//! TARGET: a default 1000x600 map in under 250ms
//!
//! Run with: cargo bench --package arcology --bench map_benchmark

use arcology::{MapAssembler, MapConfig, PartitionStrategy, StreetStyle};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn benchmark_full_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_map");
    group.sample_size(10);

    for (name, partition) in [("voronoi", PartitionStrategy::Voronoi), ("bsp", PartitionStrategy::Bsp)] {
        let assembler = MapAssembler::new(MapConfig {
            partition,
            ..MapConfig::default()
        })
        .expect("valid config");

        group.bench_function(format!("{name}_organic_streets"), |b| {
            b.iter(|| black_box(assembler.generate()));
        });
    }

    group.finish();
}

fn benchmark_without_streets(c: &mut Criterion) {
    let assembler = MapAssembler::new(MapConfig {
        street_style: StreetStyle::None,
        ..MapConfig::default()
    })
    .expect("valid config");

    c.bench_function("voronoi_zones_furniture_decorations", |b| {
        b.iter(|| black_box(assembler.generate()));
    });
}

criterion_group!(benches, benchmark_full_map, benchmark_without_streets);
criterion_main!(benches);
