//! Benchmark for the lighting relaxation over a small lit cavern.
//!
//! Run with: cargo bench --package voxmorph_core --bench light_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use voxmorph_core::{compute_lighting, OpacityTable, VoxelGrid};

const STONE: u8 = 1;
const GLOW: u8 = 89;

fn cavern(side: usize) -> VoxelGrid {
    let mut grid = VoxelGrid::try_new(side, side, 64).unwrap();
    for x in 0..side {
        for y in 0..side {
            for z in 0..40 {
                grid.set(x, y, z, STONE, 0);
            }
        }
    }
    for x in 2..side - 2 {
        for y in 2..side - 2 {
            for z in 10..20 {
                grid.set(x, y, z, 0, 0);
            }
        }
    }
    grid.set(side / 2, side / 2, 10, GLOW, 0);
    grid
}

fn benchmark_lighting(c: &mut Criterion) {
    let mut opacity = OpacityTable::new();
    opacity.set_opacity(STONE, 15);
    opacity.set_block(GLOW, -15);

    let mut group = c.benchmark_group("lighting");
    group.sample_size(10);
    for side in [16usize, 32] {
        group.bench_with_input(BenchmarkId::new("cavern", side), &side, |b, &side| {
            b.iter_batched(
                || cavern(side),
                |mut grid| {
                    compute_lighting(&mut grid, black_box(&opacity));
                    grid
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_lighting);
criterion_main!(benches);
