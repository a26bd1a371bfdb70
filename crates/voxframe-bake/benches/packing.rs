//! Packing throughput on sample animations.
//!
//! Run with: cargo bench --package voxframe-bake --bench packing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use voxframe_bake::{FramePacker, PackConfig};
use voxframe_test::{sample_animation, test_palette};

fn benchmark_pack(c: &mut Criterion) {
    let mask = test_palette().transparency_mask();
    let mut group = c.benchmark_group("pack");

    for size in [8, 16, 32] {
        let animation = sample_animation(8, size);
        let voxels: usize = animation.frames().iter().map(|f| f.len()).sum();
        group.throughput(Throughput::Elements(voxels as u64));

        for (name, parallel) in [("sequential", false), ("parallel", true)] {
            let packer = FramePacker::new(PackConfig::default().with_parallel(parallel));
            group.bench_with_input(BenchmarkId::new(name, size), &animation, |b, animation| {
                b.iter(|| black_box(packer.pack_animation(animation, &mask)));
            });
        }
    }

    group.finish();
}

fn benchmark_encode(c: &mut Criterion) {
    let mask = test_palette().transparency_mask();
    let artifact = FramePacker::default().pack_animation(&sample_animation(8, 16), &mask);

    c.bench_function("artifact_to_bytes", |b| {
        b.iter(|| black_box(artifact.to_bytes()));
    });
}

criterion_group!(benches, benchmark_pack, benchmark_encode);
criterion_main!(benches);
