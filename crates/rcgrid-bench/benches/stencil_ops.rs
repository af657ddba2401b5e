//! Criterion micro-benchmarks for the stencil kernel and node classification.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rcgrid_core::WorkerId;
use rcgrid_engine::{compute_band, RcStencil};
use rcgrid_mesh::{classify, RowRange, SharedGrid};
use rcgrid_test_utils::seeded_grid;

fn bench_compute_band_256(c: &mut Criterion) {
    let previous = SharedGrid::from_grid(&seeded_grid(256, 256, 220.0));
    let current = SharedGrid::zeros(256, 256).unwrap();
    let band = current
        .band(RowRange {
            worker: WorkerId(0),
            from: 0,
            to: 255,
        })
        .unwrap();
    let stencil = RcStencil::default();

    c.bench_function("compute_band_256x256", |b| {
        b.iter(|| compute_band(&stencil, &previous, &band, black_box(220.0)));
    });
}

fn bench_classify_256(c: &mut Criterion) {
    c.bench_function("classify_256x256", |b| {
        b.iter(|| {
            let mut corners = 0usize;
            for r in 0..256 {
                for col in 0..256 {
                    if classify(r, col, 256, 256).is_corner() {
                        corners += 1;
                    }
                }
            }
            black_box(corners)
        });
    });
}

criterion_group!(benches, bench_compute_band_256, bench_classify_256);
criterion_main!(benches);
