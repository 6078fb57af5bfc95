#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]
//! Benchmark for normalization range computation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trueno_plot::prelude::*;

fn sine_frames(frames: usize, points: usize) -> FrameMap {
    (0..frames).fold(FrameMap::new(["phase"]), |map, f| {
        let xs: Vec<f32> = (0..points).map(|i| i as f32 / points as f32).collect();
        let ys: Vec<f32> = xs
            .iter()
            .map(|x| (x * std::f32::consts::TAU + f as f32 * 0.1).sin() * (1.0 + f as f32))
            .collect();
        map.with_item(key![f], Element::curve(&xs, &ys))
    })
}

fn ranges_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_ranges");
    let renderer = SceneRenderer::new();

    for points in [100, 1_000, 10_000, 100_000] {
        let map = sine_frames(16, points);
        let plot = renderer.plot(map.clone()).unwrap();
        let obj = Viewable::Map(map);

        group.bench_with_input(BenchmarkId::new("mapwise", points), &points, |b, _| {
            b.iter(|| plot.compute_ranges(black_box(&obj), None, None));
        });
    }

    group.finish();
}

fn overlay_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlay_render");
    let renderer = SceneRenderer::new();

    for layers in [2, 8, 32] {
        let overlay = (0..layers).fold(Overlay::new(), |o, i| {
            let ys: Vec<f32> = (0..1_000).map(|x| (x as f32 * 0.01 + i as f32).cos()).collect();
            let xs: Vec<f32> = (0..1_000).map(|x| x as f32).collect();
            o.with_layer(Element::curve(&xs, &ys).label(format!("L{i}")))
        });

        group.bench_with_input(BenchmarkId::from_parameter(layers), &layers, |b, _| {
            b.iter(|| renderer.render(black_box(overlay.clone()), None).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, ranges_benchmark, overlay_benchmark);
criterion_main!(benches);
