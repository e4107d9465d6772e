use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hdr_radiance_rs::hdr_pipeline::{
    reconstruct, Frame, HdrConfig, NoopObserver, ResponseCurve, WeightTable,
};
use hdr_radiance_rs::hdr_pipeline::engine::merge_frames;

fn generate_bracket(width: usize, height: usize) -> Vec<Frame> {
    [0.25, 1.0, 4.0]
        .iter()
        .map(|&k| {
            let mut samples = Vec::with_capacity(width * height * 3);
            for y in 0..height {
                for x in 0..width {
                    let radiance = 8.0 + 52.0 * ((x + y) % 97) as f64 / 97.0;
                    let level = (radiance * k).round().min(255.0) as u16;
                    samples.extend_from_slice(&[level, level, level]);
                }
            }
            Frame::new(width, height, samples, 256, k).unwrap()
        })
        .collect()
}

fn benchmark_merge_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_by_size");

    let sizes = vec![
        (100, 100, "100x100"),
        (500, 500, "500x500"),
        (1000, 1000, "1000x1000"),
    ];

    let curve = ResponseCurve::linear(256);
    let weights = WeightTable::new(256);

    for (width, height, label) in sizes {
        let frames = generate_bracket(width, height);

        group.bench_with_input(BenchmarkId::from_parameter(label), &frames, |b, frames| {
            b.iter(|| merge_frames(black_box(frames), &curve, &weights).unwrap());
        });
    }

    group.finish();
}

fn benchmark_reconstruction(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruction");
    group.sample_size(10);
    let frames = generate_bracket(1200, 800);

    group.bench_function("default_scales", |b| {
        let config = HdrConfig::default();
        b.iter(|| reconstruct(black_box(&frames), &config, &mut NoopObserver).unwrap());
    });

    group.bench_function("single_coarse_scale", |b| {
        let config = HdrConfig::builder().scales(vec![100]).build();
        b.iter(|| reconstruct(black_box(&frames), &config, &mut NoopObserver).unwrap());
    });

    group.finish();
}

criterion_group!(benches, benchmark_merge_sizes, benchmark_reconstruction);
criterion_main!(benches);
