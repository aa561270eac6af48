use criterion::{criterion_group, criterion_main, Criterion};
use featcorr::{detect_with_config, filter_pyramid, DetectConfig, FeatureLevel, Volume};
use std::hint::black_box;

const C: usize = 32;

fn make_volume(height: usize, width: usize, seed: usize) -> Volume {
    Volume::from_fn(height, width, C, |y, x, c| {
        let v = ((x * 13) ^ (y * 7) ^ (c * 5) ^ seed) & 0xFF;
        v as f32 / 255.0 - 0.5
    })
    .unwrap()
}

fn bench_detect(c: &mut Criterion) {
    let features = make_volume(96, 128, 1);
    let root = make_volume(6, 6, 2);
    let part = make_volume(12, 12, 3);

    c.bench_function("detect_root_6x6", |b| {
        let cfg = DetectConfig::default();
        b.iter(|| {
            black_box(detect_with_config(features.view(), root.view(), 0.1, &cfg).unwrap())
        });
    });

    c.bench_function("detect_part_12x12", |b| {
        let cfg = DetectConfig::default();
        b.iter(|| {
            black_box(detect_with_config(features.view(), part.view(), 0.1, &cfg).unwrap())
        });
    });

    if cfg!(feature = "rayon") {
        c.bench_function("detect_part_12x12_parallel", |b| {
            let cfg = DetectConfig {
                parallel: true,
                ..DetectConfig::default()
            };
            b.iter(|| {
                black_box(detect_with_config(features.view(), part.view(), 0.1, &cfg).unwrap())
            });
        });
    }
}

fn bench_pyramid(c: &mut Criterion) {
    let volumes: Vec<Volume> = (0..8)
        .map(|idx| {
            let scale = 0.8f32.powi(idx);
            let h = (96.0 * scale) as usize;
            let w = (128.0 * scale) as usize;
            make_volume(h.max(1), w.max(1), idx as usize)
        })
        .collect();
    let levels: Vec<FeatureLevel<'_>> = volumes
        .iter()
        .enumerate()
        .map(|(idx, vol)| FeatureLevel {
            features: vol.view(),
            scale: 0.8f32.powi(idx as i32),
        })
        .collect();
    let filter = make_volume(6, 6, 9);

    c.bench_function("filter_pyramid_8_levels", |b| {
        let cfg = DetectConfig::default();
        b.iter(|| black_box(filter_pyramid(&levels, filter.view(), 0.0, &cfg).unwrap()));
    });
}

criterion_group!(benches, bench_detect, bench_pyramid);
criterion_main!(benches);
