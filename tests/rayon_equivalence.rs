#![cfg(feature = "rayon")]

use featcorr::{
    detect_with_config, filter_pyramid, DetectConfig, FeatureLevel, FeatureView, ScoreViewMut,
    Volume,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const C: usize = 32;

fn random_volume(rng: &mut StdRng, height: usize, width: usize) -> Volume {
    Volume::from_fn(height, width, C, |_, _, _| rng.random_range(-1.0f32..1.0)).unwrap()
}

#[test]
fn parallel_matches_sequential_bits() {
    let mut rng = StdRng::seed_from_u64(31);
    let features = random_volume(&mut rng, 40, 37);
    for &(fh, fw) in &[(5usize, 5usize), (6, 4), (1, 1), (40, 2)] {
        let filter = random_volume(&mut rng, fh, fw);
        let seq = detect_with_config(
            features.view(),
            filter.view(),
            0.75,
            &DetectConfig::default(),
        )
        .unwrap();
        let par = detect_with_config(
            features.view(),
            filter.view(),
            0.75,
            &DetectConfig {
                parallel: true,
                ..DetectConfig::default()
            },
        )
        .unwrap();

        assert_eq!(seq.valid_region(), par.valid_region());
        for (a, b) in seq.as_slice().iter().zip(par.as_slice()) {
            assert_eq!(a.to_bits(), b.to_bits(), "filter {fh}x{fw}");
        }
    }
}

#[test]
fn parallel_into_strided_output() {
    let mut rng = StdRng::seed_from_u64(32);
    let features = random_volume(&mut rng, 9, 11);
    let filter = random_volume(&mut rng, 3, 3);
    let cfg = DetectConfig {
        parallel: true,
        ..DetectConfig::default()
    };
    let expected =
        detect_with_config(features.view(), filter.view(), 0.0, &DetectConfig::default()).unwrap();

    let mut buffer = vec![f32::NAN; 9 * 30];
    let mut out = ScoreViewMut::new(&mut buffer, 9, 11, 30, 2).unwrap();
    featcorr::detect_into(features.view(), filter.view(), 0.0, &cfg, &mut out).unwrap();

    for y in 0..9 {
        for x in 0..11 {
            let got = buffer[y * 30 + x * 2];
            assert_eq!(got.to_bits(), expected.get(y, x).unwrap().to_bits());
        }
    }
}

#[test]
fn parallel_into_column_major_output() {
    let mut rng = StdRng::seed_from_u64(34);
    let features = random_volume(&mut rng, 7, 10);
    let filter = random_volume(&mut rng, 2, 3);
    let cfg = DetectConfig {
        parallel: true,
        ..DetectConfig::default()
    };
    let expected =
        detect_with_config(features.view(), filter.view(), 0.25, &DetectConfig::default())
            .unwrap();

    let mut buffer = vec![f32::NAN; 7 * 10];
    let mut out = ScoreViewMut::new(&mut buffer, 7, 10, 1, 7).unwrap();
    featcorr::detect_into(features.view(), filter.view(), 0.25, &cfg, &mut out).unwrap();

    for y in 0..7 {
        for x in 0..10 {
            let got = buffer[x * 7 + y];
            assert_eq!(got.to_bits(), expected.get(y, x).unwrap().to_bits());
        }
    }
}

#[test]
fn parallel_pyramid_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(33);
    let volumes: Vec<Volume> = [(24usize, 20usize), (17, 14), (12, 10), (4, 3)]
        .iter()
        .map(|&(h, w)| random_volume(&mut rng, h, w))
        .collect();
    let scales = [1.0f32, 0.7, 0.5, 0.25];
    let levels: Vec<FeatureLevel<'_>> = volumes
        .iter()
        .zip(scales)
        .map(|(vol, scale)| FeatureLevel {
            features: vol.view(),
            scale,
        })
        .collect();
    let filter = random_volume(&mut rng, 5, 4);
    let filter: FeatureView<'_> = filter.view();

    let seq = filter_pyramid(&levels, filter, 0.1, &DetectConfig::default()).unwrap();
    let par = filter_pyramid(
        &levels,
        filter,
        0.1,
        &DetectConfig {
            parallel: true,
            ..DetectConfig::default()
        },
    )
    .unwrap();
    assert_eq!(seq, par);
}
