//! Synthetic cases with hand-computed score maps, plus planted-filter recovery.

use featcorr::{detect_with_config, DetectConfig, Volume, INVALID_SCORE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

const CASES_JSON: &str = r#"{
  "cases": [
    {
      "case_id": "box_2x2_single_channel",
      "channels": 1,
      "bias": 1.0,
      "features": { "shape": [3, 3, 1], "data": [1, 2, 3, 4, 5, 6, 7, 8, 9] },
      "filter": { "shape": [2, 2, 1], "data": [1, 1, 1, 1] },
      "expected": [
        [11, 15, -2],
        [23, 27, -2],
        [-2, -2, -2]
      ]
    },
    {
      "case_id": "filter_fills_features",
      "channels": 2,
      "features": {
        "shape": [3, 3, 2],
        "data": [1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2]
      },
      "filter": {
        "shape": [3, 3, 2],
        "data": [1, 0.5, 1, 0.5, 1, 0.5, 1, 0.5, 1, 0.5, 1, 0.5, 1, 0.5, 1, 0.5, 1, 0.5]
      },
      "expected": [
        [-2, -2, -2],
        [-2, 18, -2],
        [-2, -2, -2]
      ]
    },
    {
      "case_id": "taller_than_features",
      "channels": 1,
      "bias": 0.5,
      "features": { "shape": [3, 3, 1], "data": [1, 1, 1, 1, 1, 1, 1, 1, 1] },
      "filter": { "shape": [4, 1, 1], "data": [1, 1, 1, 1] },
      "expected": [
        [-2, -2, -2],
        [-2, -2, -2],
        [-2, -2, -2]
      ]
    }
  ]
}"#;

#[derive(Debug, Deserialize)]
struct VolumeJson {
    shape: [usize; 3],
    data: Vec<f32>,
}

impl VolumeJson {
    fn to_volume(&self) -> Volume {
        let [h, w, c] = self.shape;
        Volume::new(self.data.clone(), h, w, c).unwrap()
    }
}

#[derive(Debug, Deserialize)]
struct Case {
    case_id: String,
    channels: usize,
    #[serde(default)]
    bias: f32,
    features: VolumeJson,
    filter: VolumeJson,
    expected: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct Cases {
    cases: Vec<Case>,
}

#[test]
fn synthetic_cases_match_hand_computed_maps() {
    let cases: Cases = serde_json::from_str(CASES_JSON).unwrap();
    assert!(!cases.cases.is_empty());

    for case in &cases.cases {
        let cfg = DetectConfig {
            channels: case.channels,
            ..DetectConfig::default()
        };
        let features = case.features.to_volume();
        let filter = case.filter.to_volume();
        let map = detect_with_config(features.view(), filter.view(), case.bias, &cfg).unwrap();

        assert_eq!(map.height(), case.expected.len(), "{}", case.case_id);
        for (y, expected_row) in case.expected.iter().enumerate() {
            let row = map.row(y).unwrap();
            assert_eq!(row, expected_row.as_slice(), "{} row {y}", case.case_id);
        }
    }
}

#[test]
fn planted_filter_is_the_best_response() {
    let mut rng = StdRng::seed_from_u64(7);
    let (height, width, channels) = (20, 24, 32);
    let (fh, fw) = (4, 3);
    let (py, px) = (9, 14);

    let patch = Volume::from_fn(fh, fw, channels, |_, _, _| rng.random_range(0.5f32..1.0)).unwrap();
    let features = Volume::from_fn(height, width, channels, |y, x, c| {
        if (py..py + fh).contains(&y) && (px..px + fw).contains(&x) {
            patch.view().get(y - py, x - px, c).unwrap()
        } else {
            ((y * 31 + x * 17 + c * 7) % 10) as f32 * 0.01
        }
    })
    .unwrap();

    let map = detect_with_config(
        features.view(),
        patch.view(),
        0.0,
        &DetectConfig::default(),
    )
    .unwrap();
    let (by, bx, best) = map
        .valid_scores()
        .max_by(|a, b| a.2.total_cmp(&b.2))
        .unwrap();

    // Output cells are centred on the filter: top = (fh - 1) / 2, left = (fw - 1) / 2.
    assert_eq!((by, bx), (py + (fh - 1) / 2, px + (fw - 1) / 2));
    assert!(best > 0.0);
    assert!(map
        .as_slice()
        .iter()
        .all(|&v| v == INVALID_SCORE || v <= best));
}
