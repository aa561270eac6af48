use clap::Parser;
use featcorr::{detect_with_config, DetectConfig, ScoreMap, Volume};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "featcorr CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectConfigJson {
    channels: usize,
    parallel: bool,
    reject_oversized_filter: bool,
}

impl Default for DetectConfigJson {
    fn default() -> Self {
        let cfg = DetectConfig::default();
        Self {
            channels: cfg.channels,
            parallel: cfg.parallel,
            reject_oversized_filter: cfg.reject_oversized_filter,
        }
    }
}

impl From<DetectConfigJson> for DetectConfig {
    fn from(value: DetectConfigJson) -> Self {
        Self {
            channels: value.channels,
            parallel: value.parallel,
            reject_oversized_filter: value.reject_oversized_filter,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    features_path: String,
    filter_path: String,
    output_path: Option<String>,
    bias: f32,
    detect: DetectConfigJson,
}

/// Row-major `(height, width, channels)` volume as stored on disk.
#[derive(Debug, Deserialize)]
struct VolumeJson {
    shape: Vec<usize>,
    data: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct BestRecord {
    y: usize,
    x: usize,
    score: f32,
}

#[derive(Debug, Serialize)]
struct Output {
    height: usize,
    width: usize,
    valid_rows: [usize; 2],
    valid_cols: [usize; 2],
    best: Option<BestRecord>,
    scores: Vec<Vec<f32>>,
}

impl From<&ScoreMap> for Output {
    fn from(map: &ScoreMap) -> Self {
        let region = map.valid_region();
        let best = map
            .valid_scores()
            .max_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(y, x, score)| BestRecord { y, x, score });
        let scores = (0..map.height())
            .filter_map(|y| map.row(y).map(<[f32]>::to_vec))
            .collect();
        Self {
            height: map.height(),
            width: map.width(),
            valid_rows: [region.rows.start, region.rows.end],
            valid_cols: [region.cols.start, region.cols.end],
            best,
            scores,
        }
    }
}

fn load_volume(path: &Path) -> Result<Volume, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let raw: VolumeJson = serde_json::from_str(&text)?;
    let [height, width, channels] = raw.shape[..] else {
        return Err(format!(
            "{} must describe a 3 dimensional volume, got shape {:?}",
            path.display(),
            raw.shape
        )
        .into());
    };
    Ok(Volume::new(raw.data, height, width, channels)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("featcorr=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.features_path.is_empty() || config.filter_path.is_empty() {
        return Err("features_path and filter_path must be set in the config".into());
    }

    let features = load_volume(Path::new(&config.features_path))?;
    let filter = load_volume(Path::new(&config.filter_path))?;
    let cfg: DetectConfig = config.detect.into();
    cfg.validate()?;

    let map = detect_with_config(features.view(), filter.view(), config.bias, &cfg)?;
    tracing::info!(
        height = map.height(),
        width = map.width(),
        valid_cells = map.valid_region().len(),
        "score map computed"
    );

    let output = Output::from(&map);
    let json = serde_json::to_string_pretty(&output)?;
    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
