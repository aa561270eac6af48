//! Score map computation.
//!
//! A call validates its inputs, fills the output with the negated bias,
//! accumulates the filter response over the region where the filter fits,
//! then overwrites the border bands with [`INVALID_SCORE`].

use crate::host::{validate_pair, HostArray};
#[cfg(feature = "rayon")]
use crate::kernel::rayon::AxpyRayon;
use crate::kernel::{Kernel, Padding};
use crate::score::{ScoreMap, ScoreViewMut, ValidRegion, INVALID_SCORE};
use crate::trace::{trace_event, trace_span};
use crate::util::{FeatCorrError, FeatCorrResult, Operand};
use crate::volume::{FeatureView, Volume};

// Sequential kernel: use SIMD when available
#[cfg(not(feature = "simd"))]
use crate::kernel::scalar::AxpyScalar as Sequential;
#[cfg(feature = "simd")]
use crate::kernel::simd::AxpySimd as Sequential;

/// Channel count of the HOG-style descriptors this kernel was built for.
pub const DEFAULT_CHANNELS: usize = 32;

/// Configuration for score map computation.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectConfig {
    /// Required length of the channel axis of both volumes.
    pub channels: usize,
    /// Accumulate output rows in parallel (requires the `rayon` feature,
    /// otherwise the sequential kernel runs).
    pub parallel: bool,
    /// Reject filters taller or wider than the features instead of returning
    /// an all-invalid map.
    pub reject_oversized_filter: bool,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            channels: DEFAULT_CHANNELS,
            parallel: false,
            reject_oversized_filter: false,
        }
    }
}

impl DetectConfig {
    /// Validates configuration values.
    pub fn validate(&self) -> FeatCorrResult<()> {
        if self.channels == 0 {
            return Err(FeatCorrError::InvalidConfig("channels must be at least 1"));
        }
        Ok(())
    }
}

fn check_channels(view: FeatureView<'_>, operand: Operand, expected: usize) -> FeatCorrResult<()> {
    if view.channels() != expected {
        return Err(FeatCorrError::ChannelMismatch {
            operand,
            expected,
            got: view.channels(),
        });
    }
    Ok(())
}

/// Runs every precondition and returns the filter padding.
fn check_inputs(
    features: FeatureView<'_>,
    filter: FeatureView<'_>,
    cfg: &DetectConfig,
) -> FeatCorrResult<Padding> {
    cfg.validate()?;
    check_channels(features, Operand::Features, cfg.channels)?;
    check_channels(filter, Operand::Filter, cfg.channels)?;
    if cfg.reject_oversized_filter
        && (filter.height() > features.height() || filter.width() > features.width())
    {
        return Err(FeatCorrError::FilterLargerThanFeatures {
            filter: (filter.height(), filter.width()),
            features: (features.height(), features.width()),
        });
    }
    Ok(Padding::for_filter(filter.height(), filter.width()))
}

#[cfg(feature = "rayon")]
fn accumulate(
    features: FeatureView<'_>,
    filter: FeatureView<'_>,
    padding: Padding,
    out: &mut ScoreViewMut<'_>,
    parallel: bool,
) {
    if parallel {
        AxpyRayon::accumulate(features, filter, padding, out);
    } else {
        Sequential::accumulate(features, filter, padding, out);
    }
}

#[cfg(not(feature = "rayon"))]
fn accumulate(
    features: FeatureView<'_>,
    filter: FeatureView<'_>,
    padding: Padding,
    out: &mut ScoreViewMut<'_>,
    _parallel: bool,
) {
    Sequential::accumulate(features, filter, padding, out);
}

/// Writes the sentinel into every cell where the filter overhangs.
fn invalidate_borders(out: &mut ScoreViewMut<'_>, padding: Padding) {
    let height = out.height();
    let width = out.width();
    out.fill_rect(0..padding.top, 0..width, INVALID_SCORE);
    out.fill_rect(height.saturating_sub(padding.bottom)..height, 0..width, INVALID_SCORE);
    out.fill_rect(0..height, 0..padding.left, INVALID_SCORE);
    out.fill_rect(0..height, width.saturating_sub(padding.right)..width, INVALID_SCORE);
}

/// Body shared by the owned and in-place entry points.
///
/// Inputs are already checked and `out` already holds `-bias` everywhere.
fn run(
    features: FeatureView<'_>,
    filter: FeatureView<'_>,
    padding: Padding,
    cfg: &DetectConfig,
    out: &mut ScoreViewMut<'_>,
) -> ValidRegion {
    let _span = trace_span!(
        "detect",
        height = features.height(),
        width = features.width(),
        filter_height = filter.height(),
        filter_width = filter.width(),
        parallel = cfg.parallel
    )
    .entered();

    accumulate(features, filter, padding, out, cfg.parallel);
    invalidate_borders(out, padding);

    let region = padding.valid_region(features.height(), features.width());
    trace_event!("detect_done", valid_cells = region.len());
    region
}

/// Correlates `filter` against `features` with the default configuration.
///
/// Returns a `(height, width)` map of `sum(filter * features) - bias` centred
/// on each cell, with [`INVALID_SCORE`] where the filter would overhang.
pub fn detect(
    features: FeatureView<'_>,
    filter: FeatureView<'_>,
    bias: f32,
) -> FeatCorrResult<ScoreMap> {
    detect_with_config(features, filter, bias, &DetectConfig::default())
}

/// Correlates `filter` against `features` with an explicit configuration.
pub fn detect_with_config(
    features: FeatureView<'_>,
    filter: FeatureView<'_>,
    bias: f32,
    cfg: &DetectConfig,
) -> FeatCorrResult<ScoreMap> {
    let padding = check_inputs(features, filter, cfg)?;
    let mut map = ScoreMap::filled(features.height(), features.width(), -bias)?;
    let region = run(features, filter, padding, cfg, &mut map.view_mut());
    map.set_valid_region(region);
    Ok(map)
}

/// Writes the score map into a caller-provided, possibly strided, output.
///
/// Cells of the backing buffer that the view does not address are left
/// untouched. Returns the region holding computed scores.
pub fn detect_into(
    features: FeatureView<'_>,
    filter: FeatureView<'_>,
    bias: f32,
    cfg: &DetectConfig,
    out: &mut ScoreViewMut<'_>,
) -> FeatCorrResult<ValidRegion> {
    let padding = check_inputs(features, filter, cfg)?;
    if out.height() != features.height() || out.width() != features.width() {
        return Err(FeatCorrError::OutputShapeMismatch {
            expected: (features.height(), features.width()),
            got: (out.height(), out.width()),
        });
    }
    out.fill(-bias);
    Ok(run(features, filter, padding, cfg, out))
}

/// Validates dynamically typed host arrays, then runs [`detect_with_config`].
pub fn detect_host(
    features: &HostArray<'_>,
    filter: &HostArray<'_>,
    bias: f32,
    cfg: &DetectConfig,
) -> FeatCorrResult<ScoreMap> {
    cfg.validate()?;
    let (features, filter) = validate_pair(features, filter, cfg.channels)?;
    detect_with_config(features, filter, bias, cfg)
}

/// A filter and bias bundled for repeated scoring.
#[derive(Clone, Debug)]
pub struct Detector {
    filter: Volume,
    bias: f32,
    config: DetectConfig,
}

impl Detector {
    /// Creates a detector with zero bias and the default configuration.
    pub fn new(filter: Volume) -> Self {
        Self {
            filter,
            bias: 0.0,
            config: DetectConfig::default(),
        }
    }

    /// Sets the bias subtracted from every valid score.
    pub fn with_bias(mut self, bias: f32) -> Self {
        self.bias = bias;
        self
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: DetectConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the filter volume.
    pub fn filter(&self) -> &Volume {
        &self.filter
    }

    /// Returns the bias.
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    /// Scores one feature map.
    pub fn detect(&self, features: FeatureView<'_>) -> FeatCorrResult<ScoreMap> {
        detect_with_config(features, self.filter.view(), self.bias, &self.config)
    }

    /// Scores every level of a feature pyramid.
    pub fn detect_pyramid(
        &self,
        levels: &[crate::pyramid::FeatureLevel<'_>],
    ) -> FeatCorrResult<Vec<crate::pyramid::LevelScores>> {
        crate::pyramid::filter_pyramid(levels, self.filter.view(), self.bias, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::{detect_with_config, invalidate_borders, DetectConfig};
    use crate::kernel::Padding;
    use crate::score::ScoreMap;
    use crate::volume::Volume;
    use crate::FeatCorrError;

    #[test]
    fn owned_map_starts_from_negated_bias() {
        let features = Volume::filled(3, 4, 2, 0.0).unwrap();
        let filter = Volume::filled(1, 1, 2, 5.0).unwrap();
        let cfg = DetectConfig {
            channels: 2,
            ..DetectConfig::default()
        };
        let map = detect_with_config(features.view(), filter.view(), 1.25, &cfg).unwrap();
        assert!(map.as_slice().iter().all(|&v| v == -1.25));
        assert_eq!(map.valid_region().len(), 12);
    }

    #[test]
    fn zero_channels_is_rejected() {
        let cfg = DetectConfig {
            channels: 0,
            ..DetectConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(FeatCorrError::InvalidConfig("channels must be at least 1"))
        );
    }

    #[test]
    fn borders_follow_padding_bands() {
        let mut map = ScoreMap::filled(5, 6, 1.0).unwrap();
        invalidate_borders(&mut map.view_mut(), Padding::for_filter(4, 3));
        // top 1, bottom 2, left 1, right 1
        assert_eq!(map.row(0).unwrap(), &[-2.0; 6]);
        assert_eq!(map.row(1).unwrap(), &[-2.0, 1.0, 1.0, 1.0, 1.0, -2.0]);
        assert_eq!(map.row(2).unwrap(), &[-2.0, 1.0, 1.0, 1.0, 1.0, -2.0]);
        assert_eq!(map.row(3).unwrap(), &[-2.0; 6]);
        assert_eq!(map.row(4).unwrap(), &[-2.0; 6]);
    }
}
