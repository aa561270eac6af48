//! Filtering a caller-built feature pyramid.
//!
//! Building the pyramid (resizing, descriptor extraction) is left to the
//! caller; this module only scores every level with one filter. Levels
//! smaller than the filter follow the oversized-filter policy of
//! [`DetectConfig`].

use crate::detect::{detect_with_config, DetectConfig};
use crate::score::ScoreMap;
use crate::trace::{trace_event, trace_span};
use crate::util::FeatCorrResult;
use crate::volume::FeatureView;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// One level of a feature pyramid.
#[derive(Clone, Copy, Debug)]
pub struct FeatureLevel<'a> {
    /// Feature volume of this level.
    pub features: FeatureView<'a>,
    /// Scale of this level relative to the source image.
    pub scale: f32,
}

/// Score map of one pyramid level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelScores {
    /// Scale copied from the input level.
    pub scale: f32,
    /// Filter response at this level.
    pub scores: ScoreMap,
}

/// Scores every level of `levels` with `filter`, preserving level order.
///
/// With `cfg.parallel` and the `rayon` feature the levels are processed
/// concurrently; each level still uses the row-parallel kernel.
pub fn filter_pyramid(
    levels: &[FeatureLevel<'_>],
    filter: FeatureView<'_>,
    bias: f32,
    cfg: &DetectConfig,
) -> FeatCorrResult<Vec<LevelScores>> {
    let _span = trace_span!("filter_pyramid", levels = levels.len()).entered();
    cfg.validate()?;

    let score_level = |level: &FeatureLevel<'_>| -> FeatCorrResult<LevelScores> {
        Ok(LevelScores {
            scale: level.scale,
            scores: detect_with_config(level.features, filter, bias, cfg)?,
        })
    };

    #[cfg(feature = "rayon")]
    let out: FeatCorrResult<Vec<LevelScores>> = if cfg.parallel {
        levels.par_iter().map(score_level).collect()
    } else {
        levels.iter().map(score_level).collect()
    };
    #[cfg(not(feature = "rayon"))]
    let out: FeatCorrResult<Vec<LevelScores>> = levels.iter().map(score_level).collect();

    let out = out?;
    trace_event!(
        "pyramid_done",
        valid_cells = out
            .iter()
            .map(|level| level.scores.valid_region().len())
            .sum::<usize>()
    );
    Ok(out)
}
