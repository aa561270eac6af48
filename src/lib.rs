//! featcorr computes detection score maps for sliding-window detectors.
//!
//! A multi-channel filter `(h, w, C)` is cross-correlated against a feature
//! map `(H, W, C)`; each output cell holds the filter response centred on
//! that location minus a bias, and cells where the filter would overhang the
//! features hold [`INVALID_SCORE`]. The scalar kernel is always available;
//! the `simd` feature vectorises the strip updates with `wide` and the
//! `rayon` feature adds row-parallel accumulation. All backends produce
//! identical bits.

pub mod detect;
pub mod host;
pub mod kernel;
pub mod lowlevel;
pub mod pyramid;
pub mod score;
mod trace;
pub mod util;
pub mod volume;

pub use detect::{
    detect, detect_host, detect_into, detect_with_config, DetectConfig, Detector,
    DEFAULT_CHANNELS,
};
pub use host::{ElementType, HostArray, HostData};
pub use kernel::{Kernel, Padding};
pub use pyramid::{filter_pyramid, FeatureLevel, LevelScores};
pub use score::{ScoreMap, ScoreViewMut, ValidRegion, INVALID_SCORE};
pub use util::{FeatCorrError, FeatCorrResult, Operand};
pub use volume::{FeatureView, Volume};
