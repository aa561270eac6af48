//! Correlation kernel implementations.
//!
//! Every backend uses the same axis-accumulation decomposition: for each
//! channel, filter row and filter column, one scalar filter weight is
//! multiplied into a strip of feature values along the column axis and added
//! into the matching strip of the output. Per output cell the contributions
//! therefore arrive channel-major, then filter row, then filter column, and all
//! backends return bit-identical maps.

use crate::score::{ScoreViewMut, ValidRegion};
use crate::volume::FeatureView;

/// Filter overhang on each side of the output cell it is centred on.
///
/// For even filter sizes the extra cell goes to the bottom and right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Padding {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl Padding {
    /// Computes the padding for a `height x width` filter.
    ///
    /// A zero-sized axis gets no padding on either side.
    pub fn for_filter(height: usize, width: usize) -> Self {
        let (top, bottom) = split(height);
        let (left, right) = split(width);
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Cells of a `height x width` map where the filter fits entirely.
    pub fn valid_region(&self, height: usize, width: usize) -> ValidRegion {
        ValidRegion {
            rows: band(height, self.top, self.bottom),
            cols: band(width, self.left, self.right),
        }
    }
}

/// Overhang before and after the centre cell of a `len`-cell filter axis.
fn split(len: usize) -> (usize, usize) {
    let rest = len.saturating_sub(1);
    let before = rest / 2;
    (before, rest - before)
}

fn band(len: usize, before: usize, after: usize) -> std::ops::Range<usize> {
    let start = before.min(len);
    let end = len.saturating_sub(after).max(start);
    start..end
}

/// Kernel trait for accumulating filter responses into a score map.
pub trait Kernel {
    /// Adds the correlation of `filter` against `features` into `out`.
    ///
    /// `out` must already hold the baseline (the negated bias) and have the
    /// same height and width as `features`; both volumes must share a channel
    /// count. Only cells inside `padding.valid_region(..)` are touched. A
    /// filter that does not fit inside the features leaves `out` unchanged.
    fn accumulate(
        features: FeatureView<'_>,
        filter: FeatureView<'_>,
        padding: Padding,
        out: &mut ScoreViewMut<'_>,
    );
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;
