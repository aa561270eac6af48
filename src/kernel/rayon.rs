//! Rayon-parallel kernel (feature-gated).
//!
//! Parallelises over output rows. Each task owns one row of the output and
//! walks channel, filter row and filter column in the same order as the
//! sequential kernels, so the result does not depend on scheduling. Outputs
//! whose rows interleave in memory run on the sequential kernel.

use crate::kernel::{Kernel, Padding};
use crate::score::ScoreViewMut;
use crate::util::math::placements;
use crate::volume::FeatureView;
use rayon::prelude::*;

#[cfg(not(feature = "simd"))]
use crate::util::math::saxpy as axpy_strip;
#[cfg(feature = "simd")]
use crate::kernel::simd::axpy_f32x8 as axpy_strip;

#[cfg(not(feature = "simd"))]
use crate::kernel::scalar::AxpyScalar as Sequential;
#[cfg(feature = "simd")]
use crate::kernel::simd::AxpySimd as Sequential;

/// Row-parallel strip accumulation kernel.
pub struct AxpyRayon;

impl Kernel for AxpyRayon {
    fn accumulate(
        features: FeatureView<'_>,
        filter: FeatureView<'_>,
        padding: Padding,
        out: &mut ScoreViewMut<'_>,
    ) {
        let rows = placements(features.height(), filter.height());
        let cols = placements(features.width(), filter.width());
        if rows == 0 || cols == 0 {
            return;
        }
        // Column-major outputs have no per-row chunks to hand out.
        if !out.rows_disjoint() {
            Sequential::accumulate(features, filter, padding, out);
            return;
        }

        let src = features.as_slice();
        let src_inc = features.strides()[1];
        let dst_inc = out.col_stride();
        let dst_start = padding.left * dst_inc;
        // Output rows never interleave, so row `y` lies inside chunk `y`.
        let chunk_len = if out.height() == 1 {
            out.as_mut_slice().len()
        } else {
            out.row_stride()
        };

        out.as_mut_slice()
            .par_chunks_mut(chunk_len)
            .skip(padding.top)
            .take(rows)
            .enumerate()
            .for_each(|(k, row)| {
                for l in 0..filter.channels() {
                    for i in 0..filter.height() {
                        for j in 0..filter.width() {
                            let weight = filter.at(i, j, l);
                            let src_start = features.offset(i + k, j, l);
                            axpy_strip(
                                cols, weight, src, src_start, src_inc, row, dst_start, dst_inc,
                            );
                        }
                    }
                }
            });
    }
}
