//! Scalar reference kernel.

use crate::kernel::{Kernel, Padding};
use crate::score::ScoreViewMut;
use crate::util::math::{placements, saxpy};
use crate::volume::FeatureView;

/// Sequential strided `saxpy` accumulation.
pub struct AxpyScalar;

impl Kernel for AxpyScalar {
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

        let src = features.as_slice();
        let src_inc = features.strides()[1];
        let dst_inc = out.col_stride();

        for l in 0..filter.channels() {
            for i in 0..filter.height() {
                for j in 0..filter.width() {
                    let weight = filter.at(i, j, l);
                    for k in 0..rows {
                        let src_start = features.offset(i + k, j, l);
                        let dst_start = out.offset(k + padding.top, padding.left);
                        saxpy(
                            cols,
                            weight,
                            src,
                            src_start,
                            src_inc,
                            out.as_mut_slice(),
                            dst_start,
                            dst_inc,
                        );
                    }
                }
            }
        }
    }
}
