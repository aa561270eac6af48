//! SIMD-accelerated kernel using the `wide` crate.
//!
//! The strip update `y += alpha * x` is processed 8 cells at a time with
//! `f32x8`. Feature strips are strided by the channel count in the usual
//! `(H, W, C)` layout, so lanes are gathered and scattered explicitly. The
//! multiply and add stay separate to keep results identical to the scalar
//! kernel.

use crate::kernel::{Kernel, Padding};
use crate::score::ScoreViewMut;
use crate::util::math::{placements, saxpy};
use crate::volume::FeatureView;
use wide::f32x8;

const LANES: usize = 8;

#[inline]
fn gather(slice: &[f32], start: usize, inc: usize) -> f32x8 {
    f32x8::from(std::array::from_fn::<f32, LANES, _>(|lane| {
        slice[start + lane * inc]
    }))
}

#[inline]
fn scatter(slice: &mut [f32], start: usize, inc: usize, value: f32x8) {
    for (lane, v) in value.to_array().into_iter().enumerate() {
        slice[start + lane * inc] = v;
    }
}

/// Strided `y += alpha * x` over `n` elements, eight lanes at a time.
#[inline]
#[allow(clippy::too_many_arguments)]
pub(crate) fn axpy_f32x8(
    n: usize,
    alpha: f32,
    x: &[f32],
    x_start: usize,
    incx: usize,
    y: &mut [f32],
    y_start: usize,
    incy: usize,
) {
    let alpha_v = f32x8::splat(alpha);
    let simd_end = n / LANES * LANES;

    let mut t = 0;
    while t < simd_end {
        let xs = x_start + t * incx;
        let ys = y_start + t * incy;
        let acc = gather(y, ys, incy) + alpha_v * gather(x, xs, incx);
        scatter(y, ys, incy, acc);
        t += LANES;
    }

    // Scalar remainder
    saxpy(
        n - t,
        alpha,
        x,
        x_start + t * incx,
        incx,
        y,
        y_start + t * incy,
        incy,
    );
}

/// SIMD strip accumulation kernel.
pub struct AxpySimd;

impl Kernel for AxpySimd {
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
                        axpy_f32x8(
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
