//! Numeric helpers shared by the accumulation kernels.

/// Strided single-precision `y += alpha * x` over `n` elements.
///
/// `x` is read at `x_start + t * incx` and `y` is updated at
/// `y_start + t * incy` for `t` in `0..n`. Multiply and add are kept as two
/// separate roundings so every backend produces identical bits.
#[inline]
#[allow(clippy::too_many_arguments)]
pub(crate) fn saxpy(
    n: usize,
    alpha: f32,
    x: &[f32],
    x_start: usize,
    incx: usize,
    y: &mut [f32],
    y_start: usize,
    incy: usize,
) {
    if n == 0 {
        return;
    }
    if incx == 1 && incy == 1 {
        let xs = &x[x_start..x_start + n];
        let ys = &mut y[y_start..y_start + n];
        for (dst, &src) in ys.iter_mut().zip(xs) {
            *dst += alpha * src;
        }
        return;
    }
    for t in 0..n {
        y[y_start + t * incy] += alpha * x[x_start + t * incx];
    }
}

/// Number of placements of a window of `window` cells along an axis of `len`.
///
/// Zero when the window does not fit.
#[inline]
pub(crate) fn placements(len: usize, window: usize) -> usize {
    (len + 1).saturating_sub(window)
}
