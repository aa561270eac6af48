//! Score maps produced by the correlation kernel.
//!
//! `ScoreViewMut` is the strided write target the kernels accumulate into.
//! `ScoreMap` owns a contiguous `(height, width)` buffer together with the
//! `ValidRegion` of cells that carry real scores; every other cell holds
//! [`INVALID_SCORE`].

use crate::util::{FeatCorrError, FeatCorrResult};
use std::ops::Range;

/// Sentinel written into cells where the filter overhangs the features.
pub const INVALID_SCORE: f32 = -2.0;

/// Rows and columns of a score map that hold computed scores.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidRegion {
    /// Half-open range of valid rows.
    pub rows: Range<usize>,
    /// Half-open range of valid columns.
    pub cols: Range<usize>,
}

impl ValidRegion {
    /// Returns true when no cell holds a computed score.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }

    /// Returns true when `(y, x)` holds a computed score.
    pub fn contains(&self, y: usize, x: usize) -> bool {
        self.rows.contains(&y) && self.cols.contains(&x)
    }

    /// Number of cells holding computed scores.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.rows.len() * self.cols.len()
        }
    }
}

/// Mutable 2D `f32` view with explicit row and column strides.
#[derive(Debug)]
pub struct ScoreViewMut<'a> {
    data: &'a mut [f32],
    height: usize,
    width: usize,
    row_stride: usize,
    col_stride: usize,
}

impl<'a> ScoreViewMut<'a> {
    /// Creates a contiguous view with `row_stride == width` and `col_stride == 1`.
    pub fn from_slice(data: &'a mut [f32], height: usize, width: usize) -> FeatCorrResult<Self> {
        Self::new(data, height, width, width, 1)
    }

    /// Creates a view with explicit element strides.
    ///
    /// Any layout where no two cells share an element is accepted: rows may be
    /// padded (row-major) or the axes swapped (column-major). Layouts where
    /// rows and columns interleave are rejected.
    pub fn new(
        data: &'a mut [f32],
        height: usize,
        width: usize,
        row_stride: usize,
        col_stride: usize,
    ) -> FeatCorrResult<Self> {
        let bad_dims = FeatCorrError::InvalidDimensions {
            height,
            width,
            channels: 1,
        };
        if height == 0 || width == 0 {
            return Err(bad_dims);
        }
        if width > 1 && col_stride == 0 {
            return Err(FeatCorrError::InvalidStride {
                reason: "column stride must be non-zero",
            });
        }
        let row_span = span(width, col_stride).ok_or(bad_dims.clone())?;
        let col_span = span(height, row_stride).ok_or(bad_dims.clone())?;
        let rows_disjoint = height == 1 || row_stride >= row_span;
        let cols_disjoint = row_stride > 0 && (width == 1 || col_stride >= col_span);
        if !rows_disjoint && !cols_disjoint {
            return Err(FeatCorrError::InvalidStride {
                reason: "rows and columns alias",
            });
        }
        let needed = (height - 1)
            .checked_mul(row_stride)
            .and_then(|v| v.checked_add(row_span))
            .ok_or(bad_dims)?;
        if data.len() < needed {
            return Err(FeatCorrError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            height,
            width,
            row_stride,
            col_stride,
        })
    }

    /// Returns the number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the element stride between row starts.
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// Returns the element stride between neighbouring columns.
    pub fn col_stride(&self) -> usize {
        self.col_stride
    }

    /// Returns the value at `(y, x)` if it is within bounds.
    pub fn get(&self, y: usize, x: usize) -> Option<f32> {
        if y >= self.height || x >= self.width {
            return None;
        }
        self.data.get(self.offset(y, x)).copied()
    }

    #[inline]
    pub(crate) fn offset(&self, y: usize, x: usize) -> usize {
        y * self.row_stride + x * self.col_stride
    }

    /// True when each row lies inside its own `row_stride` chunk of the buffer.
    pub(crate) fn rows_disjoint(&self) -> bool {
        self.height == 1 || span(self.width, self.col_stride).is_some_and(|s| self.row_stride >= s)
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut *self.data
    }

    /// Sets every addressed cell to `value`.
    pub fn fill(&mut self, value: f32) {
        self.fill_rect(0..self.height, 0..self.width, value);
    }

    /// Sets the cells of `rows x cols` (clamped to the view) to `value`.
    pub fn fill_rect(&mut self, rows: Range<usize>, cols: Range<usize>, value: f32) {
        let rows = rows.start.min(self.height)..rows.end.min(self.height);
        let cols = cols.start.min(self.width)..cols.end.min(self.width);
        for y in rows {
            for x in cols.clone() {
                let idx = self.offset(y, x);
                self.data[idx] = value;
            }
        }
    }
}

/// Elements from the first to the last cell of a `len`-cell strided run.
fn span(len: usize, stride: usize) -> Option<usize> {
    (len - 1).checked_mul(stride)?.checked_add(1)
}

/// Owned contiguous score map.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreMap {
    data: Vec<f32>,
    height: usize,
    width: usize,
    valid: ValidRegion,
}

impl ScoreMap {
    /// Allocates a map with every cell set to `value` and an all-valid region.
    ///
    /// Allocation failure is reported instead of aborting.
    pub fn filled(height: usize, width: usize, value: f32) -> FeatCorrResult<Self> {
        let cells = height
            .checked_mul(width)
            .ok_or(FeatCorrError::InvalidDimensions {
                height,
                width,
                channels: 1,
            })?;
        let mut data = Vec::new();
        data.try_reserve_exact(cells)
            .map_err(|_| FeatCorrError::AllocationFailed { cells })?;
        data.resize(cells, value);
        Ok(Self {
            data,
            height,
            width,
            valid: ValidRegion {
                rows: 0..height,
                cols: 0..width,
            },
        })
    }

    /// Returns the number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the cells that hold computed scores.
    pub fn valid_region(&self) -> &ValidRegion {
        &self.valid
    }

    pub(crate) fn set_valid_region(&mut self, valid: ValidRegion) {
        self.valid = valid;
    }

    /// Returns the score at `(y, x)` if it is within bounds.
    pub fn get(&self, y: usize, x: usize) -> Option<f32> {
        if y >= self.height || x >= self.width {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns row `y` as a contiguous slice.
    pub fn row(&self, y: usize) -> Option<&[f32]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// Returns the row-major backing buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the map and returns its row-major buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Returns a mutable strided view over the whole map.
    pub fn view_mut(&mut self) -> ScoreViewMut<'_> {
        ScoreViewMut {
            data: &mut self.data,
            height: self.height,
            width: self.width,
            row_stride: self.width,
            col_stride: 1,
        }
    }

    /// Iterates `(y, x, score)` over the valid region in row-major order.
    pub fn valid_scores(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        let cols = self.valid.cols.clone();
        self.valid.rows.clone().flat_map(move |y| {
            let row = &self.data[y * self.width..(y + 1) * self.width];
            cols.clone().map(move |x| (y, x, row[x]))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ScoreMap, ScoreViewMut, ValidRegion};
    use crate::FeatCorrError;

    #[test]
    fn strided_view_writes_only_addressed_cells() {
        let mut data = [0.0f32; 12];
        let mut view = ScoreViewMut::new(&mut data, 2, 3, 6, 2).unwrap();
        view.fill(1.0);
        assert_eq!(
            data,
            [1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn interleaved_rows_are_rejected() {
        let mut data = [0.0f32; 16];
        let err = ScoreViewMut::new(&mut data, 2, 3, 2, 1).unwrap_err();
        assert_eq!(
            err,
            FeatCorrError::InvalidStride {
                reason: "rows and columns alias"
            }
        );
    }

    #[test]
    fn column_major_view_is_accepted() {
        let mut data = [0.0f32; 20];
        let mut view = ScoreViewMut::new(&mut data, 4, 5, 1, 4).unwrap();
        assert!(!view.rows_disjoint());
        view.fill_rect(1..2, 0..5, 3.0);
        // Row 1 sits at offset 1 of every 4-element column.
        for (idx, v) in data.iter().enumerate() {
            let expected = if idx % 4 == 1 { 3.0 } else { 0.0 };
            assert_eq!(*v, expected, "element {idx}");
        }
    }

    #[test]
    fn zero_row_stride_aliases_rows() {
        let mut data = [0.0f32; 8];
        let err = ScoreViewMut::new(&mut data, 2, 1, 0, 1).unwrap_err();
        assert_eq!(
            err,
            FeatCorrError::InvalidStride {
                reason: "rows and columns alias"
            }
        );
    }

    #[test]
    fn fill_rect_clamps_to_view() {
        let mut map = ScoreMap::filled(3, 3, 0.0).unwrap();
        map.view_mut().fill_rect(2..7, 1..9, 5.0);
        assert_eq!(map.row(2).unwrap(), &[0.0, 5.0, 5.0]);
        assert_eq!(map.row(1).unwrap(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn valid_scores_follow_region() {
        let mut map = ScoreMap::filled(3, 4, 7.0).unwrap();
        map.set_valid_region(ValidRegion {
            rows: 1..2,
            cols: 1..3,
        });
        let cells: Vec<_> = map.valid_scores().collect();
        assert_eq!(cells, vec![(1, 1, 7.0), (1, 2, 7.0)]);
        assert_eq!(map.valid_region().len(), 2);
    }
}
