//! Feature and filter volumes.
//!
//! `FeatureView` is a borrowed 3D view `(height, width, channels)` into a 1D
//! `f32` buffer with an explicit stride per axis, counted in elements. Strides
//! are not required to describe a dense or even non-overlapping layout: padded
//! rows, channel-planar layouts and zero-stride broadcast axes are all valid as
//! long as every addressed element lies inside the buffer. `Volume` is the
//! owned, contiguous row-major counterpart.

use crate::util::{FeatCorrError, FeatCorrResult};

/// Borrowed 3D `f32` view with explicit per-axis strides.
#[derive(Copy, Clone, Debug)]
pub struct FeatureView<'a> {
    data: &'a [f32],
    height: usize,
    width: usize,
    channels: usize,
    strides: [usize; 3],
}

impl<'a> FeatureView<'a> {
    /// Creates a row-major view with strides `[width * channels, channels, 1]`.
    pub fn from_slice(
        data: &'a [f32],
        height: usize,
        width: usize,
        channels: usize,
    ) -> FeatCorrResult<Self> {
        let row_stride = width
            .checked_mul(channels)
            .ok_or(FeatCorrError::InvalidDimensions {
                height,
                width,
                channels,
            })?;
        Self::new(data, height, width, channels, [row_stride, channels, 1])
    }

    /// Creates a view with explicit element strides for `(row, column, channel)`.
    pub fn new(
        data: &'a [f32],
        height: usize,
        width: usize,
        channels: usize,
        strides: [usize; 3],
    ) -> FeatCorrResult<Self> {
        let needed = required_len([height, width, channels], strides)?;
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
            channels,
            strides,
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

    /// Returns the length of the channel axis.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the element strides for `(row, column, channel)`.
    pub fn strides(&self) -> [usize; 3] {
        self.strides
    }

    /// Returns the backing slice, including any elements skipped by strides.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns the element at `(y, x, c)` if it is within bounds.
    pub fn get(&self, y: usize, x: usize, c: usize) -> Option<f32> {
        if y >= self.height || x >= self.width || c >= self.channels {
            return None;
        }
        self.data.get(self.offset(y, x, c)).copied()
    }

    /// Buffer index of `(y, x, c)`; callers keep the coordinates in bounds.
    #[inline]
    pub(crate) fn offset(&self, y: usize, x: usize, c: usize) -> usize {
        y * self.strides[0] + x * self.strides[1] + c * self.strides[2]
    }

    #[inline]
    pub(crate) fn at(&self, y: usize, x: usize, c: usize) -> f32 {
        self.data[self.offset(y, x, c)]
    }

    /// Copies the view into an owned contiguous volume.
    pub fn to_volume(&self) -> Volume {
        let mut data = Vec::with_capacity(self.height * self.width * self.channels);
        for y in 0..self.height {
            for x in 0..self.width {
                for c in 0..self.channels {
                    data.push(self.at(y, x, c));
                }
            }
        }
        Volume {
            data,
            height: self.height,
            width: self.width,
            channels: self.channels,
        }
    }
}

/// Owned contiguous row-major `(height, width, channels)` volume.
#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
    data: Vec<f32>,
    height: usize,
    width: usize,
    channels: usize,
}

impl Volume {
    /// Wraps a row-major buffer whose length is exactly `height * width * channels`.
    pub fn new(
        data: Vec<f32>,
        height: usize,
        width: usize,
        channels: usize,
    ) -> FeatCorrResult<Self> {
        let needed = dense_len(height, width, channels)?;
        if data.len() < needed {
            return Err(FeatCorrError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(FeatCorrError::InvalidDimensions {
                height,
                width,
                channels,
            });
        }
        Ok(Self {
            data,
            height,
            width,
            channels,
        })
    }

    /// Creates a volume with every element set to `value`.
    pub fn filled(
        height: usize,
        width: usize,
        channels: usize,
        value: f32,
    ) -> FeatCorrResult<Self> {
        let len = dense_len(height, width, channels)?;
        Self::new(vec![value; len], height, width, channels)
    }

    /// Creates a volume by evaluating `f(y, x, c)` for every element.
    pub fn from_fn<F>(
        height: usize,
        width: usize,
        channels: usize,
        mut f: F,
    ) -> FeatCorrResult<Self>
    where
        F: FnMut(usize, usize, usize) -> f32,
    {
        let len = dense_len(height, width, channels)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push(f(y, x, c));
                }
            }
        }
        Self::new(data, height, width, channels)
    }

    /// Returns the number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the length of the channel axis.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the row-major backing buffer.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns a borrowed view of the volume.
    pub fn view(&self) -> FeatureView<'_> {
        FeatureView {
            data: &self.data,
            height: self.height,
            width: self.width,
            channels: self.channels,
            strides: [self.width * self.channels, self.channels, 1],
        }
    }
}

fn dense_len(height: usize, width: usize, channels: usize) -> FeatCorrResult<usize> {
    let invalid = FeatCorrError::InvalidDimensions {
        height,
        width,
        channels,
    };
    if height == 0 || width == 0 || channels == 0 {
        return Err(invalid);
    }
    height
        .checked_mul(width)
        .and_then(|v| v.checked_mul(channels))
        .ok_or(invalid)
}

/// One past the furthest element addressed by `dims` and `strides`.
fn required_len(dims: [usize; 3], strides: [usize; 3]) -> FeatCorrResult<usize> {
    let [height, width, channels] = dims;
    let invalid = FeatCorrError::InvalidDimensions {
        height,
        width,
        channels,
    };
    if height == 0 || width == 0 || channels == 0 {
        return Err(invalid);
    }
    let mut last = 0usize;
    for (dim, stride) in dims.into_iter().zip(strides) {
        last = (dim - 1)
            .checked_mul(stride)
            .and_then(|v| v.checked_add(last))
            .ok_or(invalid.clone())?;
    }
    last.checked_add(1).ok_or(invalid)
}

#[cfg(test)]
mod tests {
    use super::{required_len, FeatureView, Volume};

    #[test]
    fn required_len_counts_furthest_element() {
        assert_eq!(required_len([2, 3, 4], [12, 4, 1]).unwrap(), 24);
        assert_eq!(required_len([2, 3, 4], [20, 4, 1]).unwrap(), 32);
        assert_eq!(required_len([2, 3, 4], [0, 0, 1]).unwrap(), 4);
    }

    #[test]
    fn channel_planar_view_reads_expected_elements() {
        // Two channel planes of a 2x2 map, stored one after the other.
        let data = [0.0f32, 1.0, 2.0, 3.0, 10.0, 11.0, 12.0, 13.0];
        let view = FeatureView::new(&data, 2, 2, 2, [2, 1, 4]).unwrap();
        assert_eq!(view.get(1, 0, 0), Some(2.0));
        assert_eq!(view.get(1, 1, 1), Some(13.0));
        assert_eq!(view.get(2, 0, 0), None);

        let dense = view.to_volume();
        assert_eq!(dense.data(), &[0.0, 10.0, 1.0, 11.0, 2.0, 12.0, 3.0, 13.0]);
    }

    #[test]
    fn from_fn_fills_row_major() {
        let vol = Volume::from_fn(2, 2, 2, |y, x, c| (y * 100 + x * 10 + c) as f32).unwrap();
        assert_eq!(vol.view().get(1, 0, 1), Some(101.0));
        assert_eq!(vol.data()[7], 111.0);
    }
}
