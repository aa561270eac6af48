//! Dynamically typed arrays at the caller boundary.
//!
//! Bindings hand the kernel arrays whose rank and element type are only
//! known at runtime. `HostArray` carries that information so the usual
//! preconditions (three axes, `f32` elements, expected channel count) can be
//! checked before any typed view is built.

use crate::util::{FeatCorrError, FeatCorrResult, Operand};
use crate::volume::FeatureView;
use std::fmt;

/// Element type of a host array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementType {
    F32,
    F64,
    I32,
    I64,
    U8,
    /// Any element type without a dedicated variant.
    Other,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::F32 => "float32",
            ElementType::F64 => "float64",
            ElementType::I32 => "int32",
            ElementType::I64 => "int64",
            ElementType::U8 => "uint8",
            ElementType::Other => "an unsupported type",
        };
        f.write_str(name)
    }
}

/// Borrowed element buffer of a host array.
#[derive(Clone, Copy, Debug)]
pub enum HostData<'a> {
    F32(&'a [f32]),
    F64(&'a [f64]),
    I32(&'a [i32]),
    U8(&'a [u8]),
    /// Element type only; the elements themselves are not exposed.
    Opaque(ElementType),
}

impl HostData<'_> {
    /// Returns the element type of the buffer.
    pub fn element_type(&self) -> ElementType {
        match self {
            HostData::F32(_) => ElementType::F32,
            HostData::F64(_) => ElementType::F64,
            HostData::I32(_) => ElementType::I32,
            HostData::U8(_) => ElementType::U8,
            HostData::Opaque(element) => *element,
        }
    }
}

/// N-dimensional array of any supported element type.
#[derive(Clone, Debug)]
pub struct HostArray<'a> {
    data: HostData<'a>,
    shape: Vec<usize>,
    strides: Option<Vec<usize>>,
}

impl<'a> HostArray<'a> {
    /// Creates a C-contiguous array.
    pub fn new(data: HostData<'a>, shape: &[usize]) -> Self {
        Self {
            data,
            shape: shape.to_vec(),
            strides: None,
        }
    }

    /// Creates an array with explicit element strides, one per axis.
    pub fn with_strides(data: HostData<'a>, shape: &[usize], strides: &[usize]) -> Self {
        Self {
            data,
            shape: shape.to_vec(),
            strides: Some(strides.to_vec()),
        }
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Axis lengths.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Element type of the buffer.
    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    fn check_ndim(&self, operand: Operand) -> FeatCorrResult<()> {
        if self.ndim() != 3 {
            return Err(FeatCorrError::InvalidDimensionality {
                operand,
                got: self.ndim(),
            });
        }
        Ok(())
    }

    fn check_element_type(&self, operand: Operand) -> FeatCorrResult<&'a [f32]> {
        match self.data {
            HostData::F32(data) => Ok(data),
            other => Err(FeatCorrError::InvalidElementType {
                operand,
                got: other.element_type(),
            }),
        }
    }

    fn check_channels(&self, operand: Operand, expected: usize) -> FeatCorrResult<()> {
        let got = self.shape[2];
        if got != expected {
            return Err(FeatCorrError::ChannelMismatch {
                operand,
                expected,
                got,
            });
        }
        Ok(())
    }

    /// Builds a typed view once rank, element type and channels are known good.
    fn to_view(&self, data: &'a [f32]) -> FeatCorrResult<FeatureView<'a>> {
        let (height, width, channels) = (self.shape[0], self.shape[1], self.shape[2]);
        match &self.strides {
            Some(strides) if strides.len() == 3 => FeatureView::new(
                data,
                height,
                width,
                channels,
                [strides[0], strides[1], strides[2]],
            ),
            Some(_) => Err(FeatCorrError::InvalidStride {
                reason: "stride count does not match rank",
            }),
            None => FeatureView::from_slice(data, height, width, channels),
        }
    }

    /// Validates a single array as a volume with `channels` channels.
    pub fn as_volume(&self, operand: Operand, channels: usize) -> FeatCorrResult<FeatureView<'a>> {
        self.check_ndim(operand)?;
        let data = self.check_element_type(operand)?;
        self.check_channels(operand, channels)?;
        self.to_view(data)
    }
}

/// Validates a features/filter pair and returns typed views.
///
/// Checks run in a fixed order so the reported error is deterministic:
/// rank of features then filter, element type of features then filter,
/// channel count of features then filter.
pub fn validate_pair<'a>(
    features: &HostArray<'a>,
    filter: &HostArray<'a>,
    channels: usize,
) -> FeatCorrResult<(FeatureView<'a>, FeatureView<'a>)> {
    features.check_ndim(Operand::Features)?;
    filter.check_ndim(Operand::Filter)?;
    let features_data = features.check_element_type(Operand::Features)?;
    let filter_data = filter.check_element_type(Operand::Filter)?;
    features.check_channels(Operand::Features, channels)?;
    filter.check_channels(Operand::Filter, channels)?;
    Ok((
        features.to_view(features_data)?,
        filter.to_view(filter_data)?,
    ))
}
