//! Error types for featcorr.

use crate::host::ElementType;
use std::fmt;
use thiserror::Error;

/// Result alias for featcorr operations.
pub type FeatCorrResult<T> = std::result::Result<T, FeatCorrError>;

/// Identifies which input of a correlation call failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// The feature volume being scanned.
    Features,
    /// The filter volume slid over the features.
    Filter,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Features => f.write_str("features"),
            Operand::Filter => f.write_str("filter"),
        }
    }
}

/// Errors that can occur when computing score maps.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FeatCorrError {
    /// An input does not have exactly three axes.
    #[error("{operand} must be 3 dimensional, got {got} axes")]
    InvalidDimensionality { operand: Operand, got: usize },
    /// An input is not single precision floating point.
    #[error("{operand} must be single precision floating point, got {got}")]
    InvalidElementType { operand: Operand, got: ElementType },
    /// An input's channel axis does not have the configured length.
    #[error("{operand} channel dimensionality should be {expected}, got {got}")]
    ChannelMismatch {
        operand: Operand,
        expected: usize,
        got: usize,
    },
    /// A volume or map has a zero-sized axis or its size overflows.
    #[error("invalid dimensions: {height}x{width}x{channels}")]
    InvalidDimensions {
        height: usize,
        width: usize,
        channels: usize,
    },
    /// The backing buffer is shorter than the addressed extent.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Output strides would make distinct cells share storage.
    #[error("invalid stride: {reason}")]
    InvalidStride { reason: &'static str },
    /// A caller-provided output does not match the feature dimensions.
    #[error("output shape {got:?} does not match features {expected:?}")]
    OutputShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// The filter does not fit inside the features (only when rejected by config).
    #[error("filter {filter:?} is larger than features {features:?}")]
    FilterLargerThanFeatures {
        filter: (usize, usize),
        features: (usize, usize),
    },
    /// Configuration values are out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// The output buffer could not be allocated.
    #[error("failed to allocate a score map of {cells} cells")]
    AllocationFailed { cells: usize },
}
