//! Python bindings for the featcorr detection kernel.
//!
//! Arrays arrive as arbitrary numpy objects; rank, dtype and channel count are
//! validated by `featcorr::detect_host` so the errors match the library.

use std::borrow::Cow;

use numpy::ndarray::Array2;
use numpy::{
    IntoPyArray, PyArray2, PyArrayDescrMethods, PyReadonlyArrayDyn, PyUntypedArray,
    PyUntypedArrayMethods,
};
use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;

use featcorr::{
    detect_host, DetectConfig, ElementType, FeatCorrError, HostArray, HostData, Operand,
    ScoreMap, DEFAULT_CHANNELS,
};

/// Convert a FeatCorrError to a Python exception.
///
/// Rank, dtype and channel failures raise `TypeError`; everything else
/// raises `ValueError`.
fn to_py_err(err: FeatCorrError) -> PyErr {
    match err {
        FeatCorrError::InvalidDimensionality { .. }
        | FeatCorrError::InvalidElementType { .. }
        | FeatCorrError::ChannelMismatch { .. } => PyTypeError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

/// A numpy argument after dtype inspection.
enum Staged<'py> {
    F32(PyReadonlyArrayDyn<'py, f32>),
    Typed { shape: Vec<usize>, dtype: ElementType },
}

impl<'py> Staged<'py> {
    fn new(obj: &Bound<'py, PyAny>, operand: Operand) -> PyResult<Self> {
        let py = obj.py();
        let untyped: Bound<'py, PyUntypedArray> = obj
            .extract()
            .map_err(|_| PyTypeError::new_err(format!("{operand} must be a numpy array")))?;
        let dtype = untyped.dtype();
        if dtype.is_equiv_to(&numpy::dtype::<f32>(py)) {
            return Ok(Staged::F32(obj.extract()?));
        }

        // Anything else is reported by `validate_pair`, after the rank checks.
        let element = if dtype.is_equiv_to(&numpy::dtype::<f64>(py)) {
            ElementType::F64
        } else if dtype.is_equiv_to(&numpy::dtype::<i32>(py)) {
            ElementType::I32
        } else if dtype.is_equiv_to(&numpy::dtype::<i64>(py)) {
            ElementType::I64
        } else if dtype.is_equiv_to(&numpy::dtype::<u8>(py)) {
            ElementType::U8
        } else {
            ElementType::Other
        };
        Ok(Staged::Typed {
            shape: untyped.shape().to_vec(),
            dtype: element,
        })
    }

    /// Row-major f32 elements, borrowed when numpy already stores them that way.
    fn buffer(&self) -> Cow<'_, [f32]> {
        match self {
            Staged::F32(array) if array.is_c_contiguous() => match array.as_slice() {
                Ok(slice) => Cow::Borrowed(slice),
                Err(_) => Cow::Owned(array.as_array().iter().copied().collect()),
            },
            Staged::F32(array) => Cow::Owned(array.as_array().iter().copied().collect()),
            Staged::Typed { .. } => Cow::Borrowed(&[]),
        }
    }

    /// Describes the argument for validation; non-f32 arrays carry only their type.
    fn host<'a>(&'a self, buffer: &'a [f32]) -> HostArray<'a> {
        match self {
            Staged::F32(array) => HostArray::new(HostData::F32(buffer), array.shape()),
            Staged::Typed { shape, dtype } => HostArray::new(HostData::Opaque(*dtype), shape),
        }
    }
}

fn to_numpy<'py>(py: Python<'py>, map: ScoreMap) -> PyResult<Bound<'py, PyArray2<f32>>> {
    let shape = (map.height(), map.width());
    let array = Array2::from_shape_vec(shape, map.into_vec())
        .map_err(|err| PyValueError::new_err(err.to_string()))?;
    Ok(array.into_pyarray(py))
}

fn config(channels: usize, parallel: bool) -> PyResult<DetectConfig> {
    let cfg = DetectConfig {
        channels,
        parallel,
        ..DetectConfig::default()
    };
    cfg.validate().map_err(to_py_err)?;
    Ok(cfg)
}

/// Compute a 2D cross correlation between a filter and image features.
///
/// Args:
///     features: float32 array (height x width x channels)
///     filter: float32 array (filter_height x filter_width x channels)
///     bias: Subtracted from every valid score (default: 0.0)
///     channels: Required channel count (default: 32)
///     parallel: Accumulate rows in parallel (default: False)
///
/// Returns:
///     float32 array (height x width); cells where the filter overhangs
///     the features hold -2.0
#[pyfunction]
#[pyo3(signature = (features, filter, bias = 0.0, channels = DEFAULT_CHANNELS, parallel = false))]
fn detect<'py>(
    py: Python<'py>,
    features: &Bound<'py, PyAny>,
    filter: &Bound<'py, PyAny>,
    bias: f32,
    channels: usize,
    parallel: bool,
) -> PyResult<Bound<'py, PyArray2<f32>>> {
    let cfg = config(channels, parallel)?;
    let features = Staged::new(features, Operand::Features)?;
    let filter = Staged::new(filter, Operand::Filter)?;
    let features_buf = features.buffer();
    let filter_buf = filter.buffer();

    let map = detect_host(
        &features.host(&features_buf),
        &filter.host(&filter_buf),
        bias,
        &cfg,
    )
    .map_err(to_py_err)?;
    to_numpy(py, map)
}

/// Filter every level of a feature pyramid with one filter.
///
/// Args:
///     levels: Sequence of float32 feature arrays, one per pyramid level
///     filter: float32 array (filter_height x filter_width x channels)
///     bias: Subtracted from every valid score (default: 0.0)
///     channels: Required channel count (default: 32)
///     parallel: Accumulate rows in parallel (default: False)
///
/// Returns:
///     List of float32 score arrays in level order
#[pyfunction]
#[pyo3(signature = (levels, filter, bias = 0.0, channels = DEFAULT_CHANNELS, parallel = false))]
fn filter_pyramid<'py>(
    py: Python<'py>,
    levels: Vec<Bound<'py, PyAny>>,
    filter: &Bound<'py, PyAny>,
    bias: f32,
    channels: usize,
    parallel: bool,
) -> PyResult<Vec<Bound<'py, PyArray2<f32>>>> {
    let cfg = config(channels, parallel)?;
    let filter = Staged::new(filter, Operand::Filter)?;
    let filter_buf = filter.buffer();
    let filter_host = filter.host(&filter_buf);

    let mut out = Vec::with_capacity(levels.len());
    for level in &levels {
        let features = Staged::new(level, Operand::Features)?;
        let features_buf = features.buffer();
        let map = detect_host(&features.host(&features_buf), &filter_host, bias, &cfg)
            .map_err(to_py_err)?;
        out.push(to_numpy(py, map)?);
    }
    Ok(out)
}

/// Native convolution detection routine.
#[pymodule]
fn _featcorr(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(detect, m)?)?;
    m.add_function(wrap_pyfunction!(filter_pyramid, m)?)?;
    m.add("INVALID_SCORE", featcorr::INVALID_SCORE)?;
    m.add("DEFAULT_CHANNELS", DEFAULT_CHANNELS)?;

    // Add version
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
