//! Low-level building blocks for custom scoring pipelines.
//!
//! These expose the accumulation kernels, the padding geometry and host
//! validation directly. Most users should prefer [`crate::detect()`] or
//! [`crate::Detector`]; kernels here skip validation and border
//! invalidation and expect the output to already hold the bias baseline.

pub use crate::host::validate_pair;
#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::AxpyRayon;
pub use crate::kernel::scalar::AxpyScalar;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::AxpySimd;
pub use crate::kernel::{Kernel, Padding};
pub use crate::score::ScoreViewMut;
