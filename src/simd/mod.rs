//! SIMD vector types and the trait seams they plug into.
//!
//! The `avx2` submodule holds the accelerated implementations and is only
//! compiled when the build script detects AVX2 support on the build machine.

#[cfg(avx2)]
pub mod avx2;

pub mod traits;

pub mod utils;

pub use traits::{Alignment, SimdLoad, SimdMath, SimdRsqrt, SimdSin, SimdSqrt, SimdStore};
