//! Injection traits for externally supplied transcendental kernels.
//!
//! Logarithm, exponential and hyperbolic tangent are not implemented in this
//! crate: the surrounding linear-algebra stack already carries vectorized
//! kernels for them over the same lane widths, and the packet types forward
//! to those unchanged. Modeling the collaborators as traits rather than hard
//! function dependencies keeps them independently substitutable — tests can
//! inject a scalar reference double, and the host can swap kernel
//! generations without touching this crate.
//!
//! Implementations must be pure: identical input bit patterns produce
//! identical output bit patterns, with no shared mutable state.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Vectorized transcendental kernels over 8 packed f32 lanes.
pub trait Float8Kernel {
    /// Elementwise natural logarithm.
    ///
    /// # Safety
    ///
    /// Callers must ensure the CPU supports the instructions the kernel was
    /// compiled for (AVX2 for every implementation this crate is built with).
    unsafe fn ln(x: __m256) -> __m256;

    /// Elementwise natural exponential.
    ///
    /// # Safety
    ///
    /// Same contract as [`Float8Kernel::ln`].
    unsafe fn exp(x: __m256) -> __m256;

    /// Elementwise hyperbolic tangent.
    ///
    /// # Safety
    ///
    /// Same contract as [`Float8Kernel::ln`].
    unsafe fn tanh(x: __m256) -> __m256;
}

/// Vectorized transcendental kernels over 4 packed f64 lanes.
///
/// Only the exponential is consumed at double precision; the host stack does
/// not provide a fast hyperbolic tangent at this width.
pub trait Float4Kernel {
    /// Elementwise natural exponential.
    ///
    /// # Safety
    ///
    /// Callers must ensure the CPU supports the instructions the kernel was
    /// compiled for.
    unsafe fn exp(x: __m256d) -> __m256d;
}
