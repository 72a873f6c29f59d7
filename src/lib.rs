//! Lane-parallel approximations of elementary math functions.
//!
//! This crate provides fast vectorized approximations of sine, square root and
//! reciprocal square root over packed AVX2 vectors — 8 single-precision lanes
//! ([`simd::avx2::f32x8::F32x8`]) or 4 double-precision lanes
//! ([`simd::avx2::f64x4::F64x4`]) — together with injection points for
//! externally supplied logarithm, exponential and hyperbolic-tangent kernels.
//! It is the transcendental-function core of a larger linear-algebra stack.
//!
//! # Accuracy modes
//!
//! Square root and reciprocal square root come in two build-time modes,
//! selected by the `fast-math` cargo feature (enabled by default):
//!
//! - **fast**: hardware reciprocal-square-root estimate refined by one
//!   Newton-Raphson step, with explicit bitmask handling of zero, negative,
//!   subnormal and infinite lanes. Costs 1-2 bits of precision versus the
//!   exact instruction and does not handle `+inf` in `sqrt`.
//! - **exact**: the platform's IEEE-754 compliant vector square root.
//!
//! The mode is a compile-time choice, never a runtime branch: the two modes
//! carry different accuracy contracts that callers select deliberately.
//! Double-precision lanes always use the exact instructions.
//!
//! # Usage
//!
//! ```rust
//! # #[cfg(avx2)]
//! # {
//! use packmath::simd::SimdSin;
//!
//! let angles: &[f32] = &[0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5];
//! let sines = angles.simd_sin();
//! # }
//! ```

pub mod simd;
