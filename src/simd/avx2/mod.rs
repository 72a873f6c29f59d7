//! AVX2 implementations of the packed math kernels.
//!
//! This module contains the 256-bit vector paths: [`f32x8::F32x8`] with 8
//! single-precision lanes and [`f64x4::F64x4`] with 4 double-precision lanes.
//! It is only compiled when the build script detects AVX2 on the build
//! machine (`cfg(avx2)`), and the emitted code additionally assumes FMA,
//! which every AVX2-capable x86 CPU provides.
//!
//! # Layout
//!
//! - [`f32x8`] / [`f64x4`]: the packet types and their load/store plumbing
//! - [`sin`]: sine via Cody-Waite range reduction and minimax polynomials
//! - [`sqrt`] / [`rsqrt`]: root kernels with build-time fast/exact modes
//! - [`kernels`]: injection traits for externally supplied ln/exp/tanh

pub mod f32x8;

pub mod f64x4;

pub mod kernels;

#[allow(clippy::excessive_precision)]
pub mod sin;

pub mod sqrt;

pub mod rsqrt;
