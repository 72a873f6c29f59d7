//! Tests for the injected ln/exp/tanh kernel seam.
//!
//! The crate owns no algorithm for these functions: the packet methods must
//! forward the injected kernel's output unchanged. The doubles below stand
//! in for the host library's vectorized kernels.
#![cfg(avx2)]

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use packmath::simd::avx2::{
    f32x8::F32x8,
    f64x4::F64x4,
    kernels::{Float4Kernel, Float8Kernel},
};

/// Scalar reference double: applies the std library function lane by lane.
struct ScalarRefKernel;

unsafe fn map_lanes(x: __m256, f: fn(f32) -> f32) -> __m256 {
    let lanes: [f32; 8] = std::mem::transmute(x);
    let mapped = lanes.map(f);
    std::mem::transmute(mapped)
}

impl Float8Kernel for ScalarRefKernel {
    unsafe fn ln(x: __m256) -> __m256 {
        map_lanes(x, f32::ln)
    }

    unsafe fn exp(x: __m256) -> __m256 {
        map_lanes(x, f32::exp)
    }

    unsafe fn tanh(x: __m256) -> __m256 {
        map_lanes(x, f32::tanh)
    }
}

impl Float4Kernel for ScalarRefKernel {
    unsafe fn exp(x: __m256d) -> __m256d {
        let lanes: [f64; 4] = std::mem::transmute(x);
        std::mem::transmute(lanes.map(f64::exp))
    }
}

/// Pass-through double: proves the packet methods forward output bits
/// unchanged.
struct IdentityKernel;

impl Float8Kernel for IdentityKernel {
    unsafe fn ln(x: __m256) -> __m256 {
        x
    }

    unsafe fn exp(x: __m256) -> __m256 {
        x
    }

    unsafe fn tanh(x: __m256) -> __m256 {
        x
    }
}

impl Float4Kernel for IdentityKernel {
    unsafe fn exp(x: __m256d) -> __m256d {
        x
    }
}

#[test]
fn test_ln_delegates_to_kernel() {
    let data = [0.5f32, 1.0, 2.0, std::f32::consts::E, 10.0, 100.0, 0.1, 7.0];
    let got = F32x8::from(data.as_slice()).ln::<ScalarRefKernel>().to_vec();

    for (x, got) in data.iter().zip(got.iter()) {
        assert_eq!(got.to_bits(), x.ln().to_bits());
    }
}

#[test]
fn test_exp_delegates_to_kernel() {
    let data = [0.0f32, 1.0, -1.0, 0.5, 2.0, -3.0, 10.0, -10.0];
    let got = F32x8::from(data.as_slice()).exp::<ScalarRefKernel>().to_vec();

    for (x, got) in data.iter().zip(got.iter()) {
        assert_eq!(got.to_bits(), x.exp().to_bits());
    }
}

#[test]
fn test_tanh_delegates_to_kernel() {
    let data = [0.0f32, 0.5, -0.5, 1.0, -2.0, 5.0, -5.0, 20.0];
    let got = F32x8::from(data.as_slice())
        .tanh::<ScalarRefKernel>()
        .to_vec();

    for (x, got) in data.iter().zip(got.iter()) {
        assert_eq!(got.to_bits(), x.tanh().to_bits());
    }
}

#[test]
fn test_f64_exp_delegates_to_kernel() {
    let data = [0.0f64, 1.0, -1.0, 20.0];
    let got = F64x4::from(data.as_slice()).exp::<ScalarRefKernel>().to_vec();

    for (x, got) in data.iter().zip(got.iter()) {
        assert_eq!(got.to_bits(), x.exp().to_bits());
    }
}

#[test]
fn test_delegation_is_bit_transparent() {
    // NaN payloads, signed zeros and infinities must pass through untouched.
    let data = [
        f32::NAN,
        -0.0,
        0.0,
        f32::INFINITY,
        f32::NEG_INFINITY,
        f32::MIN_POSITIVE / 2.0,
        1.0,
        -1.0,
    ];
    let v = F32x8::from(data.as_slice());

    let ln = v.ln::<IdentityKernel>().to_vec();
    let exp = v.exp::<IdentityKernel>().to_vec();
    let tanh = v.tanh::<IdentityKernel>().to_vec();

    for (i, x) in data.iter().enumerate() {
        assert_eq!(ln[i].to_bits(), x.to_bits());
        assert_eq!(exp[i].to_bits(), x.to_bits());
        assert_eq!(tanh[i].to_bits(), x.to_bits());
    }
}
