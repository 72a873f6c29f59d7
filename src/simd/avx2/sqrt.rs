//! Square root over packed lanes, in exact and fast flavors.
//!
//! Single-precision lanes carry two mutually exclusive modes selected at
//! build time by the `fast-math` cargo feature:
//!
//! - **exact** (feature off): `_mm256_sqrt_ps`, fully IEEE-754 compliant.
//! - **fast** (feature on, the default): the hardware reciprocal-square-root
//!   estimate refined by one Newton-Raphson step and multiplied back by the
//!   input. Costs 1-2 bits of precision on normal positive inputs, does not
//!   handle `+inf`, and flushes denormal-range inputs to exactly zero — the
//!   estimate is unreliable near zero, so those lanes are forced rather than
//!   computed. These limitations are part of the mode's contract; callers
//!   who need IEEE behavior disable the feature.
//!
//! Double-precision lanes always use the exact `_mm256_sqrt_pd`.

use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::simd::{
    avx2::f32x8::{self, F32x8},
    avx2::f64x4::{self, F64x4},
    traits::{SimdLoad, SimdMath, SimdSqrt, SimdStore},
    utils::alloc_uninit_vec,
};

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Fast square root of 8 packed f32 values.
///
/// Computes `x * rsqrt_est(x)` with the estimate refined once:
/// `x1 = x0 * (1.5 - 0.5 * x * x0²)`. Lanes where
/// `0 <= x < f32::MIN_POSITIVE` (zero and subnormals) are flushed to exactly
/// zero through the compound comparison mask, since the hardware estimate is
/// unreliable there. Negative inputs yield NaN through the estimate itself.
///
/// Not IEEE compliant: loses 1-2 bits versus the exact instruction and does
/// not return `+inf` for a `+inf` input.
///
/// # Safety
///
/// Requires AVX2 and FMA support on the executing CPU.
#[target_feature(enable = "avx,avx2,fma")]
pub unsafe fn _mm256_sqrt_fast_ps(x: __m256) -> __m256 {
    let half = _mm256_mul_ps(x, _mm256_set1_ps(0.5));

    // Denormal-range lanes: 0 <= x < smallest positive normal.
    let denormal_mask = _mm256_and_ps(
        _mm256_cmp_ps(x, _mm256_set1_ps(f32::MIN_POSITIVE), _CMP_LT_OQ),
        _mm256_cmp_ps(x, _mm256_setzero_ps(), _CMP_GE_OQ),
    );

    // Approximate reciprocal sqrt, then a single Newton-Raphson step.
    let est = _mm256_rsqrt_ps(x);
    let est = _mm256_mul_ps(
        est,
        _mm256_sub_ps(
            _mm256_set1_ps(1.5),
            _mm256_mul_ps(half, _mm256_mul_ps(est, est)),
        ),
    );

    // sqrt(x) = x * rsqrt(x); flush the denormal-range lanes to zero.
    _mm256_andnot_ps(denormal_mask, _mm256_mul_ps(x, est))
}

#[inline(always)]
fn scalar_sqrt(a: &[f32]) -> Vec<f32> {
    assert!(!a.is_empty(), "Size can't be empty (size zero)");

    a.iter().map(|x| x.sqrt()).collect()
}

#[target_feature(enable = "avx,avx2,fma")]
fn simd_sqrt(a: &[f32]) -> Vec<f32> {
    assert!(!a.is_empty(), "Size can't be empty (size zero)");

    let size = a.len();

    let mut c = alloc_uninit_vec::<f32>(size, f32x8::AVX_ALIGNMENT);

    let step = f32x8::LANE_COUNT;

    let nb_lanes = size - (size % step);
    let rem_lanes = size - nb_lanes;

    for i in (0..nb_lanes).step_by(step) {
        simd_sqrt_block(&a[i], &mut c[i]);
    }

    if rem_lanes > 0 {
        simd_sqrt_partial_block(&a[nb_lanes], &mut c[nb_lanes], rem_lanes);
    }

    c
}

#[inline(always)]
fn simd_sqrt_block(a: *const f32, c: *mut f32) {
    let a_chunk_simd = unsafe { F32x8::load(a, f32x8::LANE_COUNT) };
    a_chunk_simd.sqrt().store_at(c);
}

#[inline(always)]
fn simd_sqrt_partial_block(a: *const f32, c: *mut f32, size: usize) {
    let a_chunk_simd = unsafe { F32x8::load_partial(a, size) };
    a_chunk_simd.sqrt().store_at(c);
}

#[target_feature(enable = "avx,avx2,fma")]
fn parallel_simd_sqrt(a: &[f32]) -> Vec<f32> {
    assert!(!a.is_empty(), "Size can't be empty (size zero)");

    let size = a.len();

    let mut c = alloc_uninit_vec::<f32>(size, f32x8::AVX_ALIGNMENT);

    let step = f32x8::LANE_COUNT;

    let nb_lanes = size - (size % step);
    let rem_lanes = size - nb_lanes;

    c.par_chunks_exact_mut(step)
        .enumerate()
        .for_each(|(i, c_chunk)| {
            simd_sqrt_block(&a[i * step], &mut c_chunk[0]);
        });

    if rem_lanes > 0 {
        simd_sqrt_partial_block(&a[nb_lanes], &mut c[nb_lanes], rem_lanes);
    }

    c
}

impl SimdSqrt<&[f32]> for &[f32] {
    type Output = Vec<f32>;

    #[inline(always)]
    fn simd_sqrt(self) -> Self::Output {
        unsafe { simd_sqrt(self) }
    }

    #[inline(always)]
    fn par_simd_sqrt(self) -> Self::Output {
        unsafe { parallel_simd_sqrt(self) }
    }

    #[inline(always)]
    fn scalar_sqrt(self) -> Self::Output {
        scalar_sqrt(self)
    }
}

#[inline(always)]
fn scalar_sqrt_f64(a: &[f64]) -> Vec<f64> {
    assert!(!a.is_empty(), "Size can't be empty (size zero)");

    a.iter().map(|x| x.sqrt()).collect()
}

#[target_feature(enable = "avx,avx2,fma")]
fn simd_sqrt_f64(a: &[f64]) -> Vec<f64> {
    assert!(!a.is_empty(), "Size can't be empty (size zero)");

    let size = a.len();

    let mut c = alloc_uninit_vec::<f64>(size, f64x4::AVX_ALIGNMENT);

    let step = f64x4::LANE_COUNT;

    let nb_lanes = size - (size % step);
    let rem_lanes = size - nb_lanes;

    for i in (0..nb_lanes).step_by(step) {
        simd_sqrt_f64_block(&a[i], &mut c[i]);
    }

    if rem_lanes > 0 {
        simd_sqrt_f64_partial_block(&a[nb_lanes], &mut c[nb_lanes], rem_lanes);
    }

    c
}

#[inline(always)]
fn simd_sqrt_f64_block(a: *const f64, c: *mut f64) {
    let a_chunk_simd = unsafe { F64x4::load(a, f64x4::LANE_COUNT) };
    a_chunk_simd.sqrt().store_at(c);
}

#[inline(always)]
fn simd_sqrt_f64_partial_block(a: *const f64, c: *mut f64, size: usize) {
    let a_chunk_simd = unsafe { F64x4::load_partial(a, size) };
    a_chunk_simd.sqrt().store_at(c);
}

#[target_feature(enable = "avx,avx2,fma")]
fn parallel_simd_sqrt_f64(a: &[f64]) -> Vec<f64> {
    assert!(!a.is_empty(), "Size can't be empty (size zero)");

    let size = a.len();

    let mut c = alloc_uninit_vec::<f64>(size, f64x4::AVX_ALIGNMENT);

    let step = f64x4::LANE_COUNT;

    let nb_lanes = size - (size % step);
    let rem_lanes = size - nb_lanes;

    c.par_chunks_exact_mut(step)
        .enumerate()
        .for_each(|(i, c_chunk)| {
            simd_sqrt_f64_block(&a[i * step], &mut c_chunk[0]);
        });

    if rem_lanes > 0 {
        simd_sqrt_f64_partial_block(&a[nb_lanes], &mut c[nb_lanes], rem_lanes);
    }

    c
}

impl SimdSqrt<&[f64]> for &[f64] {
    type Output = Vec<f64>;

    #[inline(always)]
    fn simd_sqrt(self) -> Self::Output {
        unsafe { simd_sqrt_f64(self) }
    }

    #[inline(always)]
    fn par_simd_sqrt(self) -> Self::Output {
        unsafe { parallel_simd_sqrt_f64(self) }
    }

    #[inline(always)]
    fn scalar_sqrt(self) -> Self::Output {
        scalar_sqrt_f64(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqrt_fast(data: &[f32]) -> Vec<f32> {
        let v = F32x8::from(data);
        F32x8 {
            size: v.size,
            elements: unsafe { _mm256_sqrt_fast_ps(v.elements) },
        }
        .to_vec()
    }

    fn ulp_diff(a: f32, b: f32) -> u32 {
        (a.to_bits() as i32).wrapping_sub(b.to_bits() as i32).unsigned_abs()
    }

    #[test]
    fn test_fast_sqrt_within_two_ulp_for_normals() {
        let data = [1.0f32, 2.0, 3.0, 4.0, 0.25, 1e-3, 1e6, 12345.678];
        let got = sqrt_fast(&data);

        for (x, got) in data.iter().zip(got.iter()) {
            let exact = x.sqrt();
            assert!(
                ulp_diff(*got, exact) <= 2,
                "sqrt_fast({x}) = {got}, exact {exact}"
            );
        }
    }

    #[test]
    fn test_fast_sqrt_flushes_denormals_to_zero() {
        let tiny = f32::MIN_POSITIVE / 2.0;
        let data = [0.0f32, tiny, f32::MIN_POSITIVE / 4.0, 1.0e-38, 0.0, 0.0, 0.0, 1.0];
        let got = sqrt_fast(&data);

        assert_eq!(got[0], 0.0);
        assert_eq!(got[1], 0.0);
        assert_eq!(got[2], 0.0);
        assert_eq!(got[3], 0.0);
        assert!((got[7] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fast_sqrt_negative_is_nan() {
        let data = [-1.0f32, -0.5, -1e10, -f32::MIN_POSITIVE, 4.0, 9.0, 16.0, 25.0];
        let got = sqrt_fast(&data);

        assert!(got[..3].iter().all(|y| y.is_nan()));
        assert!((got[4] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_exact_sqrt_slice_matches_scalar() {
        let data: Vec<f64> = (0..19).map(|i| i as f64 * 1.75).collect();
        let got = data.as_slice().simd_sqrt();
        let expected = data.as_slice().scalar_sqrt();

        assert_eq!(got, expected);
    }
}
