//! Reciprocal square root over packed lanes, in exact and fast flavors.
//!
//! As with [`sqrt`](crate::simd::avx2::sqrt), single-precision lanes carry
//! two build-time modes:
//!
//! - **exact** (`fast-math` off): `1 / sqrt(x)` through the exact hardware
//!   square root and division.
//! - **fast** (`fast-math` on, the default): the hardware estimate refined
//!   by one Newton-Raphson step, with every degenerate lane receiving an
//!   explicit bit pattern instead of whatever the estimate instruction would
//!   produce: negative inputs become quiet NaN, and inputs below the
//!   smallest positive normal (zero and subnormals, which flush to zero and
//!   would blow up the refinement) become `+inf`.
//!
//! Double-precision lanes always use the exact division form.

use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::simd::{
    avx2::f32x8::{self, F32x8},
    avx2::f64x4::{self, F64x4},
    traits::{SimdLoad, SimdMath, SimdRsqrt, SimdStore},
    utils::alloc_uninit_vec,
};

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

// Special-value bit patterns injected into degenerate lanes.
const INF_BITS: i32 = 0x7f80_0000;
const QNAN_BITS: i32 = 0x7fc0_0000;
// Smallest positive normal f32 (f32::MIN_POSITIVE), as a bit pattern.
const FLT_MIN_BITS: i32 = 0x0080_0000;

/// Fast reciprocal square root of 8 packed f32 values.
///
/// Runs the hardware estimate on all lanes, masks it to zero wherever
/// `x < f32::MIN_POSITIVE`, refines with one Newton-Raphson step
/// `x1 = x0 * ((-0.5 * x) * x0² + 1.5)`, and ORs in the special-value lanes:
/// quiet NaN where `x < 0`, `+inf` where `0 <= x < f32::MIN_POSITIVE`.
/// Every lane receives exactly one defined value; nothing relies on the
/// estimate instruction's behavior at degenerate inputs.
///
/// # Safety
///
/// Requires AVX2 and FMA support on the executing CPU.
#[target_feature(enable = "avx,avx2,fma")]
pub unsafe fn _mm256_rsqrt_fast_ps(x: __m256) -> __m256 {
    let inf = _mm256_castsi256_ps(_mm256_set1_epi32(INF_BITS));
    let nan = _mm256_castsi256_ps(_mm256_set1_epi32(QNAN_BITS));
    let flt_min = _mm256_castsi256_ps(_mm256_set1_epi32(FLT_MIN_BITS));

    let neg_half = _mm256_mul_ps(x, _mm256_set1_ps(-0.5));

    // Keep the estimate only for positive normal inputs; below-normal lanes
    // (denormals flush to zero and would produce infs in the refinement)
    // are zeroed here and filled in explicitly below.
    let le_zero_mask = _mm256_cmp_ps(x, flt_min, _CMP_LT_OQ);
    let est = _mm256_andnot_ps(le_zero_mask, _mm256_rsqrt_ps(x));

    // Classify the masked-out lanes: NaN for negatives, +inf for the
    // [0, flt_min) range covering zero and subnormals.
    let neg_mask = _mm256_cmp_ps(x, _mm256_setzero_ps(), _CMP_LT_OQ);
    let zero_mask = _mm256_andnot_ps(neg_mask, le_zero_mask);
    let infs_and_nans = _mm256_or_ps(
        _mm256_and_ps(neg_mask, nan),
        _mm256_and_ps(zero_mask, inf),
    );

    // One Newton-Raphson step; the masked lanes stay zero through it.
    let est = _mm256_mul_ps(
        est,
        _mm256_fmadd_ps(neg_half, _mm256_mul_ps(est, est), _mm256_set1_ps(1.5)),
    );

    // Each lane is non-zero on exactly one side of this OR.
    _mm256_or_ps(est, infs_and_nans)
}

/// Exact reciprocal square root of 8 packed f32 values, as `1 / sqrt(x)`.
///
/// # Safety
///
/// Requires AVX2 and FMA support on the executing CPU.
#[target_feature(enable = "avx,avx2,fma")]
pub unsafe fn _mm256_rsqrt_exact_ps(x: __m256) -> __m256 {
    _mm256_div_ps(_mm256_set1_ps(1.0), _mm256_sqrt_ps(x))
}

#[inline(always)]
fn scalar_rsqrt(a: &[f32]) -> Vec<f32> {
    assert!(!a.is_empty(), "Size can't be empty (size zero)");

    a.iter().map(|x| 1.0 / x.sqrt()).collect()
}

#[target_feature(enable = "avx,avx2,fma")]
fn simd_rsqrt(a: &[f32]) -> Vec<f32> {
    assert!(!a.is_empty(), "Size can't be empty (size zero)");

    let size = a.len();

    let mut c = alloc_uninit_vec::<f32>(size, f32x8::AVX_ALIGNMENT);

    let step = f32x8::LANE_COUNT;

    let nb_lanes = size - (size % step);
    let rem_lanes = size - nb_lanes;

    for i in (0..nb_lanes).step_by(step) {
        simd_rsqrt_block(&a[i], &mut c[i]);
    }

    if rem_lanes > 0 {
        simd_rsqrt_partial_block(&a[nb_lanes], &mut c[nb_lanes], rem_lanes);
    }

    c
}

#[inline(always)]
fn simd_rsqrt_block(a: *const f32, c: *mut f32) {
    let a_chunk_simd = unsafe { F32x8::load(a, f32x8::LANE_COUNT) };
    a_chunk_simd.rsqrt().store_at(c);
}

#[inline(always)]
fn simd_rsqrt_partial_block(a: *const f32, c: *mut f32, size: usize) {
    let a_chunk_simd = unsafe { F32x8::load_partial(a, size) };
    a_chunk_simd.rsqrt().store_at(c);
}

#[target_feature(enable = "avx,avx2,fma")]
fn parallel_simd_rsqrt(a: &[f32]) -> Vec<f32> {
    assert!(!a.is_empty(), "Size can't be empty (size zero)");

    let size = a.len();

    let mut c = alloc_uninit_vec::<f32>(size, f32x8::AVX_ALIGNMENT);

    let step = f32x8::LANE_COUNT;

    let nb_lanes = size - (size % step);
    let rem_lanes = size - nb_lanes;

    c.par_chunks_exact_mut(step)
        .enumerate()
        .for_each(|(i, c_chunk)| {
            simd_rsqrt_block(&a[i * step], &mut c_chunk[0]);
        });

    if rem_lanes > 0 {
        simd_rsqrt_partial_block(&a[nb_lanes], &mut c[nb_lanes], rem_lanes);
    }

    c
}

impl SimdRsqrt<&[f32]> for &[f32] {
    type Output = Vec<f32>;

    #[inline(always)]
    fn simd_rsqrt(self) -> Self::Output {
        unsafe { simd_rsqrt(self) }
    }

    #[inline(always)]
    fn par_simd_rsqrt(self) -> Self::Output {
        unsafe { parallel_simd_rsqrt(self) }
    }

    #[inline(always)]
    fn scalar_rsqrt(self) -> Self::Output {
        scalar_rsqrt(self)
    }
}

#[inline(always)]
fn scalar_rsqrt_f64(a: &[f64]) -> Vec<f64> {
    assert!(!a.is_empty(), "Size can't be empty (size zero)");

    a.iter().map(|x| 1.0 / x.sqrt()).collect()
}

#[target_feature(enable = "avx,avx2,fma")]
fn simd_rsqrt_f64(a: &[f64]) -> Vec<f64> {
    assert!(!a.is_empty(), "Size can't be empty (size zero)");

    let size = a.len();

    let mut c = alloc_uninit_vec::<f64>(size, f64x4::AVX_ALIGNMENT);

    let step = f64x4::LANE_COUNT;

    let nb_lanes = size - (size % step);
    let rem_lanes = size - nb_lanes;

    for i in (0..nb_lanes).step_by(step) {
        simd_rsqrt_f64_block(&a[i], &mut c[i]);
    }

    if rem_lanes > 0 {
        simd_rsqrt_f64_partial_block(&a[nb_lanes], &mut c[nb_lanes], rem_lanes);
    }

    c
}

#[inline(always)]
fn simd_rsqrt_f64_block(a: *const f64, c: *mut f64) {
    let a_chunk_simd = unsafe { F64x4::load(a, f64x4::LANE_COUNT) };
    a_chunk_simd.rsqrt().store_at(c);
}

#[inline(always)]
fn simd_rsqrt_f64_partial_block(a: *const f64, c: *mut f64, size: usize) {
    let a_chunk_simd = unsafe { F64x4::load_partial(a, size) };
    a_chunk_simd.rsqrt().store_at(c);
}

#[target_feature(enable = "avx,avx2,fma")]
fn parallel_simd_rsqrt_f64(a: &[f64]) -> Vec<f64> {
    assert!(!a.is_empty(), "Size can't be empty (size zero)");

    let size = a.len();

    let mut c = alloc_uninit_vec::<f64>(size, f64x4::AVX_ALIGNMENT);

    let step = f64x4::LANE_COUNT;

    let nb_lanes = size - (size % step);
    let rem_lanes = size - nb_lanes;

    c.par_chunks_exact_mut(step)
        .enumerate()
        .for_each(|(i, c_chunk)| {
            simd_rsqrt_f64_block(&a[i * step], &mut c_chunk[0]);
        });

    if rem_lanes > 0 {
        simd_rsqrt_f64_partial_block(&a[nb_lanes], &mut c[nb_lanes], rem_lanes);
    }

    c
}

impl SimdRsqrt<&[f64]> for &[f64] {
    type Output = Vec<f64>;

    #[inline(always)]
    fn simd_rsqrt(self) -> Self::Output {
        unsafe { simd_rsqrt_f64(self) }
    }

    #[inline(always)]
    fn par_simd_rsqrt(self) -> Self::Output {
        unsafe { parallel_simd_rsqrt_f64(self) }
    }

    #[inline(always)]
    fn scalar_rsqrt(self) -> Self::Output {
        scalar_rsqrt_f64(self)
    }
}
