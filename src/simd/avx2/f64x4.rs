//! AVX2 4-lane f64 SIMD vector implementation.
//!
//! `F64x4` wraps Intel's AVX `__m256d` register to process 4 double-precision
//! floating-point values simultaneously. The double-precision surface is
//! narrower than [`F32x8`](crate::simd::avx2::f32x8::F32x8): square root and
//! reciprocal square root always use the exact hardware instructions — the
//! fast estimate paths exist only for single precision — and the exponential
//! is delegated to an injected [`Float4Kernel`]. There is no sine kernel at
//! this width.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use std::ops::{Add, Div, Mul, Sub};

use crate::simd::{
    avx2::kernels::Float4Kernel, utils::alloc_uninit_vec, Alignment, SimdLoad, SimdStore,
};

/// AVX memory alignment requirement in bytes.
pub(crate) const AVX_ALIGNMENT: usize = 32;

/// Number of f64 elements in a 256-bit AVX vector (4 × 64 bits).
pub(crate) const LANE_COUNT: usize = 4;

/// AVX2 SIMD vector containing 4 packed f64 values.
///
/// A pure value type like its single-precision counterpart: operations
/// produce new vectors and the `size` field tracks how many lanes hold valid
/// data for masked tail handling.
#[derive(Copy, Clone, Debug)]
pub struct F64x4 {
    /// Number of valid elements in the vector (1-4)
    pub size: usize,
    /// AVX 256-bit register containing 4 packed f64 values
    pub elements: __m256d,
}

impl F64x4 {
    /// Broadcasts a single value into every lane.
    #[inline(always)]
    pub fn splat(value: f64) -> Self {
        Self {
            size: LANE_COUNT,
            elements: unsafe { _mm256_set1_pd(value) },
        }
    }

    /// Copies the valid lanes into a newly allocated `Vec<f64>`.
    #[inline(always)]
    pub fn to_vec(self) -> Vec<f64> {
        let out = alloc_uninit_vec::<f64>(self.size, AVX_ALIGNMENT);
        self.store_at(out.as_ptr());
        out
    }

    /// Elementwise square root via `_mm256_sqrt_pd`.
    ///
    /// Always exact and fully IEEE-754 compliant: NaN for negative inputs,
    /// +inf for +inf. Double-precision lanes never use the fast estimate.
    #[inline(always)]
    pub fn sqrt(&self) -> Self {
        Self {
            size: self.size,
            elements: unsafe { _mm256_sqrt_pd(self.elements) },
        }
    }

    /// Elementwise reciprocal square root as `1 / sqrt(x)` through the exact
    /// hardware square root and division.
    #[inline(always)]
    pub fn rsqrt(&self) -> Self {
        Self {
            size: self.size,
            elements: unsafe {
                _mm256_div_pd(_mm256_set1_pd(1.0), _mm256_sqrt_pd(self.elements))
            },
        }
    }

    /// Natural exponential, delegated lane-for-lane to the injected kernel `K`.
    #[inline(always)]
    pub fn exp<K: Float4Kernel>(&self) -> Self {
        Self {
            size: self.size,
            elements: unsafe { K::exp(self.elements) },
        }
    }
}

impl Alignment<f64> for F64x4 {
    /// Checks whether a pointer is 32-byte aligned for AVX loads and stores.
    #[inline(always)]
    fn is_aligned(ptr: *const f64) -> bool {
        let ptr = ptr as usize;

        ptr % core::mem::align_of::<__m256d>() == 0
    }
}

impl From<&[f64]> for F64x4 {
    /// Creates an F64x4 vector from a slice of f64 values.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the slice is empty.
    fn from(slice: &[f64]) -> Self {
        debug_assert!(!slice.is_empty(), "data pointer can't be NULL");

        let size = slice.len();

        match slice.len().cmp(&LANE_COUNT) {
            std::cmp::Ordering::Less => unsafe { Self::load_partial(slice.as_ptr(), size) },
            std::cmp::Ordering::Equal | std::cmp::Ordering::Greater => unsafe {
                Self::load(slice.as_ptr(), LANE_COUNT)
            },
        }
    }
}

impl SimdLoad<f64> for F64x4 {
    type Output = Self;

    /// Loads exactly 4 elements, choosing aligned or unaligned moves based
    /// on the pointer.
    ///
    /// # Safety
    ///
    /// Pointer must not be null and must point to at least 4 valid f64 values.
    #[inline(always)]
    unsafe fn load(ptr: *const f64, size: usize) -> Self::Output {
        debug_assert!(size == LANE_COUNT, "Size must be == {LANE_COUNT}");
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        match F64x4::is_aligned(ptr) {
            true => unsafe { Self::load_aligned(ptr) },
            false => unsafe { Self::load_unaligned(ptr) },
        }
    }

    /// Loads 4 elements from 32-byte aligned memory via `_mm256_load_pd`.
    ///
    /// # Safety
    ///
    /// Pointer must be 32-byte aligned and point to at least 4 valid f64 values.
    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f64) -> Self::Output {
        Self {
            elements: _mm256_load_pd(ptr),
            size: LANE_COUNT,
        }
    }

    /// Loads 4 elements from unaligned memory via `_mm256_loadu_pd`.
    ///
    /// # Safety
    ///
    /// Pointer must point to at least 4 valid f64 values.
    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f64) -> Self::Output {
        Self {
            elements: _mm256_loadu_pd(ptr),
            size: LANE_COUNT,
        }
    }

    /// Loads fewer than 4 elements using `_mm256_maskload_pd`, so no memory
    /// beyond the valid range is touched. Unloaded lanes read as zero.
    ///
    /// # Safety
    ///
    /// Pointer must not be null and must point to at least `size` valid f64
    /// values.
    #[inline(always)]
    unsafe fn load_partial(ptr: *const f64, size: usize) -> Self::Output {
        debug_assert!(
            size < LANE_COUNT,
            "{}",
            format!("Size must be < {LANE_COUNT}")
        );

        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        let mask = match size {
            1 => _mm256_setr_epi64x(-1, 0, 0, 0),
            2 => _mm256_setr_epi64x(-1, -1, 0, 0),
            3 => _mm256_setr_epi64x(-1, -1, -1, 0),
            _ => unreachable!(),
        };

        Self {
            elements: _mm256_maskload_pd(ptr, mask),
            size,
        }
    }
}

impl SimdStore<f64> for F64x4 {
    type Output = Self;

    /// Stores the valid lanes at `ptr`, choosing partial, aligned or
    /// unaligned stores based on `self.size` and the pointer.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if size > 4 or if the pointer is null.
    #[inline(always)]
    fn store_at(&self, ptr: *const f64) {
        debug_assert!(
            self.size <= LANE_COUNT,
            "{}",
            format!("Size must be <= {LANE_COUNT}")
        );
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        // Cast to mutable pointer for store operations
        let mut_ptr = ptr as *mut f64;

        match self.size.cmp(&LANE_COUNT) {
            std::cmp::Ordering::Less => unsafe { self.store_at_partial(mut_ptr) },
            std::cmp::Ordering::Equal => match F64x4::is_aligned(ptr) {
                true => unsafe { self.store_aligned_at(mut_ptr) },
                false => unsafe { self.store_unaligned_at(mut_ptr) },
            },
            std::cmp::Ordering::Greater => unreachable!("Size cannot exceed LANE_COUNT"),
        }
    }

    /// Stores 4 elements to 32-byte aligned memory via `_mm256_store_pd`.
    ///
    /// # Safety
    ///
    /// Pointer must be 32-byte aligned and reference 4 writable f64 slots.
    #[inline(always)]
    unsafe fn store_aligned_at(&self, ptr: *mut f64) {
        _mm256_store_pd(ptr, self.elements)
    }

    /// Stores 4 elements to unaligned memory via `_mm256_storeu_pd`.
    ///
    /// # Safety
    ///
    /// Pointer must reference 4 writable f64 slots.
    #[inline(always)]
    unsafe fn store_unaligned_at(&self, ptr: *mut f64) {
        _mm256_storeu_pd(ptr, self.elements)
    }

    /// Stores only the valid lanes using `_mm256_maskstore_pd`.
    ///
    /// # Safety
    ///
    /// Pointer must not be null and must reference at least `self.size`
    /// writable f64 slots.
    #[inline(always)]
    unsafe fn store_at_partial(&self, ptr: *mut f64) {
        debug_assert!(
            self.size < LANE_COUNT,
            "{}",
            format!("Size must be < {LANE_COUNT}")
        );
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        let mask: __m256i = match self.size {
            1 => _mm256_setr_epi64x(-1, 0, 0, 0),
            2 => _mm256_setr_epi64x(-1, -1, 0, 0),
            3 => _mm256_setr_epi64x(-1, -1, -1, 0),
            _ => unreachable!("Size must be < LANE_COUNT"),
        };

        _mm256_maskstore_pd(ptr, mask, self.elements);
    }
}

impl Add for F64x4 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        debug_assert!(self.size == rhs.size, "Operands must have the same size");

        Self {
            size: self.size,
            elements: unsafe { _mm256_add_pd(self.elements, rhs.elements) },
        }
    }
}

impl Sub for F64x4 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        debug_assert!(self.size == rhs.size, "Operands must have the same size");

        Self {
            size: self.size,
            elements: unsafe { _mm256_sub_pd(self.elements, rhs.elements) },
        }
    }
}

impl Mul for F64x4 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        debug_assert!(self.size == rhs.size, "Operands must have the same size");

        Self {
            size: self.size,
            elements: unsafe { _mm256_mul_pd(self.elements, rhs.elements) },
        }
    }
}

impl Div for F64x4 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self::Output {
        debug_assert!(self.size == rhs.size, "Operands must have the same size");

        Self {
            size: self.size,
            elements: unsafe { _mm256_div_pd(self.elements, rhs.elements) },
        }
    }
}
