//! AVX2 8-lane f32 SIMD vector implementation.
//!
//! This module provides `F32x8`, a SIMD vector type that wraps Intel's AVX
//! `__m256` register to evaluate math kernels on 8 single-precision
//! floating-point values simultaneously.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: x86/x86_64 processors with AVX2 and FMA (Haswell and later)
//! - **Compilation**: The build script enables `+avx2,+avx,+fma` when the
//!   build machine supports them
//!
//! # Supported Operations
//!
//! ## Loading and Storing
//! - `From<&[f32]>` - high-level loading with automatic partial handling
//! - `load_aligned()`, `load_unaligned()` - direct memory loading
//! - `load_partial()` - masked loading for sizes < 8
//! - `store_at()` - automatic store with size and alignment detection
//!
//! ## Mathematical Functions
//! - Own kernels: `sin()`, `sqrt()`, `rsqrt()` (see [`SimdMath`])
//! - Delegated kernels: `ln()`, `exp()`, `tanh()`, forwarded to an injected
//!   [`Float8Kernel`] implementation
//!
//! ## Arithmetic Operators
//! - Element-wise `+`, `-`, `*`, `/` with operator chaining

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use std::ops::{Add, Div, Mul, Sub};

use crate::simd::{
    avx2::{kernels::Float8Kernel, rsqrt, sin},
    utils::alloc_uninit_vec,
    Alignment, SimdLoad, SimdMath, SimdStore,
};

/// AVX memory alignment requirement in bytes.
///
/// 256-bit loads and stores perform best when data sits on 32-byte
/// boundaries; this constant is used both for alignment checks and for the
/// aligned buffers the slice-level kernels allocate.
pub(crate) const AVX_ALIGNMENT: usize = 32;

/// Number of f32 elements in a 256-bit AVX vector (8 × 32 bits).
pub(crate) const LANE_COUNT: usize = 8;

/// AVX2 SIMD vector containing 8 packed f32 values.
///
/// A pure value type: every operation reads the input lanes and produces a
/// new vector, with no in-place mutation and no aliasing across lanes. The
/// `size` field tracks how many lanes hold valid data so that slice tails
/// shorter than 8 elements round-trip through masked loads and stores.
///
/// ```rust
/// # #[cfg(avx2)]
/// # {
/// use packmath::simd::avx2::f32x8::F32x8;
/// use packmath::simd::SimdMath;
///
/// let data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
/// let roots = F32x8::from(data.as_slice()).sqrt();
/// # }
/// ```
#[derive(Copy, Clone, Debug)]
pub struct F32x8 {
    /// Number of valid elements in the vector (1-8)
    pub size: usize,
    /// AVX 256-bit register containing 8 packed f32 values
    pub elements: __m256,
}

impl F32x8 {
    /// Broadcasts a single value into every lane.
    #[inline(always)]
    pub fn splat(value: f32) -> Self {
        Self {
            size: LANE_COUNT,
            elements: unsafe { _mm256_set1_ps(value) },
        }
    }

    /// Copies the valid lanes into a newly allocated `Vec<f32>`.
    #[inline(always)]
    pub fn to_vec(self) -> Vec<f32> {
        let out = alloc_uninit_vec::<f32>(self.size, AVX_ALIGNMENT);
        self.store_at(out.as_ptr());
        out
    }

    /// Natural logarithm, delegated lane-for-lane to the injected kernel `K`.
    ///
    /// No algorithm lives here: the host library supplies the vectorized
    /// logarithm and this method forwards its result unchanged.
    #[inline(always)]
    pub fn ln<K: Float8Kernel>(&self) -> Self {
        Self {
            size: self.size,
            elements: unsafe { K::ln(self.elements) },
        }
    }

    /// Natural exponential, delegated lane-for-lane to the injected kernel `K`.
    #[inline(always)]
    pub fn exp<K: Float8Kernel>(&self) -> Self {
        Self {
            size: self.size,
            elements: unsafe { K::exp(self.elements) },
        }
    }

    /// Hyperbolic tangent, delegated lane-for-lane to the injected kernel `K`.
    #[inline(always)]
    pub fn tanh<K: Float8Kernel>(&self) -> Self {
        Self {
            size: self.size,
            elements: unsafe { K::tanh(self.elements) },
        }
    }
}

impl Alignment<f32> for F32x8 {
    /// Checks whether a pointer is 32-byte aligned for AVX loads and stores.
    #[inline(always)]
    fn is_aligned(ptr: *const f32) -> bool {
        let ptr = ptr as usize;

        ptr % core::mem::align_of::<__m256>() == 0
    }
}

impl From<&[f32]> for F32x8 {
    /// Creates an F32x8 vector from a slice of f32 values.
    ///
    /// Slices with at least 8 elements use a full SIMD load of the first 8;
    /// shorter slices go through a masked partial load.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the slice is empty.
    fn from(slice: &[f32]) -> Self {
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

impl SimdLoad<f32> for F32x8 {
    type Output = Self;

    /// Loads exactly 8 elements, choosing aligned or unaligned moves based
    /// on the pointer.
    ///
    /// # Safety
    ///
    /// Pointer must not be null and must point to at least 8 valid f32 values.
    #[inline(always)]
    unsafe fn load(ptr: *const f32, size: usize) -> Self::Output {
        debug_assert!(size == LANE_COUNT, "Size must be == {LANE_COUNT}");
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        match F32x8::is_aligned(ptr) {
            true => unsafe { Self::load_aligned(ptr) },
            false => unsafe { Self::load_unaligned(ptr) },
        }
    }

    /// Loads 8 elements from 32-byte aligned memory via `_mm256_load_ps`.
    ///
    /// # Safety
    ///
    /// Pointer must be 32-byte aligned and point to at least 8 valid f32 values.
    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self::Output {
        Self {
            elements: _mm256_load_ps(ptr),
            size: LANE_COUNT,
        }
    }

    /// Loads 8 elements from unaligned memory via `_mm256_loadu_ps`.
    ///
    /// # Safety
    ///
    /// Pointer must point to at least 8 valid f32 values.
    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self::Output {
        Self {
            elements: _mm256_loadu_ps(ptr),
            size: LANE_COUNT,
        }
    }

    /// Loads fewer than 8 elements using `_mm256_maskload_ps`, so no memory
    /// beyond the valid range is touched. Unloaded lanes read as zero.
    ///
    /// # Safety
    ///
    /// Pointer must not be null and must point to at least `size` valid f32
    /// values.
    #[inline(always)]
    unsafe fn load_partial(ptr: *const f32, size: usize) -> Self::Output {
        debug_assert!(
            size < LANE_COUNT,
            "{}",
            format!("Size must be < {LANE_COUNT}")
        );

        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        let mask = match size {
            1 => _mm256_setr_epi32(-1, 0, 0, 0, 0, 0, 0, 0),
            2 => _mm256_setr_epi32(-1, -1, 0, 0, 0, 0, 0, 0),
            3 => _mm256_setr_epi32(-1, -1, -1, 0, 0, 0, 0, 0),
            4 => _mm256_setr_epi32(-1, -1, -1, -1, 0, 0, 0, 0),
            5 => _mm256_setr_epi32(-1, -1, -1, -1, -1, 0, 0, 0),
            6 => _mm256_setr_epi32(-1, -1, -1, -1, -1, -1, 0, 0),
            7 => _mm256_setr_epi32(-1, -1, -1, -1, -1, -1, -1, 0),
            _ => unreachable!(),
        };

        Self {
            elements: _mm256_maskload_ps(ptr, mask),
            size,
        }
    }
}

impl SimdMath for F32x8 {
    type Output = Self;

    /// Computes the sine of all lanes through range reduction and minimax
    /// polynomial evaluation (see [`sin::_mm256_sin_ps`]).
    #[inline(always)]
    fn sin(&self) -> Self::Output {
        Self {
            size: self.size,
            elements: unsafe { sin::_mm256_sin_ps(self.elements) },
        }
    }

    /// Computes the square root of all lanes.
    ///
    /// The mode is fixed at build time by the `fast-math` feature: the fast
    /// path refines a hardware reciprocal-square-root estimate and flushes
    /// subnormal inputs to zero, the exact path issues `_mm256_sqrt_ps`.
    #[inline(always)]
    fn sqrt(&self) -> Self::Output {
        #[cfg(feature = "fast-math")]
        let elements = unsafe { crate::simd::avx2::sqrt::_mm256_sqrt_fast_ps(self.elements) };

        #[cfg(not(feature = "fast-math"))]
        let elements = unsafe { _mm256_sqrt_ps(self.elements) };

        Self {
            size: self.size,
            elements,
        }
    }

    /// Computes the reciprocal square root of all lanes.
    ///
    /// The mode is fixed at build time by the `fast-math` feature: the fast
    /// path refines a hardware estimate and injects NaN/+inf bit patterns for
    /// negative and below-normal lanes, the exact path divides through the
    /// hardware square root.
    #[inline(always)]
    fn rsqrt(&self) -> Self::Output {
        #[cfg(feature = "fast-math")]
        let elements = unsafe { rsqrt::_mm256_rsqrt_fast_ps(self.elements) };

        #[cfg(not(feature = "fast-math"))]
        let elements = unsafe { rsqrt::_mm256_rsqrt_exact_ps(self.elements) };

        Self {
            size: self.size,
            elements,
        }
    }
}

impl SimdStore<f32> for F32x8 {
    type Output = Self;

    /// Stores the valid lanes at `ptr`, choosing partial, aligned or
    /// unaligned stores based on `self.size` and the pointer.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if size > 8 or if the pointer is null.
    #[inline(always)]
    fn store_at(&self, ptr: *const f32) {
        debug_assert!(
            self.size <= LANE_COUNT,
            "{}",
            format!("Size must be <= {LANE_COUNT}")
        );
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        // Cast to mutable pointer for store operations
        let mut_ptr = ptr as *mut f32;

        match self.size.cmp(&LANE_COUNT) {
            std::cmp::Ordering::Less => unsafe { self.store_at_partial(mut_ptr) },
            std::cmp::Ordering::Equal => match F32x8::is_aligned(ptr) {
                true => unsafe { self.store_aligned_at(mut_ptr) },
                false => unsafe { self.store_unaligned_at(mut_ptr) },
            },
            std::cmp::Ordering::Greater => unreachable!("Size cannot exceed LANE_COUNT"),
        }
    }

    /// Stores 8 elements to 32-byte aligned memory via `_mm256_store_ps`.
    ///
    /// # Safety
    ///
    /// Pointer must be 32-byte aligned and reference 8 writable f32 slots.
    #[inline(always)]
    unsafe fn store_aligned_at(&self, ptr: *mut f32) {
        _mm256_store_ps(ptr, self.elements)
    }

    /// Stores 8 elements to unaligned memory via `_mm256_storeu_ps`.
    ///
    /// # Safety
    ///
    /// Pointer must reference 8 writable f32 slots.
    #[inline(always)]
    unsafe fn store_unaligned_at(&self, ptr: *mut f32) {
        _mm256_storeu_ps(ptr, self.elements)
    }

    /// Stores only the valid lanes using `_mm256_maskstore_ps`, so no memory
    /// beyond `self.size` elements is written.
    ///
    /// # Safety
    ///
    /// Pointer must not be null and must reference at least `self.size`
    /// writable f32 slots.
    #[inline(always)]
    unsafe fn store_at_partial(&self, ptr: *mut f32) {
        debug_assert!(
            self.size < LANE_COUNT,
            "{}",
            format!("Size must be < {LANE_COUNT}")
        );
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        let mask: __m256i = match self.size {
            1 => _mm256_setr_epi32(-1, 0, 0, 0, 0, 0, 0, 0),
            2 => _mm256_setr_epi32(-1, -1, 0, 0, 0, 0, 0, 0),
            3 => _mm256_setr_epi32(-1, -1, -1, 0, 0, 0, 0, 0),
            4 => _mm256_setr_epi32(-1, -1, -1, -1, 0, 0, 0, 0),
            5 => _mm256_setr_epi32(-1, -1, -1, -1, -1, 0, 0, 0),
            6 => _mm256_setr_epi32(-1, -1, -1, -1, -1, -1, 0, 0),
            7 => _mm256_setr_epi32(-1, -1, -1, -1, -1, -1, -1, 0),
            _ => unreachable!("Size must be < LANE_COUNT"),
        };

        _mm256_maskstore_ps(ptr, mask, self.elements);
    }
}

impl Add for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        debug_assert!(self.size == rhs.size, "Operands must have the same size");

        Self {
            size: self.size,
            elements: unsafe { _mm256_add_ps(self.elements, rhs.elements) },
        }
    }
}

impl Sub for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        debug_assert!(self.size == rhs.size, "Operands must have the same size");

        Self {
            size: self.size,
            elements: unsafe { _mm256_sub_ps(self.elements, rhs.elements) },
        }
    }
}

impl Mul for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        debug_assert!(self.size == rhs.size, "Operands must have the same size");

        Self {
            size: self.size,
            elements: unsafe { _mm256_mul_ps(self.elements, rhs.elements) },
        }
    }
}

impl Div for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self::Output {
        debug_assert!(self.size == rhs.size, "Operands must have the same size");

        Self {
            size: self.size,
            elements: unsafe { _mm256_div_ps(self.elements, rhs.elements) },
        }
    }
}
