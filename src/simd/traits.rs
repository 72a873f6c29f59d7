//! Trait seams shared by all packed vector widths.
//!
//! Two layers of traits live here:
//!
//! - **Packet traits** ([`Alignment`], [`SimdLoad`], [`SimdStore`],
//!   [`SimdMath`]) describe a single fixed-width vector: how it moves between
//!   registers and memory, and which math kernels it carries.
//! - **Slice traits** ([`SimdSin`], [`SimdSqrt`], [`SimdRsqrt`]) are the
//!   user-facing surface over `&[f32]` / `&[f64]`, processing full lanes in
//!   blocks and the tail through masked partial loads. Each offers a
//!   sequential SIMD path, a rayon-parallel SIMD path, and a scalar reference
//!   path.

/// Memory alignment queries for a packed vector type.
pub trait Alignment<T> {
    /// Returns `true` if `ptr` meets the alignment the vector's aligned
    /// load/store instructions require.
    fn is_aligned(ptr: *const T) -> bool;
}

/// Loading packed vectors from memory.
pub trait SimdLoad<T> {
    type Output;

    /// Loads exactly `LANE_COUNT` elements, choosing aligned or unaligned
    /// moves based on the pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null and point to at least `size` valid elements.
    unsafe fn load(ptr: *const T, size: usize) -> Self::Output;

    /// Loads a full vector from aligned memory.
    ///
    /// # Safety
    ///
    /// `ptr` must meet the vector's alignment and point to a full lane count
    /// of valid elements.
    unsafe fn load_aligned(ptr: *const T) -> Self::Output;

    /// Loads a full vector from unaligned memory.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a full lane count of valid elements.
    unsafe fn load_unaligned(ptr: *const T) -> Self::Output;

    /// Loads fewer than `LANE_COUNT` elements through a masked load;
    /// unloaded lanes are undefined.
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null and point to at least `size` valid elements,
    /// with `size` strictly below the lane count.
    unsafe fn load_partial(ptr: *const T, size: usize) -> Self::Output;
}

/// Storing packed vectors to memory.
pub trait SimdStore<T> {
    type Output;

    /// Stores the vector's valid lanes at `ptr`, choosing full or masked
    /// partial stores based on `self.size` and the pointer's alignment.
    fn store_at(&self, ptr: *const T);

    /// Stores a full vector to aligned memory.
    ///
    /// # Safety
    ///
    /// `ptr` must meet the vector's alignment and reference writable memory
    /// for a full lane count.
    unsafe fn store_aligned_at(&self, ptr: *mut T);

    /// Stores a full vector to unaligned memory.
    ///
    /// # Safety
    ///
    /// `ptr` must reference writable memory for a full lane count.
    unsafe fn store_unaligned_at(&self, ptr: *mut T);

    /// Stores only the valid lanes through a masked store.
    ///
    /// # Safety
    ///
    /// `ptr` must reference writable memory for at least `self.size` elements.
    unsafe fn store_at_partial(&self, ptr: *mut T);
}

/// Math kernels carried by a packed single-precision vector.
///
/// Every operation is total and branchless: special inputs (zero, negative,
/// subnormal, infinite, NaN) produce deliberate output bit patterns selected
/// through mask arithmetic, never through per-lane control flow.
pub trait SimdMath {
    type Output;

    /// Elementwise sine via range reduction and minimax polynomials.
    ///
    /// Valid over the full representable range; the approximation error grows
    /// with `|x|` as range-reduction rounding accumulates.
    fn sin(&self) -> Self::Output;

    /// Elementwise square root.
    ///
    /// With the `fast-math` feature this is a reciprocal-square-root estimate
    /// refined by one Newton-Raphson step, with subnormal inputs flushed to
    /// zero; otherwise the exact hardware square root.
    fn sqrt(&self) -> Self::Output;

    /// Elementwise reciprocal square root.
    ///
    /// With the `fast-math` feature this is a refined hardware estimate with
    /// explicit NaN/+inf injection for negative and below-normal lanes;
    /// otherwise `1 / sqrt(x)` through the exact instructions.
    fn rsqrt(&self) -> Self::Output;
}

/// Elementwise sine over a slice.
pub trait SimdSin<Rhs = Self> {
    type Output;

    fn simd_sin(self) -> Self::Output;
    fn par_simd_sin(self) -> Self::Output;
    fn scalar_sin(self) -> Self::Output;
}

/// Elementwise square root over a slice.
pub trait SimdSqrt<Rhs = Self> {
    type Output;

    fn simd_sqrt(self) -> Self::Output;
    fn par_simd_sqrt(self) -> Self::Output;
    fn scalar_sqrt(self) -> Self::Output;
}

/// Elementwise reciprocal square root over a slice.
pub trait SimdRsqrt<Rhs = Self> {
    type Output;

    fn simd_rsqrt(self) -> Self::Output;
    fn par_simd_rsqrt(self) -> Self::Output;
    fn scalar_rsqrt(self) -> Self::Output;
}
