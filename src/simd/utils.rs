use std::alloc::{alloc, handle_alloc_error, Layout};

/// Allocates an aligned `Vec<T>` with uninitialized contents.
///
/// The slice-level kernels write every element of their output exactly once,
/// so zero-initialization would be wasted work; this helper hands back an
/// aligned buffer the SIMD stores can fill directly.
///
/// # Panics
///
/// Panics if `align` is not a power of two or the total size overflows, and
/// routes allocation failure through [`handle_alloc_error`].
///
/// # Safety
///
/// The caller must ensure that every element of the returned vector is
/// initialized before being read. Reading uninitialized memory is undefined
/// behavior.
#[inline(always)]
pub fn alloc_uninit_vec<T: Copy>(len: usize, align: usize) -> Vec<T> {
    if len == 0 {
        return Vec::new();
    }

    let layout =
        Layout::from_size_align(len * std::mem::size_of::<T>(), align).expect("Invalid layout");

    let ptr = unsafe { alloc(layout) as *mut T };

    if ptr.is_null() {
        handle_alloc_error(layout);
    }

    // SAFETY: The pointer is non-null and the layout is valid for `len`
    // elements. Capacity equals length, so no reallocation happens before
    // the caller fills the buffer.
    unsafe { Vec::from_raw_parts(ptr, len, len) }
}
