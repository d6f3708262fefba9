use core::{fmt, mem};

use crate::copy_from_slice;

/// Width in bytes of one vector register load/store.
pub const VECTOR_WIDTH: usize = 16;
pub const FLOAT_LANES: usize = VECTOR_WIDTH / mem::size_of::<f32>();

/// Element types that may be copied as raw bytes.
/// # Safety: the type must be `Copy`, have no padding, and every bit
/// pattern read back from a byte copy must be a valid value. Its size
/// must divide [`VECTOR_WIDTH`].
pub unsafe trait Element: Copy + PartialEq + fmt::Debug + 'static {}

macro_rules! impl_element {
    ($($t:ty),+ $(,)?) => {$(
        unsafe impl Element for $t {}
    )+};
}

impl_element!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

#[inline(always)]
pub const fn byte_len<T: Element>(len: usize) -> usize {
    len * mem::size_of::<T>()
}

/// Elements per vector chunk.
#[inline(always)]
pub const fn chunk_len<T: Element>() -> usize {
    VECTOR_WIDTH / mem::size_of::<T>()
}

pub trait CopyStrategy<T: Element> {
    fn name(&self) -> &str;

    /// Copies `src` into `dst`. Panics if the lengths differ.
    fn copy(&self, dst: &mut [T], src: &[T]);

    /// Length of the prefix this strategy promises to copy for a buffer of
    /// `len` elements. Everything past it is left untouched.
    #[inline]
    fn covered(&self, len: usize) -> usize {
        len
    }

    fn check(&self, dst: &[T], src: &[T]) -> bool {
        dst.len() == src.len() && dst.iter().zip(src).all(|(d, s)| d == s)
    }

    fn check_covered(&self, dst: &[T], src: &[T]) -> bool {
        if dst.len() != src.len() {
            return false;
        }
        let n = self.covered(src.len());
        dst[..n] == src[..n]
    }
}

// This function ensures CopyStrategy is object-safe
fn _assert_trait_object(_s: &dyn CopyStrategy<u8>) {}

#[inline(always)]
fn assert_same_len<T>(dst: &[T], src: &[T]) {
    assert_eq!(dst.len(), src.len(), "source and destination slices must have equal lengths");
}

/// Element-by-element loop in ascending index order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scalar;

impl<T: Element> CopyStrategy<T> for Scalar {
    fn name(&self) -> &str {
        "scalar"
    }

    #[inline]
    fn copy(&self, dst: &mut [T], src: &[T]) {
        copy_from_slice(dst, src);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BulkCopy;

impl<T: Element> CopyStrategy<T> for BulkCopy {
    fn name(&self) -> &str {
        "std"
    }

    #[inline]
    fn copy(&self, dst: &mut [T], src: &[T]) {
        dst.copy_from_slice(src);
    }
}

/// Byte copy through the CPU's enhanced `rep movsb`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FastStringCopy;

impl<T: Element> CopyStrategy<T> for FastStringCopy {
    fn name(&self) -> &str {
        "erms"
    }

    #[inline]
    fn copy(&self, dst: &mut [T], src: &[T]) {
        assert_same_len(dst, src);
        // SAFETY: both slices hold src.len() elements, they cannot overlap,
        // and Element guarantees a bytewise copy is valid.
        unsafe {
            erms_copy(
                dst.as_mut_ptr().cast::<u8>(),
                src.as_ptr().cast::<u8>(),
                byte_len::<T>(src.len()),
            )
        }
    }
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
unsafe fn erms_copy(dst: *mut u8, src: *const u8, count: usize) {
    core::arch::asm!(
        "rep movsb",
        inout("rcx") count => _,
        inout("rdi") dst => _,
        inout("rsi") src => _,
        options(nostack, preserves_flags),
    );
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
unsafe fn erms_copy(dst: *mut u8, src: *const u8, count: usize) {
    core::ptr::copy_nonoverlapping(src, dst, count);
}

/// 128-bit integer load/store over whole chunks only. The trailing
/// `len % chunk_len` elements are never written.
#[derive(Clone, Copy, Debug, Default)]
pub struct VectorCopyInt;

impl<T: Element> CopyStrategy<T> for VectorCopyInt {
    fn name(&self) -> &str {
        "simd"
    }

    #[inline]
    fn covered(&self, len: usize) -> usize {
        (len / chunk_len::<T>()) * chunk_len::<T>()
    }

    #[inline]
    fn copy(&self, dst: &mut [T], src: &[T]) {
        assert_same_len(dst, src);
        let chunks = src.len() / chunk_len::<T>();
        // SAFETY: chunks * VECTOR_WIDTH <= byte length of both slices.
        unsafe { copy_si128(dst.as_mut_ptr().cast::<u8>(), src.as_ptr().cast::<u8>(), chunks) }
    }
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
unsafe fn copy_si128(dst: *mut u8, src: *const u8, chunks: usize) {
    use core::arch::x86_64::{__m128i, _mm_loadu_si128, _mm_storeu_si128};

    let src = src as *const __m128i;
    let dst = dst as *mut __m128i;
    for i in 0..chunks {
        let a = _mm_loadu_si128(src.add(i));
        _mm_storeu_si128(dst.add(i), a);
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
unsafe fn copy_si128(dst: *mut u8, src: *const u8, chunks: usize) {
    for i in 0..chunks {
        let offset = i * VECTOR_WIDTH;
        let block = core::ptr::read_unaligned(src.add(offset) as *const [u8; VECTOR_WIDTH]);
        core::ptr::write_unaligned(dst.add(offset) as *mut [u8; VECTOR_WIDTH], block);
    }
}

/// Loop stepping for [`VectorCopyFloat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloatStride {
    /// Chunk count used as a float-lane bound and the index advanced by a
    /// whole chunk per iteration. Covers roughly a quarter of the buffer.
    Faithful,
    /// One 4-lane chunk per iteration over every whole chunk.
    Corrected,
}

/// Packed single-precision load/store in 4-lane chunks.
#[derive(Clone, Copy, Debug)]
pub struct VectorCopyFloat {
    stride: FloatStride,
}

impl VectorCopyFloat {
    pub const fn new(stride: FloatStride) -> Self {
        Self { stride }
    }

    pub const fn stride(&self) -> FloatStride {
        self.stride
    }

    /// Bytes written for a buffer of `bytes` bytes.
    #[inline]
    pub fn covered_bytes(&self, bytes: usize) -> usize {
        let end = bytes / VECTOR_WIDTH;
        match self.stride {
            FloatStride::Faithful => end.div_ceil(FLOAT_LANES) * VECTOR_WIDTH,
            FloatStride::Corrected => end * VECTOR_WIDTH,
        }
    }
}

impl<T: Element> CopyStrategy<T> for VectorCopyFloat {
    fn name(&self) -> &str {
        match self.stride {
            FloatStride::Faithful => "simd_ps",
            FloatStride::Corrected => "simd_ps_fixed",
        }
    }

    #[inline]
    fn covered(&self, len: usize) -> usize {
        self.covered_bytes(byte_len::<T>(len)) / mem::size_of::<T>()
    }

    #[inline]
    fn copy(&self, dst: &mut [T], src: &[T]) {
        assert_same_len(dst, src);
        let end = byte_len::<T>(src.len()) / VECTOR_WIDTH;
        // (loop step, lanes per index unit)
        let (step, scale) = match self.stride {
            FloatStride::Faithful => (FLOAT_LANES, 1),
            FloatStride::Corrected => (1, FLOAT_LANES),
        };
        // SAFETY: the last lane touched is below end * FLOAT_LANES in both
        // modes, which never exceeds the float length of either slice.
        unsafe {
            copy_ps(
                dst.as_mut_ptr().cast::<f32>(),
                src.as_ptr().cast::<f32>(),
                end,
                step,
                scale,
            )
        }
    }
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
unsafe fn copy_ps(dst: *mut f32, src: *const f32, end: usize, step: usize, scale: usize) {
    use core::arch::x86_64::{_mm_loadu_ps, _mm_storeu_ps};

    for i in (0..end).step_by(step) {
        let a = _mm_loadu_ps(src.add(i * scale));
        _mm_storeu_ps(dst.add(i * scale), a);
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
unsafe fn copy_ps(dst: *mut f32, src: *const f32, end: usize, step: usize, scale: usize) {
    for i in (0..end).step_by(step) {
        let block = core::ptr::read_unaligned(src.add(i * scale) as *const [f32; FLOAT_LANES]);
        core::ptr::write_unaligned(dst.add(i * scale) as *mut [f32; FLOAT_LANES], block);
    }
}

/// Every strategy in reporting order.
pub fn default_strategies<T: Element>() -> Vec<Box<dyn CopyStrategy<T>>> {
    vec![
        Box::new(Scalar),
        Box::new(BulkCopy),
        Box::new(FastStringCopy),
        Box::new(VectorCopyInt),
        Box::new(VectorCopyFloat::new(FloatStride::Faithful)),
        Box::new(VectorCopyFloat::new(FloatStride::Corrected)),
    ]
}
