//! Collection type aliases tuned for the locator's access patterns.

use smallvec::SmallVec;

/// Small-optimized vector that stores up to `N` elements inline before
/// spilling to the heap.
///
/// # Examples
///
/// ```
/// use pointbins::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<u32, 4> = SmallBuffer::new();
/// buffer.extend([1, 2, 3]);
/// assert!(!buffer.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Inline capacity of a bucket's point-id list.
///
/// Target average occupancy is a couple dozen points per bucket, but the
/// distribution is heavily skewed toward near-empty buckets, so a small
/// inline capacity keeps most buckets allocation-free.
pub const BUCKET_INLINE_CAPACITY: usize = 8;
