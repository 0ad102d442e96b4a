//! The uniform bucket grid underlying every locator operation.
//!
//! Space inside an axis-aligned bounding box is divided into a regular
//! D-dimensional array of buckets; each bucket holds the ids of the points
//! that fall inside it. Bucket lists are created lazily, so an unpopulated
//! bucket costs one `Option` slot.

use crate::core::collections::{BUCKET_INLINE_CAPACITY, SmallBuffer};
use crate::core::locator::LocatorError;
use crate::core::point_set::PointId;
use crate::geometry::bounds::Aabb;
use crate::geometry::traits::coordinate::CoordinateScalar;
use crate::geometry::util::conversions::{safe_scalar_from_f64, safe_usize_to_scalar};

/// Scale factor applied when mapping a coordinate to its bucket index.
///
/// Keeps points lying exactly on the upper bound of the box inside the last
/// bucket instead of overflowing to a nonexistent one.
const BUCKET_SHRINK: f64 = 0.999;

/// Default target for the average number of points per bucket in automatic
/// division planning.
pub const DEFAULT_POINTS_PER_BUCKET: usize = 25;

// =============================================================================
// DIVISION PLANNING
// =============================================================================

/// How many grid divisions to use along each axis.
///
/// Automatic planning is isotropic: one division count is derived from the
/// point count and the target bucket occupancy, and applied to every axis.
/// Manual planning supports anisotropic grids.
///
/// # Examples
///
/// ```
/// use pointbins::core::grid::DivisionPlan;
///
/// // 200 points at ~25 per bucket need 8 buckets: a 2 x 2 x 2 grid.
/// let plan: DivisionPlan<3> = DivisionPlan::automatic(25);
/// assert_eq!(plan.divisions_for(200), [2, 2, 2]);
///
/// // Explicit divisions pass through, clamped to at least one per axis.
/// let plan: DivisionPlan<3> = DivisionPlan::manual([4, 0, 2]);
/// assert_eq!(plan.divisions_for(200), [4, 1, 2]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DivisionPlan<const D: usize> {
    /// Derive divisions from the point count and a target average bucket
    /// occupancy.
    Automatic {
        /// Desired average number of points per bucket, clamped to `>= 1`.
        points_per_bucket: usize,
    },
    /// Caller-supplied per-axis division counts, each clamped to `>= 1`.
    Manual([usize; D]),
}

impl<const D: usize> Default for DivisionPlan<D> {
    fn default() -> Self {
        Self::Automatic {
            points_per_bucket: DEFAULT_POINTS_PER_BUCKET,
        }
    }
}

impl<const D: usize> DivisionPlan<D> {
    /// Automatic planning with the given target bucket occupancy.
    #[must_use]
    pub fn automatic(points_per_bucket: usize) -> Self {
        Self::Automatic {
            points_per_bucket: points_per_bucket.max(1),
        }
    }

    /// Manual per-axis divisions.
    #[must_use]
    pub fn manual(divisions: [usize; D]) -> Self {
        Self::Manual(divisions.map(|n| n.max(1)))
    }

    /// Resolve the plan into concrete per-axis divisions for a set of
    /// `point_count` points. Every returned division is `>= 1`.
    #[must_use]
    pub fn divisions_for(&self, point_count: usize) -> [usize; D] {
        match *self {
            Self::Manual(divisions) => divisions.map(|n| n.max(1)),
            Self::Automatic { points_per_bucket } => {
                let count = safe_usize_to_scalar::<f64>(point_count).unwrap_or(f64::MAX);
                let per = safe_usize_to_scalar::<f64>(points_per_bucket.max(1)).unwrap_or(1.0);
                let dims = safe_usize_to_scalar::<f64>(D.max(1)).unwrap_or(1.0);
                let level = (count / per).powf(1.0 / dims).ceil();
                let n = num_traits::cast::<f64, usize>(level).unwrap_or(1).max(1);
                [n; D]
            }
        }
    }
}

// =============================================================================
// BUCKET GRID
// =============================================================================

/// A flat, lazily-populated D-dimensional array of point-id buckets.
///
/// The grid owns its bucket lists but not the points; it maps world
/// coordinates to bucket coordinates and stores which point ids landed
/// where. Buckets are addressed either by their per-axis coordinate or by
/// the flattened row-major index `i + j*nx + k*nx*ny + ...`.
#[derive(Clone, Debug)]
pub struct BucketGrid<T, const D: usize>
where
    T: CoordinateScalar,
{
    bounds: Aabb<T, D>,
    divisions: [usize; D],
    widths: [T; D],
    scale: [T; D],
    buckets: Vec<Option<SmallBuffer<PointId, BUCKET_INLINE_CAPACITY>>>,
}

impl<T, const D: usize> BucketGrid<T, D>
where
    T: CoordinateScalar,
{
    /// Allocate an empty grid over `bounds` with the given per-axis
    /// divisions.
    ///
    /// The bounds are padded so every axis has strictly positive width, and
    /// each division count is clamped to `>= 1`.
    ///
    /// # Errors
    ///
    /// Fails if the bounds contain non-finite coordinates or the scalar
    /// type cannot represent the internal scale factors.
    pub fn with_bounds(bounds: &Aabb<T, D>, divisions: [usize; D]) -> Result<Self, LocatorError> {
        let bounds = bounds.padded();
        bounds.validate()?;

        let divisions = divisions.map(|n| n.max(1));
        let shrink: T = safe_scalar_from_f64(BUCKET_SHRINK)?;

        let mut widths = [T::zero(); D];
        let mut scale = [T::zero(); D];
        for axis in 0..D {
            let n: T = safe_usize_to_scalar(divisions[axis])?;
            let width = bounds.width(axis);
            widths[axis] = width / n;
            scale[axis] = shrink * n / width;
        }

        let bucket_count = divisions.iter().product();
        Ok(Self {
            bounds,
            divisions,
            widths,
            scale,
            buckets: vec![None; bucket_count],
        })
    }

    /// The (padded) bounds the grid covers.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> &Aabb<T, D> {
        &self.bounds
    }

    /// Per-axis division counts.
    #[inline]
    #[must_use]
    pub const fn divisions(&self) -> &[usize; D] {
        &self.divisions
    }

    /// Per-axis bucket widths. Strictly positive on every axis.
    #[inline]
    #[must_use]
    pub const fn widths(&self) -> &[T; D] {
        &self.widths
    }

    /// Total number of bucket slots.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// The smallest per-axis bucket width.
    #[must_use]
    pub fn min_width(&self) -> T {
        self.widths
            .iter()
            .fold(T::infinity(), |acc, &w| if w < acc { w } else { acc })
    }

    /// The largest per-axis division count.
    #[must_use]
    pub fn max_divisions(&self) -> usize {
        self.divisions.iter().copied().max().unwrap_or(1)
    }

    /// Whether `x` lies inside the grid's bounds.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: &[T; D]) -> bool {
        self.bounds.contains(x)
    }

    /// Bucket coordinate of position `x` along a single axis, clamped into
    /// `[0, divisions - 1]`.
    fn coord_axis(&self, axis: usize, value: T) -> usize {
        let t = (value - self.bounds.min()[axis]) * self.scale[axis];
        let idx = if t > T::zero() {
            num_traits::cast::<T, usize>(t.floor()).unwrap_or(0)
        } else {
            0
        };
        idx.min(self.divisions[axis] - 1)
    }

    /// Bucket coordinate of position `x`.
    #[must_use]
    pub fn bucket_coord(&self, x: &[T; D]) -> [usize; D] {
        let mut coord = [0usize; D];
        for axis in 0..D {
            coord[axis] = self.coord_axis(axis, x[axis]);
        }
        coord
    }

    /// Inclusive bucket-coordinate range covering all positions within
    /// `dist` of `x` along each axis, clamped to the grid.
    #[must_use]
    pub fn bucket_range(&self, x: &[T; D], dist: T) -> ([usize; D], [usize; D]) {
        let mut lo = [0usize; D];
        let mut hi = [0usize; D];
        for axis in 0..D {
            lo[axis] = self.coord_axis(axis, x[axis] - dist);
            hi[axis] = self.coord_axis(axis, x[axis] + dist);
        }
        (lo, hi)
    }

    /// Flattened row-major index of a bucket coordinate.
    #[must_use]
    pub fn flat_index(&self, coord: &[usize; D]) -> usize {
        let mut index = 0;
        let mut stride = 1;
        for axis in 0..D {
            index += coord[axis] * stride;
            stride *= self.divisions[axis];
        }
        index
    }

    /// The ids stored in a bucket, or `None` if the bucket was never
    /// populated.
    #[must_use]
    pub fn bucket(&self, coord: &[usize; D]) -> Option<&[PointId]> {
        self.buckets[self.flat_index(coord)]
            .as_ref()
            .map(|ids| ids.as_slice())
    }

    /// Append a point id to a bucket, creating its list on first use.
    pub fn push(&mut self, coord: &[usize; D], id: PointId) {
        let index = self.flat_index(coord);
        self.buckets[index].get_or_insert_default().push(id);
    }

    /// Iterate over the populated buckets as `(flat_index, ids)` pairs.
    pub fn populated_buckets(&self) -> impl Iterator<Item = (usize, &[PointId])> {
        self.buckets
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|ids| (index, ids.as_slice())))
    }

    /// Smallest possible squared distance from `x` (in bucket `home`) to the
    /// closest face of bucket `neighbor`, accumulated over the axes on which
    /// the two buckets differ.
    ///
    /// This is the bound that decides whether a neighboring bucket could
    /// still hold a closer point than the current best candidate.
    #[must_use]
    pub fn boundary_distance_squared(
        &self,
        x: &[T; D],
        home: &[usize; D],
        neighbor: &[usize; D],
    ) -> T {
        let min = self.bounds.min();
        let mut dist2 = T::zero();
        for axis in 0..D {
            if home[axis] != neighbor[axis] {
                let boundary = if home[axis] > neighbor[axis] {
                    neighbor[axis] + 1
                } else {
                    neighbor[axis]
                };
                // A failed cast degrades the bound to zero, which only makes
                // the caller scan a bucket it could have skipped.
                let m: T = safe_usize_to_scalar(boundary).unwrap_or_else(|_| T::zero());
                let diff = min[axis] + m * self.widths[axis] - x[axis];
                dist2 = dist2 + diff * diff;
            }
        }
        dist2
    }
}
