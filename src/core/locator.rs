//! The bucket locator: nearest-point queries, radius and N-closest queries,
//! and batch point merging over a caller-owned point set.
//!
//! The locator builds its search structure lazily: every query first checks
//! whether the point set's revision or the locator's configuration changed
//! since the last build and rebuilds if so. Query results are therefore
//! always computed against a grid consistent with the current point set.

use log::{debug, error};
use num_traits::cast;
use std::cmp::Ordering;

use crate::core::grid::{BucketGrid, DivisionPlan};
use crate::core::neighbors::{for_each_bucket_in_box, for_each_shell_bucket};
use crate::core::point_set::{PointId, PointSet};
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::{
    CoordinateConversionError, CoordinateScalar, CoordinateValidationError,
};
use crate::geometry::util::norms::distance_squared;

/// Default merge/insertion tolerance: points closer than this are considered
/// coincident.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Sentinel for a point that has not yet been assigned a merged id.
const UNASSIGNED: PointId = PointId::MAX;

/// Errors raised by locator operations.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum LocatorError {
    /// The point set is empty; there is nothing to subdivide or merge.
    #[error("no points to subdivide")]
    NoPoints,
    /// Bounds or coordinates contained NaN or infinite values.
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordinateValidationError),
    /// An internal scalar conversion failed for the coordinate type.
    #[error(transparent)]
    Conversion(#[from] CoordinateConversionError),
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Locator configuration: division planning and the coincidence tolerance.
///
/// # Examples
///
/// ```
/// use pointbins::core::grid::DivisionPlan;
/// use pointbins::core::locator::LocatorConfig;
///
/// let config: LocatorConfig<f64, 3> = LocatorConfig::default()
///     .with_divisions(DivisionPlan::manual([10, 10, 10]))
///     .with_tolerance(1e-3);
/// assert_eq!(config.tolerance, 1e-3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocatorConfig<T, const D: usize>
where
    T: CoordinateScalar,
{
    /// How to choose per-axis grid divisions.
    pub divisions: DivisionPlan<D>,
    /// Maximum distance under which two points are considered coincident.
    pub tolerance: T,
}

impl<T, const D: usize> Default for LocatorConfig<T, D>
where
    T: CoordinateScalar,
{
    fn default() -> Self {
        Self {
            divisions: DivisionPlan::default(),
            tolerance: cast(DEFAULT_TOLERANCE).unwrap_or_else(T::zero),
        }
    }
}

impl<T, const D: usize> LocatorConfig<T, D>
where
    T: CoordinateScalar,
{
    /// Replace the division plan.
    #[must_use]
    pub fn with_divisions(mut self, divisions: DivisionPlan<D>) -> Self {
        self.divisions = divisions;
        self
    }

    /// Replace the tolerance, clamped to be non-negative.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: T) -> Self {
        self.tolerance = tolerance.max(T::zero());
        self
    }
}

/// Identity of a build: which point-set revision and which configuration
/// generation produced the current grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BuildStamp {
    points_revision: u64,
    config_generation: u64,
}

// =============================================================================
// LOCATOR
// =============================================================================

/// Uniform bucket-grid locator over a caller-owned [`PointSet`].
///
/// The locator never owns the points; each operation takes the point set as
/// an argument and identifies points by their ids in that set. The search
/// structure is built on first use and rebuilt automatically whenever the
/// point set's revision or the locator configuration changes.
///
/// Staleness is tracked by revision only, not by point-set identity: use one
/// locator per point set, or call [`BucketLocator::free_search_structure`]
/// when switching a locator to a different set.
///
/// # Examples
///
/// ```
/// use pointbins::prelude::*;
///
/// let cloud: PointCloud<f64, 3> = vec![
///     [0.0, 0.0, 0.0],
///     [1.0, 0.0, 0.0],
/// ].into();
///
/// let mut locator = BucketLocator::new(LocatorConfig::default());
/// let nearest = locator
///     .find_closest_point(&cloud, &Point::new([0.9, 0.1, 0.0]))
///     .unwrap();
/// assert_eq!(nearest, Some(1));
///
/// // Queries outside the point set's bounds report "not found".
/// let outside = locator
///     .find_closest_point(&cloud, &Point::new([5.0, 5.0, 5.0]))
///     .unwrap();
/// assert_eq!(outside, None);
/// ```
#[derive(Clone, Debug)]
pub struct BucketLocator<T, const D: usize>
where
    T: CoordinateScalar,
{
    config: LocatorConfig<T, D>,
    config_generation: u64,
    grid: Option<BucketGrid<T, D>>,
    stamp: Option<BuildStamp>,
}

impl<T, const D: usize> Default for BucketLocator<T, D>
where
    T: CoordinateScalar,
{
    fn default() -> Self {
        Self::new(LocatorConfig::default())
    }
}

impl<T, const D: usize> BucketLocator<T, D>
where
    T: CoordinateScalar,
{
    /// Create a locator with the given configuration. No search structure
    /// is built until the first build or query. The tolerance is clamped
    /// non-negative.
    #[must_use]
    pub fn new(mut config: LocatorConfig<T, D>) -> Self {
        config.tolerance = config.tolerance.max(T::zero());
        Self {
            config,
            config_generation: 0,
            grid: None,
            stamp: None,
        }
    }

    /// The current configuration.
    #[must_use]
    pub const fn config(&self) -> &LocatorConfig<T, D> {
        &self.config
    }

    /// Replace the division plan. Invalidates the search structure.
    pub fn set_divisions(&mut self, divisions: DivisionPlan<D>) {
        self.config.divisions = divisions;
        self.config_generation += 1;
    }

    /// Replace the tolerance (clamped non-negative). Invalidates the search
    /// structure.
    pub fn set_tolerance(&mut self, tolerance: T) {
        self.config.tolerance = tolerance.max(T::zero());
        self.config_generation += 1;
    }

    /// Whether a search structure currently exists.
    #[must_use]
    pub const fn is_built(&self) -> bool {
        self.grid.is_some()
    }

    /// The current grid, if one has been built.
    #[must_use]
    pub const fn grid(&self) -> Option<&BucketGrid<T, D>> {
        self.grid.as_ref()
    }

    /// Release the search structure. The next query rebuilds it.
    pub fn free_search_structure(&mut self) {
        self.grid = None;
        self.stamp = None;
    }

    /// Build (or rebuild) the search structure from `points`.
    ///
    /// Every point id is scattered into the bucket containing its
    /// coordinates. Building twice from an unchanged set produces identical
    /// bucket contents.
    ///
    /// # Errors
    ///
    /// [`LocatorError::NoPoints`] if the set is empty; conversion errors if
    /// the bounds are non-finite.
    pub fn build<P>(&mut self, points: &P) -> Result<(), LocatorError>
    where
        P: PointSet<T, D>,
    {
        let count = points.len();
        if count < 1 {
            error!("no points to subdivide");
            return Err(LocatorError::NoPoints);
        }
        let bounds = points.bounds().ok_or(LocatorError::NoPoints)?;
        let divisions = self.config.divisions.divisions_for(count);
        let mut grid = BucketGrid::with_bounds(&bounds, divisions)?;

        for id in 0..count {
            let Some(point) = points.point(id) else {
                continue;
            };
            let coord = grid.bucket_coord(point.coords());
            grid.push(&coord, id);
        }

        debug!(
            "hashed {count} points into {} buckets, divisions {divisions:?}",
            grid.bucket_count()
        );

        self.stamp = Some(BuildStamp {
            points_revision: points.revision(),
            config_generation: self.config_generation,
        });
        self.grid = Some(grid);
        Ok(())
    }

    /// Rebuild only if the point set or configuration changed since the
    /// last build.
    fn ensure_built<P>(&mut self, points: &P) -> Result<(), LocatorError>
    where
        P: PointSet<T, D>,
    {
        let current = BuildStamp {
            points_revision: points.revision(),
            config_generation: self.config_generation,
        };
        if self.grid.is_some() && self.stamp == Some(current) {
            return Ok(());
        }
        self.build(points)
    }

    /// Id of the point closest to `x`, or `None` if `x` lies outside the
    /// grid's bounds.
    ///
    /// Buckets are searched in expanding Chebyshev rings around the query's
    /// bucket until a candidate appears, then one ring further out is
    /// screened by the least possible distance to each bucket's near face.
    /// Among exactly tied candidates the first one encountered in traversal
    /// order (ascending ring, odometer order within a ring, insertion order
    /// within a bucket) wins.
    ///
    /// # Errors
    ///
    /// [`LocatorError::NoPoints`] if the point set is empty.
    pub fn find_closest_point<P>(
        &mut self,
        points: &P,
        x: &Point<T, D>,
    ) -> Result<Option<PointId>, LocatorError>
    where
        P: PointSet<T, D>,
    {
        self.ensure_built(points)?;
        let grid = self.grid.as_ref().ok_or(LocatorError::NoPoints)?;
        Ok(closest_in_grid(grid, x.coords(), |id| {
            points.point(id).map(|p| p.to_array())
        }))
    }

    /// Ids of all points within `radius` of `x`, in bucket-traversal order.
    ///
    /// Returns an empty list for out-of-bounds queries.
    ///
    /// # Errors
    ///
    /// [`LocatorError::NoPoints`] if the point set is empty.
    pub fn find_points_within_radius<P>(
        &mut self,
        points: &P,
        radius: T,
        x: &Point<T, D>,
    ) -> Result<Vec<PointId>, LocatorError>
    where
        P: PointSet<T, D>,
    {
        self.ensure_built(points)?;
        let grid = self.grid.as_ref().ok_or(LocatorError::NoPoints)?;
        let x = x.coords();

        let mut result = Vec::new();
        if !grid.contains(x) {
            return Ok(result);
        }

        let radius = radius.max(T::zero());
        let radius2 = radius * radius;
        let (lo, hi) = grid.bucket_range(x, radius);
        for_each_bucket_in_box(&lo, &hi, None, |coord| {
            let Some(ids) = grid.bucket(coord) else {
                return;
            };
            for &id in ids {
                let Some(p) = points.point(id) else {
                    continue;
                };
                if distance_squared(x, p.coords()) <= radius2 {
                    result.push(id);
                }
            }
        });
        Ok(result)
    }

    /// Ids of the `n` points closest to `x`, sorted nearest first.
    ///
    /// Returns fewer than `n` ids when the set is smaller than `n`, and an
    /// empty list for out-of-bounds queries.
    ///
    /// # Errors
    ///
    /// [`LocatorError::NoPoints`] if the point set is empty.
    pub fn find_closest_n_points<P>(
        &mut self,
        points: &P,
        n: usize,
        x: &Point<T, D>,
    ) -> Result<Vec<PointId>, LocatorError>
    where
        P: PointSet<T, D>,
    {
        self.ensure_built(points)?;
        let grid = self.grid.as_ref().ok_or(LocatorError::NoPoints)?;
        let x = x.coords();

        if n == 0 || !grid.contains(x) {
            return Ok(Vec::new());
        }

        let home = grid.bucket_coord(x);
        let divisions = *grid.divisions();
        let mut best: Vec<(T, PointId)> = Vec::with_capacity(n);

        // Phase one: expand ring by ring until n candidates are in hand (or
        // the rings run off the grid).
        let mut level = 0usize;
        loop {
            let mut ring_buckets = 0usize;
            for_each_shell_bucket(&home, &divisions, level, |coord| {
                ring_buckets += 1;
                let Some(ids) = grid.bucket(coord) else {
                    return;
                };
                for &id in ids {
                    let Some(p) = points.point(id) else {
                        continue;
                    };
                    let dist2 = distance_squared(x, p.coords());
                    offer_candidate(&mut best, n, dist2, id);
                }
            });
            if ring_buckets == 0 || best.len() >= n {
                break;
            }
            level += 1;
        }

        // Phase two: candidates collected ring by ring are not necessarily
        // the n geometrically closest. Re-screen every bucket within the
        // worst candidate distance, skipping the rings already searched.
        sort_candidates(&mut best);
        if let Some(&(worst, _)) = best.last() {
            let search_radius = worst.sqrt();
            let (lo, hi) = grid.bucket_range(x, search_radius);
            for_each_bucket_in_box(&lo, &hi, Some((&home, level)), |coord| {
                let Some(ids) = grid.bucket(coord) else {
                    return;
                };
                for &id in ids {
                    let Some(p) = points.point(id) else {
                        continue;
                    };
                    let dist2 = distance_squared(x, p.coords());
                    offer_candidate(&mut best, n, dist2, id);
                }
            });
        }

        Ok(best.into_iter().map(|(_, id)| id).collect())
    }

    /// Merge coincident points, returning a map from point id to merged id.
    ///
    /// Points are scanned in id order. Each not-yet-assigned point becomes
    /// the representative of the next merged id, and every still-unassigned
    /// point within `tolerance` of it (searching as many neighbor rings as
    /// the tolerance spans) receives the same merged id. Assignment is a
    /// single pass: merging is through direct proximity to a representative
    /// only, not transitive chains.
    ///
    /// # Errors
    ///
    /// [`LocatorError::NoPoints`] if the point set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use pointbins::prelude::*;
    ///
    /// let cloud: PointCloud<f64, 3> = vec![
    ///     [0.0, 0.0, 0.0],
    ///     [0.001, 0.0, 0.0],
    ///     [10.0, 10.0, 10.0],
    /// ].into();
    ///
    /// let mut locator = BucketLocator::new(LocatorConfig::default().with_tolerance(0.01));
    /// let index = locator.merge_points(&cloud).unwrap();
    /// assert_eq!(index, vec![0, 0, 1]);
    /// ```
    pub fn merge_points<P>(&mut self, points: &P) -> Result<Vec<PointId>, LocatorError>
    where
        P: PointSet<T, D>,
    {
        let count = points.len();
        if count < 1 {
            error!("no points to merge");
            return Err(LocatorError::NoPoints);
        }
        self.ensure_built(points)?;
        let grid = self.grid.as_ref().ok_or(LocatorError::NoPoints)?;

        let tolerance = self.config.tolerance;
        let tolerance2 = tolerance * tolerance;
        let level = tolerance_search_level(grid, tolerance);
        let divisions = *grid.divisions();
        debug!("merging {count} points, tolerance {tolerance:?}, search level {level}");

        let mut index = vec![UNASSIGNED; count];
        let mut next_id: PointId = 0;

        for i in 0..count {
            if index[i] != UNASSIGNED {
                continue;
            }
            index[i] = next_id;

            if let Some(p) = points.point(i) {
                let p = p.to_array();
                let home = grid.bucket_coord(&p);
                for ring in 0..=level {
                    for_each_shell_bucket(&home, &divisions, ring, |coord| {
                        let Some(ids) = grid.bucket(coord) else {
                            return;
                        };
                        for &id in ids {
                            if index[id] != UNASSIGNED {
                                continue;
                            }
                            let Some(q) = points.point(id) else {
                                continue;
                            };
                            if distance_squared(&p, q.coords()) <= tolerance2 {
                                index[id] = next_id;
                            }
                        }
                    });
                }
            }

            next_id += 1;
        }

        Ok(index)
    }
}

// =============================================================================
// SHARED SEARCH ROUTINES
// =============================================================================

/// Stable sort of distance/id candidates; stability preserves the
/// first-encountered-wins rule for exact distance ties.
fn sort_candidates<T: CoordinateScalar>(best: &mut [(T, PointId)]) {
    best.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
}

/// Insert a candidate into the running best-n list.
fn offer_candidate<T: CoordinateScalar>(
    best: &mut Vec<(T, PointId)>,
    n: usize,
    dist2: T,
    id: PointId,
) {
    if best.len() < n {
        best.push((dist2, id));
        if best.len() == n {
            sort_candidates(best);
        }
    } else if dist2 < best[n - 1].0 {
        best[n - 1] = (dist2, id);
        sort_candidates(best);
    }
}

/// Nearest point to `x` among the ids stored in `grid`, with coordinates
/// supplied by `lookup`. Returns `None` for out-of-bounds queries.
///
/// Shared by the locator's closest-point query and the incremental
/// inserter's closest-inserted query.
pub(crate) fn closest_in_grid<T, const D: usize, F>(
    grid: &BucketGrid<T, D>,
    x: &[T; D],
    lookup: F,
) -> Option<PointId>
where
    T: CoordinateScalar,
    F: Fn(PointId) -> Option<[T; D]>,
{
    if !grid.contains(x) {
        return None;
    }

    let home = grid.bucket_coord(x);
    let divisions = *grid.divisions();
    let mut closest: Option<PointId> = None;
    let mut min_dist2 = T::infinity();

    // Expand ring by ring; stop after the first ring that yields any
    // candidate at all.
    let mut level = 0usize;
    while closest.is_none() && level < grid.max_divisions() {
        for_each_shell_bucket(&home, &divisions, level, |coord| {
            let Some(ids) = grid.bucket(coord) else {
                return;
            };
            for &id in ids {
                let Some(p) = lookup(id) else {
                    continue;
                };
                let dist2 = distance_squared(x, &p);
                if dist2 < min_dist2 {
                    closest = Some(id);
                    min_dist2 = dist2;
                }
            }
        });
        level += 1;
    }

    // A point one ring further out can still be geometrically closer than
    // the candidate found above, so screen that ring by the least possible
    // distance from x to each bucket before scanning it.
    for_each_shell_bucket(&home, &divisions, level, |coord| {
        if grid.boundary_distance_squared(x, &home, coord) >= min_dist2 {
            return;
        }
        let Some(ids) = grid.bucket(coord) else {
            return;
        };
        for &id in ids {
            let Some(p) = lookup(id) else {
                continue;
            };
            let dist2 = distance_squared(x, &p);
            if dist2 < min_dist2 {
                closest = Some(id);
                min_dist2 = dist2;
            }
        }
    });

    closest
}

/// Number of neighbor rings a tolerance spans: `ceil(tolerance / h_min)`,
/// capped at the largest division count.
pub(crate) fn tolerance_search_level<T, const D: usize>(
    grid: &BucketGrid<T, D>,
    tolerance: T,
) -> usize
where
    T: CoordinateScalar,
{
    let max_divisions = grid.max_divisions();
    let ratio = tolerance / grid.min_width();
    cast::<T, usize>(ratio.ceil())
        .unwrap_or(max_divisions)
        .min(max_divisions)
}
