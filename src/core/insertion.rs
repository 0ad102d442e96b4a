//! Incremental point insertion with on-the-fly deduplication.
//!
//! [`PointInserter`] owns the target point container for the duration of the
//! insertion session: it is created from caller-supplied bounds (no points
//! need exist yet), accepts points one at a time, and merges each incoming
//! point with a previously inserted one when they are within tolerance.
//! There is no removal or update path; insertion is strictly additive.

use log::debug;

use crate::core::grid::{BucketGrid, DivisionPlan};
use crate::core::locator::{LocatorConfig, LocatorError, closest_in_grid, tolerance_search_level};
use crate::core::neighbors::for_each_shell_bucket;
use crate::core::point_set::{InsertablePointSet, PointId};
use crate::geometry::bounds::Aabb;
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;
use crate::geometry::util::norms::distance_squared;

/// Per-axis divisions used when inserting with an automatic plan and no
/// estimated point count.
pub const DEFAULT_INSERTION_DIVISIONS: usize = 50;

/// Incremental point inserter over an owned [`InsertablePointSet`].
///
/// Point ids are assigned by the target container. The container is
/// typically empty at construction; points already present are not indexed
/// and take no part in deduplication. Positions outside the initialization
/// bounds are clamped into the boundary buckets.
///
/// # Examples
///
/// ```
/// use pointbins::prelude::*;
///
/// let config: LocatorConfig<f64, 3> = LocatorConfig::default().with_tolerance(1e-4);
/// let bounds = Aabb::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
/// let mut inserter =
///     PointInserter::new(PointCloud::<f64, 3>::new(), &bounds, &config).unwrap();
///
/// let a = inserter.insert(&Point::new([0.25, 0.25, 0.25]));
/// let b = inserter.insert(&Point::new([0.25, 0.25, 0.25]));
/// assert_eq!(a, b);
/// assert_eq!(inserter.points().len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct PointInserter<P, T, const D: usize>
where
    T: CoordinateScalar,
    P: InsertablePointSet<T, D>,
{
    points: P,
    grid: BucketGrid<T, D>,
    tolerance_squared: T,
    insertion_level: usize,
    inserted: usize,
}

impl<P, T, const D: usize> PointInserter<P, T, D>
where
    T: CoordinateScalar,
    P: InsertablePointSet<T, D>,
{
    /// Begin an insertion session over `points`, covering `bounds`.
    ///
    /// Manual division plans are used as given; an automatic plan falls
    /// back to [`DEFAULT_INSERTION_DIVISIONS`] per axis because no point
    /// count is available yet. Use [`PointInserter::with_estimated_points`]
    /// to size an automatic grid from an expected count.
    ///
    /// # Errors
    ///
    /// Fails if `bounds` contains non-finite coordinates.
    pub fn new(
        points: P,
        bounds: &Aabb<T, D>,
        config: &LocatorConfig<T, D>,
    ) -> Result<Self, LocatorError> {
        Self::init(points, bounds, config, None)
    }

    /// Begin an insertion session, sizing automatic divisions from an
    /// estimated final point count.
    ///
    /// # Errors
    ///
    /// Fails if `bounds` contains non-finite coordinates.
    pub fn with_estimated_points(
        points: P,
        bounds: &Aabb<T, D>,
        config: &LocatorConfig<T, D>,
        estimated_points: usize,
    ) -> Result<Self, LocatorError> {
        Self::init(points, bounds, config, Some(estimated_points))
    }

    fn init(
        points: P,
        bounds: &Aabb<T, D>,
        config: &LocatorConfig<T, D>,
        estimated_points: Option<usize>,
    ) -> Result<Self, LocatorError> {
        let divisions = match (config.divisions, estimated_points) {
            (DivisionPlan::Manual(divisions), _) => divisions.map(|n| n.max(1)),
            (plan @ DivisionPlan::Automatic { .. }, Some(estimate)) if estimate > 0 => {
                plan.divisions_for(estimate)
            }
            (DivisionPlan::Automatic { .. }, _) => [DEFAULT_INSERTION_DIVISIONS; D],
        };

        let grid = BucketGrid::with_bounds(bounds, divisions)?;
        let tolerance = config.tolerance.max(T::zero());
        let insertion_level = tolerance_search_level(&grid, tolerance);
        debug!(
            "point insertion initialized, divisions {divisions:?}, probe level {insertion_level}"
        );

        Ok(Self {
            points,
            grid,
            tolerance_squared: tolerance * tolerance,
            insertion_level,
            inserted: 0,
        })
    }

    /// Insert a point, merging it with a previously inserted point within
    /// tolerance.
    ///
    /// If the point's home bucket is empty the point is definitely new: it
    /// is appended without any neighbor probe. Otherwise the neighborhood is
    /// probed up to the insertion level, and a within-tolerance hit returns
    /// the existing id without inserting anything.
    pub fn insert(&mut self, point: &Point<T, D>) -> PointId {
        let coord = self.grid.bucket_coord(point.coords());
        let occupied = self.grid.bucket(&coord).is_some_and(|ids| !ids.is_empty());
        if occupied {
            if let Some(existing) = self.probe(point.coords(), &coord) {
                return existing;
            }
        }
        self.append(point, &coord)
    }

    /// Insert a point unconditionally, with no deduplication probe.
    pub fn insert_new(&mut self, point: &Point<T, D>) -> PointId {
        let coord = self.grid.bucket_coord(point.coords());
        self.append(point, &coord)
    }

    /// Insert a point unless an equivalent one exists, reporting whether a
    /// new id was created.
    ///
    /// Unlike [`PointInserter::insert`], the probe runs through
    /// [`PointInserter::is_inserted`], so the result is `(id, created)`.
    pub fn insert_unique(&mut self, point: &Point<T, D>) -> (PointId, bool) {
        if let Some(existing) = self.is_inserted(point) {
            (existing, false)
        } else {
            let coord = self.grid.bucket_coord(point.coords());
            (self.append(point, &coord), true)
        }
    }

    /// Id of a previously inserted point within tolerance of `point`, if
    /// any.
    ///
    /// An empty home bucket is taken as "not inserted" without probing the
    /// neighborhood.
    #[must_use]
    pub fn is_inserted(&self, point: &Point<T, D>) -> Option<PointId> {
        let coord = self.grid.bucket_coord(point.coords());
        let occupied = self.grid.bucket(&coord).is_some_and(|ids| !ids.is_empty());
        if !occupied {
            return None;
        }
        self.probe(point.coords(), &coord)
    }

    /// Id of the inserted point closest to `point`, or `None` when the
    /// position is outside the insertion bounds or nothing was inserted.
    #[must_use]
    pub fn find_closest_inserted(&self, point: &Point<T, D>) -> Option<PointId> {
        closest_in_grid(&self.grid, point.coords(), |id| {
            self.points.point(id).map(|p| p.to_array())
        })
    }

    /// Number of points appended through this inserter (merged points do
    /// not count).
    #[must_use]
    pub const fn num_inserted(&self) -> usize {
        self.inserted
    }

    /// Number of neighbor rings probed around the home bucket during
    /// deduplication.
    #[must_use]
    pub const fn insertion_level(&self) -> usize {
        self.insertion_level
    }

    /// Borrow the target point container.
    #[must_use]
    pub const fn points(&self) -> &P {
        &self.points
    }

    /// End the session, returning the point container.
    #[must_use]
    pub fn into_points(self) -> P {
        self.points
    }

    /// Search the neighborhood of `home` for an inserted point within
    /// tolerance of `x`, nearest ring first.
    fn probe(&self, x: &[T; D], home: &[usize; D]) -> Option<PointId> {
        let divisions = *self.grid.divisions();
        let mut found: Option<PointId> = None;

        for ring in 0..=self.insertion_level {
            for_each_shell_bucket(home, &divisions, ring, |coord| {
                if found.is_some() {
                    return;
                }
                let Some(ids) = self.grid.bucket(coord) else {
                    return;
                };
                for &id in ids {
                    let Some(p) = self.points.point(id) else {
                        continue;
                    };
                    if distance_squared(x, p.coords()) <= self.tolerance_squared {
                        found = Some(id);
                        return;
                    }
                }
            });
            if found.is_some() {
                break;
            }
        }

        found
    }

    fn append(&mut self, point: &Point<T, D>, coord: &[usize; D]) -> PointId {
        let id = self.points.push_point(*point);
        self.grid.push(coord, id);
        self.inserted += 1;
        id
    }
}
