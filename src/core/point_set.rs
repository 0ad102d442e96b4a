//! The point-container collaborator boundary.
//!
//! The locator never owns the data it indexes. Callers hand it anything
//! implementing [`PointSet`] (an indexable, ordered sequence of coordinates)
//! and get point ids back; ids are positions in that sequence. The
//! incremental-insertion path additionally needs [`InsertablePointSet`] so
//! it can append accepted points.
//!
//! [`PointCloud`] is the obvious `Vec`-backed implementation and the one
//! used throughout the tests; pipelines with their own storage implement
//! the traits instead.

use serde::{Deserialize, Serialize};

use crate::geometry::bounds::Aabb;
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;

/// Identifier of a point: its index in the owning [`PointSet`].
pub type PointId = usize;

/// An indexable, ordered sequence of D-dimensional points.
///
/// Implementations must report a `revision` that changes whenever the
/// contents change; the locator compares revisions to decide whether its
/// search structure is stale and must be rebuilt before the next query.
pub trait PointSet<T, const D: usize>
where
    T: CoordinateScalar,
{
    /// Number of points in the set.
    fn len(&self) -> usize;

    /// Whether the set is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The point with the given id, or `None` if `id` is out of range.
    fn point(&self, id: PointId) -> Option<Point<T, D>>;

    /// Monotonic revision counter, bumped on every mutation.
    fn revision(&self) -> u64;

    /// Axis-aligned bounds over all points, or `None` when empty.
    ///
    /// The default implementation scans the whole set; implementations with
    /// cached bounds should override it.
    fn bounds(&self) -> Option<Aabb<T, D>> {
        Aabb::from_points((0..self.len()).filter_map(|id| self.point(id)))
    }
}

/// A [`PointSet`] that supports appending points, as required by the
/// incremental-insertion path.
pub trait InsertablePointSet<T, const D: usize>: PointSet<T, D>
where
    T: CoordinateScalar,
{
    /// Append a point and return its id.
    fn push_point(&mut self, point: Point<T, D>) -> PointId;
}

/// Growable, `Vec`-backed point container.
///
/// # Examples
///
/// ```
/// use pointbins::core::point_set::{PointCloud, PointSet};
/// use pointbins::geometry::point::Point;
///
/// let mut cloud: PointCloud<f64, 2> = PointCloud::new();
/// cloud.push(Point::new([1.0, 2.0]));
/// assert_eq!(cloud.len(), 1);
/// assert_eq!(cloud.point(0), Some(Point::new([1.0, 2.0])));
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(bound = "T: CoordinateScalar")]
pub struct PointCloud<T, const D: usize>
where
    T: CoordinateScalar,
{
    points: Vec<Point<T, D>>,
    revision: u64,
}

impl<T, const D: usize> PointCloud<T, D>
where
    T: CoordinateScalar,
{
    /// Create an empty cloud.
    #[must_use]
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            revision: 0,
        }
    }

    /// Create an empty cloud with room for `capacity` points.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            revision: 0,
        }
    }

    /// Append a point, returning its id.
    pub fn push(&mut self, point: Point<T, D>) -> PointId {
        let id = self.points.len();
        self.points.push(point);
        self.revision += 1;
        id
    }

    /// Remove all points.
    pub fn clear(&mut self) {
        self.points.clear();
        self.revision += 1;
    }

    /// Iterate over the points in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Point<T, D>> {
        self.points.iter()
    }

    /// Borrow the underlying point slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Point<T, D>] {
        &self.points
    }
}

impl<T, const D: usize> PointSet<T, D> for PointCloud<T, D>
where
    T: CoordinateScalar,
{
    fn len(&self) -> usize {
        self.points.len()
    }

    fn point(&self, id: PointId) -> Option<Point<T, D>> {
        self.points.get(id).copied()
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn bounds(&self) -> Option<Aabb<T, D>> {
        Aabb::from_points(self.points.iter().copied())
    }
}

impl<T, const D: usize> InsertablePointSet<T, D> for PointCloud<T, D>
where
    T: CoordinateScalar,
{
    fn push_point(&mut self, point: Point<T, D>) -> PointId {
        self.push(point)
    }
}

impl<T, const D: usize> From<Vec<Point<T, D>>> for PointCloud<T, D>
where
    T: CoordinateScalar,
{
    fn from(points: Vec<Point<T, D>>) -> Self {
        Self {
            points,
            revision: 0,
        }
    }
}

impl<T, const D: usize> From<Vec<[T; D]>> for PointCloud<T, D>
where
    T: CoordinateScalar,
{
    fn from(coords: Vec<[T; D]>) -> Self {
        Self {
            points: coords.into_iter().map(Point::new).collect(),
            revision: 0,
        }
    }
}

impl<T, const D: usize> FromIterator<Point<T, D>> for PointCloud<T, D>
where
    T: CoordinateScalar,
{
    fn from_iter<I: IntoIterator<Item = Point<T, D>>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
            revision: 0,
        }
    }
}
