//! Axis-aligned bounding boxes for point sets.

use serde::{Deserialize, Serialize};

use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::{CoordinateScalar, CoordinateValidationError};

/// An axis-aligned bounding box in D-dimensional space.
///
/// A box is described by its componentwise minimum and maximum corners.
/// Nothing forces `min <= max` on construction; consumers that need strictly
/// positive extents call [`Aabb::padded`], which expands every degenerate
/// axis by one unit.
///
/// # Examples
///
/// ```
/// use pointbins::geometry::bounds::Aabb;
/// use pointbins::geometry::point::Point;
///
/// let points = vec![
///     Point::new([0.0, 1.0]),
///     Point::new([2.0, -1.0]),
/// ];
/// let aabb = Aabb::from_points(points).unwrap();
/// assert_eq!(aabb.min(), &[0.0, -1.0]);
/// assert_eq!(aabb.max(), &[2.0, 1.0]);
/// assert!(aabb.contains(&[1.0, 0.0]));
/// assert!(!aabb.contains(&[3.0, 0.0]));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: CoordinateScalar")]
pub struct Aabb<T, const D: usize>
where
    T: CoordinateScalar,
{
    min: Point<T, D>,
    max: Point<T, D>,
}

impl<T, const D: usize> Aabb<T, D>
where
    T: CoordinateScalar,
{
    /// Create a bounding box from explicit corner arrays.
    #[inline]
    #[must_use]
    pub const fn new(min: [T; D], max: [T; D]) -> Self {
        Self {
            min: Point::new(min),
            max: Point::new(max),
        }
    }

    /// Compute the bounding box covering an iterator of points.
    ///
    /// Returns `None` for an empty iterator; bounds over nothing are
    /// meaningless and callers are expected to treat that as their "no
    /// points" precondition failure.
    #[must_use]
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point<T, D>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = first.to_array();
        let mut max = min;

        for point in iter {
            for (axis, &coord) in point.coords().iter().enumerate() {
                if coord < min[axis] {
                    min[axis] = coord;
                }
                if coord > max[axis] {
                    max[axis] = coord;
                }
            }
        }

        Some(Self::new(min, max))
    }

    /// The componentwise minimum corner.
    #[inline]
    #[must_use]
    pub const fn min(&self) -> &[T; D] {
        self.min.coords()
    }

    /// The componentwise maximum corner.
    #[inline]
    #[must_use]
    pub const fn max(&self) -> &[T; D] {
        self.max.coords()
    }

    /// The extent of the box along `axis`.
    #[inline]
    #[must_use]
    pub fn width(&self, axis: usize) -> T {
        self.max.coords()[axis] - self.min.coords()[axis]
    }

    /// A copy of this box with every zero-width (or inverted) axis expanded
    /// by one unit, guaranteeing a strictly positive extent per axis.
    #[must_use]
    pub fn padded(&self) -> Self {
        let min = self.min.to_array();
        let mut max = self.max.to_array();
        for axis in 0..D {
            if max[axis] <= min[axis] {
                max[axis] = min[axis] + T::one();
            }
        }
        Self::new(min, max)
    }

    /// Whether `x` lies inside the box (boundaries inclusive).
    #[must_use]
    pub fn contains(&self, x: &[T; D]) -> bool {
        let min = self.min.coords();
        let max = self.max.coords();
        (0..D).all(|axis| x[axis] >= min[axis] && x[axis] <= max[axis])
    }

    /// Validate that both corners are finite.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateValidationError::InvalidCoordinate`] for the first
    /// NaN or infinite corner coordinate.
    pub fn validate(&self) -> Result<(), CoordinateValidationError> {
        self.min.validate()?;
        self.max.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_empty_is_none() {
        let points: Vec<Point<f64, 3>> = Vec::new();
        assert!(Aabb::from_points(points).is_none());
    }

    #[test]
    fn from_points_single_point_is_degenerate() {
        let aabb = Aabb::from_points(vec![Point::new([1.0, 2.0, 3.0])]).unwrap();
        assert_eq!(aabb.min(), aabb.max());
        assert_eq!(aabb.width(0), 0.0);
    }

    #[test]
    fn padded_fixes_degenerate_axes_only() {
        let aabb: Aabb<f64, 3> = Aabb::new([0.0, 0.0, 5.0], [2.0, 0.0, 5.0]);
        let padded = aabb.padded();
        assert_eq!(padded.width(0), 2.0);
        assert_eq!(padded.width(1), 1.0);
        assert_eq!(padded.width(2), 1.0);
        assert_eq!(padded.min(), aabb.min());
    }

    #[test]
    fn contains_is_boundary_inclusive() {
        let aabb: Aabb<f64, 2> = Aabb::new([0.0, 0.0], [1.0, 1.0]);
        assert!(aabb.contains(&[0.0, 0.0]));
        assert!(aabb.contains(&[1.0, 1.0]));
        assert!(!aabb.contains(&[1.0 + 1e-12, 0.5]));
        assert!(!aabb.contains(&[-1e-12, 0.5]));
    }

    #[test]
    fn validate_rejects_non_finite_corners() {
        let good: Aabb<f64, 2> = Aabb::new([0.0, 0.0], [1.0, 1.0]);
        assert!(good.validate().is_ok());

        let bad: Aabb<f64, 2> = Aabb::new([0.0, f64::NAN], [1.0, 1.0]);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn serde_round_trip() {
        let aabb: Aabb<f64, 2> = Aabb::new([0.0, -1.0], [2.0, 3.0]);
        let json = serde_json::to_string(&aabb).unwrap();
        let back: Aabb<f64, 2> = serde_json::from_str(&json).unwrap();
        assert_eq!(aabb, back);
    }
}
