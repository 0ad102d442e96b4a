//! Data and operations on d-dimensional points.
//!
//! # Special Floating-Point Equality Semantics
//!
//! `Point` implements custom equality semantics for floating-point
//! coordinates that differ from the IEEE 754 standard: NaN values are treated
//! as equal to themselves so that `Eq` holds and points can be used as keys
//! in hash-based collections. If you need standard IEEE 754 semantics,
//! compare the coordinate arrays directly.

use serde::de::{Error, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::geometry::traits::coordinate::{CoordinateScalar, CoordinateValidationError};

/// A point in D-dimensional space with coordinates of scalar type `T`.
///
/// Points are immutable once created; the coordinate array is private to
/// prevent modification after instantiation.
///
/// # Examples
///
/// ```
/// use pointbins::geometry::point::Point;
///
/// let p = Point::new([1.0, 2.0, 3.0]);
/// assert_eq!(p.coords(), &[1.0, 2.0, 3.0]);
/// assert_eq!(p.dim(), 3);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Point<T, const D: usize>
where
    T: CoordinateScalar,
{
    /// The coordinates of the point.
    coords: [T; D],
}

impl<T, const D: usize> Point<T, D>
where
    T: CoordinateScalar,
{
    /// Create a new point from an array of coordinates.
    #[inline]
    #[must_use]
    pub const fn new(coords: [T; D]) -> Self {
        Self { coords }
    }

    /// Returns a reference to the point's coordinates without copying.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> &[T; D] {
        &self.coords
    }

    /// Extract the coordinates as an owned array.
    #[inline]
    #[must_use]
    pub const fn to_array(&self) -> [T; D] {
        self.coords
    }

    /// Get the coordinate at the specified index, or `None` out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.coords.get(index).copied()
    }

    /// The dimensionality of the point.
    #[inline]
    #[must_use]
    pub const fn dim(&self) -> usize {
        D
    }

    /// Validate that all coordinates are finite (no NaN or infinite values).
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateValidationError::InvalidCoordinate`] naming the
    /// first offending coordinate.
    pub fn validate(&self) -> Result<(), CoordinateValidationError> {
        for (index, &coord) in self.coords.iter().enumerate() {
            if !coord.is_finite_generic() {
                return Err(CoordinateValidationError::InvalidCoordinate {
                    coordinate_index: index,
                    coordinate_value: format!("{coord:?}"),
                    dimension: D,
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// STANDARD TRAIT IMPLEMENTATIONS
// =============================================================================

impl<T, const D: usize> Hash for Point<T, D>
where
    T: CoordinateScalar,
{
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        for coord in &self.coords {
            coord.hash_scalar(state);
        }
    }
}

impl<T, const D: usize> PartialEq for Point<T, D>
where
    T: CoordinateScalar,
{
    fn eq(&self, other: &Self) -> bool {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .all(|(a, b)| a.ordered_eq(b))
    }
}

impl<T, const D: usize> Eq for Point<T, D> where T: CoordinateScalar {}

impl<T, const D: usize> Default for Point<T, D>
where
    T: CoordinateScalar,
{
    fn default() -> Self {
        Self {
            coords: [T::default(); D],
        }
    }
}

impl<T, const D: usize> From<[T; D]> for Point<T, D>
where
    T: CoordinateScalar,
{
    #[inline]
    fn from(coords: [T; D]) -> Self {
        Self::new(coords)
    }
}

impl<T, const D: usize> From<Point<T, D>> for [T; D]
where
    T: CoordinateScalar,
{
    #[inline]
    fn from(point: Point<T, D>) -> [T; D] {
        point.to_array()
    }
}

// =============================================================================
// SERDE IMPLEMENTATIONS
// =============================================================================

// Serialized as a tuple of D coordinates. Non-finite values get
// format-portable spellings: NaN -> null, infinities -> "Infinity" strings.
impl<T, const D: usize> Serialize for Point<T, D>
where
    T: CoordinateScalar,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeTuple;
        let mut tuple = serializer.serialize_tuple(D)?;
        for coord in &self.coords {
            if coord.is_finite_generic() {
                tuple.serialize_element(coord)?;
            } else if coord.is_nan() {
                tuple.serialize_element(&Option::<T>::None)?;
            } else if coord.is_sign_positive() {
                tuple.serialize_element("Infinity")?;
            } else {
                tuple.serialize_element("-Infinity")?;
            }
        }
        tuple.end()
    }
}

/// Format-agnostic representation for coordinate values during
/// deserialization, so the visitor works for JSON, CBOR, bincode, and
/// friends without being tied to format-specific types.
#[derive(Deserialize)]
#[serde(untagged)]
enum CoordRepr<T> {
    /// Regular numeric value.
    Num(T),
    /// Special values spelled as strings ("Infinity", "-Infinity", "NaN").
    Str(String),
    /// Null, mapped back to NaN.
    Null,
}

impl<'de, T, const D: usize> Deserialize<'de> for Point<T, D>
where
    T: CoordinateScalar,
{
    fn deserialize<DE>(deserializer: DE) -> Result<Self, DE::Error>
    where
        DE: serde::Deserializer<'de>,
    {
        struct ArrayVisitor<T, const D: usize>(PhantomData<T>);

        impl<'de, T, const D: usize> Visitor<'de> for ArrayVisitor<T, D>
        where
            T: CoordinateScalar,
        {
            type Value = Point<T, D>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_fmt(format_args!(
                    "an array of {D} coordinates (numbers, null, \"Infinity\", \"-Infinity\", or \"NaN\")"
                ))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut coords = Vec::with_capacity(D);
                for i in 0..D {
                    let element: CoordRepr<T> = seq
                        .next_element()?
                        .ok_or_else(|| Error::invalid_length(i, &self))?;

                    let coord = match element {
                        CoordRepr::Num(value) => value,
                        CoordRepr::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                            "infinity" | "inf" => T::infinity(),
                            "-infinity" | "-inf" => T::neg_infinity(),
                            "nan" => T::nan(),
                            _ => {
                                return Err(Error::custom(format!("unknown special value: {s}")));
                            }
                        },
                        CoordRepr::Null => T::nan(),
                    };

                    coords.push(coord);
                }

                let coords_len = coords.len();
                let coords_array: [T; D] = coords
                    .try_into()
                    .map_err(|_| Error::invalid_length(coords_len, &self))?;

                Ok(Point::new(coords_array))
            }
        }

        deserializer.deserialize_tuple(D, ArrayVisitor(PhantomData))
    }
}
