//! Coordinate scalar traits shared by every geometric type in the crate.
//!
//! The locator works with floating-point coordinates, which need three small
//! capabilities beyond what [`num_traits::Float`] offers:
//!
//! - **`FiniteCheck`**: validation of coordinate values (no NaN or infinity),
//! - **`OrderedEq`**: NaN-aware equality so points can be compared and used
//!   as keys in hash-based collections,
//! - **`HashCoordinate`**: consistent hashing of floating-point values.
//!
//! [`CoordinateScalar`] consolidates all of these into the single bound used
//! throughout the crate; `f32` and `f64` implement it.

use num_traits::Float;
use ordered_float::OrderedFloat;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fmt::Debug,
    hash::{Hash, Hasher},
};

/// Errors that can occur when converting scalar values between numeric types.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoordinateConversionError {
    /// The numeric cast between the two types failed.
    #[error("failed to convert {value} from {from_type} to {to_type}")]
    ConversionFailed {
        /// String representation of the problematic value.
        value: String,
        /// Source type name.
        from_type: &'static str,
        /// Target type name.
        to_type: &'static str,
    },
    /// Non-finite value (NaN or infinity) encountered during conversion.
    #[error("non-finite value encountered during conversion: {value}")]
    NonFiniteValue {
        /// String representation of the non-finite value.
        value: String,
    },
}

/// Errors that can occur during coordinate validation.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoordinateValidationError {
    /// A coordinate value is invalid (NaN or infinite).
    #[error(
        "invalid coordinate at index {coordinate_index} in dimension {dimension}: {coordinate_value}"
    )]
    InvalidCoordinate {
        /// Index of the invalid coordinate.
        coordinate_index: usize,
        /// Value of the invalid coordinate, as a string.
        coordinate_value: String,
        /// The dimensionality of the coordinate system.
        dimension: usize,
    },
}

// =============================================================================
// SUPPORTING TRAITS
// =============================================================================

/// Helper trait for checking finiteness of coordinate values.
///
/// # Examples
///
/// ```
/// use pointbins::geometry::traits::coordinate::FiniteCheck;
///
/// assert!(3.25f64.is_finite_generic());
/// assert!(!f64::NAN.is_finite_generic());
/// assert!(!f32::INFINITY.is_finite_generic());
/// ```
pub trait FiniteCheck {
    /// Returns `true` if the value is finite (not NaN or infinite).
    fn is_finite_generic(&self) -> bool;
}

/// NaN-aware equality comparison.
///
/// Unlike IEEE 754 equality, this treats NaN as equal to itself (and
/// `+0.0` as equal to `-0.0`), which is what deduplication and hashing
/// need.
///
/// # Examples
///
/// ```
/// use pointbins::geometry::traits::coordinate::OrderedEq;
///
/// assert!(1.0f64.ordered_eq(&1.0));
/// assert!(f64::NAN.ordered_eq(&f64::NAN));
/// assert!(0.0f64.ordered_eq(&-0.0));
/// ```
pub trait OrderedEq {
    /// Compares two values for equality using ordered comparison semantics.
    fn ordered_eq(&self, other: &Self) -> bool;
}

/// Consistent hashing for floating-point values.
///
/// Floating-point types don't implement [`Hash`]; this routes the bits
/// through [`OrderedFloat`] so equal values (including all NaN payloads)
/// hash identically.
pub trait HashCoordinate {
    /// Hashes a single coordinate value using the provided hasher.
    fn hash_scalar<H: Hasher>(&self, state: &mut H);
}

macro_rules! impl_scalar_support {
    ($($t:ty),*) => {
        $(
            impl FiniteCheck for $t {
                #[inline(always)]
                fn is_finite_generic(&self) -> bool {
                    self.is_finite()
                }
            }

            impl OrderedEq for $t {
                #[inline(always)]
                fn ordered_eq(&self, other: &Self) -> bool {
                    OrderedFloat(*self) == OrderedFloat(*other)
                }
            }

            impl HashCoordinate for $t {
                #[inline(always)]
                fn hash_scalar<H: Hasher>(&self, state: &mut H) {
                    OrderedFloat(*self).hash(state);
                }
            }
        )*
    };
}

impl_scalar_support!(f32, f64);

// =============================================================================
// CONSOLIDATED SCALAR TRAIT
// =============================================================================

/// Trait alias consolidating every requirement on a coordinate scalar type.
///
/// Anything that is a [`Float`] with ordered equality, consistent hashing,
/// finiteness checking, and serde support can serve as the coordinate type
/// of the locator. In practice this means `f32` or `f64`.
///
/// # Examples
///
/// ```
/// use pointbins::geometry::traits::coordinate::CoordinateScalar;
///
/// fn nearly_equal<T: CoordinateScalar>(a: T, b: T) -> bool {
///     (a - b).abs() < T::default_tolerance()
/// }
///
/// assert!(nearly_equal(1.0f64, 1.0 + 1e-16));
/// ```
pub trait CoordinateScalar:
    Float + OrderedEq + HashCoordinate + FiniteCheck + Default + Debug + Serialize + DeserializeOwned
{
    /// The default tolerance for floating-point comparisons with this type.
    ///
    /// `1e-6` for `f32`, `1e-15` for `f64`.
    fn default_tolerance() -> Self;
}

impl CoordinateScalar for f32 {
    fn default_tolerance() -> Self {
        1e-6
    }
}

impl CoordinateScalar for f64 {
    fn default_tolerance() -> Self {
        1e-15
    }
}
