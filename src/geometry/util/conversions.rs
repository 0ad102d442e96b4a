//! Safe scalar conversion functions between numeric types.
//!
//! These replace bare `as` casts and `cast(x).unwrap()` patterns with
//! explicit error reporting, including finite-value checking.

use num_traits::cast;

use crate::geometry::traits::coordinate::{CoordinateConversionError, CoordinateScalar};

/// Safely convert an `f64` value to coordinate scalar type `T`.
///
/// # Errors
///
/// Returns [`CoordinateConversionError::NonFiniteValue`] if the value is NaN
/// or infinite, and [`CoordinateConversionError::ConversionFailed`] if the
/// numeric cast fails.
pub fn safe_scalar_from_f64<T: CoordinateScalar>(
    value: f64,
) -> Result<T, CoordinateConversionError> {
    if !value.is_finite() {
        return Err(CoordinateConversionError::NonFiniteValue {
            value: format!("{value:?}"),
        });
    }

    cast(value).ok_or_else(|| CoordinateConversionError::ConversionFailed {
        value: format!("{value:?}"),
        from_type: "f64",
        to_type: std::any::type_name::<T>(),
    })
}

/// Safely convert a coordinate scalar value to `f64`.
///
/// # Errors
///
/// Returns [`CoordinateConversionError::NonFiniteValue`] if the value is NaN
/// or infinite, and [`CoordinateConversionError::ConversionFailed`] if the
/// numeric cast fails.
pub fn safe_scalar_to_f64<T: CoordinateScalar>(value: T) -> Result<f64, CoordinateConversionError> {
    if !value.is_finite_generic() {
        return Err(CoordinateConversionError::NonFiniteValue {
            value: format!("{value:?}"),
        });
    }

    cast(value).ok_or_else(|| CoordinateConversionError::ConversionFailed {
        value: format!("{value:?}"),
        from_type: std::any::type_name::<T>(),
        to_type: "f64",
    })
}

/// Safely convert a `usize` count to coordinate scalar type `T`.
///
/// # Errors
///
/// Returns [`CoordinateConversionError::ConversionFailed`] if the count
/// cannot be represented in `T`.
pub fn safe_usize_to_scalar<T: CoordinateScalar>(
    value: usize,
) -> Result<T, CoordinateConversionError> {
    cast(value).ok_or_else(|| CoordinateConversionError::ConversionFailed {
        value: value.to_string(),
        from_type: "usize",
        to_type: std::any::type_name::<T>(),
    })
}
