//! Geometric utility functions: distances, safe scalar conversions, and
//! random point generation for tests and benchmarks.

pub mod conversions;
pub mod norms;
pub mod point_generation;

pub use conversions::{safe_scalar_from_f64, safe_scalar_to_f64, safe_usize_to_scalar};
pub use norms::{distance_squared, squared_norm};
pub use point_generation::{generate_random_points, generate_random_points_seeded};
