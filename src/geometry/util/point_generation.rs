//! Random point generation.
//!
//! Uniformly distributed point clouds for tests, benchmarks, and examples.
//! The seeded variant produces reproducible clouds for regression work.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand::distr::uniform::SampleUniform;

use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;

/// Generate `n` points uniformly distributed in `[min, max)` per axis.
///
/// # Examples
///
/// ```
/// use pointbins::geometry::util::generate_random_points;
///
/// let points = generate_random_points::<f64, 3>(100, (0.0, 1.0));
/// assert_eq!(points.len(), 100);
/// assert!(points.iter().all(|p| p.coords().iter().all(|&c| (0.0..1.0).contains(&c))));
/// ```
#[must_use]
pub fn generate_random_points<T, const D: usize>(n: usize, range: (T, T)) -> Vec<Point<T, D>>
where
    T: CoordinateScalar + SampleUniform,
{
    let mut rng = rand::rng();
    sample_points(&mut rng, n, range)
}

/// Generate `n` points uniformly distributed in `[min, max)` per axis,
/// using a deterministic seed.
///
/// # Examples
///
/// ```
/// use pointbins::geometry::util::generate_random_points_seeded;
///
/// let a = generate_random_points_seeded::<f64, 2>(10, (-1.0, 1.0), 42);
/// let b = generate_random_points_seeded::<f64, 2>(10, (-1.0, 1.0), 42);
/// assert_eq!(a, b);
/// ```
#[must_use]
pub fn generate_random_points_seeded<T, const D: usize>(
    n: usize,
    range: (T, T),
    seed: u64,
) -> Vec<Point<T, D>>
where
    T: CoordinateScalar + SampleUniform,
{
    let mut rng = StdRng::seed_from_u64(seed);
    sample_points(&mut rng, n, range)
}

fn sample_points<T, const D: usize, R>(rng: &mut R, n: usize, range: (T, T)) -> Vec<Point<T, D>>
where
    T: CoordinateScalar + SampleUniform,
    R: Rng,
{
    let (lo, hi) = range;
    (0..n)
        .map(|_| {
            let mut coords = [T::zero(); D];
            for coord in &mut coords {
                *coord = rng.random_range(lo..hi);
            }
            Point::new(coords)
        })
        .collect()
}
