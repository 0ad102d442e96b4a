//! # pointbins
//!
//! A uniform bucket-grid spatial locator for point clouds: divide the
//! bounding box of a point set into a regular D-dimensional array of
//! buckets, keep the list of point ids falling in each bucket, and answer
//! proximity questions by searching expanding bucket neighborhoods.
//!
//! # Features
//!
//! - Nearest-point, radius, and N-closest queries over any indexable point
//!   container (d-dimensional, `f32` or `f64` coordinates)
//! - Batch merging of coincident points under a distance tolerance
//! - Incremental point insertion with on-the-fly deduplication
//! - Automatic (occupancy-targeted) or manual grid division planning
//! - Lazy rebuild: the search structure tracks the point container's
//!   revision and the locator configuration, and rebuilds only when stale
//!
//! # Basic Usage
//!
//! ```rust
//! use pointbins::prelude::*;
//!
//! let cloud: PointCloud<f64, 3> = vec![
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0],
//! ]
//! .into();
//!
//! let mut locator = BucketLocator::new(LocatorConfig::default());
//!
//! let nearest = locator
//!     .find_closest_point(&cloud, &Point::new([0.8, 0.1, 0.0]))
//!     .unwrap();
//! assert_eq!(nearest, Some(1));
//! ```
//!
//! # Merging coincident points
//!
//! ```rust
//! use pointbins::prelude::*;
//!
//! let cloud: PointCloud<f64, 2> = vec![
//!     [0.0, 0.0],
//!     [0.004, 0.0], // coincident with point 0 under the default tolerance
//!     [5.0, 5.0],
//! ]
//! .into();
//!
//! let mut locator = BucketLocator::new(LocatorConfig::default());
//! let index = locator.merge_points(&cloud).unwrap();
//! assert_eq!(index, vec![0, 0, 1]);
//! ```
//!
//! # Incremental insertion
//!
//! ```rust
//! use pointbins::prelude::*;
//!
//! let config: LocatorConfig<f64, 3> = LocatorConfig::default();
//! let bounds = Aabb::new([0.0, 0.0, 0.0], [10.0, 10.0, 10.0]);
//! let mut inserter =
//!     PointInserter::new(PointCloud::<f64, 3>::new(), &bounds, &config).unwrap();
//!
//! let a = inserter.insert(&Point::new([1.0, 2.0, 3.0]));
//! let b = inserter.insert(&Point::new([1.0, 2.0, 3.0])); // merged with a
//! assert_eq!(a, b);
//!
//! let cloud = inserter.into_points();
//! assert_eq!(cloud.len(), 1);
//! ```
//!
//! # Caveats
//!
//! The locator is single-threaded: queries may trigger a lazy rebuild and
//! therefore take `&mut self`. Share a built locator across threads only
//! behind external synchronization. Many other spatial structures (kd-trees,
//! octrees) can answer the same queries; a uniform grid is the simple,
//! predictable choice when point distributions are reasonably even.

#![forbid(unsafe_code)]

/// Core locator machinery: grids, neighborhood walks, queries, merging,
/// and incremental insertion.
pub mod core {
    pub mod collections;
    pub mod grid;
    pub mod insertion;
    pub mod locator;
    pub mod neighbors;
    pub mod point_set;

    pub use grid::{BucketGrid, DivisionPlan};
    pub use insertion::PointInserter;
    pub use locator::{BucketLocator, LocatorConfig, LocatorError};
    pub use point_set::{InsertablePointSet, PointCloud, PointId, PointSet};
}

/// Geometric primitives: points, bounding boxes, scalar traits, and
/// utility functions.
pub mod geometry {
    pub mod bounds;
    pub mod point;
    pub mod util;

    /// Traits constraining coordinate scalar types.
    pub mod traits {
        pub mod coordinate;

        pub use coordinate::*;
    }

    pub use bounds::Aabb;
    pub use point::Point;
}

/// Convenience re-exports of the crate's public surface.
pub mod prelude {
    pub use crate::core::collections::SmallBuffer;
    pub use crate::core::grid::{BucketGrid, DivisionPlan};
    pub use crate::core::insertion::PointInserter;
    pub use crate::core::locator::{BucketLocator, LocatorConfig, LocatorError};
    pub use crate::core::neighbors::{
        for_each_bucket_in_box, for_each_shell_bucket, shell_coords,
    };
    pub use crate::core::point_set::{InsertablePointSet, PointCloud, PointId, PointSet};
    pub use crate::geometry::bounds::Aabb;
    pub use crate::geometry::point::Point;
    pub use crate::geometry::traits::coordinate::CoordinateScalar;
    pub use crate::geometry::util::{
        distance_squared, generate_random_points, generate_random_points_seeded, squared_norm,
    };
}
