//! Bucket-neighborhood enumeration.
//!
//! Two traversals drive every query:
//!
//! - **Shell walk**: the hollow surface of the cube of Chebyshev radius
//!   `level` around a center bucket, clipped to the grid. Level 0 is the
//!   center itself; level 1 its 8 (2D) or 26 (3D) immediate neighbors, and
//!   so on. Successive levels are disjoint and their union covers the whole
//!   grid, which is what lets the expanding-ring search visit each bucket
//!   exactly once.
//! - **Box walk**: every bucket in an axis-aligned coordinate range,
//!   optionally excluding an inner Chebyshev box that was already searched.
//!
//! Both are visitor-based: callers pass a closure instead of receiving an
//! allocated list, so repeated queries share no mutable scratch state.

/// Visit every bucket coordinate on the hollow shell at Chebyshev distance
/// `level` from `center`, clipped to `[0, divisions - 1]` per axis.
///
/// Level 0 visits exactly the center bucket. Coordinates are visited in
/// odometer order (last axis fastest), which makes the traversal, and
/// therefore any tie-breaking built on it, deterministic.
///
/// # Examples
///
/// ```
/// use pointbins::core::neighbors::shell_coords;
///
/// // The full first ring around an interior bucket in 3D has 26 buckets.
/// let ring = shell_coords(&[2, 2, 2], &[5, 5, 5], 1);
/// assert_eq!(ring.len(), 26);
///
/// // At a corner the ring is clipped.
/// let clipped = shell_coords(&[0, 0, 0], &[5, 5, 5], 1);
/// assert_eq!(clipped.len(), 7);
/// ```
pub fn for_each_shell_bucket<const D: usize, F>(
    center: &[usize; D],
    divisions: &[usize; D],
    level: usize,
    mut visit: F,
) where
    F: FnMut(&[usize; D]),
{
    if level == 0 {
        visit(center);
        return;
    }

    let mut lo = [0usize; D];
    let mut hi = [0usize; D];
    for axis in 0..D {
        lo[axis] = center[axis].saturating_sub(level);
        hi[axis] = (center[axis] + level).min(divisions[axis] - 1);
    }

    let mut current = [0usize; D];
    walk_box(0, &lo, &hi, &mut current, &mut |coord| {
        if on_shell(coord, center, level) {
            visit(coord);
        }
    });
}

/// Collect the shell at `level` into a vector. Convenience wrapper around
/// [`for_each_shell_bucket`] for callers that want the list itself.
#[must_use]
pub fn shell_coords<const D: usize>(
    center: &[usize; D],
    divisions: &[usize; D],
    level: usize,
) -> Vec<[usize; D]> {
    let mut coords = Vec::new();
    for_each_shell_bucket(center, divisions, level, |coord| coords.push(*coord));
    coords
}

/// Visit every bucket coordinate in the inclusive box `[lo, hi]`, skipping
/// those inside the Chebyshev box of half-width `half_width` around
/// `center` when an exclusion is supplied.
///
/// The exclusion mirrors the shell walk: a refinement pass that has already
/// searched rings `0..=half_width` hands that box in so no bucket is
/// examined twice.
pub fn for_each_bucket_in_box<const D: usize, F>(
    lo: &[usize; D],
    hi: &[usize; D],
    exclude: Option<(&[usize; D], usize)>,
    mut visit: F,
) where
    F: FnMut(&[usize; D]),
{
    let mut current = [0usize; D];
    walk_box(0, lo, hi, &mut current, &mut |coord| {
        if let Some((center, half_width)) = exclude {
            if within_chebyshev(coord, center, half_width) {
                return;
            }
        }
        visit(coord);
    });
}

/// Recursive odometer over the inclusive coordinate box `[lo, hi]`.
fn walk_box<const D: usize, F>(
    axis: usize,
    lo: &[usize; D],
    hi: &[usize; D],
    current: &mut [usize; D],
    visit: &mut F,
) where
    F: FnMut(&[usize; D]),
{
    if axis == D {
        visit(current);
        return;
    }

    for value in lo[axis]..=hi[axis] {
        current[axis] = value;
        walk_box(axis + 1, lo, hi, current, visit);
    }
}

/// Whether some axis of `coord` sits exactly on the shell boundary at
/// `level` around `center`.
fn on_shell<const D: usize>(coord: &[usize; D], center: &[usize; D], level: usize) -> bool {
    (0..D).any(|axis| {
        coord[axis] == center[axis] + level
            || (center[axis] >= level && coord[axis] == center[axis] - level)
    })
}

/// Whether every axis of `coord` lies within `half_width` of `center`.
fn within_chebyshev<const D: usize>(
    coord: &[usize; D],
    center: &[usize; D],
    half_width: usize,
) -> bool {
    (0..D).all(|axis| {
        let delta = coord[axis].abs_diff(center[axis]);
        delta <= half_width
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn level_zero_is_the_center() {
        assert_eq!(shell_coords(&[3, 1], &[8, 8], 0), vec![[3, 1]]);
    }

    #[test]
    fn interior_ring_sizes_2d_and_3d() {
        assert_eq!(shell_coords(&[4, 4], &[9, 9], 1).len(), 8);
        assert_eq!(shell_coords(&[4, 4, 4], &[9, 9, 9], 1).len(), 26);
        // A level-2 shell in 3D is 5^3 - 3^3 buckets.
        assert_eq!(shell_coords(&[4, 4, 4], &[9, 9, 9], 2).len(), 98);
    }

    #[test]
    fn rings_clip_at_grid_borders() {
        let ring = shell_coords(&[0, 0], &[4, 4], 1);
        assert_eq!(ring.len(), 3);
        assert!(ring.contains(&[1, 0]));
        assert!(ring.contains(&[0, 1]));
        assert!(ring.contains(&[1, 1]));
    }

    #[test]
    fn shells_partition_the_grid() {
        let divisions = [4, 3, 5];
        let center = [1, 2, 0];
        let mut seen: FxHashSet<[usize; 3]> = FxHashSet::default();
        let mut total = 0usize;

        for level in 0..=*divisions.iter().max().unwrap() {
            for coord in shell_coords(&center, &divisions, level) {
                assert!(seen.insert(coord), "bucket revisited across levels");
                total += 1;
            }
        }

        assert_eq!(total, divisions.iter().product::<usize>());
    }

    #[test]
    fn shell_level_equals_chebyshev_distance() {
        let divisions = [6, 6];
        let center = [2, 3];
        for level in 0..6 {
            for coord in shell_coords(&center, &divisions, level) {
                let chebyshev = coord
                    .iter()
                    .zip(center.iter())
                    .map(|(&c, &o)| c.abs_diff(o))
                    .max()
                    .unwrap();
                assert_eq!(chebyshev, level);
            }
        }
    }

    #[test]
    fn box_walk_with_exclusion() {
        let mut coords = Vec::new();
        for_each_bucket_in_box(&[0, 0], &[3, 3], Some((&[1, 1], 1)), |c| coords.push(*c));
        // 16 buckets in the box, 9 inside the excluded 3x3 block.
        assert_eq!(coords.len(), 7);
        assert!(coords.iter().all(|c| c[0] > 2 || c[1] > 2));
    }

    #[test]
    fn box_walk_without_exclusion_covers_everything() {
        let mut count = 0;
        for_each_bucket_in_box(&[1, 0, 2], &[2, 1, 3], None, |_| count += 1);
        assert_eq!(count, 2 * 2 * 2);
    }
}
