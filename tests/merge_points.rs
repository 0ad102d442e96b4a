//! Batch point-merge semantics, cross-checked against a straight-line
//! single-pass reference implementation.

use pointbins::prelude::*;

const UNASSIGNED: usize = usize::MAX;

/// Reference implementation of the single-pass representative assignment:
/// scan points in id order, give every unassigned point the next merged id,
/// and pull every still-unassigned point within tolerance into that id.
fn single_pass_reference(cloud: &PointCloud<f64, 3>, tolerance: f64) -> Vec<PointId> {
    let n = cloud.len();
    let tol2 = tolerance * tolerance;
    let mut index = vec![UNASSIGNED; n];
    let mut next_id = 0;

    for i in 0..n {
        if index[i] != UNASSIGNED {
            continue;
        }
        index[i] = next_id;
        let p = cloud.point(i).unwrap();
        for j in 0..n {
            if index[j] == UNASSIGNED {
                let q = cloud.point(j).unwrap();
                if distance_squared(p.coords(), q.coords()) <= tol2 {
                    index[j] = next_id;
                }
            }
        }
        next_id += 1;
    }

    index
}

#[test]
fn documented_example_two_groups() {
    let cloud: PointCloud<f64, 3> = vec![
        [0.0, 0.0, 0.0],
        [0.001, 0.0, 0.0],
        [10.0, 10.0, 10.0],
    ]
    .into();

    let mut locator = BucketLocator::new(LocatorConfig::default().with_tolerance(0.01));
    let index = locator.merge_points(&cloud).unwrap();

    assert_eq!(index[0], index[1]);
    assert_ne!(index[0], index[2]);

    let mut distinct = index.clone();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(distinct.len(), 2);
}

#[test]
fn merging_is_not_transitive_across_chains() {
    // a-b and b-c are each within tolerance, but a-c is not. The single
    // pass assigns b to a's group while processing a, so c starts its own
    // group even though it is within tolerance of b.
    let cloud: PointCloud<f64, 3> = vec![
        [0.0, 0.0, 0.0],
        [0.009, 0.0, 0.0],
        [0.018, 0.0, 0.0],
    ]
    .into();

    let mut locator = BucketLocator::new(LocatorConfig::default().with_tolerance(0.01));
    let index = locator.merge_points(&cloud).unwrap();
    assert_eq!(index, vec![0, 0, 1]);
}

#[test]
fn all_coincident_points_collapse_to_one_id() {
    let cloud: PointCloud<f64, 3> = vec![[1.0, 2.0, 3.0]; 20].into();
    let mut locator: BucketLocator<f64, 3> = BucketLocator::default();
    let index = locator.merge_points(&cloud).unwrap();
    assert_eq!(index, vec![0; 20]);
}

#[test]
fn well_separated_points_keep_distinct_ids() {
    let cloud: PointCloud<f64, 3> = (0..10)
        .map(|i| Point::new([f64::from(i), 0.0, 0.0]))
        .collect();
    let mut locator = BucketLocator::new(LocatorConfig::default().with_tolerance(0.01));
    let index = locator.merge_points(&cloud).unwrap();
    assert_eq!(index, (0..10).collect::<Vec<_>>());
}

#[test]
fn merged_ids_are_dense_from_zero() {
    let cloud = jittered_cloud(120, 0.004, 0x5EED);
    let mut locator = BucketLocator::new(LocatorConfig::default().with_tolerance(0.01));
    let index = locator.merge_points(&cloud).unwrap();

    let max = *index.iter().max().unwrap();
    let mut present = vec![false; max + 1];
    for &id in &index {
        present[id] = true;
    }
    assert!(present.iter().all(|&p| p), "merged ids must be contiguous");
}

#[test]
fn grid_merge_equals_single_pass_reference() {
    for (seed, tolerance) in [(1u64, 0.01), (2, 0.05), (3, 0.2), (4, 0.0)] {
        let cloud = jittered_cloud(150, tolerance * 0.4, seed);

        let mut locator = BucketLocator::new(LocatorConfig::default().with_tolerance(tolerance));
        let index = locator.merge_points(&cloud).unwrap();
        assert_eq!(index, single_pass_reference(&cloud, tolerance), "seed {seed}");
    }
}

#[test]
fn manual_divisions_do_not_change_the_result() {
    let cloud = jittered_cloud(100, 0.004, 0xA11CE);
    let tolerance = 0.01;

    let mut auto_locator = BucketLocator::new(LocatorConfig::default().with_tolerance(tolerance));
    let auto_index = auto_locator.merge_points(&cloud).unwrap();

    for divisions in [[1, 1, 1], [2, 5, 3], [7, 7, 7]] {
        let mut locator = BucketLocator::new(
            LocatorConfig::default()
                .with_tolerance(tolerance)
                .with_divisions(DivisionPlan::manual(divisions)),
        );
        let index = locator.merge_points(&cloud).unwrap();
        assert_eq!(index, auto_index, "divisions {divisions:?}");
    }
}

/// Half the points are bases, half are near-duplicates of a base offset by
/// `jitter` along x.
fn jittered_cloud(bases: usize, jitter: f64, seed: u64) -> PointCloud<f64, 3> {
    let mut points: Vec<Point<f64, 3>> = Vec::with_capacity(bases * 2);
    for base in generate_random_points_seeded::<f64, 3>(bases, (0.0, 1.0), seed) {
        let c = base.coords();
        points.push(base);
        points.push(Point::new([c[0] + jitter, c[1], c[2]]));
    }
    points.into_iter().collect()
}
