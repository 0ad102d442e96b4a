//! Nearest-point, radius, and N-closest queries cross-checked against
//! brute-force scans on randomly generated clouds.

use pointbins::prelude::*;

/// Random cloud in the unit cube whose bounds are exactly `[0, 1]^3`, so
/// every query drawn from `[0, 1)^3` is in bounds.
fn unit_cloud(n: usize, seed: u64) -> PointCloud<f64, 3> {
    let mut cloud: PointCloud<f64, 3> =
        generate_random_points_seeded(n, (0.0, 1.0), seed).into_iter().collect();
    cloud.push(Point::new([0.0, 0.0, 0.0]));
    cloud.push(Point::new([1.0, 1.0, 1.0]));
    cloud
}

fn brute_min_dist2(cloud: &PointCloud<f64, 3>, x: &[f64; 3]) -> f64 {
    cloud
        .iter()
        .map(|p| distance_squared(x, p.coords()))
        .fold(f64::INFINITY, f64::min)
}

#[test]
fn nearest_matches_brute_force_on_random_cloud() {
    let cloud = unit_cloud(150, 0xD1CE);
    let queries = generate_random_points_seeded::<f64, 3>(50, (0.0, 1.0), 0xBEEF);
    let mut locator: BucketLocator<f64, 3> = BucketLocator::default();

    for query in &queries {
        let id = locator
            .find_closest_point(&cloud, query)
            .unwrap()
            .expect("query inside bounds must find a point");
        let found = cloud.point(id).unwrap();
        let dist2 = distance_squared(query.coords(), found.coords());
        assert_eq!(dist2, brute_min_dist2(&cloud, query.coords()));
    }
}

#[test]
fn nearest_on_single_point_cloud() {
    let cloud: PointCloud<f64, 3> = vec![[0.5, 0.5, 0.5]].into();
    let mut locator: BucketLocator<f64, 3> = BucketLocator::default();

    // The degenerate bounds are padded to unit width per axis, so nearby
    // queries stay in bounds.
    let id = locator
        .find_closest_point(&cloud, &Point::new([0.6, 0.7, 0.8]))
        .unwrap();
    assert_eq!(id, Some(0));
}

#[test]
fn out_of_bounds_query_returns_none_without_error() {
    let cloud = unit_cloud(20, 7);
    let mut locator: BucketLocator<f64, 3> = BucketLocator::default();
    for query in [
        [-0.1, 0.5, 0.5],
        [0.5, 1.5, 0.5],
        [0.5, 0.5, -3.0],
        [100.0, 100.0, 100.0],
    ] {
        assert_eq!(
            locator.find_closest_point(&cloud, &Point::new(query)).unwrap(),
            None
        );
    }
}

#[test]
fn coplanar_cloud_still_answers_queries() {
    // All z coordinates are zero; the z axis is padded during the build.
    let flat: Vec<[f64; 3]> = generate_random_points_seeded::<f64, 2>(100, (0.0, 1.0), 21)
        .into_iter()
        .map(|p| [p.coords()[0], p.coords()[1], 0.0])
        .collect();
    let cloud: PointCloud<f64, 3> = flat.into();
    let mut locator: BucketLocator<f64, 3> = BucketLocator::default();

    for query in generate_random_points_seeded::<f64, 3>(20, (0.0, 0.9), 22) {
        let id = locator
            .find_closest_point(&cloud, &query)
            .unwrap()
            .expect("in-bounds query");
        let found = cloud.point(id).unwrap();
        let dist2 = distance_squared(query.coords(), found.coords());
        assert_eq!(dist2, brute_min_dist2(&cloud, query.coords()));
    }
}

#[test]
fn f32_coordinates_are_supported() {
    let cloud: PointCloud<f32, 2> = vec![[0.0f32, 0.0], [1.0, 0.0], [0.0, 1.0]].into();
    let mut locator: BucketLocator<f32, 2> = BucketLocator::default();
    let id = locator
        .find_closest_point(&cloud, &Point::new([0.9f32, 0.1]))
        .unwrap();
    assert_eq!(id, Some(1));
}

#[test]
fn radius_query_matches_brute_filter() {
    let cloud = unit_cloud(300, 0xACE);
    let mut locator: BucketLocator<f64, 3> = BucketLocator::default();

    for (i, query) in generate_random_points_seeded::<f64, 3>(25, (0.0, 1.0), 0xFACE)
        .iter()
        .enumerate()
    {
        let radius = 0.05 + 0.01 * i as f64;
        let mut ids = locator
            .find_points_within_radius(&cloud, radius, query)
            .unwrap();
        ids.sort_unstable();

        let mut expected: Vec<PointId> = (0..cloud.len())
            .filter(|&id| {
                let p = cloud.point(id).unwrap();
                distance_squared(query.coords(), p.coords()) <= radius * radius
            })
            .collect();
        expected.sort_unstable();

        assert_eq!(ids, expected);
    }
}

#[test]
fn closest_n_matches_brute_force_distances() {
    let cloud = unit_cloud(150, 0xF00D);
    let mut locator: BucketLocator<f64, 3> = BucketLocator::default();

    for query in generate_random_points_seeded::<f64, 3>(20, (0.0, 1.0), 0xD00D) {
        let n = 10;
        let ids = locator.find_closest_n_points(&cloud, n, &query).unwrap();
        assert_eq!(ids.len(), n);

        let returned: Vec<f64> = ids
            .iter()
            .map(|&id| distance_squared(query.coords(), cloud.point(id).unwrap().coords()))
            .collect();

        // Sorted nearest first.
        for pair in returned.windows(2) {
            assert!(pair[0] <= pair[1]);
        }

        // And exactly the n smallest distances in the cloud.
        let mut all: Vec<f64> = cloud
            .iter()
            .map(|p| distance_squared(query.coords(), p.coords()))
            .collect();
        all.sort_by(f64::total_cmp);
        assert_eq!(returned, all[..n]);
    }
}

#[test]
fn closest_n_with_small_cloud_returns_everything() {
    let cloud: PointCloud<f64, 3> = vec![[0.1, 0.1, 0.1], [0.9, 0.9, 0.9]].into();
    let mut locator: BucketLocator<f64, 3> = BucketLocator::default();
    let ids = locator
        .find_closest_n_points(&cloud, 5, &Point::new([0.2, 0.2, 0.2]))
        .unwrap();
    assert_eq!(ids, vec![0, 1]);
}
