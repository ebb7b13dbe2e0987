//! Convex hull by Graham scan.

use super::Point;

/// Computes the convex hull of a point set.
///
/// Returns hull vertices in counter-clockwise order, each a member of the
/// input set. The seed vertex (minimal y, ties broken by minimal x) comes
/// first. Degenerate inputs are tolerated rather than rejected: a single
/// point hulls to itself, two points to the segment, and collinear input
/// collapses to the two extreme points.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let Some(&seed) = points.iter().min_by(|a, b| {
        (a.y, a.x)
            .partial_cmp(&(b.y, b.x))
            .unwrap_or(std::cmp::Ordering::Equal)
    }) else {
        return Vec::new();
    };

    // Sort the remaining points by polar angle around the seed. The
    // comparison uses the cross-product sign rather than inverse trig so
    // the ordering stays exact at angle wraparound; ties (collinear with
    // the seed) are broken nearest-first so the scan pops the inner ones.
    let mut sorted: Vec<Point> = points.iter().copied().filter(|p| *p != seed).collect();
    sorted.sort_by(|a, b| {
        let u = a.sub(seed);
        let v = b.sub(seed);
        let cross = u.cross(v);
        if cross > 0.0 {
            std::cmp::Ordering::Less
        } else if cross < 0.0 {
            std::cmp::Ordering::Greater
        } else {
            u.dot(u)
                .partial_cmp(&v.dot(v))
                .unwrap_or(std::cmp::Ordering::Equal)
        }
    });
    sorted.dedup();

    let mut hull = vec![seed];
    for p in sorted {
        while hull.len() >= 2 {
            let last = hull[hull.len() - 1];
            let prev = hull[hull.len() - 2];
            // Pop while the last three points make a non-left turn.
            if last.sub(prev).cross(p.sub(prev)) <= 0.0 {
                hull.pop();
            } else {
                break;
            }
        }
        hull.push(p);
    }
    hull
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_square_hull() {
        let points = pts(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 3.0),
            (0.0, 3.0),
            (2.0, 1.5), // interior
        ]);
        let hull = convex_hull(&points);
        assert_eq!(
            hull,
            pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0)])
        );
    }

    #[test]
    fn test_hull_is_counter_clockwise() {
        let points = pts(&[(1.0, 0.0), (3.0, 1.0), (2.0, 4.0), (0.0, 2.0), (1.5, 1.5)]);
        let hull = convex_hull(&points);

        // Twice the signed area must be positive for a CCW polygon.
        let doubled_area: f64 = hull
            .iter()
            .zip(hull.iter().cycle().skip(1))
            .map(|(a, b)| a.cross(*b))
            .sum();
        assert!(doubled_area > 0.0, "hull should wind counter-clockwise");
    }

    #[test]
    fn test_single_point() {
        let hull = convex_hull(&pts(&[(2.0, 5.0)]));
        assert_eq!(hull, pts(&[(2.0, 5.0)]));
    }

    #[test]
    fn test_two_points() {
        let hull = convex_hull(&pts(&[(3.0, 3.0), (1.0, 1.0)]));
        assert_eq!(hull, pts(&[(1.0, 1.0), (3.0, 3.0)]));
    }

    #[test]
    fn test_collinear_collapses_to_extremes() {
        let hull = convex_hull(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]));
        assert_eq!(hull, pts(&[(0.0, 0.0), (3.0, 3.0)]));
    }

    #[test]
    fn test_duplicate_points() {
        let hull = convex_hull(&pts(&[
            (0.0, 0.0),
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
        ]));
        assert_eq!(hull.len(), 4);
    }

    #[test]
    fn test_seed_is_lowest_then_leftmost() {
        let hull = convex_hull(&pts(&[(5.0, 0.0), (1.0, 0.0), (3.0, 2.0)]));
        assert_eq!(hull[0], Point::new(1.0, 0.0));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn point_strategy() -> impl Strategy<Value = Point> {
            (-1000.0..1000.0_f64, -1000.0..1000.0_f64).prop_map(|(x, y)| Point::new(x, y))
        }

        proptest! {
            #[test]
            fn test_hull_vertices_are_input_points(
                points in prop::collection::vec(point_strategy(), 1..40)
            ) {
                let hull = convex_hull(&points);
                prop_assert!(!hull.is_empty());
                for v in &hull {
                    prop_assert!(points.contains(v), "hull vertex {:?} not in input", v);
                }
            }

            #[test]
            fn test_all_points_inside_hull(
                points in prop::collection::vec(point_strategy(), 3..40)
            ) {
                let hull = convex_hull(&points);
                if hull.len() < 3 {
                    return Ok(()); // collinear input, containment is trivial
                }
                // Every input point must lie on or left of every CCW hull edge.
                for p in &points {
                    for (a, b) in hull.iter().zip(hull.iter().cycle().skip(1)) {
                        let turn = b.sub(*a).cross(p.sub(*a));
                        prop_assert!(
                            turn >= -1e-6,
                            "point {:?} outside edge {:?}->{:?} (turn {})",
                            p, a, b, turn
                        );
                    }
                }
            }

            #[test]
            fn test_hull_is_convex(
                points in prop::collection::vec(point_strategy(), 3..40)
            ) {
                let hull = convex_hull(&points);
                if hull.len() < 3 {
                    return Ok(());
                }
                let n = hull.len();
                for i in 0..n {
                    let a = hull[i];
                    let b = hull[(i + 1) % n];
                    let c = hull[(i + 2) % n];
                    prop_assert!(
                        b.sub(a).cross(c.sub(b)) > 0.0,
                        "non-left turn at hull vertex {}", (i + 1) % n
                    );
                }
            }
        }
    }
}
