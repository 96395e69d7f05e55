//! Andrew's monotone chain convex hull

use glam::{DVec2, Vec2};

fn cross(o: DVec2, a: DVec2, b: DVec2) -> f64 {
    (a - o).perp_dot(b - o)
}

/// Convex hull of a point set
///
/// Returns indices into `points`, counter-clockwise, starting at the
/// lowest-leftmost point, with no repeated closing index. Duplicate points are
/// collapsed to their first occurrence and points lying on a hull edge are
/// dropped. Fully collinear input yields its two extreme points; a single
/// distinct point yields one index.
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use voronoi_dungeon::geometry::convex_hull;
///
/// let points = [
///     Vec2::new(0.0, 0.0),
///     Vec2::new(2.0, 0.0),
///     Vec2::new(1.0, 1.0), // interior
///     Vec2::new(2.0, 2.0),
///     Vec2::new(0.0, 2.0),
///     Vec2::new(1.0, 0.0), // on an edge
/// ];
/// assert_eq!(convex_hull(&points), vec![0, 1, 3, 4]);
/// ```
pub fn convex_hull(points: &[Vec2]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len())
        .filter(|&i| points[i].is_finite())
        .collect();
    order.sort_by(|&i, &j| {
        points[i]
            .x
            .total_cmp(&points[j].x)
            .then(points[i].y.total_cmp(&points[j].y))
            .then(i.cmp(&j))
    });
    order.dedup_by(|later, earlier| points[*later] == points[*earlier]);

    if order.len() < 3 {
        return order;
    }

    let at = |i: usize| points[i].as_dvec2();
    let mut hull: Vec<usize> = Vec::with_capacity(order.len() * 2);

    // Lower chain, then upper chain; `floor` protects the finished lower chain.
    for pass in [order.iter().copied().collect::<Vec<_>>(), order.iter().rev().copied().collect()] {
        let floor = hull.len();
        for i in pass {
            while hull.len() >= floor + 2
                && cross(at(hull[hull.len() - 2]), at(hull[hull.len() - 1]), at(i)) <= 0.0
            {
                hull.pop();
            }
            hull.push(i);
        }
        hull.pop();
    }

    hull
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_square_with_duplicates_and_collinear() {
        let points = [
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.5, 0.0),
            Vec2::new(0.0, 0.0),
        ];
        assert_eq!(convex_hull(&points), vec![1, 2, 0, 4]);
    }

    #[test]
    fn test_collinear_input() {
        let points = [Vec2::new(2.0, 2.0), Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)];
        assert_eq!(convex_hull(&points), vec![1, 0]);
    }

    #[test]
    fn test_tiny_inputs() {
        assert!(convex_hull(&[]).is_empty());
        assert_eq!(convex_hull(&[Vec2::ONE]), vec![0]);
        assert_eq!(convex_hull(&[Vec2::ONE, Vec2::ONE]), vec![0]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn hull_is_convex_and_encloses_every_point(
            coords in prop::collection::vec((-100i32..100, -100i32..100), 3..60)
        ) {
            let points: Vec<Vec2> = coords
                .iter()
                .map(|&(x, y)| Vec2::new(x as f32, y as f32))
                .collect();
            let hull = convex_hull(&points);

            if hull.len() >= 3 {
                for k in 0..hull.len() {
                    let a = points[hull[k]].as_dvec2();
                    let b = points[hull[(k + 1) % hull.len()]].as_dvec2();
                    let c = points[hull[(k + 2) % hull.len()]].as_dvec2();
                    // strictly convex, counter-clockwise turn
                    prop_assert!(cross(a, b, c) > 0.0);
                    for p in &points {
                        prop_assert!(cross(a, b, p.as_dvec2()) >= 0.0);
                    }
                }
            }
        }
    }
}
