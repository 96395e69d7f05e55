//! Planar geometry primitives
//!
//! Free functions over `glam::Vec2` used by the graph, triangulation and carving
//! stages. Intermediate products are computed in `f64`; positions are stored as `f32`.

mod hull;

pub use hull::convex_hull;

use glam::{DVec2, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{DungeonError, Result};

/// Tolerance below which two segments are treated as parallel
pub const INTERSECTION_EPSILON: f64 = 1e-5;

/// 2x2 determinant `| a b ; c d |`
#[inline]
pub fn determinant2(a: f64, b: f64, c: f64, d: f64) -> f64 {
    a * d - b * c
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    a.as_dvec2().distance(b.as_dvec2())
}

/// Angle of the ray from `from` to `to`, in radians within `[-π, π]`
#[inline]
pub fn angle_of_rotation(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Point reached by travelling `distance` from `origin` along angle `theta`
pub fn endpoint_of_line_rotation(origin: Vec2, theta: f32, distance: f32) -> Vec2 {
    origin + Vec2::new(theta.cos(), theta.sin()) * distance
}

/// Intersection point of segments `ab` and `cd`
///
/// Returns `None` when the segments are parallel (or collinear) or when the
/// crossing point of the supporting lines lies outside either segment.
/// Segments that touch at an endpoint intersect.
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use voronoi_dungeon::geometry::find_intersection;
///
/// let hit = find_intersection(
///     Vec2::new(-1.0, 0.0),
///     Vec2::new(1.0, 0.0),
///     Vec2::new(0.0, -1.0),
///     Vec2::new(0.0, 1.0),
/// );
/// assert_eq!(hit, Some(Vec2::ZERO));
/// ```
pub fn find_intersection(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> Option<Vec2> {
    let (a, b, c, d) = (a.as_dvec2(), b.as_dvec2(), c.as_dvec2(), d.as_dvec2());

    let denominator = (d.x - c.x) * (a.y - b.y) - (a.x - b.x) * (d.y - c.y);
    if denominator.abs() < INTERSECTION_EPSILON {
        return None;
    }

    let ta = ((c.y - d.y) * (a.x - c.x) + (d.x - c.x) * (a.y - c.y)) / denominator;
    let tb = ((a.y - b.y) * (a.x - c.x) + (b.x - a.x) * (a.y - c.y)) / denominator;
    if !(0.0..=1.0).contains(&ta) || !(0.0..=1.0).contains(&tb) {
        return None;
    }

    Some((a + (b - a) * ta).as_vec2())
}

/// Circumcenter of the triangle `abc`
///
/// # Errors
///
/// Returns `DegenerateGeometry` when the triangle is (nearly) collinear, so
/// that the circumcenter lies at or beyond floating-point infinity.
pub fn circumcenter(a: Vec2, b: Vec2, c: Vec2) -> Result<Vec2> {
    let (a, b, c) = (a.as_dvec2(), b.as_dvec2(), c.as_dvec2());
    let db = b - a;
    let dc = c - a;

    let bl = db.length_squared();
    let cl = dc.length_squared();
    let d = determinant2(db.x, db.y, dc.x, dc.y);

    if d.abs() <= 1e-12 * bl.max(cl) || d == 0.0 {
        return Err(DungeonError::DegenerateGeometry(format!(
            "collinear triangle ({}, {}), ({}, {}), ({}, {}) has no circumcenter",
            a.x, a.y, b.x, b.y, c.x, c.y
        )));
    }

    let center = DVec2::new(
        a.x + (dc.y * bl - db.y * cl) * 0.5 / d,
        a.y + (db.x * cl - dc.x * bl) * 0.5 / d,
    );
    if !center.is_finite() {
        return Err(DungeonError::DegenerateGeometry(
            "circumcenter is not finite".to_string(),
        ));
    }
    Ok(center.as_vec2())
}

/// Signed area of triangle `abc`; positive when counter-clockwise
pub fn triangle_signed_area(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    let (a, b, c) = (a.as_dvec2(), b.as_dvec2(), c.as_dvec2());
    0.5 * determinant2(b.x - a.x, b.y - a.y, c.x - a.x, c.y - a.y)
}

/// Absolute area of a simple polygon given its vertices in boundary order
///
/// Fewer than three vertices have zero area.
pub fn polygon_area(points: &[Vec2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        sum += determinant2(p.x as f64, q.x as f64, p.y as f64, q.y as f64);
    }
    (sum * 0.5).abs()
}

/// Shortest distance from point `p` to segment `ab`
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Shortest distance between segments `ab` and `cd`
pub fn segment_distance(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> f32 {
    if find_intersection(a, b, c, d).is_some() {
        return 0.0;
    }
    point_segment_distance(a, c, d)
        .min(point_segment_distance(b, c, d))
        .min(point_segment_distance(c, a, b))
        .min(point_segment_distance(d, a, b))
}

/// Axis-aligned bounding box
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec2,
    pub max: Vec2,
}

impl BoundingBox {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    /// Smallest box containing all points, `None` for an empty iterator
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Width divided by height; infinite for a box of zero height
    pub fn aspect_ratio(&self) -> f32 {
        if self.height() == 0.0 {
            return f32::INFINITY;
        }
        self.width() / self.height()
    }

    /// Inclusive containment test
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Box of the same center with both extents multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        let half = (self.max - self.min) * 0.5 * factor;
        let center = self.center();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &BoundingBox) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}
