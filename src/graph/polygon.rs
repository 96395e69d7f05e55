use std::collections::HashSet;

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{EdgeId, Graph, VertexId};
use crate::geometry::{self, BoundingBox};

/// A polygon described by edges (sides) of a [`Graph`]
///
/// `vertices` holds each distinct side endpoint once. Area and bounding box
/// read the vertices in their stored order, so call
/// [`order_counter_clockwise`](Polygon::order_counter_clockwise) first when the
/// sides were not collected in boundary order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    pub sides: Vec<EdgeId>,
    pub vertices: Vec<VertexId>,
}

impl Polygon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Polygon bounded by `sides`, vertices taken from the side endpoints
    pub fn from_sides(sides: Vec<EdgeId>, graph: &Graph) -> Self {
        let mut polygon = Self {
            sides,
            vertices: Vec::new(),
        };
        polygon.set_vertices_from_sides(graph);
        polygon
    }

    /// Polygon with vertices only; sides are added by the caller
    pub fn from_vertices(vertices: Vec<VertexId>) -> Self {
        Self {
            sides: Vec::new(),
            vertices,
        }
    }

    /// Recollect the distinct side endpoints, in first-seen order
    pub fn set_vertices_from_sides(&mut self, graph: &Graph) {
        let mut seen = HashSet::with_capacity(self.sides.len() * 2);
        self.vertices.clear();
        for &side in &self.sides {
            for endpoint in graph[side].endpoints() {
                if seen.insert(endpoint) {
                    self.vertices.push(endpoint);
                }
            }
        }
    }

    /// Add a side unless it is already present; returns whether it was added
    pub fn add_side(&mut self, side: EdgeId) -> bool {
        if self.sides.contains(&side) {
            return false;
        }
        self.sides.push(side);
        true
    }

    #[inline]
    pub fn contains_side(&self, side: EdgeId) -> bool {
        self.sides.contains(&side)
    }

    /// Whether the sides form a closed ring
    ///
    /// Requires at least three vertices and sides, and every vertex must have at
    /// least two graph neighbours among the polygon's own vertices.
    pub fn is_closed(&self, graph: &Graph) -> bool {
        if self.vertices.len() < 3 || self.sides.len() < 3 {
            return false;
        }
        let members: HashSet<VertexId> = self.vertices.iter().copied().collect();
        self.vertices.iter().all(|&v| {
            graph[v]
                .neighborhood
                .iter()
                .filter(|n| members.contains(*n))
                .count()
                >= 2
        })
    }

    /// Vertex positions in stored order
    pub fn positions(&self, graph: &Graph) -> Vec<Vec2> {
        self.vertices.iter().map(|&v| graph.position(v)).collect()
    }

    /// Absolute area; zero with fewer than three sides
    pub fn area(&self, graph: &Graph) -> f64 {
        if self.sides.len() < 3 {
            return 0.0;
        }
        geometry::polygon_area(&self.positions(graph))
    }

    /// Sort vertices by angle around `center`, counter-clockwise from the negative x axis
    pub fn order_counter_clockwise(&mut self, graph: &Graph, center: Vec2) {
        self.vertices.sort_by(|&a, &b| {
            let angle_a = geometry::angle_of_rotation(center, graph.position(a));
            let angle_b = geometry::angle_of_rotation(center, graph.position(b));
            angle_a.total_cmp(&angle_b)
        });
    }

    /// Bounding box of the vertices; `None` with fewer than three vertices
    pub fn bounding_box(&self, graph: &Graph) -> Option<BoundingBox> {
        if self.vertices.len() < 3 {
            return None;
        }
        BoundingBox::from_points(self.vertices.iter().map(|&v| graph.position(v)))
    }

    /// Mean of the vertex positions
    pub fn centroid(&self, graph: &Graph) -> Option<Vec2> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum: Vec2 = self.vertices.iter().map(|&v| graph.position(v)).sum();
        Some(sum / self.vertices.len() as f32)
    }
}
