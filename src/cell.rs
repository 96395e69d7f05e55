//! Voronoi Cell Structure
//!
//! Represents one Voronoi region of the dungeon floor with its boundary, neighbours
//! and carving state.

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;
use crate::graph::{CellId, Graph, Polygon, RoomId, VertexId};

/// A single Voronoi cell of the dungeon floor
///
/// Each cell surrounds exactly one Delaunay site and carries:
/// - An ID equal to the site's vertex ID
/// - The site position as its center
/// - A boundary polygon over the Voronoi graph
/// - Neighbor connectivity (cells whose sites share a Delaunay edge)
/// - The room, reachability and portal flags written by later stages
///
/// # Design Notes
///
/// Cells on the convex hull of the sample set are unbounded in a true Voronoi
/// diagram. They are kept with `bounded == false` and an area of zero so that
/// the "too large" and "closed" checks of room carving skip them.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Cell {
    /// Unique identifier, equal to the index of the site in the Delaunay graph
    pub id: CellId,

    /// Delaunay vertex this cell surrounds
    pub site: VertexId,

    /// Position of the site
    pub center: Vec2,

    /// Boundary over the Voronoi graph, vertices ordered counter-clockwise
    pub polygon: Polygon,

    /// IDs of adjacent cells
    ///
    /// Two cells are neighbours when their sites are joined by a Delaunay edge.
    pub neighbors: Vec<CellId>,

    /// Room this cell was absorbed into, if any
    pub room: Option<RoomId>,

    /// Whether the cell is enclosed by the playable area
    ///
    /// Defaults to `true`; wall carving clears it for cells walled in on every
    /// side or poking outside the playable bounds.
    pub reachable: bool,

    /// Whether a portal was placed in this cell
    pub has_portal: bool,

    /// Polygon area, zero for unbounded cells
    pub area: f64,

    /// False for cells whose site lies on the convex hull
    pub bounded: bool,
}

impl Cell {
    /// Create a new cell around a site
    ///
    /// This is typically called while building the Voronoi diagram, not by user code.
    pub fn new(site: VertexId, center: Vec2, neighbors: Vec<CellId>) -> Self {
        Self {
            id: CellId(site.0),
            site,
            center,
            polygon: Polygon::new(),
            neighbors,
            room: None,
            reachable: true,
            has_portal: false,
            area: 0.0,
            bounded: true,
        }
    }

    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn is_neighbor_of(&self, other: CellId) -> bool {
        self.neighbors.contains(&other)
    }

    /// Number of boundary vertices
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.polygon.vertices.len()
    }

    /// Whether the boundary forms a closed ring in the Voronoi graph
    pub fn is_closed(&self, voronoi: &Graph) -> bool {
        self.polygon.is_closed(voronoi)
    }

    pub fn bounding_box(&self, voronoi: &Graph) -> Option<BoundingBox> {
        self.polygon.bounding_box(voronoi)
    }

    /// Straight-line distance between the two sites
    pub fn distance_to(&self, other: &Cell) -> f32 {
        self.center.distance(other.center)
    }

    #[inline]
    pub fn in_room(&self) -> bool {
        self.room.is_some()
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.site == other.site
    }
}

impl Eq for Cell {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cell_creation() {
        let cell = Cell::new(VertexId(4), Vec2::new(1.0, 2.0), vec![CellId(1), CellId(2), CellId(3)]);

        assert_eq!(cell.id, CellId(4));
        assert_eq!(cell.neighbor_count(), 3);
        assert!(cell.is_neighbor_of(CellId(1)));
        assert!(!cell.is_neighbor_of(CellId(99)));
        assert!(cell.reachable);
        assert!(!cell.has_portal);
        assert!(!cell.in_room());
    }

    #[test]
    fn test_cell_square_area() {
        let mut voronoi = Graph::new();
        let ids: Vec<VertexId> = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)]
            .into_iter()
            .map(|(x, y)| voronoi.add_vertex(Vec2::new(x, y)))
            .collect();
        // sides in scrambled order so the vertices need sorting
        let sides = [(0, 1), (2, 3), (1, 2), (3, 0)]
            .into_iter()
            .filter_map(|(a, b)| voronoi.connect(ids[a], ids[b]))
            .collect();

        let mut cell = Cell::new(VertexId(0), Vec2::ZERO, Vec::new());
        cell.polygon = Polygon::from_sides(sides, &voronoi);
        cell.polygon.order_counter_clockwise(&voronoi, cell.center);

        assert!(cell.is_closed(&voronoi));
        assert_eq!(cell.vertex_count(), 4);
        assert_relative_eq!(cell.polygon.area(&voronoi), 2.0);
    }

    #[test]
    fn test_distance_to() {
        let a = Cell::new(VertexId(0), Vec2::new(0.0, 0.0), Vec::new());
        let b = Cell::new(VertexId(1), Vec2::new(3.0, 4.0), Vec::new());
        assert_eq!(a.distance_to(&b), 5.0);
        assert_ne!(a, b);
    }
}
