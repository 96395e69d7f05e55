//! Delaunay triangulation wrapper
//!
//! The triangulation itself comes from the `delaunator` crate. This module turns its
//! flat half-edge output into a typed [`Graph`] with deduplicated edges, triangles
//! that know their sides, and a convex hull computed independently with the
//! monotone chain in [`crate::geometry`].

use std::collections::HashSet;
use std::sync::OnceLock;

use glam::Vec2;

use crate::error::{DungeonError, Result};
use crate::generation::voronoi::Voronoi;
use crate::geometry;
use crate::graph::{CellId, EdgeId, Graph, Vertex, VertexId};

/// Marker used by the triangulator for half-edges without a twin
pub const EMPTY: usize = delaunator::EMPTY;

/// Next half-edge around the same triangle
#[inline]
pub fn next_half_edge(e: usize) -> usize {
    if e % 3 == 2 {
        e - 2
    } else {
        e + 1
    }
}

/// Triangle that owns half-edge `e`
#[inline]
pub fn triangle_of_half_edge(e: usize) -> usize {
    e / 3
}

/// One triangle of a [`Delaunay`] triangulation
///
/// Vertices follow the triangulator's winding. The circumcenter is computed on
/// first request and cached for the lifetime of the triangle, including the
/// outcome for degenerate triangles.
#[derive(Debug, Clone)]
pub struct Triangle {
    pub id: usize,
    pub vertices: [VertexId; 3],
    pub sides: [EdgeId; 3],
    circumcenter: OnceLock<Option<Vec2>>,
}

impl Triangle {
    fn new(id: usize, vertices: [VertexId; 3], sides: [EdgeId; 3]) -> Self {
        Self {
            id,
            vertices,
            sides,
            circumcenter: OnceLock::new(),
        }
    }

    /// Cached circumcenter
    ///
    /// # Errors
    ///
    /// Returns `DegenerateGeometry` for a collinear triangle.
    pub fn circumcenter(&self, graph: &Graph) -> Result<Vec2> {
        let [a, b, c] = self.vertices;
        self.circumcenter
            .get_or_init(|| {
                geometry::circumcenter(graph.position(a), graph.position(b), graph.position(c)).ok()
            })
            .ok_or_else(|| {
                DungeonError::DegenerateGeometry(format!(
                    "triangle {} ({}, {}, {}) has no circumcenter",
                    self.id, a, b, c
                ))
            })
    }

    /// Signed area; the sign gives the winding
    pub fn signed_area(&self, graph: &Graph) -> f64 {
        let [a, b, c] = self.vertices;
        geometry::triangle_signed_area(graph.position(a), graph.position(b), graph.position(c))
    }

    pub fn is_clockwise(&self, graph: &Graph) -> bool {
        self.signed_area(graph) < 0.0
    }
}

/// Outcome of [`Delaunay::filter_reachable`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// Vertices flagged as ignored after the pass
    pub ignored_vertices: usize,
    /// Edges flagged as ignored after the pass
    pub ignored_edges: usize,
    /// Flags whose value differs from before the pass
    pub changed: usize,
}

/// Typed Delaunay triangulation of a planar point set
#[derive(Debug, Clone)]
pub struct Delaunay {
    graph: Graph,
    triangles: Vec<Triangle>,
    edge_triangles: Vec<Vec<usize>>,
    triangle_indices: Vec<usize>,
    halfedges: Vec<usize>,
    boundary: Vec<VertexId>,
    boundary_set: HashSet<VertexId>,
    hull: Vec<VertexId>,
    hull_set: HashSet<VertexId>,
}

impl Delaunay {
    /// Triangulate a point set
    ///
    /// Vertex ids equal the input indices.
    ///
    /// # Errors
    ///
    /// Returns `DegenerateGeometry` for fewer than three points, non-finite or
    /// duplicate coordinates, and input without any triangle (all points collinear).
    ///
    /// # Example
    ///
    /// ```
    /// use glam::Vec2;
    /// use voronoi_dungeon::generation::Delaunay;
    ///
    /// let delaunay = Delaunay::from_points(&[
    ///     Vec2::new(0.0, 0.0),
    ///     Vec2::new(10.0, 0.0),
    ///     Vec2::new(10.0, 10.0),
    ///     Vec2::new(0.0, 10.0),
    ///     Vec2::new(5.0, 4.0),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(delaunay.triangles().len(), 4);
    /// assert_eq!(delaunay.graph().edge_count(), 8);
    /// ```
    pub fn from_points(points: &[Vec2]) -> Result<Self> {
        if points.len() < 3 {
            return Err(DungeonError::DegenerateGeometry(format!(
                "triangulation needs at least 3 points (got {})",
                points.len()
            )));
        }

        let mut graph = Graph::with_capacity(points.len(), points.len() * 3);
        for (i, &p) in points.iter().enumerate() {
            if !p.is_finite() {
                return Err(DungeonError::DegenerateGeometry(format!(
                    "point {} is not finite",
                    i
                )));
            }
            let id = graph.add_vertex(p);
            if id.0 != i {
                return Err(DungeonError::DegenerateGeometry(format!(
                    "point {} duplicates point {} at ({}, {})",
                    i, id, p.x, p.y
                )));
            }
        }

        let input: Vec<delaunator::Point> = points
            .iter()
            .map(|p| delaunator::Point {
                x: p.x as f64,
                y: p.y as f64,
            })
            .collect();
        let triangulation = delaunator::triangulate(&input);
        if triangulation.triangles.is_empty() {
            return Err(DungeonError::DegenerateGeometry(format!(
                "{} points are collinear",
                points.len()
            )));
        }

        // Edges are created grouped by their lower endpoint, each group in the
        // order the pairs first appear in the triangle list.
        let mut by_lower: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
        for t in triangulation.triangles.chunks_exact(3) {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[0], t[2])] {
                let (lo, hi) = (a.min(b), a.max(b));
                if !by_lower[lo].contains(&hi) {
                    by_lower[lo].push(hi);
                }
            }
        }
        for (lo, group) in by_lower.iter().enumerate() {
            for &hi in group {
                graph.connect(VertexId(lo), VertexId(hi));
            }
        }

        let mut triangles = Vec::with_capacity(triangulation.triangles.len() / 3);
        let mut edge_triangles = vec![Vec::new(); graph.edge_count()];
        for (id, t) in triangulation.triangles.chunks_exact(3).enumerate() {
            let vertices = [VertexId(t[0]), VertexId(t[1]), VertexId(t[2])];
            let sides = [
                side(&graph, vertices[0], vertices[1])?,
                side(&graph, vertices[1], vertices[2])?,
                side(&graph, vertices[0], vertices[2])?,
            ];
            for s in sides {
                edge_triangles[s.0].push(id);
            }
            triangles.push(Triangle::new(id, vertices, sides));
        }

        let boundary: Vec<VertexId> = triangulation.hull.iter().map(|&i| VertexId(i)).collect();
        let hull = graph.convex_hull();

        Ok(Self {
            boundary_set: boundary.iter().copied().collect(),
            hull_set: hull.iter().copied().collect(),
            graph,
            triangles,
            edge_triangles,
            triangle_indices: triangulation.triangles,
            halfedges: triangulation.halfedges,
            boundary,
            hull,
        })
    }

    /// Triangulate a subset of another graph's vertices
    ///
    /// Vertex `i` of the result sits at `sites[i]` and inherits its cell reference.
    pub fn from_sites(base: &Graph, sites: &[VertexId]) -> Result<Self> {
        let mut positions = Vec::with_capacity(sites.len());
        for &site in sites {
            let vertex = base
                .vertex(site)
                .ok_or(DungeonError::VertexNotFound(site.0))?;
            positions.push(vertex.position);
        }

        let mut delaunay = Self::from_points(&positions)?;
        for (i, &site) in sites.iter().enumerate() {
            delaunay.graph[VertexId(i)].cell = base[site].cell;
        }
        Ok(delaunay)
    }

    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        self.graph.vertices()
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Flat vertex-index triples as produced by the triangulator
    #[inline]
    pub fn triangle_indices(&self) -> &[usize] {
        &self.triangle_indices
    }

    /// Twin of each half-edge, [`EMPTY`] on the boundary
    #[inline]
    pub fn halfedges(&self) -> &[usize] {
        &self.halfedges
    }

    /// Triangles bordering an edge (one on the boundary, otherwise two)
    pub fn triangles_of_edge(&self, edge: EdgeId) -> &[usize] {
        self.edge_triangles
            .get(edge.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every vertex on the triangulation boundary, collinear ones included
    #[inline]
    pub fn boundary(&self) -> &[VertexId] {
        &self.boundary
    }

    /// Strict convex hull corners, counter-clockwise
    #[inline]
    pub fn hull(&self) -> &[VertexId] {
        &self.hull
    }

    /// Consecutive hull corner pairs, closing back to the first corner
    pub fn hull_edges(&self) -> Vec<[VertexId; 2]> {
        let n = self.hull.len();
        if n < 2 {
            return Vec::new();
        }
        (0..n).map(|i| [self.hull[i], self.hull[(i + 1) % n]]).collect()
    }

    #[inline]
    pub fn is_on_convex_hull(&self, vertex: VertexId) -> bool {
        self.hull_set.contains(&vertex)
    }

    /// Whether the vertex lies on the triangulation boundary
    #[inline]
    pub fn is_on_boundary(&self, vertex: VertexId) -> bool {
        self.boundary_set.contains(&vertex)
    }

    /// Whether the vertex or any of its neighbours lies on the boundary
    pub fn is_on_or_near_convex_hull(&self, vertex: VertexId) -> bool {
        if self.is_on_boundary(vertex) || self.is_on_convex_hull(vertex) {
            return true;
        }
        self.graph
            .vertex(vertex)
            .map(|v| v.neighborhood.iter().any(|&n| self.is_on_boundary(n)))
            .unwrap_or(false)
    }

    /// Build the Voronoi dual and link every site to its cell
    ///
    /// # Errors
    ///
    /// Returns `DegenerateGeometry` when a triangle has no circumcenter.
    pub fn make_voronoi(&mut self) -> Result<Voronoi> {
        let voronoi = Voronoi::from_delaunay(self)?;
        for vertex in self.graph.vertices_mut() {
            vertex.cell = Some(CellId(vertex.id.0));
        }
        Ok(voronoi)
    }

    /// Flag vertices outside the reachable cells, and edges touching them, as ignored
    ///
    /// Nothing is removed, so ids stay valid for structures built earlier. Vertices
    /// without a cell are ignored. Applying the same set twice changes nothing.
    pub fn filter_reachable(&mut self, reachable: &HashSet<CellId>) -> FilterReport {
        let mut report = FilterReport::default();

        for vertex in self.graph.vertices_mut() {
            let ignore = vertex.cell.map_or(true, |cell| !reachable.contains(&cell));
            if vertex.to_ignore != ignore {
                vertex.to_ignore = ignore;
                report.changed += 1;
            }
            if ignore {
                report.ignored_vertices += 1;
            }
        }

        let ignored: Vec<bool> = self.graph.vertices().iter().map(|v| v.to_ignore).collect();
        for edge in self.graph.edges_mut() {
            let ignore = ignored[edge.p.0] || ignored[edge.q.0];
            if edge.to_ignore != ignore {
                edge.to_ignore = ignore;
                report.changed += 1;
            }
            if ignore {
                report.ignored_edges += 1;
            }
        }

        tracing::debug!(
            ignored_vertices = report.ignored_vertices,
            ignored_edges = report.ignored_edges,
            changed = report.changed,
            "reachability filter applied"
        );
        report
    }

    /// Vertices not flagged by the reachability filter
    pub fn navigable_vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.graph.vertices().iter().filter(|v| !v.to_ignore)
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }
}

fn side(graph: &Graph, a: VertexId, b: VertexId) -> Result<EdgeId> {
    graph.find_edge(a, b).ok_or_else(|| {
        DungeonError::DegenerateGeometry(format!("triangle side {}-{} was not created", a, b))
    })
}
