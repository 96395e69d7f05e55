//! Planar graph arena
//!
//! Vertices and edges live in flat vectors owned by a [`Graph`] and refer to one
//! another through copyable index handles. Adjacency is kept on both endpoints,
//! so walking a vertex's neighbourhood never needs to scan the edge list.

mod polygon;

pub use polygon::Polygon;

use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::{Index, IndexMut};

use glam::{Vec2, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{self, angle_of_rotation};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

handle!(
    /// Index of a vertex inside its owning graph
    VertexId
);
handle!(
    /// Index of an edge inside its owning graph
    EdgeId
);
handle!(
    /// Index of a Voronoi cell; equal to the id of the Delaunay site it surrounds
    CellId
);
handle!(
    /// Index of a room in generation order
    RoomId
);

/// Hashable bit pattern of a position, with `-0.0` folded onto `0.0`
fn position_key(position: Vec2) -> (u32, u32) {
    let fold = |v: f32| if v == 0.0 { 0.0f32.to_bits() } else { v.to_bits() };
    (fold(position.x), fold(position.y))
}

/// A point of a planar graph
///
/// Two vertices are equal when their coordinates are equal, regardless of id
/// or adjacency.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: VertexId,
    pub position: Vec2,
    /// Adjacent vertices; the i-th entry is the far end of `incident_edges[i]`
    pub neighborhood: Vec<VertexId>,
    pub incident_edges: Vec<EdgeId>,
    /// Voronoi cell surrounding this vertex, once the dual has been built
    pub cell: Option<CellId>,
    /// Excluded from navigation by the reachability filter
    pub to_ignore: bool,
}

impl Vertex {
    pub fn new(x: f32, y: f32) -> Self {
        Self::at(VertexId(0), Vec2::new(x, y))
    }

    fn at(id: VertexId, position: Vec2) -> Self {
        Self {
            id,
            position,
            neighborhood: Vec::new(),
            incident_edges: Vec::new(),
            cell: None,
            to_ignore: false,
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn distance_to(&self, other: &Vertex) -> f64 {
        geometry::distance(self.position, other.position)
    }

    /// Angle of the ray towards `other`, in radians
    pub fn angle_to(&self, other: &Vertex) -> f32 {
        angle_of_rotation(self.position, other.position)
    }

    /// Lift into 3D with the plane's y axis mapped onto z and `height` on y
    pub fn to_vec3_at_height(&self, height: f32) -> Vec3 {
        Vec3::new(self.position.x, height, self.position.y)
    }

    /// Nearest vertex of `candidates`, `None` when empty
    pub fn find_nearest_in<'a, I>(&self, candidates: I) -> Option<&'a Vertex>
    where
        I: IntoIterator<Item = &'a Vertex>,
    {
        candidates
            .into_iter()
            .min_by(|a, b| self.distance_to(a).total_cmp(&self.distance_to(b)))
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        position_key(self.position) == position_key(other.position)
    }
}

impl Eq for Vertex {}

impl std::hash::Hash for Vertex {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        position_key(self.position).hash(state);
    }
}

/// An undirected edge between two vertices of the same graph
///
/// `Edge(a, b)` and `Edge(b, a)` compare and hash equal.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub p: VertexId,
    pub q: VertexId,
    pub length: f32,
    /// Angle from `p` towards `q`, in radians
    pub angle: f32,
    /// Voronoi cells bordered by this edge (at most two)
    pub cells: Vec<CellId>,
    pub is_wall: bool,
    pub to_ignore: bool,
}

impl Edge {
    /// Build an edge without registering it on its endpoints
    ///
    /// Use [`Graph::connect`] to add an edge to a graph.
    pub fn new(id: EdgeId, p: &Vertex, q: &Vertex) -> Self {
        Self {
            id,
            p: p.id,
            q: q.id,
            length: p.position.distance(q.position),
            angle: p.angle_to(q),
            cells: Vec::new(),
            is_wall: false,
            to_ignore: false,
        }
    }

    #[inline]
    pub fn endpoints(&self) -> [VertexId; 2] {
        [self.p, self.q]
    }

    #[inline]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.p == vertex || self.q == vertex
    }

    /// The endpoint that is not `vertex`, `None` if `vertex` is not on this edge
    pub fn other(&self, vertex: VertexId) -> Option<VertexId> {
        if self.p == vertex {
            Some(self.q)
        } else if self.q == vertex {
            Some(self.p)
        } else {
            None
        }
    }

    #[inline]
    fn key(&self) -> (VertexId, VertexId) {
        endpoint_key(self.p, self.q)
    }
}

fn endpoint_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    (a.min(b), a.max(b))
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Arena of vertices and undirected edges
#[derive(Debug, Clone, Default)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    by_position: HashMap<(u32, u32), VertexId>,
    by_endpoints: HashMap<(VertexId, VertexId), EdgeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            edges: Vec::with_capacity(edges),
            by_position: HashMap::with_capacity(vertices),
            by_endpoints: HashMap::with_capacity(edges),
        }
    }

    /// Add a vertex, or return the existing one at the same coordinates
    pub fn add_vertex(&mut self, position: Vec2) -> VertexId {
        let key = position_key(position);
        if let Some(&id) = self.by_position.get(&key) {
            return id;
        }
        let id = VertexId(self.vertices.len());
        self.vertices.push(Vertex::at(id, position));
        self.by_position.insert(key, id);
        id
    }

    /// Join two vertices with an edge, updating both endpoints
    ///
    /// Returns the existing edge when the pair is already connected and `None`
    /// for a self loop.
    pub fn connect(&mut self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        if a == b {
            return None;
        }
        let key = endpoint_key(a, b);
        if let Some(&id) = self.by_endpoints.get(&key) {
            return Some(id);
        }

        let id = EdgeId(self.edges.len());
        let edge = Edge::new(id, &self.vertices[a.0], &self.vertices[b.0]);
        self.edges.push(edge);
        self.by_endpoints.insert(key, id);

        let va = &mut self.vertices[a.0];
        va.neighborhood.push(b);
        va.incident_edges.push(id);
        let vb = &mut self.vertices[b.0];
        vb.neighborhood.push(a);
        vb.incident_edges.push(id);

        Some(id)
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0)
    }

    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(id.0)
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    #[inline]
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id.0)
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    pub fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        id.0 < self.vertices.len()
    }

    /// Position of a vertex
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this graph.
    #[inline]
    pub fn position(&self, id: VertexId) -> Vec2 {
        self.vertices[id.0].position
    }

    /// Endpoint positions of an edge
    pub fn segment(&self, id: EdgeId) -> (Vec2, Vec2) {
        let edge = &self.edges[id.0];
        (self.position(edge.p), self.position(edge.q))
    }

    /// Edge joining `a` and `b`, in either direction
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.by_endpoints.get(&endpoint_key(a, b)).copied()
    }

    /// Vertex at exactly these coordinates
    pub fn find_vertex(&self, position: Vec2) -> Option<VertexId> {
        self.by_position.get(&position_key(position)).copied()
    }

    /// Closest vertex to a position by linear scan
    pub fn find_nearest(&self, position: Vec2) -> Option<VertexId> {
        self.vertices
            .iter()
            .min_by(|a, b| {
                a.position
                    .distance_squared(position)
                    .total_cmp(&b.position.distance_squared(position))
            })
            .map(|v| v.id)
    }

    /// Intersection point of two edges, treated as closed segments
    pub fn edge_intersection(&self, a: EdgeId, b: EdgeId) -> Option<Vec2> {
        let (p1, q1) = self.segment(a);
        let (p2, q2) = self.segment(b);
        geometry::find_intersection(p1, q1, p2, q2)
    }

    /// Convex hull of all vertices, counter-clockwise
    pub fn convex_hull(&self) -> Vec<VertexId> {
        let positions: Vec<Vec2> = self.vertices.iter().map(|v| v.position).collect();
        geometry::convex_hull(&positions)
            .into_iter()
            .map(VertexId)
            .collect()
    }

    /// Breadth-first spanning tree rooted at the first vertex
    ///
    /// Neighbours are visited in insertion order, so the tree is deterministic
    /// for a given construction order. Returns `None` for graphs with fewer than
    /// two vertices or without edges. Vertices unreachable from the root are
    /// left out of the tree.
    pub fn spanning_tree_bfs(&self) -> Option<Vec<EdgeId>> {
        if self.vertices.len() < 2 || self.edges.is_empty() {
            return None;
        }

        let root = VertexId(0);
        let mut visited: HashSet<VertexId> = HashSet::from([root]);
        let mut queue: VecDeque<VertexId> = VecDeque::from([root]);
        let mut tree = Vec::with_capacity(self.vertices.len() - 1);

        while let Some(current) = queue.pop_front() {
            let vertex = &self.vertices[current.0];
            for (&neighbor, &edge) in vertex.neighborhood.iter().zip(&vertex.incident_edges) {
                if visited.insert(neighbor) {
                    tree.push(edge);
                    queue.push_back(neighbor);
                }
            }
        }

        Some(tree)
    }
}

impl Index<VertexId> for Graph {
    type Output = Vertex;

    fn index(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0]
    }
}

impl IndexMut<VertexId> for Graph {
    fn index_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.0]
    }
}

impl Index<EdgeId> for Graph {
    type Output = Edge;

    fn index(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }
}

impl IndexMut<EdgeId> for Graph {
    fn index_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.0]
    }
}
