//! Spatial indexing for fast position-to-vertex lookups
//!
//! This module is only available with the `spatial-index` feature.

#[cfg(feature = "spatial-index")]
use glam::Vec2;
#[cfg(feature = "spatial-index")]
use kiddo::immutable::float::kdtree::ImmutableKdTree;
#[cfg(feature = "spatial-index")]
use kiddo::SquaredEuclidean;

#[cfg(feature = "spatial-index")]
use crate::graph::{Vertex, VertexId};

/// KD-tree over a set of graph vertices
///
/// Maps a floor position to the nearest indexed vertex, which is how actors are
/// localised on the navigation graph before a path search.
///
/// # Performance
///
/// - Construction: O(n log n)
/// - Query: O(log n)
#[cfg(feature = "spatial-index")]
#[derive(Clone)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f32, usize, 2, 32>,
    ids: Vec<VertexId>,
}

#[cfg(feature = "spatial-index")]
impl SpatialIndex {
    /// Build an index over the given vertices
    ///
    /// Returns `None` when there is nothing to index.
    ///
    /// # Example
    ///
    /// ```
    /// use glam::Vec2;
    /// use voronoi_dungeon::graph::{Graph, VertexId};
    ///
    /// # #[cfg(feature = "spatial-index")]
    /// # {
    /// use voronoi_dungeon::SpatialIndex;
    ///
    /// let mut graph = Graph::new();
    /// graph.add_vertex(Vec2::new(0.0, 0.0));
    /// graph.add_vertex(Vec2::new(10.0, 0.0));
    ///
    /// let index = SpatialIndex::new(graph.vertices()).unwrap();
    /// assert_eq!(index.find_nearest(Vec2::new(8.0, 1.0)), VertexId(1));
    /// # }
    /// ```
    pub fn new<'a, I>(vertices: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Vertex>,
    {
        let (points, ids): (Vec<[f32; 2]>, Vec<VertexId>) = vertices
            .into_iter()
            .map(|v| ([v.x(), v.y()], v.id))
            .unzip();
        if ids.is_empty() {
            return None;
        }

        Some(Self {
            tree: ImmutableKdTree::new_from_slice(&points),
            ids,
        })
    }

    /// Nearest indexed vertex to a position
    pub fn find_nearest(&self, position: Vec2) -> VertexId {
        let query = [position.x, position.y];
        let result = self.tree.nearest_one::<SquaredEuclidean>(&query);
        self.ids[result.item as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
#[cfg(feature = "spatial-index")]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn test_spatial_index_basic() {
        let mut graph = Graph::new();
        for (x, y) in [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)] {
            graph.add_vertex(Vec2::new(x, y));
        }
        let index = SpatialIndex::new(graph.vertices()).unwrap();

        assert_eq!(index.len(), 4);
        assert_eq!(index.find_nearest(Vec2::new(0.9, 0.1)), VertexId(0));
        assert_eq!(index.find_nearest(Vec2::new(0.0, 0.95)), VertexId(1));
        assert_eq!(index.find_nearest(Vec2::new(-0.8, 0.0)), VertexId(2));
        assert_eq!(index.find_nearest(Vec2::new(0.1, -3.0)), VertexId(3));
    }

    #[test]
    fn test_spatial_index_keeps_vertex_ids() {
        let mut graph = Graph::new();
        for x in 0..6 {
            graph.add_vertex(Vec2::new(x as f32 * 10.0, 0.0));
        }
        // index only the odd vertices
        let index = SpatialIndex::new(graph.vertices().iter().filter(|v| v.id.0 % 2 == 1)).unwrap();

        assert_eq!(index.find_nearest(Vec2::new(0.0, 0.0)), VertexId(1));
        assert_eq!(index.find_nearest(Vec2::new(39.0, 0.0)), VertexId(3));
        assert_eq!(index.find_nearest(Vec2::new(100.0, 0.0)), VertexId(5));
    }

    #[test]
    fn test_spatial_index_empty() {
        assert!(SpatialIndex::new(std::iter::empty::<&Vertex>()).is_none());
    }
}
