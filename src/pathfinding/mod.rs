//! A* navigation over the dungeon's Delaunay graph
//!
//! Searches run read-only over a [`Graph`], skipping anything the reachability
//! filter flagged as ignored. Several searches may share one graph across threads.

mod node;
mod triggers;

pub use node::PathNode;
pub use triggers::{trigger_zones, TriggerZone, MAX_TRIGGER_ASPECT, MIN_TRIGGER_ASPECT};

use std::collections::{BinaryHeap, HashMap};

use node::OpenEntry;

use crate::error::{DungeonError, Result};
use crate::generation::Delaunay;
use crate::graph::{Graph, VertexId};

/// A* pathfinder bound to a navigation graph
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use voronoi_dungeon::generation::Delaunay;
/// use voronoi_dungeon::graph::VertexId;
/// use voronoi_dungeon::pathfinding::AStar;
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
/// let path = AStar::new(&delaunay).find_path(VertexId(0), VertexId(2)).unwrap();
/// assert_eq!(path.first(), Some(&VertexId(0)));
/// assert_eq!(path.last(), Some(&VertexId(2)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AStar<'a> {
    graph: &'a Graph,
}

impl<'a> AStar<'a> {
    pub fn new(delaunay: &'a Delaunay) -> Self {
        Self::over(delaunay.graph())
    }

    /// Search an arbitrary graph
    pub fn over(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// Shortest route from `start` to `goal`
    ///
    /// The path begins with `start` and ends with `goal`. It is empty when both
    /// sit at the same position.
    ///
    /// # Errors
    ///
    /// - `VertexNotFound` if either id is not in the graph
    /// - `NoPathFound` if the goal cannot be reached without crossing ignored
    ///   vertices or edges
    pub fn find_path(&self, start: VertexId, goal: VertexId) -> Result<Vec<VertexId>> {
        Ok(self.search(start, goal)?.into_iter().map(|n| n.vertex).collect())
    }

    /// Like [`find_path`](Self::find_path), but keeps the costs of every step
    pub fn search(&self, start: VertexId, goal: VertexId) -> Result<Vec<PathNode>> {
        let graph = self.graph;
        let origin = graph.vertex(start).ok_or(DungeonError::VertexNotFound(start.0))?;
        let target = graph.vertex(goal).ok_or(DungeonError::VertexNotFound(goal.0))?;
        if origin.position == target.position {
            return Ok(Vec::new());
        }

        let heuristic = |v: VertexId| graph[v].distance_to(target);

        let mut nodes: HashMap<VertexId, PathNode> = HashMap::new();
        // sequence number of the live open entry per vertex; older entries are stale
        let mut live: HashMap<VertexId, u64> = HashMap::new();
        let mut open = BinaryHeap::new();
        let mut sequence = 0u64;
        let mut expanded = 0usize;

        let first = PathNode::new(start, 0.0, heuristic(start), None);
        nodes.insert(start, first);
        live.insert(start, sequence);
        open.push(OpenEntry {
            vertex: start,
            f_cost: first.f_cost,
            h_cost: first.h_cost,
            sequence,
        });

        while let Some(entry) = open.pop() {
            if live.get(&entry.vertex) != Some(&entry.sequence) {
                continue;
            }
            live.remove(&entry.vertex);

            if entry.vertex == goal {
                tracing::trace!(%start, %goal, expanded, "path found");
                return Ok(backtrack(&nodes, goal));
            }
            expanded += 1;

            let current = nodes[&entry.vertex];
            let vertex = &graph[entry.vertex];
            for (&neighbor, &edge) in vertex.neighborhood.iter().zip(&vertex.incident_edges) {
                if graph[neighbor].to_ignore || graph[edge].to_ignore {
                    continue;
                }

                let cost = current.g_cost + vertex.distance_to(&graph[neighbor]);
                let node = match nodes.get_mut(&neighbor) {
                    Some(known) if known.g_cost <= cost => continue,
                    Some(known) => {
                        known.change_g_cost(cost, Some(current.vertex));
                        *known
                    }
                    None => {
                        let fresh = PathNode::new(neighbor, cost, heuristic(neighbor), Some(current.vertex));
                        nodes.insert(neighbor, fresh);
                        fresh
                    }
                };

                sequence += 1;
                live.insert(neighbor, sequence);
                open.push(OpenEntry {
                    vertex: neighbor,
                    f_cost: node.f_cost,
                    h_cost: node.h_cost,
                    sequence,
                });
            }
        }

        tracing::trace!(%start, %goal, expanded, "open set exhausted");
        Err(DungeonError::NoPathFound {
            start: start.0,
            goal: goal.0,
        })
    }

    /// Total Euclidean length of a path
    pub fn path_length(&self, path: &[VertexId]) -> f64 {
        path.windows(2)
            .map(|pair| self.graph[pair[0]].distance_to(&self.graph[pair[1]]))
            .sum()
    }
}

fn backtrack(nodes: &HashMap<VertexId, PathNode>, goal: VertexId) -> Vec<PathNode> {
    let mut path = Vec::new();
    let mut cursor = Some(goal);
    while let Some(vertex) = cursor {
        let Some(node) = nodes.get(&vertex) else {
            break;
        };
        path.push(*node);
        cursor = node.previous;
    }
    path.reverse();
    path
}
