//! Search-node bookkeeping for A*

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::graph::VertexId;

/// Costs recorded for one vertex during a search
///
/// Equality and hashing only look at the vertex, so a node can be looked up
/// regardless of the costs it currently carries.
#[derive(Debug, Clone, Copy)]
pub struct PathNode {
    pub vertex: VertexId,
    /// Cost of the best known route from the start
    pub g_cost: f64,
    /// Straight-line estimate to the goal
    pub h_cost: f64,
    pub f_cost: f64,
    /// Predecessor on the best known route
    pub previous: Option<VertexId>,
}

impl PathNode {
    pub fn new(vertex: VertexId, g_cost: f64, h_cost: f64, previous: Option<VertexId>) -> Self {
        Self {
            vertex,
            g_cost,
            h_cost,
            f_cost: g_cost + h_cost,
            previous,
        }
    }

    /// Replace the route cost, keeping the estimate
    pub fn change_g_cost(&mut self, g_cost: f64, previous: Option<VertexId>) {
        self.g_cost = g_cost;
        self.f_cost = g_cost + self.h_cost;
        self.previous = previous;
    }
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.vertex == other.vertex
    }
}

impl Eq for PathNode {}

impl Hash for PathNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vertex.hash(state);
    }
}

/// Entry of the open set
///
/// Ordered so that a max-heap pops the lowest f first, then the lowest h,
/// then the entry pushed earliest.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpenEntry {
    pub vertex: VertexId,
    pub f_cost: f64,
    pub h_cost: f64,
    pub sequence: u64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.h_cost.total_cmp(&self.h_cost))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BinaryHeap, HashSet};

    fn entry(vertex: usize, f_cost: f64, h_cost: f64, sequence: u64) -> OpenEntry {
        OpenEntry {
            vertex: VertexId(vertex),
            f_cost,
            h_cost,
            sequence,
        }
    }

    #[test]
    fn test_node_identity_is_the_vertex() {
        let a = PathNode::new(VertexId(3), 1.0, 2.0, None);
        let mut b = PathNode::new(VertexId(3), 9.0, 2.0, Some(VertexId(1)));
        assert_eq!(a, b);
        assert_eq!(b.f_cost, 11.0);

        b.change_g_cost(0.5, None);
        assert_eq!(b.f_cost, 2.5);
        assert_eq!(b.previous, None);

        let set: HashSet<PathNode> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_heap_pops_lowest_f_then_h_then_oldest() {
        let mut heap = BinaryHeap::new();
        heap.push(entry(0, 5.0, 1.0, 0));
        heap.push(entry(1, 4.0, 3.0, 1));
        heap.push(entry(2, 4.0, 2.0, 2));
        heap.push(entry(3, 4.0, 2.0, 3));

        let order: Vec<usize> = std::iter::from_fn(|| heap.pop()).map(|e| e.vertex.0).collect();
        assert_eq!(order, vec![2, 3, 1, 0]);
    }
}
