//! Wall carving
//!
//! Raises walls on every Voronoi edge that separates open floor from anything
//! else, then opens the walls that block a corridor and decides which cells the
//! player can reach.

use std::collections::HashSet;
use std::time::Instant;

use crate::config::DungeonConfig;
use crate::generation::rooms::RoomLayout;
use crate::generation::voronoi::Voronoi;
use crate::geometry::{self, BoundingBox};
use crate::graph::{CellId, EdgeId, Graph, VertexId};
use glam::Vec2;

/// Width of the widest character that has to squeeze through an opening
pub const CONTROLLER_DIAMETER: f32 = 6.0;

/// Openings shorter than this get a neighbouring wall removed as well
const NARROW_OPENING: f32 = CONTROLLER_DIAMETER * 2.0;

/// Walls this many hall widths from a corridor stay renderable
const KEEP_RADIUS_FACTOR: f32 = 4.0;

/// Playable area margin around the sampled domain
const PLAYABLE_MARGIN: f32 = 1.1;

/// Result of wall carving
#[derive(Debug, Clone)]
pub struct WallLayout {
    /// Edges still standing as walls, ascending
    pub walls: Vec<EdgeId>,
    /// Edges that were walls and got opened, in opening order
    pub opened: Vec<EdgeId>,
    /// Walls that need a physical instance: near a corridor or on a room exterior
    pub renderable: Vec<EdgeId>,
    pub playable_bounds: BoundingBox,
    /// Cells flagged reachable, ascending
    pub reachable_cells: Vec<CellId>,
}

impl WallLayout {
    /// Reachable cells as a set, the shape the reachability filter expects
    pub fn reachable_set(&self) -> HashSet<CellId> {
        self.reachable_cells.iter().copied().collect()
    }

    #[inline]
    pub fn is_renderable(&self, edge: EdgeId) -> bool {
        self.renderable.binary_search(&edge).is_ok()
    }
}

/// Raise, open and cull walls, then flag reachable cells
///
/// Writes `is_wall` on the Voronoi edges and `reachable` on every cell. Running
/// it again on the same layout gives the same result.
pub fn carve_walls(voronoi: &mut Voronoi, layout: &RoomLayout, config: &DungeonConfig) -> WallLayout {
    let start = Instant::now();
    let (graph, cells) = voronoi.parts_mut();

    for edge in graph.edges_mut() {
        edge.is_wall = false;
    }

    let mut exterior: HashSet<EdgeId> = HashSet::new();
    for room in &layout.rooms {
        exterior.extend(room.exterior.sides.iter().copied());
    }
    for cell in cells.iter().filter(|c| c.room.is_none()) {
        for &side in &cell.polygon.sides {
            graph[side].is_wall = true;
        }
    }
    for &side in &exterior {
        graph[side].is_wall = true;
    }

    let corridors = layout.corridors.segments();
    let mut opened: Vec<EdgeId> = Vec::new();
    let mut narrow: Vec<EdgeId> = Vec::new();
    let mut keep: HashSet<EdgeId> = HashSet::new();
    let keep_radius = config.hall_width * KEEP_RADIUS_FACTOR;

    for &(a, b) in &corridors {
        for id in 0..graph.edge_count() {
            let id = EdgeId(id);
            if !graph[id].is_wall {
                continue;
            }
            let (p, q) = graph.segment(id);
            let gap = geometry::segment_distance(a, b, p, q);
            if gap > keep_radius {
                continue;
            }

            keep.insert(id);
            let edge = &mut graph[id];
            if gap <= config.hall_width {
                edge.is_wall = false;
                opened.push(id);
                if edge.length < NARROW_OPENING {
                    narrow.push(id);
                }
            }
        }
    }

    for &id in &narrow {
        if let Some(widened) = widen_opening(graph, id) {
            keep.remove(&widened);
            opened.push(widened);
        }
    }

    let playable_bounds =
        BoundingBox::new(Vec2::ZERO, Vec2::new(config.width, config.height)).scaled(PLAYABLE_MARGIN);

    let mut reachable_cells = Vec::new();
    for cell in cells.iter_mut() {
        let walled_in = cell.polygon.sides.iter().all(|&s| graph[s].is_wall);
        let inside = cell
            .polygon
            .vertices
            .iter()
            .all(|&v| playable_bounds.contains(graph.position(v)));
        cell.reachable = !walled_in && inside;
        if cell.reachable {
            reachable_cells.push(cell.id);
        }
    }

    let walls: Vec<EdgeId> = graph.edges().iter().filter(|e| e.is_wall).map(|e| e.id).collect();
    let renderable: Vec<EdgeId> = walls
        .iter()
        .copied()
        .filter(|id| keep.contains(id) || exterior.contains(id))
        .collect();

    tracing::debug!(
        walls = walls.len(),
        opened = opened.len(),
        narrow = narrow.len(),
        renderable = renderable.len(),
        reachable = reachable_cells.len(),
        elapsed = ?start.elapsed(),
        "walls carved"
    );

    WallLayout {
        walls,
        opened,
        renderable,
        playable_bounds,
        reachable_cells,
    }
}

/// Open one more wall next to a narrow opening
///
/// Picks the endpoint of `opening` with fewer standing walls; on a tie the one
/// whose shortest wall is not the longer of the two. Opens the shortest wall at
/// that endpoint and returns it, or `None` when there is nothing to open.
pub fn widen_opening(graph: &mut Graph, opening: EdgeId) -> Option<EdgeId> {
    let edge = graph.edge(opening)?;
    let (p, q) = (edge.p, edge.q);

    let (p_walls, p_shortest) = standing_walls(graph, p);
    let (q_walls, q_shortest) = standing_walls(graph, q);

    let side = if p_walls < q_walls {
        p
    } else if p_walls > q_walls {
        q
    } else if p_walls == 0 {
        return None;
    } else if p_shortest > q_shortest {
        q
    } else {
        p
    };

    let shortest = graph[side]
        .incident_edges
        .iter()
        .copied()
        .filter(|&e| graph[e].is_wall)
        .min_by(|&a, &b| graph[a].length.total_cmp(&graph[b].length))?;
    graph[shortest].is_wall = false;
    Some(shortest)
}

/// Count of standing walls at a vertex and the length of the shortest one
fn standing_walls(graph: &Graph, vertex: VertexId) -> (usize, f32) {
    graph[vertex]
        .incident_edges
        .iter()
        .map(|&e| &graph[e])
        .filter(|e| e.is_wall)
        .fold((0, f32::INFINITY), |(count, shortest), e| {
            (count + 1, shortest.min(e.length))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DungeonConfigBuilder;
    use crate::generation::delaunay::Delaunay;
    use crate::generation::rooms::carve_rooms;
    use crate::generation::PoissonSampler;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn carved(seed: u64) -> (Voronoi, RoomLayout, DungeonConfig, WallLayout) {
        let config = DungeonConfigBuilder::new()
            .seed(seed)
            .dimensions(160.0, 160.0)
            .unwrap()
            .rooms(5, 7)
            .minimum_distance_between_master_points(30.0)
            .unwrap()
            .build()
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points = PoissonSampler::new(4.0, 160.0, 160.0).unwrap().sample(&mut rng);
        let mut delaunay = Delaunay::from_points(&points).unwrap();
        let mut voronoi = delaunay.make_voronoi().unwrap();
        let layout = carve_rooms(&delaunay, &mut voronoi, &config, &mut rng).unwrap();
        let walls = carve_walls(&mut voronoi, &layout, &config);
        (voronoi, layout, config, walls)
    }

    /// Star of three edges around `center`, lengths 1, 2 and 3
    fn star(graph: &mut Graph, center: Vec2) -> (VertexId, [EdgeId; 3]) {
        let c = graph.add_vertex(center);
        let mut edges = [EdgeId(0); 3];
        for (i, offset) in [Vec2::X, Vec2::Y * 2.0, Vec2::NEG_Y * 3.0].into_iter().enumerate() {
            let v = graph.add_vertex(center + offset);
            edges[i] = graph.connect(c, v).unwrap();
            graph[edges[i]].is_wall = true;
        }
        (c, edges)
    }

    #[test]
    fn test_no_wall_blocks_a_corridor() {
        let (voronoi, layout, config, _) = carved(1);
        for (a, b) in layout.corridors.segments() {
            for edge in voronoi.graph().edges().iter().filter(|e| e.is_wall) {
                let (p, q) = voronoi.graph().segment(edge.id);
                assert!(geometry::segment_distance(a, b, p, q) > config.hall_width);
            }
        }
    }

    #[test]
    fn test_room_interiors_are_open() {
        let (voronoi, layout, _, walls) = carved(2);
        for room in &layout.rooms {
            for edge in &room.interior_edges {
                assert!(!voronoi.graph()[*edge].is_wall);
                assert!(!walls.walls.contains(edge));
            }
        }
    }

    #[test]
    fn test_layout_matches_edge_flags() {
        let (voronoi, _, _, walls) = carved(3);
        let flagged: Vec<EdgeId> = voronoi
            .graph()
            .edges()
            .iter()
            .filter(|e| e.is_wall)
            .map(|e| e.id)
            .collect();
        assert_eq!(walls.walls, flagged);
        for id in &walls.opened {
            assert!(!voronoi.graph()[*id].is_wall);
        }
        for id in &walls.renderable {
            assert!(walls.walls.contains(id));
            assert!(walls.is_renderable(*id));
        }
    }

    #[test]
    fn test_reachability_flags_agree() {
        let (voronoi, _, _, walls) = carved(4);
        assert!(!walls.reachable_cells.is_empty());
        assert!((walls.playable_bounds.min.x + 8.0).abs() < 1e-3);
        assert!((walls.playable_bounds.max.y - 168.0).abs() < 1e-3);

        let reachable = walls.reachable_set();
        for cell in voronoi.cells() {
            assert_eq!(cell.reachable, reachable.contains(&cell.id));
            if cell.reachable {
                assert!(cell.polygon.sides.iter().any(|s| !voronoi.graph()[*s].is_wall));
            }
            if cell.polygon.sides.is_empty() {
                assert!(!cell.reachable);
            }
        }
    }

    #[test]
    fn test_room_cells_are_reachable() {
        let (voronoi, layout, _, walls) = carved(5);
        let reachable = walls.reachable_set();
        for room in &layout.rooms {
            if room.cells.len() > 1 {
                assert!(room.cells.iter().any(|c| reachable.contains(c)));
            }
        }
        assert_eq!(voronoi.cells().iter().filter(|c| c.reachable).count(), reachable.len());
    }

    #[test]
    fn test_carving_twice_is_stable() {
        let (mut voronoi, layout, config, first) = carved(6);
        let second = carve_walls(&mut voronoi, &layout, &config);
        assert_eq!(first.walls, second.walls);
        assert_eq!(first.reachable_cells, second.reachable_cells);
    }

    #[test]
    fn test_widen_prefers_endpoint_with_fewer_walls() {
        let mut graph = Graph::new();
        let (p, p_edges) = star(&mut graph, Vec2::ZERO);
        let q = graph.add_vertex(Vec2::new(-5.0, 0.0));
        let opening = graph.connect(p, q).unwrap();
        // q has a single standing wall
        let r = graph.add_vertex(Vec2::new(-5.0, 4.0));
        let lone = graph.connect(q, r).unwrap();
        graph[lone].is_wall = true;

        assert_eq!(widen_opening(&mut graph, opening), Some(lone));
        assert!(!graph[lone].is_wall);
        assert!(p_edges.iter().all(|e| graph[*e].is_wall));
    }

    #[test]
    fn test_widen_tie_opens_shortest_wall() {
        let mut graph = Graph::new();
        let (p, p_edges) = star(&mut graph, Vec2::ZERO);
        let (q, q_edges) = star(&mut graph, Vec2::new(20.0, 0.0));
        let opening = graph.connect(p, q).unwrap();
        // make q's shortest wall longer than p's
        graph[q_edges[0]].length = 1.5;

        assert_eq!(widen_opening(&mut graph, opening), Some(p_edges[0]));
        assert!(graph[q_edges[0]].is_wall);
    }

    #[test]
    fn test_widen_without_walls_does_nothing() {
        let mut graph = Graph::new();
        let p = graph.add_vertex(Vec2::ZERO);
        let q = graph.add_vertex(Vec2::X);
        let opening = graph.connect(p, q).unwrap();

        assert_eq!(widen_opening(&mut graph, opening), None);
        assert_eq!(widen_opening(&mut graph, EdgeId(42)), None);
    }
}
