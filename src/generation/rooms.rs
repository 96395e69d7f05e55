//! Room and corridor carving
//!
//! Picks well separated "master" sites, links them with a spanning tree of their
//! own triangulation plus a few extra edges, and grows a room of Voronoi cells
//! around each master.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use glam::Vec2;
use rand::Rng;

use crate::config::DungeonConfig;
use crate::error::{DungeonError, GenerationWarning, Result};
use crate::generation::delaunay::Delaunay;
use crate::generation::voronoi::Voronoi;
use crate::geometry::{self, BoundingBox};
use crate::graph::{CellId, EdgeId, Graph, Polygon, RoomId, VertexId};

/// Cells larger than this never seed or join a room
pub const MAX_CELL_AREA: f64 = 2048.0;

/// Whether a cell may belong to a room
fn admissible(voronoi: &Voronoi, cell: CellId) -> bool {
    voronoi.cell(cell).map_or(false, |c| {
        c.bounded && c.area < MAX_CELL_AREA && c.is_closed(voronoi.graph())
    })
}

/// A connected cluster of Voronoi cells grown from one master site
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    /// Master vertex in the base Delaunay graph
    pub site: VertexId,
    /// Member cells, seed first
    pub cells: Vec<CellId>,
    /// Sides used by exactly one member cell
    pub exterior: Polygon,
    /// Sides shared by two member cells
    pub interior_edges: Vec<EdgeId>,
    pub bounding_box: Option<BoundingBox>,
}

impl Room {
    /// Claim the cell around `site` as the first cell of a new room
    ///
    /// Returns `None` when the cell is unbounded, too large, or already claimed.
    pub fn seed(id: RoomId, site: VertexId, voronoi: &mut Voronoi) -> Option<Self> {
        let cell_id = CellId(site.0);
        let cell = voronoi.cell(cell_id)?;
        if !cell.bounded || cell.area >= MAX_CELL_AREA || cell.room.is_some() {
            return None;
        }

        voronoi.cells_mut()[cell_id.0].room = Some(id);
        let mut room = Self {
            id,
            site,
            cells: vec![cell_id],
            exterior: Polygon::new(),
            interior_edges: Vec::new(),
            bounding_box: None,
        };
        room.refresh(voronoi);
        Some(room)
    }

    /// Absorb every admissible, unclaimed neighbour of the current members
    ///
    /// Only neighbours of cells that were members before the call are
    /// considered. Returns the number of cells added.
    pub fn grow(&mut self, voronoi: &mut Voronoi) -> usize {
        let members = self.cells.len();
        let mut added = 0;

        for i in 0..members {
            let neighbors = voronoi.cells()[self.cells[i].0].neighbors.clone();
            for neighbor in neighbors {
                let claimed = voronoi.cell(neighbor).map_or(true, |c| c.room.is_some());
                if claimed || !admissible(voronoi, neighbor) {
                    continue;
                }
                voronoi.cells_mut()[neighbor.0].room = Some(self.id);
                self.cells.push(neighbor);
                added += 1;
            }
        }

        if added > 0 {
            self.refresh(voronoi);
        }
        added
    }

    /// Recompute exterior, interior edges and bounding box from the member cells
    pub fn refresh(&mut self, voronoi: &Voronoi) {
        let mut order: Vec<EdgeId> = Vec::new();
        let mut uses: HashMap<EdgeId, usize> = HashMap::new();
        for &cell in &self.cells {
            for &side in &voronoi.cells()[cell.0].polygon.sides {
                let count = uses.entry(side).or_insert(0);
                if *count == 0 {
                    order.push(side);
                }
                *count += 1;
            }
        }

        let (exterior, interior): (Vec<EdgeId>, Vec<EdgeId>) =
            order.into_iter().partition(|side| uses[side] == 1);
        self.exterior = Polygon::from_sides(exterior, voronoi.graph());
        self.interior_edges = interior;
        self.bounding_box = self.exterior.bounding_box(voronoi.graph());
    }

    /// Distinct Voronoi vertices of all member cells
    pub fn vertices(&self, voronoi: &Voronoi) -> Vec<VertexId> {
        let mut seen = HashSet::new();
        self.cells
            .iter()
            .flat_map(|c| voronoi.cells()[c.0].polygon.vertices.iter().copied())
            .filter(|v| seen.insert(*v))
            .collect()
    }

    /// Every side of every member cell, once
    pub fn edges(&self) -> Vec<EdgeId> {
        self.exterior
            .sides
            .iter()
            .chain(&self.interior_edges)
            .copied()
            .collect()
    }

    #[inline]
    pub fn contains(&self, cell: CellId) -> bool {
        self.cells.contains(&cell)
    }
}

/// One piece of track laid along a corridor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPiece {
    pub position: Vec2,
    /// Direction of the corridor, in radians
    pub angle: f32,
}

/// Corridor skeleton linking the master sites
///
/// Vertex `i` of [`graph`](CorridorNetwork::graph) sits on `masters()[i]`.
#[derive(Debug, Clone)]
pub struct CorridorNetwork {
    graph: Graph,
    masters: Vec<VertexId>,
    spanning_tree: Vec<EdgeId>,
    added_back: Vec<EdgeId>,
}

impl CorridorNetwork {
    /// Triangulate the masters, keep a BFS spanning tree and restore a share of
    /// the remaining edges
    ///
    /// With fewer than three masters, or masters on a single line, the masters
    /// are chained in selection order and a warning is returned.
    pub fn build<R: Rng + ?Sized>(
        base: &Graph,
        masters: &[VertexId],
        percentage_to_add_back: f32,
        rng: &mut R,
    ) -> Result<(Self, Option<GenerationWarning>)> {
        let triangulated = if masters.len() >= 3 {
            match Delaunay::from_sites(base, masters) {
                Ok(delaunay) => Some(delaunay.into_graph()),
                Err(DungeonError::DegenerateGeometry(reason)) => {
                    tracing::debug!(%reason, "master points cannot be triangulated");
                    None
                }
                Err(err) => return Err(err),
            }
        } else {
            None
        };

        let Some(graph) = triangulated else {
            let network = Self::chain(base, masters)?;
            let warning = GenerationWarning::CorridorGraphDegenerate {
                masters: masters.len(),
            };
            return Ok((network, Some(warning)));
        };

        let spanning_tree = graph.spanning_tree_bfs().unwrap_or_default();
        let in_tree: HashSet<EdgeId> = spanning_tree.iter().copied().collect();
        let spare: Vec<EdgeId> = graph
            .edges()
            .iter()
            .map(|e| e.id)
            .filter(|e| !in_tree.contains(e))
            .collect();

        let wanted = (spare.len() as f32 * percentage_to_add_back).ceil() as usize;
        let wanted = wanted.min(spare.len());
        let mut added_back: Vec<EdgeId> = rand::seq::index::sample(rng, spare.len(), wanted)
            .into_iter()
            .map(|i| spare[i])
            .collect();
        added_back.sort_unstable();

        Ok((
            Self {
                graph,
                masters: masters.to_vec(),
                spanning_tree,
                added_back,
            },
            None,
        ))
    }

    fn chain(base: &Graph, masters: &[VertexId]) -> Result<Self> {
        let mut graph = Graph::with_capacity(masters.len(), masters.len().saturating_sub(1));
        let mut ids = Vec::with_capacity(masters.len());
        for &master in masters {
            let vertex = base
                .vertex(master)
                .ok_or(DungeonError::VertexNotFound(master.0))?;
            let id = graph.add_vertex(vertex.position);
            graph[id].cell = vertex.cell;
            ids.push(id);
        }
        let spanning_tree = ids
            .windows(2)
            .filter_map(|pair| graph.connect(pair[0], pair[1]))
            .collect();

        Ok(Self {
            graph,
            masters: masters.to_vec(),
            spanning_tree,
            added_back: Vec::new(),
        })
    }

    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[inline]
    pub fn masters(&self) -> &[VertexId] {
        &self.masters
    }

    #[inline]
    pub fn spanning_tree(&self) -> &[EdgeId] {
        &self.spanning_tree
    }

    #[inline]
    pub fn added_back(&self) -> &[EdgeId] {
        &self.added_back
    }

    /// Spanning-tree edges followed by the restored edges
    pub fn corridors(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.spanning_tree.iter().chain(&self.added_back).copied()
    }

    /// Endpoint positions of every corridor
    pub fn segments(&self) -> Vec<(Vec2, Vec2)> {
        self.corridors().map(|e| self.graph.segment(e)).collect()
    }

    /// Evenly spaced track pieces along every corridor
    ///
    /// Each corridor of length `l` receives `ceil(l / piece_length)` pieces,
    /// the last one at the far endpoint.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `piece_length` is not a positive finite number.
    pub fn track_pieces(&self, piece_length: f32) -> Result<Vec<TrackPiece>> {
        if !piece_length.is_finite() || piece_length <= 0.0 {
            return Err(DungeonError::InvalidConfig(format!(
                "track piece length must be positive (got {})",
                piece_length
            )));
        }

        let mut pieces = Vec::new();
        for id in self.corridors() {
            let edge = &self.graph[id];
            let (p, q) = self.graph.segment(id);
            let count = ((edge.length / piece_length).ceil() as usize).max(1);
            for k in 1..=count {
                pieces.push(TrackPiece {
                    position: p.lerp(q, k as f32 / count as f32),
                    angle: edge.angle,
                });
            }
        }
        Ok(pieces)
    }
}

/// Rooms and corridors of one generation pass
#[derive(Debug, Clone)]
pub struct RoomLayout {
    /// Master sites in selection order
    pub masters: Vec<VertexId>,
    pub corridors: CorridorNetwork,
    pub rooms: Vec<Room>,
    pub warnings: Vec<GenerationWarning>,
}

/// Pick master sites from the base triangulation
///
/// A candidate is rejected when it is already chosen, on or next to the convex
/// hull, inside an unbounded or oversized cell, or closer than the configured
/// spacing to a chosen master. Selection gives up after as many consecutive
/// rejections as there are vertices and reports the shortfall.
pub fn select_master_points<R: Rng + ?Sized>(
    delaunay: &Delaunay,
    voronoi: &Voronoi,
    config: &DungeonConfig,
    rng: &mut R,
) -> (Vec<VertexId>, Option<GenerationWarning>) {
    let requested = rng.gen_range(config.room_range());
    let graph = delaunay.graph();
    let budget = graph.vertex_count();
    let spacing = config.minimum_distance_between_master_points;

    let mut masters: Vec<VertexId> = Vec::with_capacity(requested);
    let mut rejections = 0;

    while masters.len() < requested && rejections < budget {
        let candidate = VertexId(rng.gen_range(0..budget));
        let cell_ok = voronoi
            .cell(CellId(candidate.0))
            .map_or(false, |c| c.bounded && c.area <= MAX_CELL_AREA);
        let position = graph.position(candidate);
        let spaced = masters
            .iter()
            .all(|&m| geometry::distance(graph.position(m), position) >= spacing);

        if !cell_ok || !spaced || masters.contains(&candidate) || delaunay.is_on_or_near_convex_hull(candidate) {
            rejections += 1;
            continue;
        }

        masters.push(candidate);
        rejections = 0;
    }

    let warning = (masters.len() < requested).then(|| GenerationWarning::FewerRoomsThanRequested {
        requested,
        placed: masters.len(),
    });
    (masters, warning)
}

/// Select masters, build the corridor network and grow the rooms
pub fn carve_rooms<R: Rng + ?Sized>(
    delaunay: &Delaunay,
    voronoi: &mut Voronoi,
    config: &DungeonConfig,
    rng: &mut R,
) -> Result<RoomLayout> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let (masters, warning) = select_master_points(delaunay, voronoi, config, rng);
    warnings.extend(warning);

    let (corridors, warning) = CorridorNetwork::build(
        delaunay.graph(),
        &masters,
        config.percentage_of_edges_to_add_back,
        rng,
    )?;
    warnings.extend(warning);

    let mut rooms: Vec<Room> = Vec::with_capacity(masters.len());
    for &master in &masters {
        match Room::seed(RoomId(rooms.len()), master, voronoi) {
            Some(room) => rooms.push(room),
            None => warnings.push(GenerationWarning::RoomSeedRejected { cell: master.0 }),
        }
    }

    for _ in 0..config.room_growth_radius {
        for room in &mut rooms {
            room.grow(voronoi);
        }
    }

    tracing::debug!(
        masters = masters.len(),
        corridors = corridors.corridors().count(),
        rooms = rooms.len(),
        room_cells = rooms.iter().map(|r| r.cells.len()).sum::<usize>(),
        elapsed = ?start.elapsed(),
        "rooms carved"
    );

    Ok(RoomLayout {
        masters,
        corridors,
        rooms,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DungeonConfigBuilder;
    use crate::generation::PoissonSampler;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn base(seed: u64) -> (Delaunay, Voronoi, ChaCha8Rng) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points = PoissonSampler::new(4.0, 160.0, 160.0).unwrap().sample(&mut rng);
        let mut delaunay = Delaunay::from_points(&points).unwrap();
        let voronoi = delaunay.make_voronoi().unwrap();
        (delaunay, voronoi, rng)
    }

    fn config() -> DungeonConfig {
        DungeonConfigBuilder::new()
            .seed(0)
            .dimensions(160.0, 160.0)
            .unwrap()
            .rooms(5, 7)
            .minimum_distance_between_master_points(30.0)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_masters_are_spaced_and_interior() {
        let (delaunay, voronoi, mut rng) = base(1);
        let config = config();
        let (masters, _) = select_master_points(&delaunay, &voronoi, &config, &mut rng);

        assert!(!masters.is_empty());
        for (i, &a) in masters.iter().enumerate() {
            assert!(!delaunay.is_on_or_near_convex_hull(a));
            for &b in &masters[i + 1..] {
                let d = geometry::distance(delaunay.graph().position(a), delaunay.graph().position(b));
                assert!(d >= config.minimum_distance_between_master_points);
            }
        }
    }

    #[test]
    fn test_overconstrained_selection_warns() {
        let (delaunay, voronoi, mut rng) = base(2);
        let config = DungeonConfigBuilder::new()
            .seed(0)
            .rooms(40, 40)
            .minimum_distance_between_master_points(150.0)
            .unwrap()
            .build()
            .unwrap();

        let (masters, warning) = select_master_points(&delaunay, &voronoi, &config, &mut rng);
        assert!(masters.len() < 40);
        assert_eq!(
            warning,
            Some(GenerationWarning::FewerRoomsThanRequested {
                requested: 40,
                placed: masters.len()
            })
        );
    }

    #[test]
    fn test_rooms_do_not_overlap() {
        let (delaunay, mut voronoi, mut rng) = base(3);
        let layout = carve_rooms(&delaunay, &mut voronoi, &config(), &mut rng).unwrap();

        let mut owner: HashMap<CellId, RoomId> = HashMap::new();
        for room in &layout.rooms {
            for &cell in &room.cells {
                assert!(owner.insert(cell, room.id).is_none(), "cell {} in two rooms", cell);
                assert_eq!(voronoi.cell(cell).unwrap().room, Some(room.id));
            }
        }
        let flagged = voronoi.cells().iter().filter(|c| c.room.is_some()).count();
        assert_eq!(flagged, owner.len());
    }

    #[test]
    fn test_growth_adds_neighbors() {
        let (delaunay, mut voronoi, mut rng) = base(4);
        let (masters, _) = select_master_points(&delaunay, &voronoi, &config(), &mut rng);

        let mut room = Room::seed(RoomId(0), masters[0], &mut voronoi).unwrap();
        assert_eq!(room.cells.len(), 1);
        let seed_sides = voronoi.cells()[masters[0].0].polygon.sides.len();
        assert_eq!(room.exterior.sides.len(), seed_sides);
        assert!(room.interior_edges.is_empty());

        let added = room.grow(&mut voronoi);
        assert!(added > 0);
        assert_eq!(room.cells.len(), 1 + added);
        assert!(!room.interior_edges.is_empty());
        for side in &room.interior_edges {
            assert!(!room.exterior.contains_side(*side));
        }
        assert!(room.bounding_box.is_some());
        assert_eq!(room.edges().len(), room.exterior.sides.len() + room.interior_edges.len());
    }

    #[test]
    fn test_corridor_add_back_count() {
        let (delaunay, voronoi, mut rng) = base(5);
        let (masters, _) = select_master_points(&delaunay, &voronoi, &config(), &mut rng);
        assert!(masters.len() >= 3);

        for percentage in [0.0f32, 0.3, 1.0] {
            let (network, warning) =
                CorridorNetwork::build(delaunay.graph(), &masters, percentage, &mut rng).unwrap();
            assert!(warning.is_none());

            let edges = network.graph().edge_count();
            let tree = network.spanning_tree().len();
            assert_eq!(tree, masters.len() - 1);
            let expected = ((edges - tree) as f32 * percentage).ceil() as usize;
            assert_eq!(network.added_back().len(), expected);

            let unique: HashSet<EdgeId> = network.corridors().collect();
            assert_eq!(unique.len(), tree + expected);
        }
    }

    #[test]
    fn test_two_masters_fall_back_to_chain() {
        let (delaunay, _, mut rng) = base(6);
        let masters = [VertexId(10), VertexId(20)];
        let (network, warning) =
            CorridorNetwork::build(delaunay.graph(), &masters, 0.5, &mut rng).unwrap();

        assert_eq!(warning, Some(GenerationWarning::CorridorGraphDegenerate { masters: 2 }));
        assert_eq!(network.spanning_tree().len(), 1);
        assert!(network.added_back().is_empty());
    }

    #[test]
    fn test_track_pieces_end_on_corridor_endpoints() {
        let mut graph = Graph::new();
        let a = graph.add_vertex(Vec2::new(0.0, 0.0));
        let b = graph.add_vertex(Vec2::new(10.0, 0.0));
        let network = CorridorNetwork::chain(&graph, &[a, b]).unwrap();

        let pieces = network.track_pieces(3.0).unwrap();
        assert_eq!(pieces.len(), 4);
        assert_eq!(pieces.last().unwrap().position, Vec2::new(10.0, 0.0));
        assert!(pieces.iter().all(|p| p.angle == 0.0));
        assert!(network.track_pieces(0.0).is_err());
    }
}
