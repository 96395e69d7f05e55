//! Dungeon main structure

use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::cell::Cell;
use crate::config::DungeonConfig;
use crate::error::{DungeonError, GenerationWarning, Result};
use crate::generation::{
    self, carve_rooms, carve_walls, CorridorNetwork, Delaunay, FilterReport, Placement, Room,
    RoomLayout, Voronoi, WallLayout,
};
use crate::geometry::BoundingBox;
use crate::graph::{CellId, VertexId};
use crate::pathfinding::{trigger_zones, AStar, TriggerZone};

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;
#[cfg(feature = "spatial-index")]
use glam::Vec2;

/// A fully generated dungeon floor
///
/// Holds every stage of one generation pass: the base triangulation (filtered
/// down to reachable cells for navigation), its Voronoi dual with room and wall
/// flags, the corridor network and the placement of portals and spawns.
///
/// # Examples
///
/// ```
/// use voronoi_dungeon::*;
///
/// let config = DungeonConfigBuilder::new()
///     .seed(42)
///     .dimensions(160.0, 160.0)
///     .unwrap()
///     .rooms(4, 6)
///     .build()
///     .unwrap();
///
/// let dungeon = Dungeon::generate(config).unwrap();
/// println!("Generated {} rooms over {} cells", dungeon.rooms().len(), dungeon.cell_count());
///
/// if let Some(spawn) = dungeon.placement().player_spawn {
///     println!("Player spawns at vertex {}", spawn);
/// }
/// ```
#[derive(Clone)]
pub struct Dungeon {
    config: DungeonConfig,
    delaunay: Delaunay,
    voronoi: Voronoi,
    layout: RoomLayout,
    walls: WallLayout,
    filter: FilterReport,
    placement: Placement,
    floor_bounds: Option<BoundingBox>,
    trigger_zones: Vec<TriggerZone>,
    warnings: Vec<GenerationWarning>,

    /// Nearest-vertex lookup over navigable sites (requires spatial-index feature)
    #[cfg(feature = "spatial-index")]
    spatial_index: Option<SpatialIndex>,
}

impl Dungeon {
    /// Run a complete generation pass
    ///
    /// All randomness comes from one `ChaCha8Rng` seeded with `config.seed`, so
    /// the same configuration always yields the same dungeon. Soft failures are
    /// collected in [`warnings`](Self::warnings) and logged.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for unusable sampling parameters and
    /// `DegenerateGeometry` when the sample cannot be triangulated.
    pub fn generate(config: DungeonConfig) -> Result<Self> {
        let start = Instant::now();
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let (mut delaunay, mut voronoi) = generation::generate_base(&config, &mut rng)?;
        let layout = carve_rooms(&delaunay, &mut voronoi, &config, &mut rng)?;
        let walls = carve_walls(&mut voronoi, &layout, &config);
        let filter = delaunay.filter_reachable(&walls.reachable_set());

        let (placement, placement_warnings) =
            generation::place(&delaunay, &mut voronoi, &layout, &mut rng);
        let floor_bounds = generation::floor_bounds(&voronoi, &layout);
        let trigger_zones = trigger_zones(&delaunay, &voronoi);

        #[cfg(feature = "spatial-index")]
        let spatial_index = SpatialIndex::new(delaunay.navigable_vertices());

        let mut warnings = layout.warnings.clone();
        warnings.extend(placement_warnings);
        for warning in &warnings {
            tracing::warn!(seed = config.seed, %warning, "dungeon generation incomplete");
        }

        tracing::info!(
            seed = config.seed,
            cells = voronoi.cell_count(),
            rooms = layout.rooms.len(),
            reachable = walls.reachable_cells.len(),
            warnings = warnings.len(),
            elapsed = ?start.elapsed(),
            "dungeon generated"
        );

        Ok(Self {
            config,
            delaunay,
            voronoi,
            layout,
            walls,
            filter,
            placement,
            floor_bounds,
            trigger_zones,
            warnings,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        })
    }

    /// Like [`generate`](Self::generate), but refuses a pass with warnings
    ///
    /// # Errors
    ///
    /// Returns `Incomplete` carrying the warnings in addition to the errors of
    /// [`generate`](Self::generate).
    pub fn generate_strict(config: DungeonConfig) -> Result<Self> {
        let dungeon = Self::generate(config)?;
        if !dungeon.is_complete() {
            return Err(DungeonError::Incomplete(dungeon.warnings));
        }
        Ok(dungeon)
    }

    #[inline]
    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    /// Base triangulation; vertices outside reachable cells are flagged ignored
    #[inline]
    pub fn delaunay(&self) -> &Delaunay {
        &self.delaunay
    }

    #[inline]
    pub fn voronoi(&self) -> &Voronoi {
        &self.voronoi
    }

    #[inline]
    pub fn rooms(&self) -> &[Room] {
        &self.layout.rooms
    }

    #[inline]
    pub fn corridors(&self) -> &CorridorNetwork {
        &self.layout.corridors
    }

    /// Master sites in selection order
    #[inline]
    pub fn masters(&self) -> &[VertexId] {
        &self.layout.masters
    }

    #[inline]
    pub fn walls(&self) -> &WallLayout {
        &self.walls
    }

    /// What the reachability filter flagged on the navigation graph
    #[inline]
    pub fn filter_report(&self) -> &FilterReport {
        &self.filter
    }

    #[inline]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.voronoi.cell_count()
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        self.voronoi.cells()
    }

    /// Get a cell by ID
    ///
    /// Returns `None` if the cell ID is out of bounds.
    #[inline]
    pub fn get_cell(&self, id: CellId) -> Option<&Cell> {
        self.voronoi.cell(id)
    }

    /// Neighbour IDs of a cell, empty for an unknown ID
    pub fn get_neighbors(&self, id: CellId) -> &[CellId] {
        self.voronoi
            .cell(id)
            .map(|c| c.neighbors.as_slice())
            .unwrap_or(&[])
    }

    /// Find cells within a given hop count from a center cell (BFS)
    ///
    /// # Arguments
    ///
    /// * `center` - Starting cell ID
    /// * `hops` - Maximum number of cell hops (0 = just the center cell)
    ///
    /// # Returns
    ///
    /// Cell IDs in visiting order, the center first. Empty if `center` is invalid.
    pub fn find_cells_within_radius(&self, center: CellId, hops: usize) -> Vec<CellId> {
        if self.voronoi.cell(center).is_none() {
            return vec![];
        }

        let mut visited = HashSet::from([center]);
        let mut order = vec![center];
        let mut frontier = VecDeque::from([(center, 0usize)]);

        while let Some((cell, depth)) = frontier.pop_front() {
            if depth == hops {
                continue;
            }
            for &neighbor in self.get_neighbors(cell) {
                if visited.insert(neighbor) {
                    order.push(neighbor);
                    frontier.push_back((neighbor, depth + 1));
                }
            }
        }

        order
    }

    /// Cells that belong to a room, room by room
    pub fn valid_cells(&self) -> Vec<CellId> {
        self.layout
            .rooms
            .iter()
            .flat_map(|r| r.cells.iter().copied())
            .collect()
    }

    #[inline]
    pub fn reachable_cells(&self) -> &[CellId] {
        &self.walls.reachable_cells
    }

    #[inline]
    pub fn trigger_zones(&self) -> &[TriggerZone] {
        &self.trigger_zones
    }

    /// Bounding box of all room vertices, `None` without rooms
    #[inline]
    pub fn floor_bounds(&self) -> Option<BoundingBox> {
        self.floor_bounds
    }

    /// A* search over the filtered navigation graph
    pub fn pathfinder(&self) -> AStar<'_> {
        AStar::new(&self.delaunay)
    }

    /// Shortest navigable route between two sites
    ///
    /// # Errors
    ///
    /// See [`AStar::find_path`].
    pub fn find_path(&self, start: VertexId, goal: VertexId) -> Result<Vec<VertexId>> {
        self.pathfinder().find_path(start, goal)
    }

    /// Route between the sites of two cells
    ///
    /// # Errors
    ///
    /// Returns `CellNotFound` for an unknown cell, otherwise as [`AStar::find_path`].
    pub fn find_path_between_cells(&self, from: CellId, to: CellId) -> Result<Vec<VertexId>> {
        let start = self.get_cell(from).ok_or(DungeonError::CellNotFound(from.0))?.site;
        let goal = self.get_cell(to).ok_or(DungeonError::CellNotFound(to.0))?.site;
        self.find_path(start, goal)
    }

    /// Nearest navigable site to a floor position (requires spatial-index feature)
    ///
    /// Returns `None` when no site is navigable.
    #[cfg(feature = "spatial-index")]
    pub fn find_vertex_at(&self, position: Vec2) -> Option<VertexId> {
        self.spatial_index.as_ref().map(|index| index.find_nearest(position))
    }

    /// Soft failures collected during generation
    #[inline]
    pub fn warnings(&self) -> &[GenerationWarning] {
        &self.warnings
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}
