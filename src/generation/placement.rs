//! Portal and spawn placement

use rand::seq::SliceRandom;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::GenerationWarning;
use crate::generation::delaunay::Delaunay;
use crate::generation::rooms::RoomLayout;
use crate::generation::voronoi::Voronoi;
use crate::geometry::BoundingBox;
use crate::graph::{CellId, VertexId};

/// Where the portals and the two actors start
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    /// Portal leading one floor deeper
    pub delve_portal: Option<CellId>,
    /// Portal leading out of the dungeon
    pub escape_portal: Option<CellId>,
    /// Master site the player starts on
    pub player_spawn: Option<VertexId>,
    /// Navigable site the pursuer starts on
    pub pursuer_spawn: Option<VertexId>,
}

/// Place both portals on room cells, then pick spawn sites away from them
///
/// Portals land on distinct cells whenever there are at least two room cells.
/// The player spawns on a master whose cell holds no portal; the pursuer on a
/// navigable Delaunay vertex whose cell holds no portal. Anything without a
/// candidate is left as `None` and reported.
pub fn place<R: Rng + ?Sized>(
    delaunay: &Delaunay,
    voronoi: &mut Voronoi,
    layout: &RoomLayout,
    rng: &mut R,
) -> (Placement, Vec<GenerationWarning>) {
    let mut placement = Placement::default();
    let mut warnings = Vec::new();

    let room_cells: Vec<CellId> = layout.rooms.iter().flat_map(|r| r.cells.iter().copied()).collect();

    placement.delve_portal = room_cells.choose(rng).copied();
    let remaining: Vec<CellId> = room_cells
        .iter()
        .copied()
        .filter(|c| Some(*c) != placement.delve_portal)
        .collect();
    placement.escape_portal = remaining.choose(rng).copied().or(placement.delve_portal);

    for (kind, portal) in [("delve", placement.delve_portal), ("escape", placement.escape_portal)] {
        match portal {
            Some(cell) => voronoi.cells_mut()[cell.0].has_portal = true,
            None => warnings.push(GenerationWarning::PortalNotPlaced { kind }),
        }
    }

    let voronoi: &Voronoi = voronoi;
    let free = |site: VertexId| {
        delaunay.graph()[site]
            .cell
            .and_then(|c| voronoi.cell(c))
            .map_or(false, |c| !c.has_portal)
    };

    let players: Vec<VertexId> = layout
        .masters
        .iter()
        .copied()
        .filter(|&m| free(m))
        .collect();
    placement.player_spawn = players.choose(rng).copied();

    let pursuers: Vec<VertexId> = delaunay
        .navigable_vertices()
        .map(|v| v.id)
        .filter(|&v| free(v))
        .collect();
    placement.pursuer_spawn = pursuers.choose(rng).copied();

    if placement.player_spawn.is_none() {
        warnings.push(GenerationWarning::SpawnNotPlaced { kind: "player" });
    }
    if placement.pursuer_spawn.is_none() {
        warnings.push(GenerationWarning::SpawnNotPlaced { kind: "pursuer" });
    }

    tracing::debug!(?placement, "portals and spawns placed");
    (placement, warnings)
}

/// Bounding box of every Voronoi vertex that belongs to a room
pub fn floor_bounds(voronoi: &Voronoi, layout: &RoomLayout) -> Option<BoundingBox> {
    let graph = voronoi.graph();
    BoundingBox::from_points(
        layout
            .rooms
            .iter()
            .flat_map(|room| room.vertices(voronoi))
            .map(|v| graph.position(v)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DungeonConfigBuilder;
    use crate::generation::rooms::{carve_rooms, CorridorNetwork};
    use crate::generation::PoissonSampler;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup(seed: u64) -> (Delaunay, Voronoi, RoomLayout, ChaCha8Rng) {
        let config = DungeonConfigBuilder::new()
            .seed(seed)
            .dimensions(160.0, 160.0)
            .unwrap()
            .rooms(4, 6)
            .minimum_distance_between_master_points(30.0)
            .unwrap()
            .build()
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points = PoissonSampler::new(4.0, 160.0, 160.0).unwrap().sample(&mut rng);
        let mut delaunay = Delaunay::from_points(&points).unwrap();
        let mut voronoi = delaunay.make_voronoi().unwrap();
        let layout = carve_rooms(&delaunay, &mut voronoi, &config, &mut rng).unwrap();
        (delaunay, voronoi, layout, rng)
    }

    #[test]
    fn test_portals_on_distinct_room_cells() {
        let (delaunay, mut voronoi, layout, mut rng) = setup(1);
        let (placement, warnings) = place(&delaunay, &mut voronoi, &layout, &mut rng);

        assert!(warnings.is_empty(), "{:?}", warnings);
        let delve = placement.delve_portal.unwrap();
        let escape = placement.escape_portal.unwrap();
        assert_ne!(delve, escape);
        for cell in [delve, escape] {
            assert!(voronoi.cell(cell).unwrap().room.is_some());
            assert!(voronoi.cell(cell).unwrap().has_portal);
        }
        assert_eq!(voronoi.cells().iter().filter(|c| c.has_portal).count(), 2);
    }

    #[test]
    fn test_spawns_avoid_portal_cells() {
        let (delaunay, mut voronoi, layout, mut rng) = setup(2);
        let (placement, _) = place(&delaunay, &mut voronoi, &layout, &mut rng);

        let player = placement.player_spawn.unwrap();
        assert!(layout.masters.contains(&player));
        assert!(!voronoi.cell(CellId(player.0)).unwrap().has_portal);

        let pursuer = placement.pursuer_spawn.unwrap();
        assert!(!voronoi.cell(CellId(pursuer.0)).unwrap().has_portal);
    }

    #[test]
    fn test_no_rooms_reports_everything_missing() {
        let (delaunay, mut voronoi, _, mut rng) = setup(3);
        let (corridors, _) = CorridorNetwork::build(delaunay.graph(), &[], 0.0, &mut rng).unwrap();
        let empty = RoomLayout {
            masters: Vec::new(),
            corridors,
            rooms: Vec::new(),
            warnings: Vec::new(),
        };

        let (placement, warnings) = place(&delaunay, &mut voronoi, &empty, &mut rng);
        assert_eq!(placement.delve_portal, None);
        assert_eq!(placement.escape_portal, None);
        assert_eq!(placement.player_spawn, None);
        assert!(placement.pursuer_spawn.is_some());
        assert_eq!(
            warnings,
            vec![
                GenerationWarning::PortalNotPlaced { kind: "delve" },
                GenerationWarning::PortalNotPlaced { kind: "escape" },
                GenerationWarning::SpawnNotPlaced { kind: "player" },
            ]
        );
        assert!(floor_bounds(&voronoi, &empty).is_none());
    }

    #[test]
    fn test_floor_bounds_cover_rooms() {
        let (_, voronoi, layout, _) = setup(4);
        let bounds = floor_bounds(&voronoi, &layout).unwrap();
        for room in &layout.rooms {
            for v in room.vertices(&voronoi) {
                assert!(bounds.contains(voronoi.graph().position(v)));
            }
            assert!(bounds.contains(voronoi.cell(room.cells[0]).unwrap().center));
        }
    }
}
