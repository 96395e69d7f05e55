//! Movement trigger zones around navigable sites
//!
//! A zone covers the bounding box of a navigable site's cell. Sliver cells make
//! poor triggers and are skipped.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::generation::{Delaunay, Voronoi};
use crate::geometry::BoundingBox;
use crate::graph::{CellId, VertexId};

/// Zones whose width/height ratio is at or below this are skipped
pub const MIN_TRIGGER_ASPECT: f32 = 0.2;
/// Zones whose width/height ratio is at or above this are skipped
pub const MAX_TRIGGER_ASPECT: f32 = 5.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerZone {
    pub site: VertexId,
    pub cell: CellId,
    pub bounds: BoundingBox,
}

/// One zone per navigable site whose cell is closed and not too elongated
pub fn trigger_zones(delaunay: &Delaunay, voronoi: &Voronoi) -> Vec<TriggerZone> {
    delaunay
        .navigable_vertices()
        .filter_map(|vertex| {
            let cell = voronoi.cell(vertex.cell?)?;
            if !cell.is_closed(voronoi.graph()) {
                return None;
            }
            let bounds = cell.bounding_box(voronoi.graph())?;
            let aspect = bounds.aspect_ratio();
            (aspect > MIN_TRIGGER_ASPECT && aspect < MAX_TRIGGER_ASPECT).then_some(TriggerZone {
                site: vertex.id,
                cell: cell.id,
                bounds,
            })
        })
        .collect()
}
