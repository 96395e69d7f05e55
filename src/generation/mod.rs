//! Dungeon generation stages
//!
//! Each stage consumes the output of the previous one:
//! Poisson sampling, Delaunay triangulation, the Voronoi dual, room and corridor
//! carving, wall carving and finally portal/spawn placement.

mod delaunay;
mod placement;
mod poisson;
mod rooms;
mod voronoi;
mod walls;

pub use delaunay::{next_half_edge, triangle_of_half_edge, Delaunay, FilterReport, Triangle, EMPTY};
pub use placement::{floor_bounds, place, Placement};
pub use poisson::{PoissonSampler, DEFAULT_ATTEMPTS};
pub use rooms::{
    carve_rooms, select_master_points, CorridorNetwork, Room, RoomLayout, TrackPiece, MAX_CELL_AREA,
};
pub use voronoi::Voronoi;
pub use walls::{carve_walls, widen_opening, WallLayout, CONTROLLER_DIAMETER};

use rand::Rng;

use crate::config::DungeonConfig;
use crate::error::Result;

/// Sample the configured domain and triangulate it
///
/// Returns the triangulation together with its (not yet carved) Voronoi dual.
///
/// # Errors
///
/// Returns `InvalidConfig` for a bad sampling setup and `DegenerateGeometry`
/// when the sample cannot be triangulated.
pub fn generate_base<R: Rng + ?Sized>(config: &DungeonConfig, rng: &mut R) -> Result<(Delaunay, Voronoi)> {
    let sampler = PoissonSampler::new(config.minimum_poisson_distance, config.width, config.height)?;
    let points = sampler.sample(rng);
    tracing::debug!(points = points.len(), "poisson sample drawn");

    let mut delaunay = Delaunay::from_points(&points)?;
    let voronoi = delaunay.make_voronoi()?;
    Ok((delaunay, voronoi))
}
