//! Procedural dungeon floors on planar Voronoi graphs
//!
//! A standalone library that samples a rectangle with Poisson-disc noise,
//! triangulates it, derives the Voronoi dual and carves rooms, corridors and walls
//! out of the cells. The resulting navigation graph supports A* queries, so the
//! output can be handed to any game engine (Bevy, Godot, etc.)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voronoi_dungeon::*;
//!
//! // Generate a dungeon
//! let config = DungeonConfigBuilder::new()
//!     .seed(42)
//!     .dimensions(200.0, 200.0).unwrap()
//!     .rooms(10, 16)
//!     .build().unwrap();
//!
//! let dungeon = Dungeon::generate(config).unwrap();
//!
//! // Route between two master sites
//! let masters = dungeon.masters();
//! if masters.len() >= 2 {
//!     let path = dungeon.find_path(masters[0], masters[1]);
//!     println!("Route: {:?}", path);
//! }
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) position-to-vertex lookups using KD-tree
//! - `serde`: Enables serialization support for configuration and generated data

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod graph;
pub mod cell;
pub mod generation;
pub mod pathfinding;
pub mod dungeon;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{DungeonError, GenerationWarning, Result};
pub use config::{DungeonConfig, DungeonConfigBuilder};
pub use cell::Cell;
pub use dungeon::Dungeon;
pub use geometry::BoundingBox;
pub use graph::{CellId, Edge, EdgeId, Graph, Polygon, RoomId, Vertex, VertexId};
pub use generation::{Delaunay, Placement, Room, Voronoi, WallLayout};
pub use pathfinding::{AStar, PathNode, TriggerZone};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::Vec2 for convenience
pub use glam::Vec2;
