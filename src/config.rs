//! Dungeon Configuration and Builder
//!
//! This module provides the configuration for deterministic dungeon generation.
//! One configuration object is passed explicitly through the whole pipeline; there
//! is no global generator state.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{DungeonError, Result};

/// Configuration for deterministic dungeon generation
///
/// The same configuration (seed included) always produces the identical dungeon
/// topology.
///
/// # Example
///
/// ```rust
/// use voronoi_dungeon::*;
///
/// let config = DungeonConfigBuilder::new()
///     .seed(42)
///     .dimensions(160.0, 160.0)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: DungeonConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DungeonConfig {
    /// Seed of the single PRNG stream consumed by a generation pass
    pub seed: u64,

    /// Minimum distance between any two Poisson-disc samples
    pub minimum_poisson_distance: f32,

    /// Width of the sampling domain
    pub width: f32,

    /// Height of the sampling domain
    pub height: f32,

    /// Lower bound of the room count draw
    pub min_rooms: usize,

    /// Upper bound of the room count draw (inclusive)
    ///
    /// Not checked against `min_rooms`; the draw uses `min_rooms..=max(min_rooms, max_rooms)`.
    pub max_rooms: usize,

    /// Minimum spacing between master points
    pub minimum_distance_between_master_points: f64,

    /// Fraction of non-spanning-tree corridor edges to restore (0.0 - 1.0)
    ///
    /// - 0.0: corridors form a tree, exactly one route between rooms
    /// - 0.3: default, a few loops
    /// - 1.0: full Delaunay corridor graph
    pub percentage_of_edges_to_add_back: f32,

    /// Number of growth rounds applied to each room after seeding
    pub room_growth_radius: usize,

    /// Corridor half-width used when opening walls along corridors
    pub hall_width: f32,

    /// Wall height, opaque to the graph core and carried for consumers
    pub wall_height: f32,
}

impl DungeonConfig {
    /// Number of rooms to request for a given draw from `[min_rooms, max_rooms]`
    #[inline]
    pub fn room_range(&self) -> std::ops::RangeInclusive<usize> {
        self.min_rooms..=self.max_rooms.max(self.min_rooms)
    }
}

impl Default for DungeonConfig {
    fn default() -> Self {
        DungeonConfigBuilder::new().seed(0).into_config()
    }
}

/// Builder for creating DungeonConfig with validation
///
/// Every fallible setter checks its own argument and returns `InvalidConfig`
/// immediately, so an invalid value never reaches generation.
///
/// # Example
///
/// ```rust
/// use voronoi_dungeon::*;
///
/// let config = DungeonConfigBuilder::new()
///     .seed(7)
///     .rooms(4, 6)
///     .percentage_of_edges_to_add_back(0.5)
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(config.max_rooms, 6);
/// ```
#[derive(Debug, Clone)]
pub struct DungeonConfigBuilder {
    seed: Option<u64>,
    minimum_poisson_distance: f32,
    width: f32,
    height: f32,
    min_rooms: usize,
    max_rooms: usize,
    minimum_distance_between_master_points: f64,
    percentage_of_edges_to_add_back: f32,
    room_growth_radius: usize,
    hall_width: f32,
    wall_height: f32,
}

impl DungeonConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random
    /// - minimum_poisson_distance: 4
    /// - width x height: 200 x 200
    /// - rooms: 10 to 16
    /// - minimum_distance_between_master_points: 32
    /// - percentage_of_edges_to_add_back: 0.3
    /// - room_growth_radius: 2
    /// - hall_width: 5
    /// - wall_height: 10
    pub fn new() -> Self {
        Self {
            seed: None,
            minimum_poisson_distance: 4.0,
            width: 200.0,
            height: 200.0,
            min_rooms: 10,
            max_rooms: 16,
            minimum_distance_between_master_points: 32.0,
            percentage_of_edges_to_add_back: 0.3,
            room_growth_radius: 2,
            hall_width: 5.0,
            wall_height: 10.0,
        }
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the minimum distance between Poisson-disc samples
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the distance is not a positive finite number
    pub fn minimum_poisson_distance(mut self, distance: f32) -> Result<Self> {
        self.minimum_poisson_distance = positive("minimum Poisson distance", distance)?;
        Ok(self)
    }

    /// Set the sampling domain size
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either dimension is not a positive finite number
    pub fn dimensions(mut self, width: f32, height: f32) -> Result<Self> {
        self.width = positive("width", width)?;
        self.height = positive("height", height)?;
        Ok(self)
    }

    /// Set the room count range
    pub fn rooms(mut self, min: usize, max: usize) -> Self {
        self.min_rooms = min;
        self.max_rooms = max;
        self
    }

    /// Set the minimum distance between master points
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the distance is negative or not finite
    pub fn minimum_distance_between_master_points(mut self, distance: f64) -> Result<Self> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(DungeonError::InvalidConfig(format!(
                "master point distance must be >= 0 (got {})",
                distance
            )));
        }
        self.minimum_distance_between_master_points = distance;
        Ok(self)
    }

    /// Set the fraction of non-tree corridor edges to restore
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the fraction lies outside `[0, 1]`
    pub fn percentage_of_edges_to_add_back(mut self, fraction: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(DungeonError::InvalidConfig(format!(
                "percentage of edges to add back must be within [0, 1] (got {})",
                fraction
            )));
        }
        self.percentage_of_edges_to_add_back = fraction;
        Ok(self)
    }

    /// Set the number of room growth rounds
    pub fn room_growth_radius(mut self, rounds: usize) -> Self {
        self.room_growth_radius = rounds;
        self
    }

    /// Set the corridor half-width
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the width is negative or not finite
    pub fn hall_width(mut self, width: f32) -> Result<Self> {
        if !width.is_finite() || width < 0.0 {
            return Err(DungeonError::InvalidConfig(format!(
                "hall width must be >= 0 (got {})",
                width
            )));
        }
        self.hall_width = width;
        Ok(self)
    }

    /// Set the wall height
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the height is not a positive finite number
    pub fn wall_height(mut self, height: f32) -> Result<Self> {
        self.wall_height = positive("wall height", height)?;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, a random one is drawn.
    pub fn build(self) -> Result<DungeonConfig> {
        Ok(self.into_config())
    }

    fn into_config(self) -> DungeonConfig {
        DungeonConfig {
            seed: self.seed.unwrap_or_else(rand::random),
            minimum_poisson_distance: self.minimum_poisson_distance,
            width: self.width,
            height: self.height,
            min_rooms: self.min_rooms,
            max_rooms: self.max_rooms,
            minimum_distance_between_master_points: self.minimum_distance_between_master_points,
            percentage_of_edges_to_add_back: self.percentage_of_edges_to_add_back,
            room_growth_radius: self.room_growth_radius,
            hall_width: self.hall_width,
            wall_height: self.wall_height,
        }
    }
}

impl Default for DungeonConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn positive(name: &str, value: f32) -> Result<f32> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DungeonError::InvalidConfig(format!(
            "{} must be positive (got {})",
            name, value
        )));
    }
    Ok(value)
}
