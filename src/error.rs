//! Error and warning types for dungeon generation

use std::fmt;

use thiserror::Error;

/// Errors that can occur during dungeon generation or queries
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DungeonError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Geometry cannot be triangulated or measured (collinear, duplicate, too few points)
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
    /// The pathfinder exhausted its open set without reaching the goal
    #[error("no path found from vertex {start} to vertex {goal}")]
    NoPathFound { start: usize, goal: usize },
    /// Requested vertex ID does not exist
    #[error("vertex not found: {0}")]
    VertexNotFound(usize),
    /// Requested cell ID does not exist
    #[error("cell not found: {0}")]
    CellNotFound(usize),
    /// Strict generation refused a pass that produced warnings
    #[error("generation incomplete: {}", join_warnings(.0))]
    Incomplete(Vec<GenerationWarning>),
}

fn join_warnings(warnings: &[GenerationWarning]) -> String {
    warnings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Soft failures of a generation pass
///
/// A pass that emits warnings still yields a usable dungeon, just a smaller or
/// less connected one than the configuration asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationWarning {
    /// Master-point selection ran out of candidates
    FewerRoomsThanRequested { requested: usize, placed: usize },
    /// A master point's cell was too large to seed a room
    RoomSeedRejected { cell: usize },
    /// Fewer than three master points; corridors fall back to a chain
    CorridorGraphDegenerate { masters: usize },
    /// No room cell was available for a portal
    PortalNotPlaced { kind: &'static str },
    /// No candidate vertex was available for a spawn point
    SpawnNotPlaced { kind: &'static str },
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationWarning::FewerRoomsThanRequested { requested, placed } => write!(
                f,
                "placed {} of {} requested rooms",
                placed, requested
            ),
            GenerationWarning::RoomSeedRejected { cell } => {
                write!(f, "cell {} too large to seed a room", cell)
            }
            GenerationWarning::CorridorGraphDegenerate { masters } => write!(
                f,
                "only {} master points, corridors form a chain",
                masters
            ),
            GenerationWarning::PortalNotPlaced { kind } => write!(f, "{} portal not placed", kind),
            GenerationWarning::SpawnNotPlaced { kind } => write!(f, "{} spawn not placed", kind),
        }
    }
}

/// Result type alias for dungeon operations
pub type Result<T> = std::result::Result<T, DungeonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DungeonError::NoPathFound { start: 3, goal: 7 };
        assert_eq!(err.to_string(), "no path found from vertex 3 to vertex 7");

        let err = DungeonError::InvalidConfig("width must be positive".into());
        assert_eq!(err.to_string(), "invalid configuration: width must be positive");
    }

    #[test]
    fn test_incomplete_lists_warnings() {
        let err = DungeonError::Incomplete(vec![
            GenerationWarning::FewerRoomsThanRequested { requested: 12, placed: 9 },
            GenerationWarning::RoomSeedRejected { cell: 4 },
        ]);
        let text = err.to_string();
        assert!(text.contains("placed 9 of 12 requested rooms"));
        assert!(text.contains("cell 4 too large"));
    }
}
