//! Error types for dungeon generation.

use crate::catalog::PartTypeId;
use crate::connection::Connection;
use crate::types::GridPos;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DungeonError {
    /// No catalog module satisfies the constraint of a grid cell.
    #[error("No module type satisfies constraint [{constraint}] at grid cell {position}")]
    NoCandidate {
        position: GridPos,
        constraint: Connection,
    },

    #[error("Unknown part type: {0}")]
    UnknownPartType(PartTypeId),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Catalog parse error: {0}")]
    CatalogParse(#[from] toml::de::Error),

    #[error("Invalid dungeon settings: {0}")]
    InvalidSettings(String),

    /// The requested location is too close to the edge of the coordinate range.
    #[error("Location out of bounds: {0}")]
    OutOfBounds(String),

    #[error("Prefab placement error: {0}")]
    Placement(String),
}

pub type Result<T> = std::result::Result<T, DungeonError>;
