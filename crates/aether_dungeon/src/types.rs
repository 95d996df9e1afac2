//! # Core Type Definitions
//!
//! Fundamental coordinate and identifier types shared by the dungeon generator
//! and the host world.
//!
//! ## Key Types
//!
//! - [`Direction`] - The four horizontal directions a module edge can face
//! - [`GridPos`] - Position of a module on the dungeon grid, relative to the dungeon origin
//! - [`BlockPos`] - Absolute integer block position in the world
//! - [`WorldId`] - Name of the world a dungeon lives in
//! - [`DungeonId`] - Unique identifier of a published dungeon
//!
//! One dungeon grid cell spans [`GRID_CELL_SIZE`] blocks on the X and Z axes
//! (five chunks of sixteen blocks).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Width of a single chunk in blocks.
pub const CHUNK_SIZE: i32 = 16;

/// Width of one dungeon grid cell (one outer part) in blocks.
pub const GRID_CELL_SIZE: i32 = CHUNK_SIZE * 5;

// ============================================================================
// Directions
// ============================================================================

/// A horizontal direction.
///
/// East points towards +X, south towards +Z. The declaration order
/// (east, west, south, north) is also the priority order used wherever
/// directions are checked one after another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    East,
    West,
    South,
    North,
}

impl Direction {
    /// All directions in priority order.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    /// Unit offset `(dx, dz)` of this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::South => (0, 1),
            Direction::North => (0, -1),
        }
    }

    /// The direction pointing the other way.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::South => Direction::North,
            Direction::North => Direction::South,
        }
    }

    /// Single-letter name used in module type identifiers (`E`, `W`, `S`, `N`).
    pub fn letter(self) -> char {
        match self {
            Direction::East => 'E',
            Direction::West => 'W',
            Direction::South => 'S',
            Direction::North => 'N',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::East => "east",
            Direction::West => "west",
            Direction::South => "south",
            Direction::North => "north",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Positions
// ============================================================================

/// Position of an outer part on the dungeon grid.
///
/// Grid positions are relative to the dungeon origin, so the seed module is
/// always at [`GridPos::ORIGIN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub z: i32,
}

impl GridPos {
    /// The seed cell of every dungeon.
    pub const ORIGIN: GridPos = GridPos { x: 0, z: 0 };

    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The adjacent cell in `direction`.
    pub fn neighbor(self, direction: Direction) -> GridPos {
        let (dx, dz) = direction.offset();
        GridPos::new(self.x + dx, self.z + dz)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// An absolute block position in a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns this position moved by the given amounts.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> BlockPos {
        BlockPos::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Like [`BlockPos::offset`], but `None` if the result leaves the `i32` range.
    pub fn checked_offset(self, dx: i32, dy: i32, dz: i32) -> Option<BlockPos> {
        Some(BlockPos::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
            self.z.checked_add(dz)?,
        ))
    }

    /// The horizontally adjacent block in `direction`.
    pub fn relative(self, direction: Direction) -> BlockPos {
        let (dx, dz) = direction.offset();
        self.offset(dx, 0, dz)
    }

    /// The block directly below.
    pub fn below(self) -> BlockPos {
        self.offset(0, -1, 0)
    }

    /// Snaps this position to the corner of the dungeon grid cell containing it.
    ///
    /// X and Z are floored to a multiple of [`GRID_CELL_SIZE`]; Y is kept.
    /// Every position inside the same cell maps to the same corner, negative
    /// coordinates included.
    pub fn to_dungeon_grid(self) -> BlockPos {
        BlockPos::new(
            self.x.div_euclid(GRID_CELL_SIZE) * GRID_CELL_SIZE,
            self.y,
            self.z.div_euclid(GRID_CELL_SIZE) * GRID_CELL_SIZE,
        )
    }

    /// World anchor of the grid cell `cell` for a dungeon whose origin is `self`.
    pub fn grid_anchor(self, cell: GridPos) -> BlockPos {
        self.offset(cell.x * GRID_CELL_SIZE, 0, cell.z * GRID_CELL_SIZE)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ============================================================================
// Identifiers
// ============================================================================

/// Name of a world hosting dungeons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldId(pub String);

impl WorldId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier of a dungeon.
///
/// A wrapper around UUID so dungeon ids cannot be confused with other ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DungeonId(pub Uuid);

impl DungeonId {
    /// Creates a new random dungeon ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DungeonId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DungeonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_opposites_cancel_out() {
        for direction in Direction::ALL {
            let (dx, dz) = direction.offset();
            let (ox, oz) = direction.opposite().offset();
            assert_eq!((dx + ox, dz + oz), (0, 0));
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn test_grid_snapping_is_stable_within_a_cell() {
        let corner = BlockPos::new(160, 64, -80);
        for dx in [0, 1, 40, 79] {
            for dz in [0, 13, 79] {
                let snapped = corner.offset(dx, 0, dz).to_dungeon_grid();
                assert_eq!(snapped, corner);
            }
        }
        // The next cell over snaps somewhere else
        assert_eq!(corner.offset(80, 0, 0).to_dungeon_grid(), BlockPos::new(240, 64, -80));
    }

    #[test]
    fn test_grid_snapping_floors_negative_coordinates() {
        assert_eq!(BlockPos::new(-1, 5, -1).to_dungeon_grid(), BlockPos::new(-80, 5, -80));
        assert_eq!(BlockPos::new(-80, 5, -81).to_dungeon_grid(), BlockPos::new(-80, 5, -160));
        assert_eq!(BlockPos::new(79, 5, 0).to_dungeon_grid(), BlockPos::new(0, 5, 0));
    }

    #[test]
    fn test_grid_anchor() {
        let origin = BlockPos::new(80, 20, 0);
        assert_eq!(origin.grid_anchor(GridPos::new(-1, 2)), BlockPos::new(0, 20, 160));
        assert_eq!(origin.grid_anchor(GridPos::ORIGIN), origin);
    }

    #[test]
    fn test_checked_offset_stops_at_the_coordinate_edge() {
        let edge = BlockPos::new(i32::MAX - 10, 0, i32::MIN + 10);
        assert_eq!(edge.checked_offset(10, 0, -10), Some(BlockPos::new(i32::MAX, 0, i32::MIN)));
        assert_eq!(edge.checked_offset(11, 0, 0), None);
        assert_eq!(edge.checked_offset(0, 0, -11), None);
        assert_eq!(edge.checked_offset(0, i32::MIN, 0), Some(BlockPos::new(i32::MAX - 10, i32::MIN, i32::MIN + 10)));
    }

    #[test]
    fn test_dungeon_ids_are_unique() {
        assert_ne!(DungeonId::new(), DungeonId::new());
    }
}
