//! # Host World Interface
//!
//! Contracts the host world implements so dungeons can be inspected and
//! built into it. All of these run on the primary thread, the only thread
//! allowed to touch world state.

use crate::catalog::PrefabId;
use crate::chest::ChestPlacement;
use crate::error::Result;
use crate::types::BlockPos;

/// Read access to world blocks.
pub trait BlockAccess {
    /// True if the block at `pos` is empty.
    fn is_air(&self, pos: BlockPos) -> bool;
}

/// Instantiates prefabs into the world.
pub trait PrefabPlacer {
    /// Builds `prefab` with its origin at `location`. `is_monument` marks the
    /// dungeon's monument structure.
    fn instantiate(&mut self, prefab: &PrefabId, location: BlockPos, is_monument: bool) -> Result<()>;
}

/// Places loot chests.
pub trait ChestPlacer {
    fn place_chest(&mut self, chest: &ChestPlacement) -> Result<()>;
}

/// Everything the publication stage needs from the host world.
pub trait DungeonWorld: BlockAccess + PrefabPlacer + ChestPlacer {}

impl<T: BlockAccess + PrefabPlacer + ChestPlacer> DungeonWorld for T {}
