//! Test worlds shared by the unit tests.

use crate::catalog::PrefabId;
use crate::chest::ChestPlacement;
use crate::error::{DungeonError, Result};
use crate::host::{BlockAccess, ChestPlacer, PrefabPlacer};
use crate::types::BlockPos;
use std::collections::HashSet;

/// Explicit set of solid blocks; everything else is air.
#[derive(Debug, Default)]
pub struct SolidBlocks {
    solid: HashSet<BlockPos>,
}

impl SolidBlocks {
    pub fn set(&mut self, pos: BlockPos) {
        self.solid.insert(pos);
    }
}

impl BlockAccess for SolidBlocks {
    fn is_air(&self, pos: BlockPos) -> bool {
        !self.solid.contains(&pos)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedPrefab {
    pub prefab: PrefabId,
    pub location: BlockPos,
    pub is_monument: bool,
}

/// Records placement calls instead of building anything.
///
/// With `walls` set, everything below y = 20 is solid and every tenth X
/// column is a wall, so chest scans at height 20 find cells.
#[derive(Debug, Default)]
pub struct RecordingWorld {
    pub prefabs: Vec<PlacedPrefab>,
    pub chests: Vec<ChestPlacement>,
    pub fail_placement: bool,
    pub walls: bool,
}

impl RecordingWorld {
    pub fn with_walls() -> Self {
        Self {
            walls: true,
            ..Self::default()
        }
    }
}

impl BlockAccess for RecordingWorld {
    fn is_air(&self, pos: BlockPos) -> bool {
        !self.walls || (pos.y >= 20 && pos.x.rem_euclid(10) != 0)
    }
}

impl PrefabPlacer for RecordingWorld {
    fn instantiate(&mut self, prefab: &PrefabId, location: BlockPos, is_monument: bool) -> Result<()> {
        if self.fail_placement {
            return Err(DungeonError::Placement(format!("refusing to place {prefab}")));
        }
        self.prefabs.push(PlacedPrefab {
            prefab: prefab.clone(),
            location,
            is_monument,
        });
        Ok(())
    }
}

impl ChestPlacer for RecordingWorld {
    fn place_chest(&mut self, chest: &ChestPlacement) -> Result<()> {
        self.chests.push(chest.clone());
        Ok(())
    }
}
