//! In-memory Aether world.
//!
//! A sparse block store owned by the primary thread. Unset positions are
//! air. Prefab placement writes prefab blocks relative to the placement
//! location; placed chests carry their rolled contents.

use crate::prefab::PrefabLibrary;
use aether_dungeon::{
    BlockAccess, BlockPos, ChestPlacement, ChestPlacer, Direction, DungeonError, ItemStack,
    PrefabId, PrefabPlacer, WorldId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

static AIR: Block = Block::Air;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Air,
    Stone,
    Brick,
    Pillar,
    Chest {
        facing: Direction,
        contents: Vec<ItemStack>,
    },
}

impl Block {
    pub fn is_air(&self) -> bool {
        matches!(self, Block::Air)
    }
}

/// The Aether world as seen by the dungeon generator.
#[derive(Debug)]
pub struct AetherWorld {
    id: WorldId,
    blocks: HashMap<BlockPos, Block>,
    prefabs: Arc<PrefabLibrary>,
    monuments: Vec<BlockPos>,
    prefabs_placed: usize,
}

impl AetherWorld {
    pub fn new(id: WorldId, prefabs: Arc<PrefabLibrary>) -> Self {
        Self {
            id,
            blocks: HashMap::new(),
            prefabs,
            monuments: Vec::new(),
            prefabs_placed: 0,
        }
    }

    /// Name of this world.
    pub fn id(&self) -> &WorldId {
        &self.id
    }

    /// Block at `pos`, air if never set.
    pub fn block(&self, pos: BlockPos) -> &Block {
        self.blocks.get(&pos).unwrap_or(&AIR)
    }

    pub fn set_block(&mut self, pos: BlockPos, block: Block) {
        if block.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }
    }

    /// Number of non-air blocks.
    pub fn solid_count(&self) -> usize {
        self.blocks.len()
    }

    /// Every placed chest with its location.
    pub fn chests(&self) -> impl Iterator<Item = (BlockPos, &Direction, &[ItemStack])> + '_ {
        self.blocks.iter().filter_map(|(pos, block)| match block {
            Block::Chest { facing, contents } => Some((*pos, facing, contents.as_slice())),
            _ => None,
        })
    }

    /// Locations monument prefabs were placed at.
    pub fn monuments(&self) -> &[BlockPos] {
        &self.monuments
    }

    /// Number of prefabs instantiated so far, monuments included.
    pub fn prefabs_placed(&self) -> usize {
        self.prefabs_placed
    }
}

impl BlockAccess for AetherWorld {
    fn is_air(&self, pos: BlockPos) -> bool {
        !self.blocks.contains_key(&pos)
    }
}

impl PrefabPlacer for AetherWorld {
    fn instantiate(
        &mut self,
        prefab: &PrefabId,
        location: BlockPos,
        is_monument: bool,
    ) -> aether_dungeon::Result<()> {
        let library = self.prefabs.clone();
        let structure = library
            .get(prefab)
            .ok_or_else(|| DungeonError::Placement(format!("unknown prefab {prefab}")))?;

        for (offset, block) in &structure.blocks {
            self.set_block(location.offset(offset.x, offset.y, offset.z), block.clone());
        }
        if is_monument {
            self.monuments.push(location);
        }
        self.prefabs_placed += 1;
        trace!("🧩 Placed prefab {} at {}", prefab, location);
        Ok(())
    }
}

impl ChestPlacer for AetherWorld {
    fn place_chest(&mut self, chest: &ChestPlacement) -> aether_dungeon::Result<()> {
        if !self.is_air(chest.location) {
            return Err(DungeonError::Placement(format!(
                "chest location {} is occupied",
                chest.location
            )));
        }
        self.set_block(
            chest.location,
            Block::Chest {
                facing: chest.facing,
                contents: chest.contents.clone(),
            },
        );
        Ok(())
    }
}
