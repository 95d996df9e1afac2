//! Chunk population trigger for dungeon generation.

use crate::world::AetherWorld;
use aether_dungeon::{
    BlockPos, DungeonGenerator, GenerationOutcome, GenerationRequest, WorldId, CHUNK_SIZE,
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

/// Chunk coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// North-west corner of the chunk at height `y`.
    pub fn corner(self, y: i32) -> BlockPos {
        BlockPos::new(self.x * CHUNK_SIZE, y, self.z * CHUNK_SIZE)
    }
}

/// Starts dungeons in freshly populated Aether chunks.
pub struct DungeonListener {
    aether: WorldId,
    generator: Arc<DungeonGenerator<AetherWorld>>,
}

impl DungeonListener {
    pub fn new(aether: WorldId, generator: Arc<DungeonGenerator<AetherWorld>>) -> Self {
        Self { aether, generator }
    }

    /// Rolls the spawn chance for a populated chunk and requests a dungeon at
    /// its corner on success. Chunks of other worlds are ignored.
    pub fn on_chunk_populated(
        &self,
        world: &WorldId,
        chunk: ChunkPos,
    ) -> Option<oneshot::Receiver<GenerationOutcome>> {
        if *world != self.aether {
            return None;
        }

        let settings = self.generator.settings();
        if self.generator.roll() >= settings.spawn_chance {
            return None;
        }

        let location = chunk.corner(settings.spawn_height);
        debug!("🎲 Chunk ({}, {}) rolled a dungeon at {}", chunk.x, chunk.z, location);
        let request = GenerationRequest::new(world.clone(), location, settings);
        Some(self.generator.generate_dungeon(request))
    }
}
