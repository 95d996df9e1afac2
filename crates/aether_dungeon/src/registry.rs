//! Registry of published dungeons.
//!
//! The registry is shared between the primary thread, which appends freshly
//! published dungeons, and generation tasks, which read a snapshot of it for
//! collision checks. Reads are not ordered against concurrent appends; two
//! overlapping dungeons finishing at the same moment may both be published.

use crate::dungeon::Dungeon;
use crate::types::DungeonId;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared list of published dungeons.
pub trait DungeonRegistry: Send + Sync {
    /// Snapshot of every registered dungeon, oldest first.
    fn list(&self) -> Vec<Arc<Dungeon>>;

    /// Registers a dungeon. Only called from the primary thread.
    fn append(&self, dungeon: Dungeon) -> Arc<Dungeon>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `dungeon` shares an outer part location with a registered dungeon.
    fn collides(&self, dungeon: &Dungeon) -> bool {
        self.list().iter().any(|other| dungeon.overlaps(other))
    }
}

/// Lock-free in-memory registry.
///
/// Each dungeon is stored with its append sequence number so snapshots come
/// back in the order dungeons were published.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    dungeons: DashMap<DungeonId, (u64, Arc<Dungeon>)>,
    next_sequence: AtomicU64,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a registered dungeon by id.
    pub fn get(&self, id: DungeonId) -> Option<Arc<Dungeon>> {
        self.dungeons.get(&id).map(|entry| entry.value().1.clone())
    }
}

impl DungeonRegistry for InMemoryRegistry {
    fn list(&self) -> Vec<Arc<Dungeon>> {
        let mut snapshot: Vec<(u64, Arc<Dungeon>)> =
            self.dungeons.iter().map(|entry| entry.value().clone()).collect();
        snapshot.sort_unstable_by_key(|(sequence, _)| *sequence);
        snapshot.into_iter().map(|(_, dungeon)| dungeon).collect()
    }

    fn append(&self, dungeon: Dungeon) -> Arc<Dungeon> {
        let dungeon = Arc::new(dungeon);
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        self.dungeons.insert(dungeon.id(), (sequence, dungeon.clone()));
        dungeon
    }

    fn len(&self) -> usize {
        self.dungeons.len()
    }
}
