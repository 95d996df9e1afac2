//! Chest placement scan.
//!
//! Every outer part gets a random number of placement attempts at random
//! cells of its footprint, on the part's anchor level. A cell is accepted
//! when it is air, stands on a solid block and has a solid horizontal
//! neighbour to mount the chest against. Neighbours are checked east, west,
//! south, north; the chest faces away from the first solid one.

use crate::config::DungeonSettings;
use crate::dungeon::Dungeon;
use crate::host::BlockAccess;
use crate::loot::ItemStack;
use crate::types::{BlockPos, Direction, GRID_CELL_SIZE};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A chest accepted by the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChestPlacement {
    pub location: BlockPos,
    pub facing: Direction,
    pub contents: Vec<ItemStack>,
}

/// Facing of a chest at `pos`, or `None` if the cell cannot hold one.
pub fn chest_facing<W: BlockAccess + ?Sized>(world: &W, pos: BlockPos) -> Option<Direction> {
    if !world.is_air(pos) || world.is_air(pos.below()) {
        return None;
    }
    Direction::ALL
        .into_iter()
        .find(|direction| !world.is_air(pos.relative(*direction)))
        .map(Direction::opposite)
}

/// Scans every outer part of `dungeon` for chest cells.
///
/// A cell is accepted at most once per scan.
pub fn scan_chests<W, R>(
    world: &W,
    dungeon: &Dungeon,
    settings: &DungeonSettings,
    rng: &mut R,
) -> Vec<ChestPlacement>
where
    W: BlockAccess + ?Sized,
    R: Rng + ?Sized,
{
    let mut taken = HashSet::new();
    let mut placements = Vec::new();
    let max_checks = settings.max_chest_checks.max(settings.min_chest_checks);

    for part in dungeon.outer_parts() {
        let checks = rng.gen_range(settings.min_chest_checks..=max_checks);
        for _ in 0..checks {
            let location = part.world_location.offset(
                rng.gen_range(0..GRID_CELL_SIZE),
                0,
                rng.gen_range(0..GRID_CELL_SIZE),
            );
            if taken.contains(&location) {
                continue;
            }
            let Some(facing) = chest_facing(world, location) else {
                continue;
            };
            taken.insert(location);
            placements.push(ChestPlacement {
                location,
                facing,
                contents: settings.loot.roll(rng),
            });
        }
    }
    placements
}
