//! # Prefab Library
//!
//! Block geometry for every prefab a catalog references. Geometry is derived
//! from the catalog entry that names the prefab:
//!
//! - **Outer prefabs** span a whole grid cell: a stone floor, brick perimeter
//!   walls and a doorway on every open edge, centred where corridor arms of
//!   neighbouring hubs meet the cell edge.
//! - **Inner prefabs** span their footprint. Corridors are walled along
//!   their long sides and open at both ends; square rooms get a doorway in
//!   every wall. Decor adds pillars or a sunken pool.
//! - **The monument** is a pillar obelisk on a brick plinth above the centre
//!   of the origin cell.
//!
//! All offsets are relative to the prefab origin, which is placed at a part's
//! world location. The floor lies one block below the origin level.

use crate::world::Block;
use aether_dungeon::{
    BlockPos, Catalog, Connection, ConnectionState, Direction, InnerPartDescriptor, PrefabId,
    RoomDecor, GRID_CELL_SIZE,
};
use std::collections::HashMap;

/// Height of every wall, counted from the origin level.
pub const WALL_HEIGHT: i32 = 5;

/// Half width of the doorways in outer prefabs. Doorways span
/// `[GRID_CELL_SIZE / 2 - DOOR_HALF_WIDTH, GRID_CELL_SIZE / 2 + DOOR_HALF_WIDTH)`.
pub const DOOR_HALF_WIDTH: i32 = 8;

const ROOM_DOOR_HALF_WIDTH: i32 = 3;
const PILLAR_SPACING: i32 = 8;
const OBELISK_HEIGHT: i32 = 9;

/// A block structure placed relative to an origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefab {
    pub id: PrefabId,
    /// Blocks as (offset from origin, block) pairs
    pub blocks: Vec<(BlockPos, Block)>,
}

impl Prefab {
    fn new(id: PrefabId) -> Self {
        Self { id, blocks: Vec::new() }
    }

    fn set(&mut self, x: i32, y: i32, z: i32, block: Block) {
        self.blocks.push((BlockPos::new(x, y, z), block));
    }

    fn floor(&mut self, size_x: i32, size_z: i32) {
        for x in 0..size_x {
            for z in 0..size_z {
                self.set(x, -1, z, Block::Stone);
            }
        }
    }

    fn column(&mut self, x: i32, z: i32, from: i32, to: i32, block: Block) {
        for y in from..to {
            self.set(x, y, z, block.clone());
        }
    }
}

/// Prefabs by id.
#[derive(Debug, Default)]
pub struct PrefabLibrary {
    prefabs: HashMap<PrefabId, Prefab>,
}

impl PrefabLibrary {
    /// Builds geometry for every prefab `catalog` references.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut library = Self::default();

        for outer in catalog.outer_types() {
            if let Some(prefab) = &outer.prefab {
                library.insert(outer_prefab(prefab.clone(), &outer.connection));
            }
        }
        for inner in catalog.inner_types() {
            library.insert(inner_prefab(inner));
        }
        library.insert(monument_prefab(catalog.monument_prefab().clone()));

        library
    }

    /// Adds or replaces a prefab.
    pub fn insert(&mut self, prefab: Prefab) {
        self.prefabs.insert(prefab.id.clone(), prefab);
    }

    /// Geometry registered under `id`.
    pub fn get(&self, id: &PrefabId) -> Option<&Prefab> {
        self.prefabs.get(id)
    }

    /// Number of registered prefabs.
    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }
}

// ============================================================================
// Geometry
// ============================================================================

fn outer_prefab(id: PrefabId, connection: &Connection) -> Prefab {
    let mut prefab = Prefab::new(id);
    let last = GRID_CELL_SIZE - 1;
    let door = (GRID_CELL_SIZE / 2 - DOOR_HALF_WIDTH)..(GRID_CELL_SIZE / 2 + DOOR_HALF_WIDTH);
    let open = |direction| connection.state(direction) == ConnectionState::Open;

    prefab.floor(GRID_CELL_SIZE, GRID_CELL_SIZE);
    for i in 0..GRID_CELL_SIZE {
        let in_door = door.contains(&i);
        if !(in_door && open(Direction::East)) {
            prefab.column(last, i, 0, WALL_HEIGHT, Block::Brick);
        }
        if !(in_door && open(Direction::West)) {
            prefab.column(0, i, 0, WALL_HEIGHT, Block::Brick);
        }
        // Corners already belong to the east and west walls
        if i == 0 || i == last {
            continue;
        }
        if !(in_door && open(Direction::South)) {
            prefab.column(i, last, 0, WALL_HEIGHT, Block::Brick);
        }
        if !(in_door && open(Direction::North)) {
            prefab.column(i, 0, 0, WALL_HEIGHT, Block::Brick);
        }
    }
    prefab
}

fn inner_prefab(descriptor: &InnerPartDescriptor) -> Prefab {
    let mut prefab = Prefab::new(descriptor.prefab.clone());
    let (size_x, size_z) = (descriptor.size_x, descriptor.size_z);

    let pool = descriptor.decor == RoomDecor::Pool && size_x > 4 && size_z > 4;
    for x in 0..size_x {
        for z in 0..size_z {
            let in_pool = pool && (2..size_x - 2).contains(&x) && (2..size_z - 2).contains(&z);
            if in_pool {
                prefab.set(x, -2, z, Block::Stone);
            } else {
                prefab.set(x, -1, z, Block::Stone);
            }
        }
    }

    // Long axis walls only; square rooms are walled all round with doorways
    let walls_x = size_x <= size_z;
    let walls_z = size_z <= size_x;
    let square = size_x == size_z;
    let door_x = (size_x / 2 - ROOM_DOOR_HALF_WIDTH)..(size_x / 2 + ROOM_DOOR_HALF_WIDTH);
    let door_z = (size_z / 2 - ROOM_DOOR_HALF_WIDTH)..(size_z / 2 + ROOM_DOOR_HALF_WIDTH);

    if walls_x {
        for z in 0..size_z {
            if square && door_z.contains(&z) {
                continue;
            }
            prefab.column(0, z, 0, WALL_HEIGHT, Block::Brick);
            prefab.column(size_x - 1, z, 0, WALL_HEIGHT, Block::Brick);
        }
    }
    if walls_z {
        for x in 0..size_x {
            if square && door_x.contains(&x) {
                continue;
            }
            if walls_x && (x == 0 || x == size_x - 1) {
                continue;
            }
            prefab.column(x, 0, 0, WALL_HEIGHT, Block::Brick);
            prefab.column(x, size_z - 1, 0, WALL_HEIGHT, Block::Brick);
        }
    }

    if descriptor.decor == RoomDecor::Pillars {
        for (x, z) in pillar_positions(size_x, size_z) {
            prefab.column(x, z, 0, WALL_HEIGHT, Block::Pillar);
        }
    }
    prefab
}

fn pillar_positions(size_x: i32, size_z: i32) -> Vec<(i32, i32)> {
    if size_x == size_z {
        let (near, far) = (3, size_x - 4);
        return vec![(near, near), (near, far), (far, near), (far, far)];
    }

    // Pairs along the long axis, one block in from each wall
    let along_x = size_x > size_z;
    let length = size_x.max(size_z);
    let width = size_x.min(size_z);
    (PILLAR_SPACING / 2..length)
        .step_by(PILLAR_SPACING as usize)
        .flat_map(|i| {
            [1, width - 2]
                .into_iter()
                .map(move |j| if along_x { (i, j) } else { (j, i) })
        })
        .collect()
}

fn monument_prefab(id: PrefabId) -> Prefab {
    let mut prefab = Prefab::new(id);
    let centre = GRID_CELL_SIZE / 2;
    for x in centre - 1..=centre + 1 {
        for z in centre - 1..=centre + 1 {
            prefab.set(x, WALL_HEIGHT, z, Block::Brick);
        }
    }
    prefab.column(centre, centre, WALL_HEIGHT + 1, WALL_HEIGHT + 1 + OBELISK_HEIGHT, Block::Pillar);
    prefab
}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_dungeon::PartTypeId;
    use std::collections::HashSet;

    fn solid_at(prefab: &Prefab) -> HashSet<BlockPos> {
        prefab.blocks.iter().map(|(pos, _)| *pos).collect()
    }

    #[test]
    fn test_library_covers_every_catalog_prefab() {
        let catalog = Catalog::builtin();
        let library = PrefabLibrary::from_catalog(&catalog);

        assert!(library.get(catalog.monument_prefab()).is_some());
        for outer in catalog.outer_types() {
            if let Some(prefab) = &outer.prefab {
                assert!(library.get(prefab).is_some(), "missing {prefab}");
            }
        }
        for inner in catalog.inner_types() {
            assert!(library.get(&inner.prefab).is_some(), "missing {}", inner.prefab);
        }
        assert!(library.get(&PrefabId::new("dungeon/unknown")).is_none());
    }

    #[test]
    fn test_outer_doorways_follow_open_edges() {
        let catalog = Catalog::builtin();
        let descriptor = catalog.outer(&PartTypeId::new("E")).unwrap();
        let prefab = outer_prefab(PrefabId::new("test"), &descriptor.connection);
        let solid = solid_at(&prefab);
        let last = GRID_CELL_SIZE - 1;
        let mid = GRID_CELL_SIZE / 2;

        assert!(!solid.contains(&BlockPos::new(last, 0, mid)), "east doorway");
        assert!(solid.contains(&BlockPos::new(0, 0, mid)), "west wall");
        assert!(solid.contains(&BlockPos::new(mid, 0, last)), "south wall");
        assert!(solid.contains(&BlockPos::new(mid, 0, 0)), "north wall");
        assert!(solid.contains(&BlockPos::new(mid, -1, mid)), "floor");
        assert!(!solid.contains(&BlockPos::new(mid, 0, mid)), "open interior");
    }

    #[test]
    fn test_sealed_prefab_is_fully_walled() {
        let catalog = Catalog::builtin();
        let prefab = outer_prefab(PrefabId::new("test"), &catalog.sealed_type().connection);
        let solid = solid_at(&prefab);
        let last = GRID_CELL_SIZE - 1;
        for i in 0..GRID_CELL_SIZE {
            for (x, z) in [(0, i), (last, i), (i, 0), (i, last)] {
                assert!(solid.contains(&BlockPos::new(x, 0, z)), "gap at {x},{z}");
            }
        }
        // No block is written twice
        assert_eq!(solid.len(), prefab.blocks.len());
    }

    #[test]
    fn test_corridor_is_open_at_both_ends() {
        let catalog = Catalog::builtin();
        let corridor = catalog.inner(&PartTypeId::new("CORRIDOR_EW")).unwrap();
        let prefab = inner_prefab(corridor);
        let solid = solid_at(&prefab);

        assert!(solid.contains(&BlockPos::new(10, 0, 0)));
        assert!(solid.contains(&BlockPos::new(10, 0, corridor.size_z - 1)));
        assert!(!solid.contains(&BlockPos::new(0, 0, 8)));
        assert!(!solid.contains(&BlockPos::new(corridor.size_x - 1, 0, 8)));
    }

    #[test]
    fn test_decor_variants() {
        let catalog = Catalog::builtin();

        let pillars = inner_prefab(catalog.inner(&PartTypeId::new("CHAMBER_PILLARS")).unwrap());
        assert!(pillars.blocks.iter().any(|(_, block)| *block == Block::Pillar));

        let pool = inner_prefab(catalog.inner(&PartTypeId::new("CHAMBER_POOL")).unwrap());
        let solid = solid_at(&pool);
        assert!(!solid.contains(&BlockPos::new(8, -1, 8)));
        assert!(solid.contains(&BlockPos::new(8, -2, 8)));

        let plain = inner_prefab(catalog.inner(&PartTypeId::new("CHAMBER")).unwrap());
        assert!(plain.blocks.iter().all(|(_, block)| *block != Block::Pillar));
        let solid = solid_at(&plain);
        assert!(!solid.contains(&BlockPos::new(0, 0, 8)), "doorway in the west wall");
    }

    #[test]
    fn test_monument_rises_above_walls() {
        let prefab = monument_prefab(PrefabId::new("dungeon/monument"));
        let top = prefab.blocks.iter().map(|(pos, _)| pos.y).max().unwrap();
        assert!(top >= WALL_HEIGHT + OBELISK_HEIGHT);
        assert!(prefab.blocks.iter().any(|(_, block)| *block == Block::Pillar));
    }
}
