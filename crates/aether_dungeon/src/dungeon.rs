//! The dungeon aggregate.

use crate::catalog::Catalog;
use crate::part::OuterPart;
use crate::types::{BlockPos, DungeonId, GridPos, WorldId};
use serde::{Deserialize, Serialize};

/// A fully laid out dungeon.
///
/// Built once per generation request and immutable afterwards. The monument
/// location is derived on construction: it is the anchor of the part at the
/// dungeon origin when that part is a monument anchor type, and `None`
/// otherwise, which marks the generation as failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    id: DungeonId,
    world: WorldId,
    outer_parts: Vec<OuterPart>,
    monument_location: Option<BlockPos>,
}

impl Dungeon {
    /// Wraps a finished layout and derives its monument location.
    pub fn new(world: WorldId, outer_parts: Vec<OuterPart>, catalog: &Catalog) -> Self {
        let monument_location = outer_parts
            .iter()
            .find(|part| {
                part.relative_position == GridPos::ORIGIN && catalog.is_monument_anchor(&part.outer_type)
            })
            .map(|part| part.world_location);

        Self {
            id: DungeonId::new(),
            world,
            outer_parts,
            monument_location,
        }
    }

    /// Unique id assigned at construction.
    pub fn id(&self) -> DungeonId {
        self.id
    }

    /// The world this dungeon was generated in.
    pub fn world(&self) -> &WorldId {
        &self.world
    }

    /// Outer parts in placement order, the seed first.
    pub fn outer_parts(&self) -> &[OuterPart] {
        &self.outer_parts
    }

    /// Anchor of the monument, if the origin part qualifies.
    pub fn monument_location(&self) -> Option<BlockPos> {
        self.monument_location
    }

    /// Number of inner parts across all outer parts.
    pub fn size(&self) -> usize {
        self.outer_parts.iter().map(|part| part.inner_parts.len()).sum()
    }

    pub fn part_at(&self, position: GridPos) -> Option<&OuterPart> {
        self.outer_parts
            .iter()
            .find(|part| part.relative_position == position)
    }

    /// True if both dungeons are in the same world and share an outer part anchor.
    pub fn overlaps(&self, other: &Dungeon) -> bool {
        self.world == other.world
            && self.outer_parts.iter().any(|part| {
                other
                    .outer_parts
                    .iter()
                    .any(|other_part| part.world_location == other_part.world_location)
            })
    }
}
