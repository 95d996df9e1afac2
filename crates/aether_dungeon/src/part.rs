//! Placed dungeon modules.

use crate::catalog::{Catalog, OuterPartDescriptor, PartTypeId};
use crate::error::Result;
use crate::types::{BlockPos, GridPos};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An inner module placed inside an outer part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerPart {
    pub inner_type: PartTypeId,
    pub world_location: BlockPos,
}

/// An outer module placed on the dungeon grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OuterPart {
    pub outer_type: PartTypeId,
    /// Grid cell relative to the dungeon origin.
    pub relative_position: GridPos,
    /// World anchor of the cell (its north-west corner).
    pub world_location: BlockPos,
    /// Materialized inner parts; empty when the type uses a single prefab.
    pub inner_parts: Vec<InnerPart>,
}

impl OuterPart {
    /// Places `descriptor` at `relative_position` of a dungeon rooted at `origin`,
    /// choosing one candidate uniformly at random for every inner slot.
    pub fn new<R: Rng + ?Sized>(
        descriptor: &OuterPartDescriptor,
        relative_position: GridPos,
        origin: BlockPos,
        rng: &mut R,
    ) -> Self {
        let world_location = origin.grid_anchor(relative_position);
        let inner_parts = descriptor
            .inner
            .iter()
            .filter(|slot| !slot.candidates.is_empty())
            .map(|slot| InnerPart {
                inner_type: slot.candidates[rng.gen_range(0..slot.candidates.len())].clone(),
                world_location: world_location.offset(slot.offset_x, 0, slot.offset_z),
            })
            .collect();

        Self {
            outer_type: descriptor.id.clone(),
            relative_position,
            world_location,
            inner_parts,
        }
    }

    pub fn has_inner_parts(&self) -> bool {
        !self.inner_parts.is_empty()
    }

    /// Looks up this part's type descriptor.
    pub fn descriptor<'c>(&self, catalog: &'c Catalog) -> Result<&'c OuterPartDescriptor> {
        catalog.require_outer(&self.outer_type)
    }
}
