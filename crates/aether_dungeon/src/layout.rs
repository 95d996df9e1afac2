//! # Dungeon Layout
//!
//! Grows the graph of outer parts outward from a seed module, one ring of
//! frontier parts per round.
//!
//! Every round takes the parts added in the previous round and, for each open
//! edge leading to an empty cell, derives the constraint that cell must meet
//! from its already placed neighbours. With the end-part probability the
//! unconstrained edges are closed before matching, which makes the new part a
//! leaf. Once the dungeon holds more than `part_cap` parts the probability is
//! forced to one, so every further part is a leaf and growth stops.
//!
//! ## Empty candidate sets
//!
//! A constraint always has at least one open edge (the edge of the part that
//! led here), so the built-in catalog can satisfy every constraint. Custom
//! catalogs may not. When closing the free edges came from the random draw
//! the cell is retried with its free edges left open; when it came from the
//! part cap, or the plain constraint has no candidate either, the whole
//! generation fails with [`DungeonError::NoCandidate`].

use crate::catalog::{Catalog, OuterPartDescriptor};
use crate::connection::{Connection, ConnectionState};
use crate::error::{DungeonError, Result};
use crate::part::OuterPart;
use crate::types::{BlockPos, Direction, GridPos};
use rand::Rng;
use std::collections::HashMap;
use tracing::trace;

/// Growth parameters of a single layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Probability in `[0, 1]` that a new part becomes a leaf.
    pub end_part_chance: f32,
    /// Soft cap on the number of outer parts.
    pub part_cap: usize,
}

/// Lays out the outer parts of a dungeon whose origin is `origin`.
///
/// `origin` is expected to be snapped to the dungeon grid already. Parts are
/// returned in placement order, the seed first.
pub fn generate_outer_parts<R: Rng + ?Sized>(
    catalog: &Catalog,
    origin: BlockPos,
    params: LayoutParams,
    rng: &mut R,
) -> Result<Vec<OuterPart>> {
    LayoutBuilder::new(catalog, origin, params).build(rng)
}

struct LayoutBuilder<'c> {
    catalog: &'c Catalog,
    origin: BlockPos,
    params: LayoutParams,
    parts: Vec<OuterPart>,
    occupied: HashMap<GridPos, usize>,
}

impl<'c> LayoutBuilder<'c> {
    fn new(catalog: &'c Catalog, origin: BlockPos, params: LayoutParams) -> Self {
        Self {
            catalog,
            origin,
            params,
            parts: Vec::new(),
            occupied: HashMap::new(),
        }
    }

    fn build<R: Rng + ?Sized>(mut self, rng: &mut R) -> Result<Vec<OuterPart>> {
        let seed = self.seed_type();
        let seed_part = OuterPart::new(seed, GridPos::ORIGIN, self.origin, rng);
        self.push(seed_part);

        // parts[frontier_start..] is the frontier of the current round
        let mut frontier_start = 0;
        let mut round = 0;
        while frontier_start < self.parts.len() {
            let frontier_end = self.parts.len();
            for index in frontier_start..frontier_end {
                self.grow_from(index, rng)?;
            }
            trace!(
                "🧱 Layout round {} added {} parts ({} total)",
                round,
                self.parts.len() - frontier_end,
                self.parts.len()
            );
            frontier_start = frontier_end;
            round += 1;
        }

        Ok(self.parts)
    }

    /// The hub normally seeds the dungeon. When the end-part probability at the
    /// seed is certain the sealed type is used instead, so the dungeon is a
    /// single room.
    fn seed_type(&self) -> &'c OuterPartDescriptor {
        let certain_end = self.params.end_part_chance >= 1.0 || self.params.part_cap <= 1;
        if certain_end {
            self.catalog.sealed_type()
        } else {
            self.catalog.seed_type()
        }
    }

    fn grow_from<R: Rng + ?Sized>(&mut self, index: usize, rng: &mut R) -> Result<()> {
        let part = &self.parts[index];
        let descriptor = part.descriptor(self.catalog)?;
        let position = part.relative_position;
        let directions: Vec<Direction> = descriptor.connection.connect_directions().collect();

        for direction in directions {
            let cell = position.neighbor(direction);
            if self.occupied.contains_key(&cell) {
                continue;
            }

            let capped = self.parts.len() > self.params.part_cap;
            let end_part_chance = if capped { 1.0 } else { self.params.end_part_chance };
            let constraint = self.constraint_at(cell)?;
            let part = self.random_part(cell, constraint, end_part_chance, capped, rng)?;
            self.push(part);
        }
        Ok(())
    }

    /// Edge states the neighbours of `cell` present towards it.
    fn constraint_at(&self, cell: GridPos) -> Result<Connection> {
        let mut constraint = Connection::uniform(ConnectionState::DontCare);
        for direction in Direction::ALL {
            if let Some(&index) = self.occupied.get(&cell.neighbor(direction)) {
                let neighbour = self.parts[index].descriptor(self.catalog)?;
                constraint.set_state(direction, neighbour.connection.state(direction.opposite()));
            }
        }
        Ok(constraint)
    }

    fn random_part<R: Rng + ?Sized>(
        &self,
        cell: GridPos,
        constraint: Connection,
        end_part_chance: f32,
        capped: bool,
        rng: &mut R,
    ) -> Result<OuterPart> {
        let end_part = rng.gen::<f32>() < end_part_chance;
        let required = if end_part {
            constraint.set_dont_care_to_closed()
        } else {
            constraint
        };

        let mut candidates = self.catalog.candidates(&required);
        if candidates.is_empty() && end_part && !capped {
            trace!("🧱 No leaf fits cell {}, retrying with free edges", cell);
            candidates = self.catalog.candidates(&constraint);
        }
        if candidates.is_empty() {
            return Err(DungeonError::NoCandidate {
                position: cell,
                constraint: required,
            });
        }

        let descriptor = candidates[rng.gen_range(0..candidates.len())];
        Ok(OuterPart::new(descriptor, cell, self.origin, rng))
    }

    fn push(&mut self, part: OuterPart) {
        self.occupied.insert(part.relative_position, self.parts.len());
        self.parts.push(part);
    }
}
