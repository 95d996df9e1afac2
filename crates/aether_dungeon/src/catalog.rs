//! # Module Catalog
//!
//! The catalog is the data-driven table of every module a dungeon can be
//! assembled from. Outer modules fill one dungeon grid cell and declare a
//! [`Connection`] signature; they either carry a single prefab (terminal and
//! corridor pieces) or a list of inner slots that are filled with randomly
//! chosen inner modules when the part is placed.
//!
//! The table is built once (from [`Catalog::builtin`] or a TOML document) and
//! shared read-only between generation tasks. Selection logic only ever looks
//! at descriptors; there is no per-type code.
//!
//! ## TOML layout
//!
//! ```toml
//! seed = "EWSN"
//! sealed = "SEALED"
//! monument_prefab = "dungeon/monument"
//!
//! [[outer]]
//! id = "EWSN"
//! connection = { east = "open", west = "open", south = "open", north = "open" }
//!
//! [[outer.inner]]
//! offset_x = 32
//! offset_z = 32
//! candidates = ["CHAMBER"]
//!
//! [[inner]]
//! id = "CHAMBER"
//! prefab = "dungeon/inner/chamber"
//! size_x = 16
//! size_z = 16
//! ```

use crate::connection::{Connection, ConnectionState};
use crate::error::{DungeonError, Result};
use crate::types::{Direction, GRID_CELL_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of an outer or inner module type, e.g. `EWSN` or `CHAMBER`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartTypeId(pub String);

impl PartTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a prefab the host knows how to instantiate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefabId(pub String);

impl PrefabId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrefabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// Interior decoration of a room prefab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomDecor {
    #[default]
    Plain,
    Pillars,
    Pool,
}

/// An inner module: a sub-room placed inside an outer part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InnerPartDescriptor {
    pub id: PartTypeId,
    pub prefab: PrefabId,
    /// Footprint along X, in blocks.
    pub size_x: i32,
    /// Footprint along Z, in blocks.
    pub size_z: i32,
    #[serde(default)]
    pub decor: RoomDecor,
}

/// A slot inside an outer part, filled with one of `candidates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InnerSlot {
    /// Offset from the outer part anchor along X.
    pub offset_x: i32,
    /// Offset from the outer part anchor along Z.
    pub offset_z: i32,
    pub candidates: Vec<PartTypeId>,
}

/// An outer module occupying one dungeon grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OuterPartDescriptor {
    pub id: PartTypeId,
    pub connection: Connection,
    /// Prefab used when the part has no inner slots.
    #[serde(default)]
    pub prefab: Option<PrefabId>,
    #[serde(default)]
    pub inner: Vec<InnerSlot>,
}

impl OuterPartDescriptor {
    pub fn has_inner_parts(&self) -> bool {
        !self.inner.is_empty()
    }
}

/// Serialized form of a catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDefinition {
    /// Four-way open type every dungeon grows from.
    pub seed: PartTypeId,
    /// Fully closed type used when the seed itself must be terminal.
    pub sealed: PartTypeId,
    /// Prefab placed at the monument location of every dungeon.
    pub monument_prefab: PrefabId,
    pub outer: Vec<OuterPartDescriptor>,
    #[serde(default)]
    pub inner: Vec<InnerPartDescriptor>,
}

// ============================================================================
// Catalog
// ============================================================================

/// Validated, indexed module catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    definition: CatalogDefinition,
    outer_index: HashMap<PartTypeId, usize>,
    inner_index: HashMap<PartTypeId, usize>,
}

impl Catalog {
    /// Validates `definition` and builds the lookup tables.
    pub fn new(definition: CatalogDefinition) -> Result<Self> {
        let mut outer_index = HashMap::with_capacity(definition.outer.len());
        for (i, descriptor) in definition.outer.iter().enumerate() {
            if outer_index.insert(descriptor.id.clone(), i).is_some() {
                return Err(invalid(format!("duplicate outer type {}", descriptor.id)));
            }
        }

        let mut inner_index = HashMap::with_capacity(definition.inner.len());
        for (i, descriptor) in definition.inner.iter().enumerate() {
            if inner_index.insert(descriptor.id.clone(), i).is_some() {
                return Err(invalid(format!("duplicate inner type {}", descriptor.id)));
            }
        }

        let catalog = Self { definition, outer_index, inner_index };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parses and validates a catalog from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let definition: CatalogDefinition = toml::from_str(content)?;
        Self::new(definition)
    }

    /// The catalog shipped with the plugin.
    ///
    /// Contains one outer type per non-empty set of open edges, named by those
    /// edges (`EWSN`, `EW`, `S`, ...), plus `SEALED`. Types with three or four
    /// open edges are split into a central chamber and one corridor arm per
    /// open edge.
    pub fn builtin() -> Self {
        let definition = builtin_definition();
        let outer_index = definition
            .outer
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.clone(), i))
            .collect();
        let inner_index = definition
            .inner
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.clone(), i))
            .collect();
        Self { definition, outer_index, inner_index }
    }

    pub fn definition(&self) -> &CatalogDefinition {
        &self.definition
    }

    pub fn outer_types(&self) -> &[OuterPartDescriptor] {
        &self.definition.outer
    }

    pub fn inner_types(&self) -> &[InnerPartDescriptor] {
        &self.definition.inner
    }

    pub fn outer(&self, id: &PartTypeId) -> Option<&OuterPartDescriptor> {
        self.outer_index.get(id).map(|&i| &self.definition.outer[i])
    }

    pub fn inner(&self, id: &PartTypeId) -> Option<&InnerPartDescriptor> {
        self.inner_index.get(id).map(|&i| &self.definition.inner[i])
    }

    /// Looks up an outer type, failing with [`DungeonError::UnknownPartType`].
    pub fn require_outer(&self, id: &PartTypeId) -> Result<&OuterPartDescriptor> {
        self.outer(id).ok_or_else(|| DungeonError::UnknownPartType(id.clone()))
    }

    /// Looks up an inner type, failing with [`DungeonError::UnknownPartType`].
    pub fn require_inner(&self, id: &PartTypeId) -> Result<&InnerPartDescriptor> {
        self.inner(id).ok_or_else(|| DungeonError::UnknownPartType(id.clone()))
    }

    pub fn seed_type(&self) -> &OuterPartDescriptor {
        // Presence is checked on construction
        &self.definition.outer[self.outer_index[&self.definition.seed]]
    }

    pub fn sealed_type(&self) -> &OuterPartDescriptor {
        &self.definition.outer[self.outer_index[&self.definition.sealed]]
    }

    pub fn monument_prefab(&self) -> &PrefabId {
        &self.definition.monument_prefab
    }

    /// Whether a part of type `id` at the dungeon origin anchors the monument.
    pub fn is_monument_anchor(&self, id: &PartTypeId) -> bool {
        *id == self.definition.seed || *id == self.definition.sealed
    }

    /// Every outer type whose connection is valid against `constraint`, in catalog order.
    pub fn candidates(&self, constraint: &Connection) -> Vec<&OuterPartDescriptor> {
        self.definition
            .outer
            .iter()
            .filter(|descriptor| constraint.is_valid(&descriptor.connection))
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.definition.outer.is_empty() {
            return Err(invalid("catalog has no outer types"));
        }

        for descriptor in &self.definition.inner {
            if descriptor.size_x <= 0 || descriptor.size_z <= 0 {
                return Err(invalid(format!("inner type {} has an empty footprint", descriptor.id)));
            }
        }

        for descriptor in &self.definition.outer {
            if !descriptor.connection.is_resolved() {
                return Err(invalid(format!(
                    "outer type {} has unresolved edges [{}]",
                    descriptor.id, descriptor.connection
                )));
            }
            if descriptor.prefab.is_none() && descriptor.inner.is_empty() {
                return Err(invalid(format!(
                    "outer type {} has neither a prefab nor inner slots",
                    descriptor.id
                )));
            }
            for slot in &descriptor.inner {
                self.validate_slot(&descriptor.id, slot)?;
            }
        }

        let seed = self
            .outer(&self.definition.seed)
            .ok_or_else(|| invalid(format!("seed type {} is not defined", self.definition.seed)))?;
        if seed.connection != Connection::uniform(ConnectionState::Open) {
            return Err(invalid(format!("seed type {} must be open on every edge", seed.id)));
        }

        let sealed = self
            .outer(&self.definition.sealed)
            .ok_or_else(|| invalid(format!("sealed type {} is not defined", self.definition.sealed)))?;
        if sealed.connection != Connection::uniform(ConnectionState::Closed) {
            return Err(invalid(format!("sealed type {} must be closed on every edge", sealed.id)));
        }

        Ok(())
    }

    fn validate_slot(&self, owner: &PartTypeId, slot: &InnerSlot) -> Result<()> {
        if slot.candidates.is_empty() {
            return Err(invalid(format!("outer type {owner} has a slot without candidates")));
        }
        for candidate in &slot.candidates {
            let inner = self.inner(candidate).ok_or_else(|| {
                invalid(format!("outer type {owner} references unknown inner type {candidate}"))
            })?;
            let fits = slot.offset_x >= 0
                && slot.offset_z >= 0
                && slot.offset_x + inner.size_x <= GRID_CELL_SIZE
                && slot.offset_z + inner.size_z <= GRID_CELL_SIZE;
            if !fits {
                return Err(invalid(format!(
                    "inner type {candidate} does not fit its slot in outer type {owner}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn invalid(message: impl Into<String>) -> DungeonError {
    DungeonError::InvalidCatalog(message.into())
}

// ============================================================================
// Built-in content
// ============================================================================

const CHAMBER_OFFSET: i32 = 32;
const CHAMBER_SIZE: i32 = 16;
const ARM_LENGTH: i32 = 32;

fn inner_type(id: &str, prefab: &str, size_x: i32, size_z: i32, decor: RoomDecor) -> InnerPartDescriptor {
    InnerPartDescriptor {
        id: PartTypeId::new(id),
        prefab: PrefabId::new(prefab),
        size_x,
        size_z,
        decor,
    }
}

fn arm_slot(direction: Direction) -> InnerSlot {
    let (offset_x, offset_z, axis) = match direction {
        Direction::East => (CHAMBER_OFFSET + CHAMBER_SIZE, CHAMBER_OFFSET, "EW"),
        Direction::West => (0, CHAMBER_OFFSET, "EW"),
        Direction::South => (CHAMBER_OFFSET, CHAMBER_OFFSET + CHAMBER_SIZE, "SN"),
        Direction::North => (CHAMBER_OFFSET, 0, "SN"),
    };
    InnerSlot {
        offset_x,
        offset_z,
        candidates: vec![
            PartTypeId::new(format!("CORRIDOR_{axis}")),
            PartTypeId::new(format!("CORRIDOR_{axis}_PILLARS")),
        ],
    }
}

fn builtin_definition() -> CatalogDefinition {
    let inner = vec![
        inner_type("CHAMBER", "dungeon/inner/chamber", CHAMBER_SIZE, CHAMBER_SIZE, RoomDecor::Plain),
        inner_type("CHAMBER_PILLARS", "dungeon/inner/chamber_pillars", CHAMBER_SIZE, CHAMBER_SIZE, RoomDecor::Pillars),
        inner_type("CHAMBER_POOL", "dungeon/inner/chamber_pool", CHAMBER_SIZE, CHAMBER_SIZE, RoomDecor::Pool),
        inner_type("CORRIDOR_EW", "dungeon/inner/corridor_ew", ARM_LENGTH, CHAMBER_SIZE, RoomDecor::Plain),
        inner_type("CORRIDOR_EW_PILLARS", "dungeon/inner/corridor_ew_pillars", ARM_LENGTH, CHAMBER_SIZE, RoomDecor::Pillars),
        inner_type("CORRIDOR_SN", "dungeon/inner/corridor_sn", CHAMBER_SIZE, ARM_LENGTH, RoomDecor::Plain),
        inner_type("CORRIDOR_SN_PILLARS", "dungeon/inner/corridor_sn_pillars", CHAMBER_SIZE, ARM_LENGTH, RoomDecor::Pillars),
    ];

    let mut outer = Vec::with_capacity(16);
    for mask in 1u8..16 {
        let open: Vec<Direction> = Direction::ALL
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, direction)| *direction)
            .collect();
        let id: String = open.iter().map(|direction| direction.letter()).collect();

        let (prefab, slots) = if open.len() >= 3 {
            let mut slots = vec![InnerSlot {
                offset_x: CHAMBER_OFFSET,
                offset_z: CHAMBER_OFFSET,
                candidates: vec![
                    PartTypeId::new("CHAMBER"),
                    PartTypeId::new("CHAMBER_PILLARS"),
                    PartTypeId::new("CHAMBER_POOL"),
                ],
            }];
            slots.extend(open.iter().map(|direction| arm_slot(*direction)));
            (None, slots)
        } else {
            (Some(PrefabId::new(format!("dungeon/outer/{}", id.to_lowercase()))), Vec::new())
        };

        outer.push(OuterPartDescriptor {
            id: PartTypeId::new(id),
            connection: Connection::open_on(&open),
            prefab,
            inner: slots,
        });
    }

    outer.push(OuterPartDescriptor {
        id: PartTypeId::new("SEALED"),
        connection: Connection::uniform(ConnectionState::Closed),
        prefab: Some(PrefabId::new("dungeon/outer/sealed")),
        inner: Vec::new(),
    });

    CatalogDefinition {
        seed: PartTypeId::new("EWSN"),
        sealed: PartTypeId::new("SEALED"),
        monument_prefab: PrefabId::new("dungeon/monument"),
        outer,
        inner,
    }
}
