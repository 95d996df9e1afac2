//! # Aether Dungeon
//!
//! Procedural dungeon generation for the Aether dimension.
//!
//! A dungeon is a graph of modular parts laid out on an 80 block grid. Every
//! module type declares which of its four edges are open, and neighbouring
//! modules must agree on the edges they share. Layouts grow outward from a
//! four-way hub until every open edge is matched or the part cap closes the
//! remaining branches.
//!
//! ## Architecture Overview
//!
//! - **Model**: [`Connection`] signatures, the data-driven [`Catalog`] of
//!   module types, placed [`OuterPart`]s and the [`Dungeon`] aggregate
//! - **Layout**: breadth-first frontier growth in [`layout`]
//! - **Content**: prefab instantiation and the chest scan in [`chest`]
//! - **Pipeline**: [`DungeonGenerator`] plans layouts off the primary thread
//!   and publishes them on it through a [`Scheduler`]
//!
//! ## Quick Start Example
//!
//! ```rust,no_run
//! use aether_dungeon::*;
//! use std::sync::Arc;
//!
//! # struct HostWorld;
//! # impl BlockAccess for HostWorld { fn is_air(&self, _: BlockPos) -> bool { true } }
//! # impl PrefabPlacer for HostWorld { fn instantiate(&mut self, _: &PrefabId, _: BlockPos, _: bool) -> Result<()> { Ok(()) } }
//! # impl ChestPlacer for HostWorld { fn place_chest(&mut self, _: &ChestPlacement) -> Result<()> { Ok(()) } }
//! #[tokio::main]
//! async fn main() {
//!     let mut world = HostWorld;
//!     let (scheduler, mut queue) = primary_channel::<HostWorld>(tokio::runtime::Handle::current());
//!     let settings = Arc::new(DungeonSettings::default());
//!     let generator = DungeonGenerator::new(
//!         Arc::new(Catalog::builtin()),
//!         settings.clone(),
//!         Arc::new(InMemoryRegistry::new()),
//!         Arc::new(scheduler),
//!         42,
//!     );
//!
//!     let request = GenerationRequest::new(WorldId::new("aether"), BlockPos::new(0, 20, 0), &settings);
//!     let outcome = queue.run_until(&mut world, generator.generate_dungeon(request)).await;
//!     println!("{outcome:?}");
//! }
//! ```

pub mod catalog;
pub mod chest;
pub mod config;
pub mod connection;
pub mod dungeon;
pub mod error;
pub mod generator;
pub mod host;
pub mod layout;
pub mod loot;
pub mod part;
pub mod registry;
pub mod scheduler;
pub mod types;

#[cfg(test)]
mod test_support;

pub use catalog::{
    Catalog, CatalogDefinition, InnerPartDescriptor, InnerSlot, OuterPartDescriptor, PartTypeId,
    PrefabId, RoomDecor,
};
pub use chest::{chest_facing, scan_chests, ChestPlacement};
pub use config::DungeonSettings;
pub use connection::{Connection, ConnectionState};
pub use dungeon::Dungeon;
pub use error::{DungeonError, Result};
pub use generator::{
    plan_dungeon, publish_dungeon, AbandonReason, DungeonGenerator, GenerationOutcome,
    GenerationRequest, Plan,
};
pub use host::{BlockAccess, ChestPlacer, DungeonWorld, PrefabPlacer};
pub use layout::{generate_outer_parts, LayoutParams};
pub use loot::{ItemStack, LootEntry, LootTable};
pub use part::{InnerPart, OuterPart};
pub use registry::{DungeonRegistry, InMemoryRegistry};
pub use scheduler::{primary_channel, AsyncTask, PrimaryQueue, PrimaryTask, Scheduler, TokioScheduler};
pub use types::*;
