//! # Dungeon Generator
//!
//! Orchestrates a generation request across the two scheduling stages:
//!
//! 1. **Planning** runs through [`Scheduler::run_async`]. It snaps the
//!    requested location to the dungeon grid, lays out the outer parts,
//!    derives the monument and checks the layout against the registry. It
//!    never touches world state.
//! 2. **Publishing** runs through [`Scheduler::run_on_primary`] with
//!    exclusive access to the world. It registers the dungeon, instantiates
//!    the monument and every part's prefabs, then scans for and places
//!    chests.
//!
//! Requests are fire-and-forget. The returned receiver reports what happened
//! and may be dropped. Errors never cross the task boundary: they are logged
//! and reported as [`GenerationOutcome::Failed`].

use crate::catalog::Catalog;
use crate::chest::scan_chests;
use crate::config::DungeonSettings;
use crate::dungeon::Dungeon;
use crate::error::{DungeonError, Result};
use crate::host::DungeonWorld;
use crate::layout::{generate_outer_parts, LayoutParams};
use crate::registry::DungeonRegistry;
use crate::scheduler::Scheduler;
use crate::types::{BlockPos, DungeonId, WorldId, GRID_CELL_SIZE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

// ============================================================================
// Requests and Outcomes
// ============================================================================

/// A request to generate one dungeon.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub world: WorldId,
    /// Any location inside the dungeon's origin cell.
    pub location: BlockPos,
    pub end_part_chance: f32,
    pub part_cap: usize,
}

impl GenerationRequest {
    /// Request using the layout parameters from `settings`.
    pub fn new(world: WorldId, location: BlockPos, settings: &DungeonSettings) -> Self {
        Self {
            world,
            location,
            end_part_chance: settings.end_part_chance,
            part_cap: settings.part_cap,
        }
    }

    fn layout_params(&self) -> Result<LayoutParams> {
        if !(0.0..=1.0).contains(&self.end_part_chance) {
            return Err(DungeonError::InvalidSettings(format!(
                "end_part_chance must be within [0, 1], got {}",
                self.end_part_chance
            )));
        }
        self.check_bounds()?;
        Ok(LayoutParams {
            end_part_chance: self.end_part_chance,
            part_cap: self.part_cap,
        })
    }

    /// Rejects locations whose layout could leave the `i32` coordinate range.
    ///
    /// Growth stops at most `part_cap + 1` cells from the origin. One more
    /// cell covers the prefab footprint and one the snap to the grid.
    fn check_bounds(&self) -> Result<()> {
        let reach = i32::try_from(self.part_cap)
            .ok()
            .and_then(|cap| cap.checked_add(3))
            .and_then(|cells| cells.checked_mul(GRID_CELL_SIZE));
        let fits = reach.is_some_and(|reach| {
            self.location.checked_offset(reach, GRID_CELL_SIZE, reach).is_some()
                && self.location.checked_offset(-reach, -GRID_CELL_SIZE, -reach).is_some()
        });
        if fits {
            Ok(())
        } else {
            Err(DungeonError::OutOfBounds(format!(
                "a dungeon of up to {} parts at {} does not fit in the world",
                self.part_cap, self.location
            )))
        }
    }
}

/// Why a generated layout was not published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonReason {
    /// The layout has no monument anchor at its origin.
    NoMonument,
    /// An outer part shares its location with a registered dungeon.
    Collision,
}

impl fmt::Display for AbandonReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbandonReason::NoMonument => write!(f, "no monument"),
            AbandonReason::Collision => write!(f, "collision with an existing dungeon"),
        }
    }
}

/// Result of a generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Published {
        id: DungeonId,
        monument: BlockPos,
        outer_parts: usize,
        inner_parts: usize,
        chests: usize,
    },
    Abandoned(AbandonReason),
    Failed(String),
}

impl GenerationOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, GenerationOutcome::Published { .. })
    }
}

/// Output of the planning stage.
#[derive(Debug)]
pub enum Plan {
    Ready { dungeon: Dungeon, monument: BlockPos },
    Abandoned(AbandonReason),
}

// ============================================================================
// Stages
// ============================================================================

/// Planning stage. Pure apart from a snapshot read of `registry`.
pub fn plan_dungeon<R: Rng + ?Sized>(
    catalog: &Catalog,
    registry: &dyn DungeonRegistry,
    request: &GenerationRequest,
    rng: &mut R,
) -> Result<Plan> {
    let params = request.layout_params()?;
    let origin = request.location.to_dungeon_grid();
    let parts = generate_outer_parts(catalog, origin, params, rng)?;
    let dungeon = Dungeon::new(request.world.clone(), parts, catalog);

    let Some(monument) = dungeon.monument_location() else {
        return Ok(Plan::Abandoned(AbandonReason::NoMonument));
    };
    if registry.collides(&dungeon) {
        return Ok(Plan::Abandoned(AbandonReason::Collision));
    }
    Ok(Plan::Ready { dungeon, monument })
}

/// Publishing stage. Must run on the thread that owns `world`.
pub fn publish_dungeon<W, R>(
    world: &mut W,
    dungeon: Dungeon,
    monument: BlockPos,
    catalog: &Catalog,
    settings: &DungeonSettings,
    registry: &dyn DungeonRegistry,
    rng: &mut R,
) -> Result<GenerationOutcome>
where
    W: DungeonWorld + ?Sized,
    R: Rng + ?Sized,
{
    let dungeon = registry.append(dungeon);

    world.instantiate(catalog.monument_prefab(), monument, true)?;

    for part in dungeon.outer_parts() {
        if part.has_inner_parts() {
            for inner in &part.inner_parts {
                let descriptor = catalog.require_inner(&inner.inner_type)?;
                world.instantiate(&descriptor.prefab, inner.world_location, false)?;
            }
        } else {
            let descriptor = part.descriptor(catalog)?;
            let prefab = descriptor.prefab.as_ref().ok_or_else(|| {
                DungeonError::Placement(format!("outer type {} has no prefab", descriptor.id))
            })?;
            world.instantiate(prefab, part.world_location, false)?;
        }
    }

    let chests = scan_chests(&*world, &dungeon, settings, rng);
    for chest in &chests {
        world.place_chest(chest)?;
    }

    info!(
        "🏰 Generated new dungeon with {} inner parts at monument location {}",
        dungeon.size(),
        monument
    );

    Ok(GenerationOutcome::Published {
        id: dungeon.id(),
        monument,
        outer_parts: dungeon.outer_parts().len(),
        inner_parts: dungeon.size(),
        chests: chests.len(),
    })
}

// ============================================================================
// Generator
// ============================================================================

/// Entry point for dungeon generation, shared by every request source.
pub struct DungeonGenerator<W> {
    catalog: Arc<Catalog>,
    settings: Arc<DungeonSettings>,
    registry: Arc<dyn DungeonRegistry>,
    scheduler: Arc<dyn Scheduler<W>>,
    rng: Mutex<StdRng>,
}

impl<W: DungeonWorld + 'static> DungeonGenerator<W> {
    /// Creates a generator. `seed` feeds the master RNG every request draws
    /// its own seed from.
    pub fn new(
        catalog: Arc<Catalog>,
        settings: Arc<DungeonSettings>,
        registry: Arc<dyn DungeonRegistry>,
        scheduler: Arc<dyn Scheduler<W>>,
        seed: u64,
    ) -> Self {
        Self {
            catalog,
            settings,
            registry,
            scheduler,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn settings(&self) -> &Arc<DungeonSettings> {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<dyn DungeonRegistry> {
        &self.registry
    }

    /// Draws a value from the master RNG, e.g. for spawn rolls.
    pub fn roll(&self) -> f64 {
        self.master_rng().gen()
    }

    /// Starts generating a dungeon for `request`.
    pub fn generate_dungeon(&self, request: GenerationRequest) -> oneshot::Receiver<GenerationOutcome> {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let request_seed: u64 = self.master_rng().gen();

        let catalog = self.catalog.clone();
        let settings = self.settings.clone();
        let registry = self.registry.clone();
        let scheduler = self.scheduler.clone();

        debug!(
            "🧭 Dungeon requested in '{}' at {} (end chance {}, cap {})",
            request.world, request.location, request.end_part_chance, request.part_cap
        );

        self.scheduler.run_async(Box::new(move || {
            let mut rng = StdRng::seed_from_u64(request_seed);
            let (dungeon, monument) = match plan_dungeon(&catalog, registry.as_ref(), &request, &mut rng) {
                Ok(Plan::Ready { dungeon, monument }) => (dungeon, monument),
                Ok(Plan::Abandoned(reason)) => {
                    debug!("🪦 Abandoned dungeon at {}: {}", request.location, reason);
                    let _ = outcome_tx.send(GenerationOutcome::Abandoned(reason));
                    return;
                }
                Err(e) => {
                    warn!("⚠️ Dungeon generation at {} failed: {}", request.location, e);
                    let _ = outcome_tx.send(GenerationOutcome::Failed(e.to_string()));
                    return;
                }
            };

            scheduler.run_on_primary(Box::new(move |world: &mut W| {
                let outcome = publish_dungeon(
                    world,
                    dungeon,
                    monument,
                    &catalog,
                    &settings,
                    registry.as_ref(),
                    &mut rng,
                )
                .unwrap_or_else(|e| {
                    warn!("⚠️ Failed to publish dungeon at {}: {}", monument, e);
                    GenerationOutcome::Failed(e.to_string())
                });
                let _ = outcome_tx.send(outcome);
            }));
        }));

        outcome_rx
    }

    fn master_rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemoryRegistry;
    use crate::scheduler::primary_channel;
    use crate::test_support::RecordingWorld;
    use tokio::runtime::Handle;

    fn settings() -> DungeonSettings {
        DungeonSettings {
            end_part_chance: 0.5,
            part_cap: 12,
            ..DungeonSettings::default()
        }
    }

    fn build_generator(
        registry: Arc<InMemoryRegistry>,
        seed: u64,
    ) -> (DungeonGenerator<RecordingWorld>, crate::scheduler::PrimaryQueue<RecordingWorld>) {
        let (scheduler, queue) = primary_channel::<RecordingWorld>(Handle::current());
        let generator = DungeonGenerator::new(
            Arc::new(Catalog::builtin()),
            Arc::new(settings()),
            registry,
            Arc::new(scheduler),
            seed,
        );
        (generator, queue)
    }

    #[test]
    fn test_plan_snaps_to_grid() {
        let catalog = Catalog::builtin();
        let registry = InMemoryRegistry::new();
        let request = GenerationRequest::new(WorldId::new("aether"), BlockPos::new(-5, 20, 97), &settings());
        let mut rng = StdRng::seed_from_u64(3);

        match plan_dungeon(&catalog, &registry, &request, &mut rng).unwrap() {
            Plan::Ready { dungeon, monument } => {
                assert_eq!(monument, BlockPos::new(-GRID_CELL_SIZE, 20, GRID_CELL_SIZE));
                assert_eq!(dungeon.world(), &WorldId::new("aether"));
            }
            Plan::Abandoned(reason) => panic!("unexpected abandon: {reason}"),
        }
    }

    #[test]
    fn test_plan_rejects_invalid_chance() {
        let catalog = Catalog::builtin();
        let registry = InMemoryRegistry::new();
        let mut request = GenerationRequest::new(WorldId::new("aether"), BlockPos::new(0, 20, 0), &settings());
        request.end_part_chance = 2.0;
        let mut rng = StdRng::seed_from_u64(3);

        assert!(matches!(
            plan_dungeon(&catalog, &registry, &request, &mut rng),
            Err(DungeonError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_plan_rejects_locations_at_the_coordinate_edge() {
        let catalog = Catalog::builtin();
        let registry = InMemoryRegistry::new();
        let mut rng = StdRng::seed_from_u64(3);
        let edges = [
            BlockPos::new(i32::MAX - 10, 20, 0),
            BlockPos::new(0, 20, i32::MIN + 10),
            BlockPos::new(0, i32::MAX, 0),
        ];

        for location in edges {
            let request = GenerationRequest::new(WorldId::new("aether"), location, &settings());
            assert!(
                matches!(
                    plan_dungeon(&catalog, &registry, &request, &mut rng),
                    Err(DungeonError::OutOfBounds(_))
                ),
                "{location} should be out of bounds"
            );
        }

        let mut request = GenerationRequest::new(WorldId::new("aether"), BlockPos::new(0, 20, 0), &settings());
        request.part_cap = usize::MAX;
        assert!(matches!(
            plan_dungeon(&catalog, &registry, &request, &mut rng),
            Err(DungeonError::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_plan_accepts_locations_with_room_to_grow() {
        let catalog = Catalog::builtin();
        let registry = InMemoryRegistry::new();
        let mut rng = StdRng::seed_from_u64(3);
        // Cap 12 reaches 15 cells in every direction
        let location = BlockPos::new(i32::MAX - 15 * GRID_CELL_SIZE, 20, i32::MIN + 15 * GRID_CELL_SIZE);
        let request = GenerationRequest::new(WorldId::new("aether"), location, &settings());

        assert!(plan_dungeon(&catalog, &registry, &request, &mut rng).is_ok());
    }

    #[test]
    fn test_end_to_end_cap_one_yields_terminal_seed() {
        let catalog = Catalog::builtin();
        let registry = InMemoryRegistry::new();
        let request = GenerationRequest {
            world: WorldId::new("aether"),
            location: BlockPos::new(10, 20, 10),
            end_part_chance: 0.0,
            part_cap: 1,
        };
        let mut rng = StdRng::seed_from_u64(11);

        let Plan::Ready { dungeon, monument } = plan_dungeon(&catalog, &registry, &request, &mut rng).unwrap() else {
            panic!("single room dungeon should be publishable");
        };
        assert_eq!(dungeon.outer_parts().len(), 1);
        assert_eq!(monument, BlockPos::new(0, 20, 0));
    }

    #[test]
    fn test_publish_places_monument_prefabs_and_chests() {
        let catalog = Catalog::builtin();
        let registry = InMemoryRegistry::new();
        let request = GenerationRequest::new(WorldId::new("aether"), BlockPos::new(0, 20, 0), &settings());
        let mut rng = StdRng::seed_from_u64(21);
        let Plan::Ready { dungeon, monument } = plan_dungeon(&catalog, &registry, &request, &mut rng).unwrap() else {
            panic!("empty registry cannot collide");
        };
        let expected_prefabs: usize = dungeon
            .outer_parts()
            .iter()
            .map(|part| part.inner_parts.len().max(1))
            .sum();

        let mut world = RecordingWorld::with_walls();
        let outcome = publish_dungeon(&mut world, dungeon, monument, &catalog, &settings(), &registry, &mut rng).unwrap();

        assert_eq!(registry.len(), 1);
        let monuments: Vec<_> = world.prefabs.iter().filter(|p| p.is_monument).collect();
        assert_eq!(monuments.len(), 1);
        assert_eq!(monuments[0].prefab, *catalog.monument_prefab());
        assert_eq!(monuments[0].location, monument);
        assert_eq!(world.prefabs.len(), expected_prefabs + 1);

        match outcome {
            GenerationOutcome::Published { chests, monument: reported, .. } => {
                assert_eq!(reported, monument);
                assert_eq!(chests, world.chests.len());
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_publish_failure_is_an_error() {
        let catalog = Catalog::builtin();
        let registry = InMemoryRegistry::new();
        let request = GenerationRequest::new(WorldId::new("aether"), BlockPos::new(0, 20, 0), &settings());
        let mut rng = StdRng::seed_from_u64(21);
        let Plan::Ready { dungeon, monument } = plan_dungeon(&catalog, &registry, &request, &mut rng).unwrap() else {
            panic!("empty registry cannot collide");
        };

        let mut world = RecordingWorld::default();
        world.fail_placement = true;
        let result = publish_dungeon(&mut world, dungeon, monument, &catalog, &settings(), &registry, &mut rng);
        assert!(matches!(result, Err(DungeonError::Placement(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_generate_publishes_then_rejects_collision() {
        let registry = Arc::new(InMemoryRegistry::new());
        let (generator, mut queue) = build_generator(registry.clone(), 99);
        let mut world = RecordingWorld::with_walls();
        let location = BlockPos::new(400, 20, -400);

        let first = generator.generate_dungeon(GenerationRequest::new(WorldId::new("aether"), location, &settings()));
        let outcome = queue.run_until(&mut world, first).await.unwrap();
        assert!(outcome.is_published(), "first dungeon should publish: {outcome:?}");
        assert_eq!(registry.len(), 1);

        let placed = world.prefabs.len();
        let second = generator.generate_dungeon(GenerationRequest::new(WorldId::new("aether"), location, &settings()));
        let outcome = queue.run_until(&mut world, second).await.unwrap();
        assert_eq!(outcome, GenerationOutcome::Abandoned(AbandonReason::Collision));
        assert_eq!(registry.len(), 1);
        assert_eq!(world.prefabs.len(), placed, "abandoned dungeons place nothing");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_generate_reports_failures() {
        let registry = Arc::new(InMemoryRegistry::new());
        let (generator, mut queue) = build_generator(registry.clone(), 5);
        let mut world = RecordingWorld::default();
        world.fail_placement = true;

        let request = GenerationRequest::new(WorldId::new("aether"), BlockPos::new(0, 20, 0), &settings());
        let outcome = queue.run_until(&mut world, generator.generate_dungeon(request)).await.unwrap();
        assert!(matches!(outcome, GenerationOutcome::Failed(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_generate_at_the_coordinate_edge_fails_cleanly() {
        let registry = Arc::new(InMemoryRegistry::new());
        let (generator, mut queue) = build_generator(registry.clone(), 5);
        let mut world = RecordingWorld::with_walls();

        let request = GenerationRequest::new(WorldId::new("aether"), BlockPos::new(i32::MAX - 10, 20, 0), &settings());
        let outcome = queue.run_until(&mut world, generator.generate_dungeon(request)).await.unwrap();
        assert!(matches!(outcome, GenerationOutcome::Failed(_)), "{outcome:?}");
        assert!(registry.is_empty());
        assert!(world.prefabs.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_same_seed_same_dungeon() {
        let mut layouts = Vec::new();
        for _ in 0..2 {
            let registry = Arc::new(InMemoryRegistry::new());
            let (generator, mut queue) = build_generator(registry.clone(), 1234);
            let mut world = RecordingWorld::with_walls();
            let request = GenerationRequest::new(WorldId::new("aether"), BlockPos::new(0, 20, 0), &settings());
            queue.run_until(&mut world, generator.generate_dungeon(request)).await.unwrap();

            let dungeon = registry.list().pop().unwrap();
            layouts.push(dungeon.outer_parts().to_vec());
        }
        assert_eq!(layouts[0], layouts[1]);
    }
}
