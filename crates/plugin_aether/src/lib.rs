//! # Aether Plugin
//!
//! Host-facing shell around the [`aether_dungeon`] generator. The plugin
//! owns the Aether world and the primary task queue: the host calls
//! [`AetherPlugin::tick`] from its main loop, which is where every dungeon is
//! built into the world.

use aether_dungeon::{
    primary_channel, BlockPos, Catalog, Dungeon, DungeonGenerator, DungeonRegistry,
    GenerationOutcome, GenerationRequest, InMemoryRegistry, PrimaryQueue, WorldId,
};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, info};

pub mod config;
pub mod error;
pub mod listener;
pub mod logging;
pub mod prefab;
pub mod world;

pub use config::{LoggingSettings, PluginConfig, WorldSettings};
pub use error::{PluginError, Result};
pub use listener::{ChunkPos, DungeonListener};
pub use prefab::{Prefab, PrefabLibrary};
pub use world::{AetherWorld, Block};

// ============================================================================
// Aether Plugin
// ============================================================================

pub struct AetherPlugin {
    config: PluginConfig,
    world: AetherWorld,
    queue: PrimaryQueue<AetherWorld>,
    generator: Arc<DungeonGenerator<AetherWorld>>,
    registry: Arc<InMemoryRegistry>,
    listener: DungeonListener,
}

impl AetherPlugin {
    /// Loads the configuration at `config_path` (creating it if missing) and
    /// starts the plugin. Must be called inside a tokio runtime.
    ///
    /// Installs the configured log subscriber unless the host already has one.
    pub async fn on_enable(config_path: &Path) -> Result<Self> {
        let config = PluginConfig::load_from_file(config_path).await?;
        if let Err(e) = logging::setup_logging(&config.logging, false) {
            debug!("🔧 Keeping the existing log subscriber: {}", e);
        }
        Self::start(config, config_path.parent()).await
    }

    /// Starts the plugin from an already loaded configuration. A relative
    /// catalog file is resolved against the working directory.
    pub async fn with_config(config: PluginConfig) -> Result<Self> {
        Self::start(config, None).await
    }

    async fn start(config: PluginConfig, base_dir: Option<&Path>) -> Result<Self> {
        config.validate().map_err(PluginError::InvalidConfig)?;

        let catalog = match &config.world.catalog_file {
            Some(file) => {
                let path = match base_dir {
                    Some(dir) => dir.join(file),
                    None => file.into(),
                };
                let content = tokio::fs::read_to_string(&path).await?;
                let catalog = Catalog::from_toml_str(&content)?;
                info!("📚 Loaded module catalog from {}", path.display());
                catalog
            }
            None => Catalog::builtin(),
        };

        let handle = Handle::try_current().map_err(|e| PluginError::Runtime(e.to_string()))?;
        let (scheduler, queue) = primary_channel::<AetherWorld>(handle);

        let world_id = WorldId::new(config.world.name.clone());
        let prefabs = Arc::new(PrefabLibrary::from_catalog(&catalog));
        let registry = Arc::new(InMemoryRegistry::new());
        let generator = Arc::new(DungeonGenerator::<AetherWorld>::new(
            Arc::new(catalog),
            Arc::new(config.dungeon.clone()),
            registry.clone(),
            Arc::new(scheduler),
            config.world.seed,
        ));
        let listener = DungeonListener::new(world_id.clone(), generator.clone());

        info!(
            "🌌 Aether plugin enabled for world '{}' ({} module types, {} prefabs)",
            world_id,
            generator.catalog().outer_types().len(),
            prefabs.len()
        );

        Ok(Self {
            world: AetherWorld::new(world_id, prefabs),
            config,
            queue,
            generator,
            registry,
            listener,
        })
    }

    /// Requests a dungeon at `location` in the Aether world.
    pub fn generate_dungeon(&self, location: BlockPos) -> oneshot::Receiver<GenerationOutcome> {
        let request = GenerationRequest::new(self.world.id().clone(), location, &self.config.dungeon);
        self.generator.generate_dungeon(request)
    }

    /// Chunk population hook. See [`DungeonListener::on_chunk_populated`].
    pub fn on_chunk_populated(
        &self,
        world: &WorldId,
        chunk: ChunkPos,
    ) -> Option<oneshot::Receiver<GenerationOutcome>> {
        self.listener.on_chunk_populated(world, chunk)
    }

    /// Runs every queued world task. Call once per host tick.
    pub fn tick(&mut self) -> usize {
        self.queue.drain(&mut self.world)
    }

    /// Runs world tasks as they arrive until `until` completes.
    pub async fn run_until<F: Future>(&mut self, until: F) -> F::Output {
        self.queue.run_until(&mut self.world, until).await
    }

    /// The configuration the plugin was started with.
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// The Aether world dungeons are built into.
    pub fn world(&self) -> &AetherWorld {
        &self.world
    }

    /// Every dungeon published so far.
    pub fn registry(&self) -> &Arc<InMemoryRegistry> {
        &self.registry
    }

    /// Serializes every registered dungeon to JSON for the host's save data.
    pub fn export_registry(&self) -> Result<String> {
        let dungeons = self.registry.list();
        let dungeons: Vec<&Dungeon> = dungeons.iter().map(|dungeon| dungeon.as_ref()).collect();
        Ok(serde_json::to_string_pretty(&dungeons)?)
    }

    /// Runs the remaining world tasks and shuts down. Returns the number of
    /// registered dungeons.
    pub fn on_disable(mut self) -> usize {
        let flushed = self.tick();
        let dungeons = self.registry.len();
        info!(
            "🌌 Aether plugin disabled ({} dungeons registered, {} pending tasks flushed)",
            dungeons, flushed
        );
        dungeons
    }
}
