//! Dungeon generation settings.
//!
//! These are read from the `[dungeon]` table of the plugin configuration file.
//! Every field has a serde default, so partial tables are accepted.

use crate::loot::LootTable;
use serde::{Deserialize, Serialize};

fn default_end_part_chance() -> f32 {
    0.35
}

fn default_part_cap() -> usize {
    40
}

fn default_min_chest_checks() -> u32 {
    4
}

fn default_max_chest_checks() -> u32 {
    12
}

fn default_spawn_chance() -> f64 {
    0.02
}

fn default_spawn_height() -> i32 {
    20
}

/// Tunables for dungeon layout, content and spawning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonSettings {
    /// Probability that a new outer part becomes a leaf
    #[serde(default = "default_end_part_chance")]
    pub end_part_chance: f32,
    /// Soft cap on the number of outer parts per dungeon
    #[serde(default = "default_part_cap")]
    pub part_cap: usize,
    /// Minimum chest placement attempts per outer part
    #[serde(default = "default_min_chest_checks")]
    pub min_chest_checks: u32,
    /// Maximum chest placement attempts per outer part (inclusive)
    #[serde(default = "default_max_chest_checks")]
    pub max_chest_checks: u32,
    /// Probability that a freshly populated chunk starts a dungeon
    #[serde(default = "default_spawn_chance")]
    pub spawn_chance: f64,
    /// Block height dungeons are generated at
    #[serde(default = "default_spawn_height")]
    pub spawn_height: i32,
    /// Loot rolled into every dungeon chest
    #[serde(default)]
    pub loot: LootTable,
}

impl Default for DungeonSettings {
    fn default() -> Self {
        Self {
            end_part_chance: default_end_part_chance(),
            part_cap: default_part_cap(),
            min_chest_checks: default_min_chest_checks(),
            max_chest_checks: default_max_chest_checks(),
            spawn_chance: default_spawn_chance(),
            spawn_height: default_spawn_height(),
            loot: LootTable::default(),
        }
    }
}

impl DungeonSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.end_part_chance) {
            return Err(format!(
                "dungeon.end_part_chance must be within [0, 1], got {}",
                self.end_part_chance
            ));
        }
        if !(0.0..=1.0).contains(&self.spawn_chance) {
            return Err(format!(
                "dungeon.spawn_chance must be within [0, 1], got {}",
                self.spawn_chance
            ));
        }
        if self.min_chest_checks > self.max_chest_checks {
            return Err("dungeon.min_chest_checks must not exceed dungeon.max_chest_checks".to_string());
        }
        self.loot.validate().map_err(|e| format!("dungeon.loot: {e}"))
    }
}
