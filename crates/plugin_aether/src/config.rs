//! Configuration management for the Aether plugin.
//!
//! The plugin reads a single TOML file with `[dungeon]`, `[logging]` and
//! `[world]` tables. Missing tables and fields fall back to their defaults,
//! and a missing file is created with the default configuration.

use crate::error::Result;
use aether_dungeon::DungeonSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

fn default_log_level() -> String {
    "info".to_string()
}

fn default_world_name() -> String {
    "aether".to_string()
}

fn default_world_seed() -> u64 {
    0x00AE_7E12
}

/// Plugin configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Dungeon layout, content and spawning settings
    #[serde(default)]
    pub dungeon: DungeonSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
    /// The world dungeons spawn in
    #[serde(default)]
    pub world: WorldSettings,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

/// Target world settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSettings {
    /// Name of the Aether world; chunks of other worlds never spawn dungeons
    #[serde(default = "default_world_name")]
    pub name: String,
    /// Seed for every random decision the plugin makes
    #[serde(default = "default_world_seed")]
    pub seed: u64,
    /// Optional TOML module catalog replacing the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<String>,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_world_seed(),
            catalog_file: None,
        }
    }
}

impl PluginConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates it with default values.
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: PluginConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = PluginConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("📝 Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level, valid_levels
            ));
        }

        if self.world.name.is_empty() {
            return Err("World name cannot be empty".to_string());
        }

        self.dungeon.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_plugin_config_default() {
        let config = PluginConfig::default();

        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert_eq!(config.world.name, "aether");
        assert!(config.world.catalog_file.is_none());
        assert_eq!(config.dungeon, DungeonSettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PluginConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().unwrap_err().contains("Invalid log level"));

        let mut config = PluginConfig::default();
        config.world.name.clear();
        assert!(config.validate().is_err());

        let mut config = PluginConfig::default();
        config.dungeon.end_part_chance = 1.01;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("aether.toml");

        let config = PluginConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.world.name, "aether");
        assert!(path.exists());

        // The written file loads back to the same values
        let reloaded = PluginConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.dungeon, config.dungeon);
        assert_eq!(reloaded.world.seed, config.world.seed);
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let toml_content = r#"
[dungeon]
end_part_chance = 0.6
part_cap = 8
min_chest_checks = 1
max_chest_checks = 2

[logging]
level = "debug"
json_format = true

[world]
name = "sky"
seed = 7
"#;
        let temp_file = NamedTempFile::new().unwrap();
        tokio::fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = PluginConfig::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.dungeon.part_cap, 8);
        assert_eq!(config.dungeon.max_chest_checks, 2);
        assert_eq!(config.dungeon.spawn_height, 20);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
        assert_eq!(config.world.name, "sky");
        assert_eq!(config.world.seed, 7);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_from_invalid_toml() {
        let temp_file = NamedTempFile::new().unwrap();
        tokio::fs::write(temp_file.path(), "[dungeon\npart_cap = ").await.unwrap();

        let result = PluginConfig::load_from_file(temp_file.path()).await;
        assert!(result.is_err());
    }
}
