//! Error types for the Aether plugin.

use aether_dungeon::DungeonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dungeon error: {0}")]
    Dungeon(#[from] DungeonError),

    #[error("Logging setup error: {0}")]
    Logging(String),

    #[error("Export error: {0}")]
    Export(#[from] serde_json::Error),

    #[error("No tokio runtime available: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, PluginError>;
