//! Error types for Trailhead

use thiserror::Error;

/// The main error type for Trailhead operations
#[derive(Debug, Error)]
pub enum TrailheadError {
    #[error("Malformed asset: {0}")]
    MalformedAsset(String),

    #[error("Asset error: {0}")]
    AssetError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Audio error: {0}")]
    AudioError(String),
}

/// Result type alias for Trailhead operations
pub type Result<T> = std::result::Result<T, TrailheadError>;

impl From<toml::de::Error> for TrailheadError {
    fn from(err: toml::de::Error) -> Self {
        TrailheadError::TomlParseError(err.to_string())
    }
}
