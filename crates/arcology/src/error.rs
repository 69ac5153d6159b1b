//! # Map Error Types
//!
//! Everything that can stop a map from being generated or written.

use arcology_procedural::ProceduralError;
use thiserror::Error;

/// Errors raised while loading a config, generating a map or writing it out.
#[derive(Error, Debug)]
pub enum MapError {
    /// A generator rejected its configuration.
    #[error("generation failed: {0}")]
    Procedural(#[from] ProceduralError),

    /// The config file is not valid TOML for a [`crate::MapConfig`].
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The map could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a config or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A config value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for map operations.
pub type MapResult<T> = Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedural_errors_convert() {
        let err: MapError = ProceduralError::InvalidCellCount(0).into();
        assert!(matches!(err, MapError::Procedural(_)));
        assert!(err.to_string().contains("invalid cell count"));
    }

    #[test]
    fn test_invalid_config_message() {
        let err = MapError::InvalidConfig("furniture_density = 2".to_string());
        assert_eq!(err.to_string(), "invalid config: furniture_density = 2");
    }
}
