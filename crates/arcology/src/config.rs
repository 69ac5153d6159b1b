//! # Map Configuration
//!
//! TOML description of one map. Every field has a default, so a partial
//! file (or an empty one) is a valid config.
//!
//! ```toml
//! width = 1000.0
//! height = 600.0
//! seed = "sunny-meadow"
//! partition = "voronoi"
//! theme = "ecological"
//! street_style = "organic"
//! furniture_density = 0.7
//!
//! [streets]
//! branching_probability = 0.5
//! ```

use std::path::Path;

use arcology_procedural::{StreetConfig, WorldSeed};
use arcology_shared::{MAP_HEIGHT, MAP_PADDING, MAP_WIDTH};
use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};
use crate::theme::Theme;

/// A seed given as text or as a number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedInput {
    /// Used verbatim
    Number(u64),
    /// Hashed into a number
    Text(String),
}

impl SeedInput {
    /// Resolves to a world seed.
    #[must_use]
    pub fn world_seed(&self) -> WorldSeed {
        match self {
            Self::Number(value) => WorldSeed::new(*value),
            Self::Text(text) => WorldSeed::from_text(text),
        }
    }

    /// Parses command-line input: digits become a number, anything else text.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        input
            .parse::<u64>()
            .map_or_else(|_| Self::Text(input.to_string()), Self::Number)
    }
}

impl Default for SeedInput {
    fn default() -> Self {
        Self::Number(12345)
    }
}

/// How the map is divided into zones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategy {
    /// Organic Voronoi cells
    #[default]
    Voronoi,
    /// Rectangular BSP rooms
    Bsp,
}

/// How zones are connected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreetStyle {
    /// Searched network with branches and connections
    #[default]
    Organic,
    /// One bent path between consecutive zones
    Simple,
    /// No streets
    None,
}

/// Top-level map parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Map width
    pub width: f64,
    /// Map height
    pub height: f64,
    /// World seed
    pub seed: SeedInput,
    /// Zone partition strategy
    pub partition: PartitionStrategy,
    /// Palette and room sizing
    pub theme: Theme,
    /// Street layout
    pub street_style: StreetStyle,
    /// Share of optional furniture attempted, in `[0, 1]`
    pub furniture_density: f64,
    /// Strength of zone jitter, in `[0, 1]`
    pub density_variation: f64,
    /// Clump decorations together
    pub natural_clustering: bool,
    /// Target room count for BSP maps
    pub room_count: usize,
    /// Fixed zone count for Voronoi maps; derived from the seed when absent
    pub cell_count: Option<usize>,
    /// Street overrides; the seed is always replaced by the world seed
    pub streets: Option<StreetConfig>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
            seed: SeedInput::default(),
            partition: PartitionStrategy::default(),
            theme: Theme::default(),
            street_style: StreetStyle::default(),
            furniture_density: 0.7,
            density_variation: 0.8,
            natural_clustering: true,
            room_count: 6,
            cell_count: None,
            streets: None,
        }
    }
}

impl MapConfig {
    /// Parses and validates a TOML config.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this struct or a
    /// value is out of range.
    pub fn from_toml_str(text: &str) -> MapResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails
    /// [`MapConfig::from_toml_str`].
    pub fn from_file(path: &Path) -> MapResult<Self> {
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded map config");
        Self::from_toml_str(&text)
    }

    /// Checks every value.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidConfig`] for an out-of-range value, or a
    /// wrapped procedural error for invalid street overrides.
    pub fn validate(&self) -> MapResult<()> {
        let finite = self.width.is_finite() && self.height.is_finite();
        if !finite || self.width <= MAP_PADDING * 2.0 || self.height <= MAP_PADDING * 2.0 {
            return Err(MapError::InvalidConfig(format!(
                "map {} x {} must exceed {} on both sides",
                self.width,
                self.height,
                MAP_PADDING * 2.0
            )));
        }
        for (name, value) in [
            ("furniture_density", self.furniture_density),
            ("density_variation", self.density_variation),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MapError::InvalidConfig(format!("{name} = {value} is outside [0, 1]")));
            }
        }
        if self.cell_count == Some(0) {
            return Err(MapError::InvalidConfig("cell_count must be at least 1".to_string()));
        }
        if let Some(streets) = &self.streets {
            streets.validate()?;
        }
        Ok(())
    }

    /// Resolved world seed.
    #[must_use]
    pub fn world_seed(&self) -> WorldSeed {
        self.seed.world_seed()
    }
}
