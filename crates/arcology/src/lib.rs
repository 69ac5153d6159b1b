//! # ARCOLOGY
//!
//! Procedural habitat maps: typed zones, furniture, decorations and the
//! streets between them, all reproducible from one seed.
//!
//! ## Modules
//!
//! - `config`: TOML map descriptions
//! - `zone`: room kinds, stat effects and the zone record
//! - `theme`: palettes and room sizing
//! - `catalog`: furniture assets, room templates, decorations
//! - `element`: the flat element list handed to renderers
//! - `assembler`: the generation pipeline
//!
//! ## Example
//!
//! ```rust,ignore
//! use arcology::{MapAssembler, MapConfig};
//!
//! let config = MapConfig::from_toml_str("seed = \"harbor\"\ntheme = \"urban\"")?;
//! let map = MapAssembler::new(config)?.generate()?;
//! std::fs::write("harbor.json", map.to_json(true)?)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod element;
pub mod error;
pub mod theme;
pub mod zone;

/// Re-export of the generation algorithms.
pub use arcology_procedural as procedural;
/// Re-export of the shared geometry.
pub use arcology_shared as shared;

pub use assembler::{GeneratedMap, GenerationReport, MapAssembler, ZoneReport};
pub use catalog::{decorations, room_template, Decoration, FurnitureCatalog};
pub use config::{MapConfig, PartitionStrategy, SeedInput, StreetStyle};
pub use element::{ElementKind, ElementRole, MapElement};
pub use error::{MapError, MapResult};
pub use theme::{Palette, PaletteSlot, Theme};
pub use zone::{Stat, Zone, ZoneKind};
