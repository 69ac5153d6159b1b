//! # ARCOLOGY Procedural Generation
//!
//! Deterministic layout generation for 2D habitat maps.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same layout
//! 2. **Self-contained**: Every generator owns its tables and grids; nothing is global
//! 3. **Bounded**: Degenerate inputs degrade gracefully instead of looping
//!
//! ## Core Components
//!
//! - `PerlinNoise` / `SimplexNoise`: 2D noise fields, fractal octaves, elevation maps
//! - `PoissonDiskSampler`: blue-noise point scattering
//! - `VoronoiPartitioner`: organic cell partitions with relaxation
//! - `RoomPartitioner`: BSP floor plans
//! - `StreetPathfinder`: A* street networks
//! - `FurniturePlacer`: grid-based furniture placement
//!
//! ## Example
//!
//! ```rust,ignore
//! use arcology_procedural::{VoronoiConfig, VoronoiPartitioner};
//!
//! let config = VoronoiConfig::for_area(1000.0, 600.0);
//! let diagram = VoronoiPartitioner::new(config)?.generate();
//!
//! for cell in &diagram.cells {
//!     println!("{} at {:?}", cell.cell_type.name(), cell.center);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bsp;
pub mod error;
pub mod furniture;
pub mod noise;
pub mod poisson;
pub mod streets;
pub mod voronoi;

pub use bsp::{RoomPartitioner, MAX_DEPTH, MIN_ROOM_SIZE};
pub use error::{ProceduralError, ProceduralResult};
pub use furniture::{
    AssetDescriptor, AssetLookup, FurniturePlacement, FurniturePlacer, PlacementConstraint,
    PlacementReport, RoomTemplate,
};
pub use noise::{density_map, NoiseConfig, NoiseField, PerlinNoise, ScalarGrid, SimplexNoise, WorldSeed};
pub use poisson::PoissonDiskSampler;
pub use streets::{Street, StreetConfig, StreetNetwork, StreetPathfinder, StreetType};
pub use voronoi::{CellType, VoronoiCell, VoronoiConfig, VoronoiDiagram, VoronoiPartitioner};
