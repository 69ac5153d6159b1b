//! # ARCOLOGY Shared
//!
//! Geometry value types used by both the procedural core and the map
//! assembler.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER contain generation logic. Points and rectangles
//! only. If you need noise or randomness, put it in `arcology_procedural`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{
    FURNITURE_GRID_SIZE, MAP_HEIGHT, MAP_PADDING, MAP_WIDTH, MIN_ZONE_SIZE,
};
pub use math::{Point, Rect, Size};
