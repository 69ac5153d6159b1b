//! # Map Constants
//!
//! Default extents and grid resolutions shared by every generation stage.
//!
//! **CRITICAL:** Changing any of these changes every generated map for
//! every seed. Treat them as part of the save format.

// =============================================================================
// MAP EXTENT
// =============================================================================

/// Default map width in map units.
pub const MAP_WIDTH: f64 = 1000.0;

/// Default map height in map units.
pub const MAP_HEIGHT: f64 = 600.0;

/// Margin kept clear around the map edge by room partitioning.
pub const MAP_PADDING: f64 = 50.0;

// =============================================================================
// ZONES & FURNITURE
// =============================================================================

/// Smallest zone side length after organic variation.
pub const MIN_ZONE_SIZE: f64 = 60.0;

/// Edge length of one furniture placement grid cell.
pub const FURNITURE_GRID_SIZE: f64 = 16.0;
