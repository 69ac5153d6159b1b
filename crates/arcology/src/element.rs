//! # Map Elements
//!
//! Flat list of everything drawn on top of the zones.

use arcology_shared::{Point, Size};
use serde::Serialize;

/// What produced an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Placed by the furniture solver
    Furniture,
    /// Scattered by Poisson sampling
    Decoration,
    /// One straight piece of a street
    StreetSegment,
    /// Marker where streets meet
    Intersection,
}

/// How the simulation treats an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementRole {
    /// Blocks movement
    Obstacle,
    /// Somewhere to eat
    Food,
    /// Somewhere to sleep
    Rest,
    /// Somewhere to play; streets count as play space
    Play,
    /// Somewhere to sit together
    Social,
    /// Somewhere to work
    Work,
}

impl ElementRole {
    /// Role of a furniture id, by keyword.
    #[must_use]
    pub fn for_furniture(id: &str) -> Self {
        if id.contains("bed") {
            Self::Rest
        } else if id.contains("sofa") || id.contains("chair") {
            Self::Social
        } else if id.contains("table") || id.contains("stove") {
            Self::Food
        } else if id.contains("desk") {
            Self::Work
        } else {
            Self::Obstacle
        }
    }
}

/// One drawable element.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MapElement {
    /// Unique id within the map
    pub id: String,
    /// Producer
    pub kind: ElementKind,
    /// Simulation role
    pub role: ElementRole,
    /// Top-left corner, or segment start for street segments
    pub position: Point,
    /// Extent; for segments, length by street width
    pub size: Size,
    /// Rotation in degrees
    pub rotation: f64,
    /// Fill color
    pub color: String,
    /// Zone the element belongs to, if any
    pub zone_id: Option<String>,
}
