//! # Zones
//!
//! Typed regions handed to the simulation. A zone never changes after the
//! assembler creates it.

use std::collections::BTreeMap;

use arcology_shared::Rect;
use serde::{Deserialize, Serialize};

use crate::theme::{PaletteSlot, Theme};

/// Simulation stat a zone can influence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    /// Satisfied by eating
    Hunger,
    /// Satisfied by sleeping
    Sleepiness,
    /// Physical energy
    Energy,
    /// General mood
    Happiness,
    /// Satisfied by company
    Loneliness,
    /// Physical health
    Health,
    /// Earned by working
    Money,
    /// Relieved by play
    Boredom,
}

/// Kind of room a zone is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    /// Cooking and eating
    Kitchen,
    /// Sitting together
    Living,
    /// Sleeping
    Bedroom,
    /// Washing
    Bathroom,
    /// Working
    Office,
    /// Training
    Gym,
    /// Garden and play
    Recreation,
}

impl ZoneKind {
    /// Every kind, in catalog order.
    pub const ALL: [Self; 7] = [
        Self::Kitchen,
        Self::Living,
        Self::Bedroom,
        Self::Bathroom,
        Self::Office,
        Self::Gym,
        Self::Recreation,
    ];

    /// Kinds every Voronoi map gets first.
    pub const ESSENTIAL: [Self; 4] = [Self::Kitchen, Self::Living, Self::Bedroom, Self::Bathroom];

    /// Order BSP rooms cycle through.
    pub const BSP_CYCLE: [Self; 5] = [
        Self::Living,
        Self::Bedroom,
        Self::Kitchen,
        Self::Bathroom,
        Self::Office,
    ];

    /// Lowercase identifier used in element and zone ids.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Kitchen => "kitchen",
            Self::Living => "living",
            Self::Bedroom => "bedroom",
            Self::Bathroom => "bathroom",
            Self::Office => "office",
            Self::Gym => "gym",
            Self::Recreation => "recreation",
        }
    }

    /// Display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Kitchen => "Kitchen",
            Self::Living => "Living Room",
            Self::Bedroom => "Bedroom",
            Self::Bathroom => "Bathroom",
            Self::Office => "Office",
            Self::Gym => "Gym",
            Self::Recreation => "Garden",
        }
    }

    /// How strongly the zone draws visitors, in `[0, 1]`.
    #[must_use]
    pub const fn attractiveness(self) -> f64 {
        match self {
            Self::Living => 0.9,
            Self::Bedroom => 0.8,
            Self::Office => 0.75,
            Self::Kitchen => 0.7,
            Self::Bathroom => 0.6,
            Self::Gym | Self::Recreation => 0.5,
        }
    }

    /// Palette slot the zone is painted with.
    #[must_use]
    pub const fn palette_slot(self) -> PaletteSlot {
        match self {
            Self::Kitchen | Self::Gym => PaletteSlot::Primary,
            Self::Bedroom | Self::Bathroom | Self::Office => PaletteSlot::Secondary,
            Self::Living | Self::Recreation => PaletteSlot::Accent,
        }
    }

    /// Stat changes a visit applies.
    #[must_use]
    pub fn effects(self) -> BTreeMap<Stat, i32> {
        let table: &[(Stat, i32)] = match self {
            Self::Kitchen => &[(Stat::Hunger, 25), (Stat::Happiness, 10)],
            Self::Bedroom => &[(Stat::Sleepiness, 40), (Stat::Energy, 25)],
            Self::Living => &[(Stat::Happiness, 15), (Stat::Loneliness, 10)],
            Self::Bathroom => &[(Stat::Health, 10), (Stat::Happiness, 5)],
            Self::Office => &[(Stat::Money, 60), (Stat::Boredom, -5)],
            Self::Gym => &[(Stat::Energy, -10), (Stat::Health, 20), (Stat::Happiness, 15)],
            Self::Recreation => &[(Stat::Happiness, 20), (Stat::Boredom, 25)],
        };
        table.iter().copied().collect()
    }
}

/// A generated region of the map.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Zone {
    /// Unique id within the map
    pub id: String,
    /// Display name
    pub name: String,
    /// Axis-aligned extent
    pub bounds: Rect,
    /// Room kind
    pub kind: ZoneKind,
    /// Fill color from the theme
    pub color: String,
    /// Visitor pull in `[0, 1]`
    pub attractiveness: f64,
    /// Stat changes a visit applies
    pub effects: BTreeMap<Stat, i32>,
}

impl Zone {
    /// Creates a zone, filling name, color and effects from its kind.
    #[must_use]
    pub fn new(id: String, kind: ZoneKind, bounds: Rect, theme: Theme) -> Self {
        Self {
            id,
            name: kind.display_name().to_string(),
            bounds,
            kind,
            color: theme.palette().color(kind.palette_slot()).to_string(),
            attractiveness: kind.attractiveness(),
            effects: kind.effects(),
        }
    }
}
