//! # Architectural Themes
//!
//! A theme decides the palette zones are painted with and how generous
//! room sizes are.

use serde::{Deserialize, Serialize};

/// Which of the three palette colors a room kind uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteSlot {
    /// Dominant color
    Primary,
    /// Supporting color
    Secondary,
    /// Highlight color
    Accent,
}

/// Three zone colors of a theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Palette {
    /// Dominant color
    pub primary: &'static str,
    /// Supporting color
    pub secondary: &'static str,
    /// Highlight color
    pub accent: &'static str,
}

impl Palette {
    /// The color in `slot`.
    #[must_use]
    pub const fn color(&self, slot: PaletteSlot) -> &'static str {
        match slot {
            PaletteSlot::Primary => self.primary,
            PaletteSlot::Secondary => self.secondary,
            PaletteSlot::Accent => self.accent,
        }
    }
}

/// Architectural theme of a map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Greys, slightly larger rooms
    #[default]
    Modern,
    /// Browns, cosier rooms
    Rustic,
    /// Greens
    Ecological,
    /// Concrete, the largest rooms
    Urban,
}

impl Theme {
    /// Every theme.
    pub const ALL: [Self; 4] = [Self::Modern, Self::Rustic, Self::Ecological, Self::Urban];

    /// Zone palette.
    #[must_use]
    pub const fn palette(self) -> Palette {
        match self {
            Self::Modern => Palette {
                primary: "rgba(64, 64, 64, 0.3)",
                secondary: "rgba(128, 128, 128, 0.25)",
                accent: "rgba(220, 220, 220, 0.35)",
            },
            Self::Rustic => Palette {
                primary: "rgba(139, 69, 19, 0.3)",
                secondary: "rgba(160, 82, 45, 0.25)",
                accent: "rgba(210, 180, 140, 0.35)",
            },
            Self::Ecological => Palette {
                primary: "rgba(34, 139, 34, 0.3)",
                secondary: "rgba(85, 107, 47, 0.25)",
                accent: "rgba(144, 238, 144, 0.35)",
            },
            Self::Urban => Palette {
                primary: "rgba(70, 70, 70, 0.3)",
                secondary: "rgba(105, 105, 105, 0.25)",
                accent: "rgba(169, 169, 169, 0.35)",
            },
        }
    }

    /// Scale applied to the largest room a template allows.
    #[must_use]
    pub const fn room_size_multiplier(self) -> f64 {
        match self {
            Self::Modern => 1.1,
            Self::Rustic => 0.9,
            Self::Ecological => 1.0,
            Self::Urban => 1.2,
        }
    }

    /// Color for placed furniture, which has no color of its own.
    #[must_use]
    pub const fn furniture_color(self) -> &'static str {
        match self {
            Self::Modern => "#9CA3AF",
            Self::Rustic => "#8B4513",
            Self::Ecological => "#059669",
            Self::Urban => "#6B7280",
        }
    }
}
