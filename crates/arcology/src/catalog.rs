//! # Catalogs
//!
//! Static data behind every room kind: the furniture the placer may use,
//! the template each kind is furnished by, and the decorations scattered
//! around it.

use std::collections::BTreeMap;

use arcology_procedural::{AssetDescriptor, AssetLookup, RoomTemplate};
use arcology_shared::Size;
use serde::Serialize;

use crate::element::ElementRole;
use crate::zone::ZoneKind;

/// Prefix shared by every furniture asset id.
pub const FURNITURE_PREFIX: &str = "tile_furniture_";

/// Furniture names and footprints, without the id prefix.
const FURNITURE: [(&str, f64, f64); 14] = [
    ("sofa_brown", 32.0, 32.0),
    ("coffee_table", 32.0, 32.0),
    ("tv_stand", 32.0, 32.0),
    ("armchair", 32.0, 32.0),
    ("bed_double", 32.0, 48.0),
    ("nightstand", 16.0, 16.0),
    ("dresser", 32.0, 32.0),
    ("wardrobe", 32.0, 16.0),
    ("stove", 32.0, 32.0),
    ("fridge", 32.0, 32.0),
    ("dining_table", 32.0, 32.0),
    ("mirror", 16.0, 16.0),
    ("desk", 32.0, 32.0),
    ("stool", 16.0, 16.0),
];

/// In-memory furniture asset table.
#[derive(Clone, Debug, PartialEq)]
pub struct FurnitureCatalog {
    assets: BTreeMap<String, AssetDescriptor>,
}

impl FurnitureCatalog {
    /// The built-in furniture set.
    #[must_use]
    pub fn standard() -> Self {
        let assets = FURNITURE
            .iter()
            .map(|&(name, width, height)| {
                let id = format!("{FURNITURE_PREFIX}{name}");
                (id.clone(), AssetDescriptor::new(id, width, height))
            })
            .collect();
        Self { assets }
    }

    /// Adds or replaces an asset.
    #[must_use]
    pub fn with_asset(mut self, asset: AssetDescriptor) -> Self {
        self.assets.insert(asset.id.clone(), asset);
        self
    }

    /// Removes an asset, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<AssetDescriptor> {
        self.assets.remove(id)
    }

    /// Number of assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Returns true if the catalog holds no assets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl Default for FurnitureCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl AssetLookup for FurnitureCatalog {
    fn lookup(&self, id: &str) -> Option<AssetDescriptor> {
        self.assets.get(id).cloned()
    }
}

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| format!("{FURNITURE_PREFIX}{name}")).collect()
}

/// Furnishing rules for a room kind.
#[must_use]
pub fn room_template(kind: ZoneKind) -> RoomTemplate {
    let (min, max, required, optional, wall, center, pathways): (
        (f64, f64),
        (f64, f64),
        &[&str],
        &[&str],
        &[&str],
        &[&str],
        bool,
    ) = match kind {
        ZoneKind::Living => (
            (120.0, 100.0),
            (200.0, 180.0),
            &["sofa_brown", "coffee_table"],
            &["tv_stand", "armchair"],
            &["tv_stand"],
            &["coffee_table"],
            true,
        ),
        ZoneKind::Bedroom => (
            (100.0, 90.0),
            (150.0, 130.0),
            &["bed_double"],
            &["nightstand", "dresser", "wardrobe"],
            &["bed_double", "dresser", "wardrobe"],
            &[],
            true,
        ),
        ZoneKind::Kitchen => (
            (80.0, 70.0),
            (140.0, 120.0),
            &["stove", "fridge"],
            &["dining_table"],
            &["stove", "fridge"],
            &["dining_table"],
            true,
        ),
        ZoneKind::Bathroom => (
            (60.0, 60.0),
            (100.0, 100.0),
            &[],
            &["mirror"],
            &["mirror"],
            &[],
            false,
        ),
        ZoneKind::Office => (
            (90.0, 80.0),
            (130.0, 120.0),
            &["desk"],
            &["stool"],
            &["desk"],
            &[],
            true,
        ),
        ZoneKind::Gym => (
            (90.0, 80.0),
            (150.0, 130.0),
            &[],
            &["stool", "mirror"],
            &["mirror"],
            &[],
            true,
        ),
        ZoneKind::Recreation => (
            (100.0, 90.0),
            (180.0, 160.0),
            &[],
            &["armchair", "coffee_table"],
            &[],
            &["coffee_table"],
            true,
        ),
    };

    RoomTemplate {
        name: kind.slug().to_string(),
        min_size: Size::new(min.0, min.1),
        max_size: Size::new(max.0, max.1),
        required_furniture: ids(required),
        optional_furniture: ids(optional),
        wall_requirements: ids(wall),
        center_requirements: ids(center),
        pathways,
    }
}

/// Decorative item scattered inside zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoration {
    /// Single bed
    BedSimple,
    /// Double bed
    BedDouble,
    /// Modern sofa
    SofaModern,
    /// Classic sofa
    SofaClassic,
    /// Coffee table
    TableCoffee,
    /// Dining table
    TableDining,
    /// Potted plant
    PlantSmall,
    /// Tree
    PlantTree,
    /// Flower bed
    PlantFlower,
    /// Lamp
    Lamp,
    /// Wall clock
    Clock,
    /// Bookshelf
    Bookshelf,
}

impl Decoration {
    /// Lowercase identifier used in element ids.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::BedSimple => "bed_simple",
            Self::BedDouble => "bed_double",
            Self::SofaModern => "sofa_modern",
            Self::SofaClassic => "sofa_classic",
            Self::TableCoffee => "table_coffee",
            Self::TableDining => "table_dining",
            Self::PlantSmall => "plant_small",
            Self::PlantTree => "plant_tree",
            Self::PlantFlower => "plant_flower",
            Self::Lamp => "lamp",
            Self::Clock => "clock",
            Self::Bookshelf => "bookshelf",
        }
    }

    /// Size before noise variation.
    #[must_use]
    pub const fn base_size(self) -> Size {
        let (width, height) = match self {
            Self::BedSimple => (32.0, 20.0),
            Self::BedDouble => (32.0, 24.0),
            Self::SofaModern => (32.0, 16.0),
            Self::SofaClassic => (32.0, 18.0),
            Self::TableCoffee => (24.0, 16.0),
            Self::TableDining => (32.0, 20.0),
            Self::PlantSmall => (12.0, 12.0),
            Self::PlantTree => (32.0, 40.0),
            Self::PlantFlower | Self::Clock => (16.0, 16.0),
            Self::Lamp => (12.0, 20.0),
            Self::Bookshelf => (28.0, 32.0),
        };
        Size::new(width, height)
    }

    /// Simulation role.
    #[must_use]
    pub const fn role(self) -> ElementRole {
        match self {
            Self::BedSimple | Self::BedDouble => ElementRole::Rest,
            Self::SofaModern | Self::SofaClassic | Self::TableCoffee => ElementRole::Social,
            Self::TableDining | Self::PlantSmall | Self::PlantFlower => ElementRole::Food,
            Self::PlantTree => ElementRole::Obstacle,
            Self::Lamp | Self::Clock | Self::Bookshelf => ElementRole::Play,
        }
    }

    /// Fill color.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::BedSimple | Self::Bookshelf => "#8B4513",
            Self::BedDouble => "#654321",
            Self::SofaModern => "#4169E1",
            Self::SofaClassic => "#DC143C",
            Self::TableCoffee => "#DEB887",
            Self::TableDining => "#A0522D",
            Self::PlantSmall => "#228B22",
            Self::PlantTree => "#006400",
            Self::PlantFlower => "#ff6b9d",
            Self::Lamp => "#f2d450",
            Self::Clock => "#B5A642",
        }
    }
}

/// Decorations of a room kind, essentials first.
#[must_use]
pub fn decorations(kind: ZoneKind) -> Vec<Decoration> {
    use Decoration::{
        BedDouble, Bookshelf, Clock, Lamp, PlantFlower, PlantSmall, PlantTree, SofaModern,
        TableCoffee, TableDining,
    };

    let (essential, optional): (&[Decoration], &[Decoration]) = match kind {
        ZoneKind::Kitchen => (&[TableDining, Lamp], &[PlantSmall, Clock]),
        ZoneKind::Living => (&[SofaModern, TableCoffee], &[PlantSmall, Lamp, Bookshelf]),
        ZoneKind::Bedroom => (&[BedDouble, Lamp], &[PlantSmall, Clock]),
        ZoneKind::Bathroom | ZoneKind::Gym => (&[Lamp], &[PlantSmall]),
        ZoneKind::Office => (&[Bookshelf, Lamp], &[PlantSmall, Clock]),
        ZoneKind::Recreation => (&[PlantTree, PlantFlower], &[TableCoffee, Lamp]),
    };
    essential.iter().chain(optional).copied().collect()
}
