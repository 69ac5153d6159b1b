//! # Map Assembly
//!
//! One generation call, start to finish:
//!
//! ```text
//! seed ─┬─> zones (Voronoi cells or BSP rooms) ──> organic variation
//!       ├─> furniture per zone
//!       ├─> decorations per zone (Poisson over the density field)
//!       └─> streets between zone centers ──> segments + intersections
//! ```
//!
//! Each stage draws from its own derived seed, so changing one stage never
//! shifts the randomness of another. Nothing survives between calls.

use arcology_procedural::{
    density_map, AssetLookup, FurniturePlacement, FurniturePlacer, NoiseConfig, NoiseField,
    PoissonDiskSampler, RoomPartitioner, ScalarGrid, SimplexNoise, StreetConfig, StreetNetwork,
    StreetPathfinder, VoronoiConfig, VoronoiPartitioner, WorldSeed,
};
use arcology_shared::{Point, Rect, Size, MAP_PADDING, MIN_ZONE_SIZE};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::catalog::{decorations, room_template, FurnitureCatalog};
use crate::config::{MapConfig, PartitionStrategy, StreetStyle};
use crate::element::{ElementKind, ElementRole, MapElement};
use crate::error::MapResult;
use crate::zone::{Zone, ZoneKind};

/// Stream ids for each stage.
const CELL_COUNT_STREAM: u64 = 0x4345_4c4c;
const ZONE_KIND_STREAM: u64 = 0x4b49_4e44;
const VORONOI_STREAM: u64 = 0x564f_524f;
const BSP_STREAM: u64 = 0x5253_5021;
const VARIATION_FIELD: u64 = 0x5641_5259;
const DENSITY_FIELD: u64 = 0x4445_4e53;
const FURNITURE_STREAM: u64 = 0x4655_524e;
const DECORATION_STREAM: u64 = 0x4445_434f;
const STREET_STREAM: u64 = 0x5354_5254;

/// Voronoi zones are kept at least this far apart.
const ZONE_CELL_DISTANCE: f64 = 80.0;
/// Margin kept by Voronoi seeds and by zone jitter.
const ZONE_MARGIN: f64 = 30.0;
/// BSP rooms are inset from their leaf by this much.
const ROOM_INSET: f64 = 10.0;
/// Decorations keep this far from the zone edge.
const DECORATION_INSET: f64 = 10.0;
/// Minimum spacing of decorations.
const DECORATION_RADIUS: f64 = 25.0;
/// Map units per density sample.
const DENSITY_STEP: f64 = 4.0;
/// Side of an intersection marker.
const INTERSECTION_MARKER: f64 = 24.0;
/// Color of intersection markers.
const INTERSECTION_COLOR: &str = "#4A5568";

/// Furniture outcome of one zone.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ZoneReport {
    /// Zone id
    pub zone_id: String,
    /// Room kind
    pub kind: ZoneKind,
    /// Pieces placed
    pub furniture_placed: usize,
    /// Selected pieces that did not fit
    pub furniture_shortfall: usize,
    /// Every required piece was placed
    pub required_complete: bool,
}

/// Summary of one generation call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationReport {
    /// Strategy used
    pub partition: PartitionStrategy,
    /// Zones asked for
    pub requested_zones: usize,
    /// Zones produced
    pub produced_zones: usize,
    /// Voronoi seeding fell back to random points
    pub used_fallback: bool,
    /// Per-zone furniture outcome, in zone order
    pub zones: Vec<ZoneReport>,
    /// Decorations placed
    pub decorations: usize,
    /// Streets built
    pub streets: usize,
}

/// A finished map.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeneratedMap {
    /// Resolved world seed
    pub seed: u64,
    /// Map width
    pub width: f64,
    /// Map height
    pub height: f64,
    /// Zones in generation order
    pub zones: Vec<Zone>,
    /// Furniture, then decorations, street segments and intersection markers
    pub elements: Vec<MapElement>,
    /// Street network the segments were cut from
    pub streets: StreetNetwork,
    /// What was asked for against what came out
    pub report: GenerationReport,
}

impl GeneratedMap {
    /// Serializes the map to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self, pretty: bool) -> MapResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Elements of one kind.
    pub fn elements_of(&self, kind: ElementKind) -> impl Iterator<Item = &MapElement> {
        self.elements.iter().filter(move |e| e.kind == kind)
    }
}

/// Zone layout before furnishing.
struct Layout {
    zones: Vec<Zone>,
    requested: usize,
    used_fallback: bool,
}

/// Builds complete maps from a [`MapConfig`].
///
/// # Example
///
/// ```rust,ignore
/// let config = MapConfig::from_toml_str("seed = \"harbor\"")?;
/// let map = MapAssembler::new(config)?.generate()?;
/// println!("{} zones, {} elements", map.zones.len(), map.elements.len());
/// ```
pub struct MapAssembler<A = FurnitureCatalog> {
    config: MapConfig,
    catalog: A,
}

impl MapAssembler {
    /// Creates an assembler with the built-in furniture catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub fn new(config: MapConfig) -> MapResult<Self> {
        Self::with_catalog(config, FurnitureCatalog::standard())
    }
}

impl<A: AssetLookup> MapAssembler<A> {
    /// Creates an assembler with a custom furniture catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or a room template names
    /// furniture the catalog does not know.
    pub fn with_catalog(config: MapConfig, catalog: A) -> MapResult<Self> {
        config.validate()?;
        for kind in ZoneKind::ALL {
            room_template(kind).validate(&catalog)?;
        }
        Ok(Self { config, catalog })
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Generates the map.
    ///
    /// # Errors
    ///
    /// Returns an error only if a generator rejects a derived configuration.
    pub fn generate(&self) -> MapResult<GeneratedMap> {
        let seed = self.config.world_seed();
        tracing::info!(
            seed = seed.value(),
            partition = ?self.config.partition,
            theme = ?self.config.theme,
            "generating map"
        );

        let layout = match self.config.partition {
            PartitionStrategy::Voronoi => self.voronoi_zones(seed)?,
            PartitionStrategy::Bsp => self.bsp_zones(seed)?,
        };
        let zones = layout.zones;
        tracing::debug!(zones = zones.len(), requested = layout.requested, "zones laid out");

        let density = self.density_field(seed);
        let mut furniture = Vec::new();
        let mut scattered = Vec::new();
        let mut zone_reports = Vec::with_capacity(zones.len());

        for (index, zone) in zones.iter().enumerate() {
            let zone_seed = seed.derive(index as u64);
            let report = FurniturePlacer::new(&self.catalog).place(
                zone.bounds,
                &room_template(zone.kind),
                self.config.furniture_density,
                zone_seed.derive(FURNITURE_STREAM),
            );

            scattered.extend(self.decorate(zone, &report.placements, &density, zone_seed)?);
            zone_reports.push(ZoneReport {
                zone_id: zone.id.clone(),
                kind: zone.kind,
                furniture_placed: report.placements.len(),
                furniture_shortfall: report.shortfall(),
                required_complete: report.required_complete(),
            });
            furniture.extend(
                report
                    .placements
                    .iter()
                    .enumerate()
                    .map(|(i, placement)| self.furniture_element(zone, i, placement)),
            );
        }

        let streets = self.street_network(seed, &zones)?;
        let decoration_count = scattered.len();

        let mut elements = furniture;
        elements.append(&mut scattered);
        elements.extend(street_elements(&streets));

        let report = GenerationReport {
            partition: self.config.partition,
            requested_zones: layout.requested,
            produced_zones: zones.len(),
            used_fallback: layout.used_fallback,
            zones: zone_reports,
            decorations: decoration_count,
            streets: streets.streets.len(),
        };

        tracing::info!(
            zones = zones.len(),
            elements = elements.len(),
            streets = streets.streets.len(),
            intersections = streets.intersections.len(),
            "map generated"
        );

        Ok(GeneratedMap {
            seed: seed.value(),
            width: self.config.width,
            height: self.config.height,
            zones,
            elements,
            streets,
            report,
        })
    }

    fn map_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.config.width, self.config.height)
    }

    fn voronoi_zones(&self, seed: WorldSeed) -> MapResult<Layout> {
        let num_cells = self.config.cell_count.unwrap_or_else(|| {
            let fraction: f64 = seed.rng(CELL_COUNT_STREAM).gen();
            6 + (fraction * 8.0).floor() as usize
        });

        let diagram = VoronoiPartitioner::new(VoronoiConfig {
            width: self.config.width,
            height: self.config.height,
            num_cells,
            relaxation_iterations: 2,
            seed: seed.derive(VORONOI_STREAM).value(),
            min_cell_distance: ZONE_CELL_DISTANCE,
            boundary_padding: ZONE_MARGIN,
        })?
        .generate();

        let kinds = select_kinds(diagram.cells.len(), &mut seed.rng(ZONE_KIND_STREAM));
        let variation = SimplexNoise::new(seed.derive(VARIATION_FIELD));
        let map = self.map_rect();

        let zones = diagram
            .cells
            .iter()
            .zip(kinds)
            .enumerate()
            .map(|(index, (cell, kind))| {
                let bounds = self.vary(clamp_into(cell.bounds, map), &variation);
                Zone::new(format!("zone_{index}_{}", kind.slug()), kind, bounds, self.config.theme)
            })
            .collect();

        Ok(Layout {
            zones,
            requested: diagram.requested_cells,
            used_fallback: diagram.used_fallback,
        })
    }

    fn bsp_zones(&self, seed: WorldSeed) -> MapResult<Layout> {
        let root = self.map_rect().inset(MAP_PADDING);
        let leaves = RoomPartitioner::new(seed.derive(BSP_STREAM)).partition(root, self.config.room_count)?;
        let multiplier = self.config.theme.room_size_multiplier();

        let zones = leaves
            .iter()
            .enumerate()
            .map(|(index, leaf)| {
                let kind = ZoneKind::BSP_CYCLE[index % ZoneKind::BSP_CYCLE.len()];
                let max = room_template(kind).max_size;
                let room = leaf.inset(ROOM_INSET);
                let bounds = Rect::new(
                    room.x,
                    room.y,
                    room.width.min(max.width * multiplier),
                    room.height.min(max.height * multiplier),
                );
                Zone::new(format!("room_{index}_{}", kind.slug()), kind, bounds, self.config.theme)
            })
            .collect();

        Ok(Layout {
            zones,
            requested: self.config.room_count,
            used_fallback: false,
        })
    }

    /// Jitters position and size by noise, scaled by `density_variation`.
    fn vary(&self, bounds: Rect, noise: &SimplexNoise) -> Rect {
        let variation = self.config.density_variation;
        if variation == 0.0 {
            return bounds;
        }

        let (x, y) = (bounds.x, bounds.y);
        let shift = variation * 20.0;
        let nx = noise.sample(x * 0.005, y * 0.005);
        let ny = noise.sample(x * 0.005 + 50.0, y * 0.005 + 50.0);
        let sx = noise.sample(x * 0.008, y * 0.008);
        let sy = noise.sample(x * 0.008 + 75.0, y * 0.008 + 75.0);

        let growth = variation * 0.15;
        let max_width = self.config.width - ZONE_MARGIN * 2.0;
        let max_height = self.config.height - ZONE_MARGIN * 2.0;
        let width = (bounds.width * (1.0 + sx * growth)).floor().min(max_width).max(MIN_ZONE_SIZE);
        let height = (bounds.height * (1.0 + sy * growth)).floor().min(max_height).max(MIN_ZONE_SIZE);

        let x = (x + nx * shift)
            .min(self.config.width - width - ZONE_MARGIN)
            .max(ZONE_MARGIN);
        let y = (y + ny * shift)
            .min(self.config.height - height - ZONE_MARGIN)
            .max(ZONE_MARGIN);
        Rect::new(x, y, width, height)
    }

    /// Decoration density over the whole map, one sample per
    /// [`DENSITY_STEP`] units.
    fn density_field(&self, seed: WorldSeed) -> ScalarGrid {
        let base = NoiseConfig::ORGANIC_VARIATION;
        let config = base
            .with_seed(seed.derive(DENSITY_FIELD).value())
            .with_scale(base.scale / DENSITY_STEP);
        density_map(
            (self.config.width / DENSITY_STEP).ceil() as usize,
            (self.config.height / DENSITY_STEP).ceil() as usize,
            &config,
            self.config.natural_clustering,
        )
    }

    fn furniture_element(&self, zone: &Zone, index: usize, placement: &FurniturePlacement) -> MapElement {
        MapElement {
            id: format!("{}_furniture_{index}", zone.id),
            kind: ElementKind::Furniture,
            role: ElementRole::for_furniture(&placement.asset_id),
            position: placement.position,
            size: Size::new(placement.width, placement.height),
            rotation: f64::from(placement.rotation),
            color: self.config.theme.furniture_color().to_string(),
            zone_id: Some(zone.id.clone()),
        }
    }

    /// Scatters the zone's decorations, one per Poisson point, skipping
    /// points that land on furniture.
    fn decorate(
        &self,
        zone: &Zone,
        furniture: &[FurniturePlacement],
        density: &ScalarGrid,
        zone_seed: WorldSeed,
    ) -> MapResult<Vec<MapElement>> {
        let area = zone.bounds.inset(DECORATION_INSET);
        if area.width <= 0.0 || area.height <= 0.0 {
            return Ok(Vec::new());
        }

        let local = ScalarGrid::from_fn(
            (area.width / DENSITY_STEP).ceil() as usize,
            (area.height / DENSITY_STEP).ceil() as usize,
            |x, y| {
                density.get(
                    (area.x / DENSITY_STEP) as usize + x,
                    (area.y / DENSITY_STEP) as usize + y,
                )
            },
        );
        let points = PoissonDiskSampler::new(area.width, area.height, DECORATION_RADIUS)?
            .generate(zone_seed.derive(DECORATION_STREAM), Some(&local));
        let size_noise = SimplexNoise::new(zone_seed.derive(DECORATION_STREAM));

        let elements = points
            .iter()
            .zip(decorations(zone.kind))
            .enumerate()
            .filter_map(|(index, (point, decoration))| {
                let position = Point::new(area.x + point.x, area.y + point.y);
                if furniture.iter().any(|f| f.footprint().contains_point(position)) {
                    return None;
                }

                let scale = 1.0 + size_noise.sample(position.x * 0.02, position.y * 0.02) * 0.2;
                let base = decoration.base_size();
                Some(MapElement {
                    id: format!("{}_decoration_{index}_{}", zone.id, decoration.slug()),
                    kind: ElementKind::Decoration,
                    role: decoration.role(),
                    position,
                    size: Size::new((base.width * scale).floor(), (base.height * scale).floor()),
                    rotation: 0.0,
                    color: decoration.color().to_string(),
                    zone_id: Some(zone.id.clone()),
                })
            })
            .collect();
        Ok(elements)
    }

    fn street_network(&self, seed: WorldSeed, zones: &[Zone]) -> MapResult<StreetNetwork> {
        let anchors: Vec<Point> = zones.iter().map(|z| z.bounds.center()).collect();
        let config = StreetConfig {
            seed: seed.derive(STREET_STREAM).value(),
            ..self.config.streets.unwrap_or(StreetConfig {
                elevation_influence: 8.0,
                curvature_amount: 0.4,
                branching_probability: 0.3,
                ..StreetConfig::default()
            })
        };

        let network = match self.config.street_style {
            StreetStyle::None => StreetNetwork::default(),
            StreetStyle::Simple => {
                StreetPathfinder::new(self.config.width, self.config.height, config)?
                    .connect_in_sequence(&anchors)
            }
            StreetStyle::Organic => {
                StreetPathfinder::new(self.config.width, self.config.height, config)?
                    .build_network(&anchors)
            }
        };
        Ok(network)
    }
}

/// Room kinds for `count` zones: essentials first, then the other kinds in
/// seeded order, then seeded repeats.
fn select_kinds(count: usize, rng: &mut ChaCha8Rng) -> Vec<ZoneKind> {
    let mut kinds: Vec<ZoneKind> = ZoneKind::ESSENTIAL.iter().copied().take(count).collect();

    let mut rest: Vec<ZoneKind> = ZoneKind::ALL
        .iter()
        .copied()
        .filter(|kind| !ZoneKind::ESSENTIAL.contains(kind))
        .collect();
    rest.shuffle(rng);
    kinds.extend(rest.into_iter().take(count - kinds.len()));

    while kinds.len() < count {
        kinds.push(ZoneKind::ALL[rng.gen_range(0..ZoneKind::ALL.len())]);
    }
    kinds
}

/// Intersection of `rect` with `area`, empty when they do not meet.
fn clamp_into(rect: Rect, area: Rect) -> Rect {
    let x = rect.x.max(area.x);
    let y = rect.y.max(area.y);
    let right = rect.right().min(area.right());
    let bottom = rect.bottom().min(area.bottom());
    Rect::new(x, y, (right - x).max(0.0), (bottom - y).max(0.0))
}

/// One segment per consecutive path pair, then one marker per intersection.
fn street_elements(network: &StreetNetwork) -> Vec<MapElement> {
    let segments = network.streets.iter().flat_map(|street| {
        street.path.windows(2).enumerate().map(move |(index, pair)| {
            let delta = pair[1] - pair[0];
            MapElement {
                id: format!("street_{}_segment_{index}", street.id),
                kind: ElementKind::StreetSegment,
                role: ElementRole::Play,
                position: pair[0],
                size: Size::new(delta.length(), street.width),
                rotation: delta.y.atan2(delta.x).to_degrees(),
                color: street.color.to_string(),
                zone_id: None,
            }
        })
    });

    let half = INTERSECTION_MARKER / 2.0;
    let markers = network.intersections.iter().enumerate().map(|(index, point)| MapElement {
        id: format!("intersection_{index}"),
        kind: ElementKind::Intersection,
        role: ElementRole::Play,
        position: Point::new(point.x - half, point.y - half),
        size: Size::new(INTERSECTION_MARKER, INTERSECTION_MARKER),
        rotation: 0.0,
        color: INTERSECTION_COLOR.to_string(),
        zone_id: None,
    });

    segments.chain(markers).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_kinds_essentials_first() {
        let mut rng = WorldSeed::new(1).rng(0);
        let kinds = select_kinds(12, &mut rng);

        assert_eq!(kinds.len(), 12);
        assert_eq!(&kinds[..4], &ZoneKind::ESSENTIAL);
        for kind in [ZoneKind::Office, ZoneKind::Gym, ZoneKind::Recreation] {
            assert!(kinds[4..7].contains(&kind));
        }
    }

    #[test]
    fn test_select_kinds_few_zones() {
        let mut rng = WorldSeed::new(1).rng(0);
        assert_eq!(select_kinds(2, &mut rng), vec![ZoneKind::Kitchen, ZoneKind::Living]);
        assert!(select_kinds(0, &mut rng).is_empty());
    }

    #[test]
    fn test_clamp_into() {
        let map = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(clamp_into(Rect::new(-10.0, 50.0, 40.0, 80.0), map), Rect::new(0.0, 50.0, 30.0, 50.0));
        assert_eq!(clamp_into(Rect::new(200.0, 0.0, 10.0, 10.0), map).width, 0.0);
    }

    #[test]
    fn test_street_elements() {
        let mut network = StreetPathfinder::new(200.0, 200.0, StreetConfig::default())
            .expect("valid pathfinder")
            .connect_in_sequence(&[Point::new(20.0, 20.0), Point::new(180.0, 20.0)]);
        network.intersections.push(Point::new(50.0, 50.0));

        let elements = street_elements(&network);
        let segments = elements.iter().filter(|e| e.kind == ElementKind::StreetSegment).count();
        assert_eq!(segments, 2);

        let marker = elements.last().expect("marker present");
        assert_eq!(marker.kind, ElementKind::Intersection);
        assert_eq!(marker.position, Point::new(38.0, 38.0));
        assert_eq!(marker.size, Size::new(24.0, 24.0));
    }

    #[test]
    fn test_bsp_rooms_respect_template_maximum() {
        let config = MapConfig {
            partition: PartitionStrategy::Bsp,
            room_count: 2,
            street_style: StreetStyle::None,
            ..MapConfig::default()
        };
        let map = MapAssembler::new(config).expect("valid").generate().expect("generates");

        assert_eq!(map.zones.len(), 2);
        assert_eq!(map.zones[0].kind, ZoneKind::Living);
        assert_eq!(map.zones[1].kind, ZoneKind::Bedroom);
        for zone in &map.zones {
            let max = room_template(zone.kind).max_size;
            assert!(zone.bounds.width <= max.width * 1.1 + 1e-9);
            assert!(zone.bounds.height <= max.height * 1.1 + 1e-9);
        }
    }

    #[test]
    fn test_organic_variation_keeps_minimum_size() {
        let assembler = MapAssembler::new(MapConfig::default()).expect("valid");
        let noise = SimplexNoise::new(WorldSeed::new(3));
        for x in (0..900).step_by(37) {
            let varied = assembler.vary(Rect::new(f64::from(x), 100.0, 40.0, 70.0), &noise);
            assert!(varied.width >= MIN_ZONE_SIZE && varied.height >= MIN_ZONE_SIZE);
            assert!(varied.x >= ZONE_MARGIN && varied.right() <= 1000.0 - ZONE_MARGIN + 1e-9);
        }
    }
}
