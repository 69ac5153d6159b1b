//! # Voronoi Partitioning
//!
//! Splits a rectangle into organically shaped districts.
//!
//! ## Pipeline
//!
//! 1. Seed points: best of several candidates per slot, scored by a
//!    habitability noise field and closeness to the map center
//! 2. Lloyd relaxation: Monte-Carlo centroid of the samples each site owns
//! 3. Cells: an octagon around each site, with vertices that fall nearer
//!    another site pulled back to the midpoint of the two sites
//! 4. Neighbors: every site within `1.5 × min_cell_distance`
//! 5. Classification: distance from center blended with a second noise field
//!
//! The cells are approximate. Type thresholds are tuned against these
//! octagons; an exact diagram would need them re-tuned.

use arcology_shared::{Point, Rect};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{check_dimensions, check_positive, ProceduralError, ProceduralResult};
use crate::noise::{NoiseConfig, NoiseField, PerlinNoise, WorldSeed};

/// Stream ids for the partitioner's random draws and noise fields.
const VORONOI_STREAM: u64 = 0x564f_524f;
const HABITABILITY_FIELD: u64 = 0x4841_4249;
const CLASSIFICATION_FIELD: u64 = 0x434c_4153;
const DENSITY_FIELD: u64 = 0x4445_4e53;

/// District classification of a cell.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    /// Default housing district.
    Residential = 0,
    /// Central, favourable district.
    Commercial = 1,
    /// The very heart of the map.
    Public = 2,
    /// Outskirts and unfavourable ground.
    Green = 3,
    /// Mildly favourable ground away from the center.
    Mixed = 4,
}

impl CellType {
    /// Classifies a site from its normalized distance to the map center
    /// (`0` at the center, `1` at a corner) and a noise sample in `[-1, 1]`.
    #[must_use]
    pub fn classify(center_distance: f64, noise: f64) -> Self {
        match (center_distance, noise) {
            (d, n) if d < 0.3 && n > 0.3 => Self::Commercial,
            (d, _) if d < 0.2 => Self::Public,
            (d, n) if d > 0.7 || n < -0.4 => Self::Green,
            (_, n) if n > 0.1 => Self::Mixed,
            _ => Self::Residential,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Residential => "Residential",
            Self::Commercial => "Commercial",
            Self::Public => "Public",
            Self::Green => "Green",
            Self::Mixed => "Mixed",
        }
    }
}

/// Voronoi partition parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoronoiConfig {
    /// Area width
    pub width: f64,
    /// Area height
    pub height: f64,
    /// Requested number of cells
    pub num_cells: usize,
    /// Lloyd relaxation rounds
    pub relaxation_iterations: u32,
    /// Seed
    pub seed: u64,
    /// Minimum spacing between seed points
    pub min_cell_distance: f64,
    /// Margin kept free of seed points
    pub boundary_padding: f64,
}

impl VoronoiConfig {
    /// Default configuration scaled to an area.
    ///
    /// One cell per 8000 square units (8 to 25 cells), spacing of an
    /// eighth of the short side.
    #[must_use]
    pub fn for_area(width: f64, height: f64) -> Self {
        let area = (width * height).max(0.0);
        Self {
            width,
            height,
            num_cells: ((area / 8000.0).floor() as usize).clamp(8, 25),
            relaxation_iterations: 2,
            seed: 12345,
            min_cell_distance: width.min(height) / 8.0,
            boundary_padding: 30.0,
        }
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty area, `num_cells < 1`, a non-positive
    /// cell distance, or padding that leaves no room for seed points.
    pub fn validate(&self) -> ProceduralResult<()> {
        check_dimensions(self.width, self.height)?;
        if self.num_cells < 1 {
            return Err(ProceduralError::InvalidCellCount(self.num_cells));
        }
        check_positive("min_cell_distance", self.min_cell_distance)?;
        if !(self.boundary_padding.is_finite() && self.boundary_padding >= 0.0) {
            return Err(ProceduralError::InvalidParameter {
                name: "boundary_padding",
                value: self.boundary_padding,
            });
        }
        if self.width <= self.boundary_padding * 2.0 || self.height <= self.boundary_padding * 2.0 {
            return Err(ProceduralError::PaddingTooLarge {
                padding: self.boundary_padding,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// The area seed points are drawn from.
    #[must_use]
    pub fn padded_area(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height).inset(self.boundary_padding)
    }
}

/// One approximate Voronoi region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoronoiCell {
    /// Index of the cell in its diagram
    pub id: usize,
    /// Relaxed seed point
    pub center: Point,
    /// Octagon outline, clipped to the map
    pub vertices: Vec<Point>,
    /// Ids of nearby cells
    pub neighbors: Vec<usize>,
    /// District classification
    pub cell_type: CellType,
    /// Polygon area
    pub size: f64,
    /// Bounding box of `vertices`
    pub bounds: Rect,
    /// Local density in `[0.1, 1]`
    pub density: f64,
}

/// Output of one partition run.
#[derive(Clone, Debug, PartialEq)]
pub struct VoronoiDiagram {
    /// Cells in generation order
    pub cells: Vec<VoronoiCell>,
    /// Number of cells the config asked for
    pub requested_cells: usize,
    /// True when the scored placement fell short and random points were added
    pub used_fallback: bool,
}

impl VoronoiDiagram {
    /// The cell whose center is nearest to `point`.
    #[must_use]
    pub fn containing_cell(&self, point: Point) -> Option<&VoronoiCell> {
        let centers: Vec<Point> = self.cells.iter().map(|c| c.center).collect();
        nearest_index(&centers, point).map(|i| &self.cells[i])
    }

    /// Cells whose centers lie within `radius` of `point`.
    #[must_use]
    pub fn cells_in_radius(&self, point: Point, radius: f64) -> Vec<&VoronoiCell> {
        self.cells
            .iter()
            .filter(|c| c.center.distance(point) <= radius)
            .collect()
    }

    /// Cell centers in generation order.
    #[must_use]
    pub fn centers(&self) -> Vec<Point> {
        self.cells.iter().map(|c| c.center).collect()
    }
}

/// Approximate Voronoi partitioner.
///
/// # Example
///
/// ```rust,ignore
/// let config = VoronoiConfig::for_area(1000.0, 600.0);
/// let diagram = VoronoiPartitioner::new(config)?.generate();
/// for cell in &diagram.cells {
///     println!("{} at {:?}", cell.cell_type.name(), cell.center);
/// }
/// ```
pub struct VoronoiPartitioner {
    config: VoronoiConfig,
    seed: WorldSeed,
    habitability: PerlinNoise,
    classification: PerlinNoise,
    density: PerlinNoise,
}

impl VoronoiPartitioner {
    /// Candidates drawn per seed slot.
    pub const CANDIDATES_PER_SLOT: usize = 5;
    /// Monte-Carlo samples per site per relaxation round.
    pub const RELAXATION_SAMPLES: usize = 50;
    /// Octagon radius as a fraction of `min_cell_distance`.
    pub const CELL_RADIUS_FACTOR: f64 = 0.7;
    /// Neighbor range as a multiple of `min_cell_distance`.
    pub const NEIGHBOR_RANGE_FACTOR: f64 = 1.5;

    const HABITABILITY_WEIGHT: f64 = 0.7;
    const CENTER_WEIGHT: f64 = 0.3;

    /// Creates a partitioner.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub fn new(config: VoronoiConfig) -> ProceduralResult<Self> {
        config.validate()?;
        let seed = WorldSeed::new(config.seed);
        Ok(Self {
            config,
            seed,
            habitability: PerlinNoise::new(seed.derive(HABITABILITY_FIELD)),
            classification: PerlinNoise::new(seed.derive(CLASSIFICATION_FIELD)),
            density: PerlinNoise::new(seed.derive(DENSITY_FIELD)),
        })
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &VoronoiConfig {
        &self.config
    }

    /// Runs the full pipeline.
    #[must_use]
    pub fn generate(&self) -> VoronoiDiagram {
        let mut rng = self.seed.rng(VORONOI_STREAM);

        let (mut sites, used_fallback) = self.seed_points(&mut rng);
        for _ in 0..self.config.relaxation_iterations {
            self.relax(&mut sites, &mut rng);
        }

        let cells: Vec<VoronoiCell> = sites
            .iter()
            .enumerate()
            .map(|(id, &center)| self.build_cell(id, center, &sites))
            .collect();

        tracing::debug!(
            requested = self.config.num_cells,
            produced = cells.len(),
            used_fallback,
            "voronoi partition complete"
        );

        VoronoiDiagram {
            cells,
            requested_cells: self.config.num_cells,
            used_fallback,
        }
    }

    fn map_center(&self) -> Point {
        Point::new(self.config.width * 0.5, self.config.height * 0.5)
    }

    /// Half-diagonal of the map, the farthest any site can be from center.
    fn max_center_distance(&self) -> f64 {
        self.map_center().length()
    }

    fn score(&self, candidate: Point) -> f64 {
        let habitability = (self
            .habitability
            .fractal(candidate.x, candidate.y, &NoiseConfig::SMOOTH.with_scale(100.0))
            + 1.0)
            * 0.5;
        let center_score =
            1.0 - candidate.distance(self.map_center()) / self.max_center_distance();
        Self::HABITABILITY_WEIGHT * habitability + Self::CENTER_WEIGHT * center_score
    }

    fn is_spaced(&self, candidate: Point, sites: &[Point]) -> bool {
        let min_sq = self.config.min_cell_distance * self.config.min_cell_distance;
        sites.iter().all(|s| s.distance_squared(candidate) >= min_sq)
    }

    fn random_point(area: &Rect, rng: &mut ChaCha8Rng) -> Point {
        Point::new(
            rng.gen_range(area.x..area.right()),
            rng.gen_range(area.y..area.bottom()),
        )
    }

    /// Scored placement, then the random fallback if too few sites landed.
    fn seed_points(&self, rng: &mut ChaCha8Rng) -> (Vec<Point>, bool) {
        let area = self.config.padded_area();
        let target = self.config.num_cells;
        let max_attempts = target * 10;

        let mut sites: Vec<Point> = Vec::with_capacity(target);
        let mut attempts = 0;
        while sites.len() < target && attempts < max_attempts {
            attempts += 1;
            let best = (0..Self::CANDIDATES_PER_SLOT)
                .map(|_| Self::random_point(&area, rng))
                .filter(|c| self.is_spaced(*c, &sites))
                .map(|c| (self.score(c), c))
                .max_by(|a, b| a.0.total_cmp(&b.0));
            if let Some((_, point)) = best {
                sites.push(point);
            }
        }

        let minimum = 4.max((target as f64 * 0.7).ceil() as usize).min(target);
        if sites.len() >= minimum {
            return (sites, false);
        }

        tracing::warn!(
            accepted = sites.len(),
            minimum,
            "too few voronoi seed points, falling back to random placement"
        );

        let mut retries = 0;
        while sites.len() < minimum && retries < max_attempts {
            retries += 1;
            let candidate = Self::random_point(&area, rng);
            if self.is_spaced(candidate, &sites) {
                sites.push(candidate);
            }
        }
        // Spacing cannot be met: accept unspaced draws so the loop ends
        while sites.len() < minimum {
            sites.push(Self::random_point(&area, rng));
        }

        (sites, true)
    }

    /// One Lloyd round against a snapshot of the current sites.
    fn relax(&self, sites: &mut [Point], rng: &mut ChaCha8Rng) {
        let snapshot = sites.to_vec();
        let area = self.config.padded_area();
        let reach = self.config.min_cell_distance;

        for (i, site) in snapshot.iter().enumerate() {
            let mut sum = Point::ZERO;
            let mut count = 0usize;

            for s in 0..Self::RELAXATION_SAMPLES {
                let angle = s as f64 / Self::RELAXATION_SAMPLES as f64 * std::f64::consts::TAU;
                let distance = rng.gen_range(0.0..reach);
                let sample =
                    *site + Point::new(angle.cos() * distance, angle.sin() * distance);
                if nearest_index(&snapshot, sample) == Some(i) {
                    sum = sum + sample;
                    count += 1;
                }
            }

            if count > 0 {
                sites[i] = area.clamp_point(sum * (1.0 / count as f64));
            }
        }
    }

    fn build_cell(&self, id: usize, center: Point, sites: &[Point]) -> VoronoiCell {
        let map = Rect::new(0.0, 0.0, self.config.width, self.config.height);
        let radius = self.config.min_cell_distance * Self::CELL_RADIUS_FACTOR;

        let vertices: Vec<Point> = (0..8)
            .map(|k| {
                let angle = f64::from(k) / 8.0 * std::f64::consts::TAU;
                let vertex = center + Point::new(angle.cos() * radius, angle.sin() * radius);
                let own = vertex.distance_squared(center);
                let intruder = sites
                    .iter()
                    .enumerate()
                    .filter(|&(j, s)| j != id && vertex.distance_squared(*s) < own)
                    .min_by(|a, b| {
                        vertex
                            .distance_squared(*a.1)
                            .total_cmp(&vertex.distance_squared(*b.1))
                    });
                let pulled = intruder.map_or(vertex, |(_, other)| center.midpoint(*other));
                map.clamp_point(pulled)
            })
            .collect();

        let neighbor_range = self.config.min_cell_distance * Self::NEIGHBOR_RANGE_FACTOR;
        let neighbors = sites
            .iter()
            .enumerate()
            .filter(|&(j, s)| j != id && s.distance(center) <= neighbor_range)
            .map(|(j, _)| j)
            .collect();

        let center_distance = center.distance(self.map_center()) / self.max_center_distance();
        let type_noise = self.classification.fractal(
            center.x,
            center.y,
            &NoiseConfig::SMOOTH.with_scale(200.0),
        );
        let density = ((self.density.fractal(center.x, center.y, &NoiseConfig::SMOOTH) + 1.0)
            * 0.5)
            .clamp(0.1, 1.0);

        VoronoiCell {
            id,
            center,
            bounds: Rect::bounding(&vertices),
            size: polygon_area(&vertices),
            vertices,
            neighbors,
            cell_type: CellType::classify(center_distance, type_noise),
            density,
        }
    }
}

/// Index of the point nearest to `target`; ties go to the lower index.
#[must_use]
pub fn nearest_index(points: &[Point], target: Point) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in points.iter().enumerate() {
        let d = p.distance_squared(target);
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Shoelace area of a simple polygon.
#[must_use]
pub fn polygon_area(vertices: &[Point]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice.abs() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> VoronoiConfig {
        VoronoiConfig {
            width: 1000.0,
            height: 600.0,
            num_cells: 10,
            relaxation_iterations: 2,
            seed: 42,
            min_cell_distance: 75.0,
            boundary_padding: 30.0,
        }
    }

    #[test]
    fn test_classification_thresholds() {
        assert_eq!(CellType::classify(0.1, 0.5), CellType::Commercial);
        assert_eq!(CellType::classify(0.1, 0.0), CellType::Public);
        assert_eq!(CellType::classify(0.25, 0.0), CellType::Residential);
        assert_eq!(CellType::classify(0.8, 0.9), CellType::Green);
        assert_eq!(CellType::classify(0.5, -0.5), CellType::Green);
        assert_eq!(CellType::classify(0.5, 0.2), CellType::Mixed);
        assert_eq!(CellType::classify(0.5, 0.0), CellType::Residential);
    }

    #[test]
    fn test_default_config_scales_with_area() {
        let small = VoronoiConfig::for_area(100.0, 100.0);
        let large = VoronoiConfig::for_area(1000.0, 600.0);
        let huge = VoronoiConfig::for_area(5000.0, 5000.0);

        assert_eq!(small.num_cells, 8);
        assert_eq!(large.num_cells, 25);
        assert_eq!(huge.num_cells, 25);
        assert_eq!(large.min_cell_distance, 75.0);
    }

    #[test]
    fn test_invalid_configs_fail_fast() {
        let mut config = scenario();
        config.num_cells = 0;
        assert_eq!(
            VoronoiPartitioner::new(config).err(),
            Some(ProceduralError::InvalidCellCount(0))
        );

        let mut config = scenario();
        config.width = 0.0;
        assert!(VoronoiPartitioner::new(config).is_err());

        let mut config = scenario();
        config.boundary_padding = 400.0;
        assert!(matches!(
            VoronoiPartitioner::new(config),
            Err(ProceduralError::PaddingTooLarge { .. })
        ));
    }

    #[test]
    fn test_scenario_is_reproducible() {
        let a = VoronoiPartitioner::new(scenario()).expect("valid").generate();
        let b = VoronoiPartitioner::new(scenario()).expect("valid").generate();
        assert_eq!(a, b);
        assert!(a.cells.len() >= 7 && a.cells.len() <= 10);
    }

    #[test]
    fn test_sites_own_themselves() {
        let diagram = VoronoiPartitioner::new(scenario()).expect("valid").generate();
        for cell in &diagram.cells {
            let owner = diagram.containing_cell(cell.center).expect("non-empty");
            assert_eq!(owner.id, cell.id);
        }
    }

    #[test]
    fn test_cells_are_well_formed() {
        let config = scenario();
        let diagram = VoronoiPartitioner::new(config).expect("valid").generate();
        let map = Rect::new(0.0, 0.0, config.width, config.height);

        for cell in &diagram.cells {
            assert_eq!(cell.vertices.len(), 8);
            assert_eq!(cell.bounds, Rect::bounding(&cell.vertices));
            assert!(map.contains_rect(&cell.bounds));
            assert!(cell.size > 0.0);
            assert!((0.1..=1.0).contains(&cell.density));
            assert!(!cell.neighbors.contains(&cell.id));
            for &n in &cell.neighbors {
                assert!(diagram.cells[n].neighbors.contains(&cell.id), "neighbors are symmetric");
            }
        }
    }

    #[test]
    fn test_crowded_area_falls_back() {
        let config = VoronoiConfig {
            width: 200.0,
            height: 200.0,
            num_cells: 20,
            relaxation_iterations: 1,
            seed: 3,
            min_cell_distance: 150.0,
            boundary_padding: 10.0,
        };
        let diagram = VoronoiPartitioner::new(config).expect("valid").generate();
        assert!(diagram.used_fallback);
        assert_eq!(diagram.cells.len(), 14);
        assert_eq!(diagram.requested_cells, 20);
    }

    #[test]
    fn test_single_cell() {
        let mut config = scenario();
        config.num_cells = 1;
        let diagram = VoronoiPartitioner::new(config).expect("valid").generate();
        assert_eq!(diagram.cells.len(), 1);
        assert!(diagram.cells[0].neighbors.is_empty());
    }

    #[test]
    fn test_radius_query() {
        let diagram = VoronoiPartitioner::new(scenario()).expect("valid").generate();
        let center = diagram.cells[0].center;
        let nearby = diagram.cells_in_radius(center, 1.0);
        assert_eq!(nearby.len(), 1);
        assert_eq!(diagram.cells_in_radius(center, 5000.0).len(), diagram.cells.len());
    }

    #[test]
    fn test_polygon_area() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert_eq!(polygon_area(&square), 100.0);
        assert_eq!(polygon_area(&square[..2]), 0.0);
    }
}
