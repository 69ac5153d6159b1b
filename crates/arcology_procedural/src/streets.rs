//! # Street Networks
//!
//! Cost-weighted lattice search between anchor points, grown into a
//! network of one main street, perpendicular branches and connections.
//!
//! ## Search
//!
//! A* over an 8-connected lattice anchored at the start point. Step cost is
//! distance plus climbing, doubled on occupied ground, with a small bonus
//! for following the contour. The heuristic ignores those extras, so the
//! search is satisficing rather than optimal.
//!
//! ## Network
//!
//! 1. Main street between the two anchors farthest apart
//! 2. Secondary branches off the main street, perpendicular to it
//! 3. Connection streets for every anchor the network does not reach yet
//!
//! Every street is smoothed with quadratic Bézier arcs and a little noise
//! jitter. Intersections and the connectivity map are derived last.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};

use arcology_shared::{Point, Rect};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{check_dimensions, check_positive, check_unit, ProceduralError, ProceduralResult};
use crate::noise::{NoiseConfig, NoiseField, PerlinNoise, ScalarGrid, WorldSeed};

/// Stream ids for street randomness and noise fields.
const STREET_STREAM: u64 = 0x5354_5245;
const ELEVATION_FIELD: u64 = 0x454c_4556;
const JITTER_FIELD: u64 = 0x4a49_5454;

/// A search node is a success once it is this close to the target.
pub const GOAL_TOLERANCE: f64 = 5.0;
/// Minimum arc length between branch origins on the main street.
pub const BRANCH_MIN_SPACING: f64 = 50.0;
/// Anchors closer than this to a street need no connection.
pub const ANCHOR_SERVICE_RADIUS: f64 = 20.0;
/// Path points of two streets closer than this form an intersection.
pub const INTERSECTION_RADIUS: f64 = 15.0;

/// Street classification.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreetType {
    /// The spine of the network.
    Main = 0,
    /// Branch off the main street.
    Secondary = 1,
    /// Simple link between consecutive anchors.
    Path = 2,
    /// Link from an unserved anchor to the network.
    Connection = 3,
}

impl StreetType {
    /// Drawn width.
    #[must_use]
    pub const fn width(self) -> f64 {
        match self {
            Self::Main => 20.0,
            Self::Secondary => 16.0,
            Self::Path => 14.0,
            Self::Connection => 12.0,
        }
    }

    /// Drawn color.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Main => "#4A5568",
            Self::Secondary | Self::Path => "#6B7280",
            Self::Connection => "#9CA3AF",
        }
    }

    /// Lattice step of the search.
    #[must_use]
    pub const fn step_size(self) -> f64 {
        match self {
            Self::Main => 8.0,
            Self::Secondary | Self::Path | Self::Connection => 6.0,
        }
    }

    /// Multiplier applied to every step cost.
    #[must_use]
    pub const fn cost_multiplier(self) -> f64 {
        match self {
            Self::Main => 0.8,
            Self::Secondary | Self::Path => 1.0,
            Self::Connection => 1.2,
        }
    }

    /// Fraction of the configured curvature used when smoothing.
    #[must_use]
    pub const fn curvature_factor(self) -> f64 {
        match self {
            Self::Main | Self::Path => 1.0,
            Self::Secondary => 0.7,
            Self::Connection => 0.5,
        }
    }
}

/// Street network parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreetConfig {
    /// Seed
    pub seed: u64,
    /// Cost per unit of elevation change
    pub elevation_influence: f64,
    /// Perpendicular offset of smoothing control points
    pub curvature_amount: f64,
    /// Chance of a branch at each candidate origin
    pub branching_probability: f64,
    /// Reach of branches is 60% of this
    pub max_street_length: f64,
    /// Branches shorter than this are dropped
    pub min_street_length: f64,
    /// Preferred distance between branch origins
    pub street_spacing: f64,
    /// Optional cap on node expansions per search
    pub expansion_limit: Option<usize>,
}

impl Default for StreetConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            elevation_influence: 10.0,
            curvature_amount: 0.3,
            branching_probability: 0.4,
            max_street_length: 200.0,
            min_street_length: 30.0,
            street_spacing: 80.0,
            expansion_limit: None,
        }
    }
}

impl StreetConfig {
    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if a weight is negative or non-finite, the branching
    /// probability is outside `[0, 1]`, or the maximum length is not positive.
    pub fn validate(&self) -> ProceduralResult<()> {
        for (name, value) in [
            ("elevation_influence", self.elevation_influence),
            ("min_street_length", self.min_street_length),
            ("street_spacing", self.street_spacing),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ProceduralError::InvalidParameter { name, value });
            }
        }
        if !self.curvature_amount.is_finite() {
            return Err(ProceduralError::InvalidParameter {
                name: "curvature_amount",
                value: self.curvature_amount,
            });
        }
        check_unit("branching_probability", self.branching_probability)?;
        check_positive("max_street_length", self.max_street_length)
    }
}

/// One street polyline.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Street {
    /// Stable id within its network
    pub id: String,
    /// Ordered path points
    pub path: Vec<Point>,
    /// Drawn width
    pub width: f64,
    /// Classification
    pub street_type: StreetType,
    /// Curvature used when smoothing
    pub curvature: f64,
    /// Drawn color
    pub color: &'static str,
}

impl Street {
    /// Creates a street with the width and color of its type.
    #[must_use]
    pub fn new(id: String, path: Vec<Point>, street_type: StreetType, curvature: f64) -> Self {
        Self {
            id,
            path,
            width: street_type.width(),
            street_type,
            curvature,
            color: street_type.color(),
        }
    }

    /// Polyline length.
    #[must_use]
    pub fn length(&self) -> f64 {
        polyline_length(&self.path)
    }

    /// The path as `[x0, y0, x1, y1, ...]` for vertex buffers.
    #[must_use]
    pub fn flat_path(&self) -> &[f64] {
        bytemuck::cast_slice(&self.path)
    }
}

/// Streets plus derived intersections.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StreetNetwork {
    /// Streets in generation order
    pub streets: Vec<Street>,
    /// Intersection points
    pub intersections: Vec<Point>,
    /// Street id to ids of streets it meets; symmetric
    pub connectivity: BTreeMap<String, Vec<String>>,
}

impl StreetNetwork {
    fn from_streets(streets: Vec<Street>) -> Self {
        let mut connectivity: BTreeMap<String, Vec<String>> = streets
            .iter()
            .map(|s| (s.id.clone(), Vec::new()))
            .collect();
        let mut intersections = Vec::new();

        for (i, a) in streets.iter().enumerate() {
            for b in &streets[i + 1..] {
                let Some(point) = first_meeting(&a.path, &b.path) else {
                    continue;
                };
                intersections.push(point);
                if let Some(links) = connectivity.get_mut(&a.id) {
                    links.push(b.id.clone());
                }
                if let Some(links) = connectivity.get_mut(&b.id) {
                    links.push(a.id.clone());
                }
            }
        }

        Self {
            streets,
            intersections,
            connectivity,
        }
    }

    /// Returns true if the two streets share an intersection.
    #[must_use]
    pub fn are_connected(&self, a: &str, b: &str) -> bool {
        self.connectivity
            .get(a)
            .is_some_and(|links| links.iter().any(|id| id == b))
    }
}

/// Midpoint of the first pair of points closer than [`INTERSECTION_RADIUS`].
fn first_meeting(a: &[Point], b: &[Point]) -> Option<Point> {
    let radius_sq = INTERSECTION_RADIUS * INTERSECTION_RADIUS;
    a.iter().find_map(|p| {
        b.iter()
            .find(|q| p.distance_squared(**q) <= radius_sq)
            .map(|q| p.midpoint(*q))
    })
}

/// Polyline length.
#[must_use]
pub fn polyline_length(path: &[Point]) -> f64 {
    path.windows(2).map(|w| w[0].distance(w[1])).sum()
}

type CellKey = (i64, i64);

/// Open-set entry; ordered so `BinaryHeap` pops the lowest estimate first.
#[derive(Clone, Copy, Debug)]
struct Frontier {
    estimate: f64,
    order: u64,
    key: CellKey,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap; earlier pushes win ties
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best known way to reach one lattice node.
#[derive(Clone, Copy, Debug)]
struct NodeRecord {
    point: Point,
    cost: f64,
    parent: Option<CellKey>,
}

/// Street search and network builder for one map.
///
/// Owns its elevation map, occupancy grid and random stream; build one per
/// generation call.
pub struct StreetPathfinder {
    config: StreetConfig,
    bounds: Rect,
    grid_width: usize,
    grid_height: usize,
    elevation: ScalarGrid,
    occupied: Vec<bool>,
    jitter: PerlinNoise,
    rng: ChaCha8Rng,
}

impl StreetPathfinder {
    /// Creates a pathfinder over `[0, width) × [0, height)`.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty area or an invalid config.
    pub fn new(width: f64, height: f64, config: StreetConfig) -> ProceduralResult<Self> {
        check_dimensions(width, height)?;
        config.validate()?;

        let seed = WorldSeed::new(config.seed);
        let grid_width = width.ceil() as usize;
        let grid_height = height.ceil() as usize;
        let elevation = PerlinNoise::new(seed.derive(ELEVATION_FIELD)).elevation_map(
            grid_width,
            grid_height,
            &NoiseConfig::TERRAIN,
        );

        Ok(Self {
            config,
            bounds: Rect::new(0.0, 0.0, width, height),
            grid_width,
            grid_height,
            elevation,
            occupied: vec![false; grid_width * grid_height],
            jitter: PerlinNoise::new(seed.derive(JITTER_FIELD)),
            rng: seed.rng(STREET_STREAM),
        })
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &StreetConfig {
        &self.config
    }

    fn clamp_inside(&self, p: Point) -> Point {
        let max_x = (self.bounds.width - 1e-6).max(0.0);
        let max_y = (self.bounds.height - 1e-6).max(0.0);
        Point::new(p.x.clamp(0.0, max_x), p.y.clamp(0.0, max_y))
    }

    fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0.0 && p.x < self.bounds.width && p.y >= 0.0 && p.y < self.bounds.height
    }

    fn cell_index(&self, p: Point) -> Option<usize> {
        if !self.in_bounds(p) {
            return None;
        }
        let x = (p.x.floor() as usize).min(self.grid_width - 1);
        let y = (p.y.floor() as usize).min(self.grid_height - 1);
        Some(y * self.grid_width + x)
    }

    fn elevation_at(&self, p: Point) -> f64 {
        let p = self.clamp_inside(p);
        self.elevation.get(p.x.floor() as usize, p.y.floor() as usize)
    }

    /// Out-of-bounds ground counts as occupied.
    fn is_occupied(&self, p: Point) -> bool {
        self.cell_index(p).map_or(true, |i| self.occupied[i])
    }

    fn mark_occupied(&mut self, path: &[Point]) {
        for &p in path {
            if let Some(i) = self.cell_index(p) {
                self.occupied[i] = true;
            }
        }
    }

    fn step_cost(&self, from: Point, to: Point, street_type: StreetType) -> f64 {
        let distance = from.distance(to);
        let climb = (self.elevation_at(to) - self.elevation_at(from)).abs();

        let mut cost = distance + climb * self.config.elevation_influence;
        if self.is_occupied(to) {
            cost += distance * 2.0;
        }
        cost -= ((0.1 - climb) * 5.0).max(0.0);

        (cost * street_type.cost_multiplier()).max(distance * 0.5)
    }

    /// Searches for a path between two points.
    ///
    /// Points are clamped into the map first. Returns `None` when the open
    /// set is exhausted or the configured expansion limit is hit.
    #[must_use]
    pub fn find_path(&self, start: Point, end: Point, street_type: StreetType) -> Option<Vec<Point>> {
        let start = self.clamp_inside(start);
        let end = self.clamp_inside(end);
        let step = street_type.step_size();
        let key_of = |p: Point| -> CellKey { (p.x.floor() as i64, p.y.floor() as i64) };

        let mut nodes: HashMap<CellKey, NodeRecord> = HashMap::new();
        let mut closed: HashSet<CellKey> = HashSet::new();
        let mut open = BinaryHeap::new();
        let mut order = 0u64;

        let start_key = key_of(start);
        nodes.insert(
            start_key,
            NodeRecord {
                point: start,
                cost: 0.0,
                parent: None,
            },
        );
        open.push(Frontier {
            estimate: start.distance(end),
            order,
            key: start_key,
        });

        let mut expansions = 0usize;
        while let Some(Frontier { key, .. }) = open.pop() {
            if !closed.insert(key) {
                continue;
            }
            let Some(&current) = nodes.get(&key) else {
                continue;
            };

            if current.point.distance(end) <= GOAL_TOLERANCE {
                return Some(Self::reconstruct(&nodes, key));
            }

            expansions += 1;
            if self.config.expansion_limit.is_some_and(|limit| expansions > limit) {
                tracing::debug!(expansions, "street search hit its expansion limit");
                return None;
            }

            let mut successors: Vec<Point> = Vec::with_capacity(9);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let next = current.point
                        + Point::new(f64::from(dx) * step, f64::from(dy) * step);
                    if self.in_bounds(next) {
                        successors.push(next);
                    }
                }
            }
            // The lattice may never land within tolerance; offer the target itself
            if current.point.distance(end) <= step * std::f64::consts::SQRT_2 {
                successors.push(end);
            }

            for next in successors {
                let next_key = key_of(next);
                if closed.contains(&next_key) {
                    continue;
                }
                let cost = current.cost + self.step_cost(current.point, next, street_type);
                let improved = nodes.get(&next_key).map_or(true, |known| cost < known.cost);
                if improved {
                    nodes.insert(
                        next_key,
                        NodeRecord {
                            point: next,
                            cost,
                            parent: Some(key),
                        },
                    );
                    order += 1;
                    open.push(Frontier {
                        estimate: cost + next.distance(end),
                        order,
                        key: next_key,
                    });
                }
            }
        }

        tracing::debug!(expansions, "street search exhausted the open set");
        None
    }

    fn reconstruct(nodes: &HashMap<CellKey, NodeRecord>, goal: CellKey) -> Vec<Point> {
        let mut path = Vec::new();
        let mut cursor = Some(goal);
        while let Some(key) = cursor {
            let Some(record) = nodes.get(&key) else {
                break;
            };
            path.push(record.point);
            cursor = record.parent;
        }
        path.reverse();
        path
    }

    /// Bends a polyline into quadratic Bézier arcs with noise jitter.
    ///
    /// Each interior vertex becomes the control point region of an arc from
    /// its predecessor to its successor, sampled at four points. The first
    /// and last points are kept exactly.
    #[must_use]
    pub fn smooth_path(&self, path: &[Point], curvature: f64) -> Vec<Point> {
        if path.len() < 3 {
            return path.to_vec();
        }

        let mut smoothed = Vec::with_capacity(path.len() * 4);
        smoothed.push(path[0]);

        for window in path.windows(3) {
            let (prev, current, next) = (window[0], window[1], window[2]);
            let chord = (next - prev) * 0.5;
            let control = current + chord.perpendicular() * curvature;

            for s in 0..=3 {
                let t = f64::from(s) / 3.0;
                let u = 1.0 - t;
                let arc = prev * (u * u) + control * (2.0 * u * t) + next * (t * t);
                let jitter = self.jitter.sample(arc.x * 0.02, arc.y * 0.02) * 3.0;
                let point = self.clamp_inside(arc + Point::new(jitter, jitter));
                if smoothed.last().map_or(true, |last: &Point| last.distance(point) > 1e-9) {
                    smoothed.push(point);
                }
            }
        }

        let last = path[path.len() - 1];
        if smoothed.last().map_or(true, |p| p.distance(last) > 1e-9) {
            smoothed.push(last);
        }
        smoothed
    }

    /// Grows the organic network: main street, branches, connections.
    #[must_use]
    pub fn build_network(mut self, anchors: &[Point]) -> StreetNetwork {
        let anchors: Vec<Point> = anchors.iter().map(|&a| self.clamp_inside(a)).collect();
        let mut streets = Vec::new();

        if let Some((a, b)) = most_distant_pair(&anchors) {
            match self.find_path(a, b, StreetType::Main) {
                Some(raw) if raw.len() >= 2 => {
                    let curvature = self.config.curvature_amount;
                    let path = self.smooth_path(&raw, curvature);
                    self.mark_occupied(&path);
                    streets.push(Street::new("main".to_string(), path, StreetType::Main, curvature));
                    self.spawn_branches(&mut streets);
                }
                _ => tracing::debug!("no main street could be found"),
            }
        }

        self.connect_anchors(&anchors, &mut streets);

        let network = StreetNetwork::from_streets(streets);
        tracing::debug!(
            streets = network.streets.len(),
            intersections = network.intersections.len(),
            "street network complete"
        );
        network
    }

    fn spawn_branches(&mut self, streets: &mut Vec<Street>) {
        let main = streets[0].path.clone();
        let total = polyline_length(&main);
        let spacing = BRANCH_MIN_SPACING.max(self.config.street_spacing);
        let reach = self.config.max_street_length * 0.6;
        let curvature = self.config.curvature_amount * StreetType::Secondary.curvature_factor();

        let mut travelled = 0.0;
        let mut last_origin = 0.0;
        for i in 1..main.len() - 1 {
            travelled += main[i - 1].distance(main[i]);
            if travelled - last_origin < spacing || total - travelled < spacing {
                continue;
            }
            last_origin = travelled;

            if !self.rng.gen_bool(self.config.branching_probability) {
                continue;
            }

            let normal = (main[i + 1] - main[i - 1]).perpendicular().normalized();
            let normal = if normal == Point::ZERO {
                Point::new(1.0, 0.0)
            } else {
                normal
            };
            let side = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let end = self.clamp_inside(main[i] + normal * (reach * side));

            let Some(raw) = self.find_path(main[i], end, StreetType::Secondary) else {
                continue;
            };
            if raw.len() <= 3 {
                continue;
            }
            let path = self.smooth_path(&raw, curvature);
            if polyline_length(&path) < self.config.min_street_length {
                continue;
            }

            self.mark_occupied(&path);
            let id = format!("secondary_{}", streets.len() - 1);
            streets.push(Street::new(id, path, StreetType::Secondary, curvature));
        }
    }

    fn connect_anchors(&mut self, anchors: &[Point], streets: &mut Vec<Street>) {
        let curvature = self.config.curvature_amount * StreetType::Connection.curvature_factor();
        let mut index = 0;

        for &anchor in anchors {
            let nearest = streets
                .iter()
                .flat_map(|s| s.path.iter().copied())
                .min_by(|a, b| {
                    a.distance_squared(anchor)
                        .total_cmp(&b.distance_squared(anchor))
                });
            let Some(target) = nearest else {
                break;
            };
            if target.distance(anchor) <= ANCHOR_SERVICE_RADIUS {
                continue;
            }

            match self.find_path(anchor, target, StreetType::Connection) {
                Some(raw) if raw.len() > 1 => {
                    let path = self.smooth_path(&raw, curvature);
                    self.mark_occupied(&path);
                    streets.push(Street::new(
                        format!("connection_{index}"),
                        path,
                        StreetType::Connection,
                        curvature,
                    ));
                    index += 1;
                }
                _ => tracing::debug!(?anchor, "anchor left unconnected"),
            }
        }
    }

    /// Links consecutive anchors with `Path` streets bent through one noisy
    /// midpoint. No search is involved.
    #[must_use]
    pub fn connect_in_sequence(&self, anchors: &[Point]) -> StreetNetwork {
        let streets = anchors
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let start = self.clamp_inside(pair[0]);
                let end = self.clamp_inside(pair[1]);
                let mid = start.midpoint(end);
                let bend = self.jitter.sample(mid.x * 0.01 + 0.5, mid.y * 0.01 + 0.5) * 30.0;
                let mid = self.clamp_inside(mid + Point::new(bend, bend));
                Street::new(format!("path_{i}"), vec![start, mid, end], StreetType::Path, 0.0)
            })
            .collect();
        StreetNetwork::from_streets(streets)
    }
}

/// The two anchors farthest apart; ties keep the first pair found.
fn most_distant_pair(anchors: &[Point]) -> Option<(Point, Point)> {
    let mut best: Option<(Point, Point, f64)> = None;
    for (i, a) in anchors.iter().enumerate() {
        for b in &anchors[i + 1..] {
            let d = a.distance_squared(*b);
            if best.map_or(true, |(_, _, best_d)| d > best_d) {
                best = Some((*a, *b, d));
            }
        }
    }
    best.map(|(a, b, _)| (a, b))
}
