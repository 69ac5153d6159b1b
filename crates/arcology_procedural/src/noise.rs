//! # Noise Fields
//!
//! Deterministic gradient noise for organic variation, elevation costs and
//! density bias.
//!
//! ## Variants
//!
//! - `PerlinNoise`: square lattice, 8 gradient directions, quintic fade.
//!   Exactly zero at every integer lattice point.
//! - `SimplexNoise`: skewed triangular lattice, fewer directional artifacts.
//!
//! Both implement [`NoiseField`], which layers octaves on top of the raw
//! sample.
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, every field produces **exactly** the same
//! values on any platform, independent of call order.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{check_positive, ProceduralError, ProceduralResult};

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Hashes a text seed (64-bit FNV-1a) into a world seed.
    #[must_use]
    pub const fn from_text(text: &str) -> Self {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;

        let bytes = text.as_bytes();
        let mut hash = OFFSET;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose (e.g., street branching).
    ///
    /// Uses a hash function to create independent streams from one seed.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }

    /// Creates a fresh random stream for one purpose.
    ///
    /// Every call returns an identical, independent generator.
    #[must_use]
    pub fn rng(self, purpose: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.derive(purpose).value())
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0xDEAD_BEEF_CAFE_BABE)
    }
}

impl From<u64> for WorldSeed {
    fn from(seed: u64) -> Self {
        Self::new(seed)
    }
}

impl From<&str> for WorldSeed {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

/// Linear congruential generator used to shuffle permutation tables.
struct TableLcg {
    state: u64,
}

impl TableLcg {
    const MODULUS: u64 = 2_147_483_647;
    const MULTIPLIER: u64 = 1_103_515_245;
    const INCREMENT: u64 = 12_345;

    fn new(seed: WorldSeed) -> Self {
        Self {
            state: seed.value() % Self::MODULUS,
        }
    }

    /// Next index in `[0, bound)`.
    fn next_index(&mut self, bound: usize) -> usize {
        self.state = (Self::MULTIPLIER * self.state + Self::INCREMENT) % Self::MODULUS;
        (self.state % bound as u64) as usize
    }
}

/// Pre-computed permutation table for noise.
///
/// This is computed once from the seed and reused.
struct PermutationTable {
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
}

impl PermutationTable {
    /// Creates a new permutation table from a seed.
    fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];

        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates shuffle with the seed-keyed LCG
        let mut lcg = TableLcg::new(seed);
        for i in (1..256).rev() {
            let j = lcg.next_index(i + 1);
            perm.swap(i, j);
        }

        // Double the table to avoid index wrapping
        perm.copy_within(0..256, 256);

        Self { perm }
    }

    /// Gets a permutation value (with automatic wrapping).
    #[inline]
    fn get(&self, index: usize) -> usize {
        usize::from(self.perm[index & 511])
    }
}

/// Fractal sampling parameters.
///
/// `scale` is the feature size in map units: the first octave samples at
/// frequency `1 / scale`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Seed for fields built from this config
    pub seed: u64,
    /// Feature size of the first octave
    pub scale: f64,
    /// Number of layers
    pub octaves: u32,
    /// Amplitude decay per octave
    pub persistence: f64,
    /// Frequency growth per octave
    pub lacunarity: f64,
}

impl NoiseConfig {
    /// Broad, gentle variation.
    pub const SMOOTH: Self = Self::preset(50.0, 4, 0.5, 2.0);
    /// Busy, high-contrast variation.
    pub const ROUGH: Self = Self::preset(25.0, 6, 0.6, 2.5);
    /// Large features with many faint details.
    pub const FINE: Self = Self::preset(100.0, 8, 0.4, 2.0);
    /// Variation used for density maps.
    pub const ORGANIC_VARIATION: Self = Self::preset(75.0, 5, 0.55, 2.2);
    /// Variation used for street elevation.
    pub const TERRAIN: Self = Self::preset(30.0, 6, 0.7, 2.1);

    const fn preset(scale: f64, octaves: u32, persistence: f64, lacunarity: f64) -> Self {
        Self {
            seed: 0,
            scale,
            octaves,
            persistence,
            lacunarity,
        }
    }

    /// Creates a validated config.
    ///
    /// # Errors
    ///
    /// Returns an error if `scale` or `lacunarity` is not positive,
    /// `persistence` is negative, or `octaves` is zero.
    pub fn new(
        seed: u64,
        scale: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
    ) -> ProceduralResult<Self> {
        let config = Self {
            seed,
            scale,
            octaves,
            persistence,
            lacunarity,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// See [`NoiseConfig::new`].
    pub fn validate(&self) -> ProceduralResult<()> {
        check_positive("scale", self.scale)?;
        check_positive("lacunarity", self.lacunarity)?;
        if !(self.persistence.is_finite() && self.persistence >= 0.0) {
            return Err(ProceduralError::InvalidParameter {
                name: "persistence",
                value: self.persistence,
            });
        }
        if self.octaves == 0 {
            return Err(ProceduralError::InvalidParameter {
                name: "octaves",
                value: 0.0,
            });
        }
        Ok(())
    }

    /// Copy of this config with another seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Copy of this config with another feature size.
    #[must_use]
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Copy of this config with another octave count.
    #[must_use]
    pub const fn with_octaves(mut self, octaves: u32) -> Self {
        self.octaves = octaves;
        self
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self::SMOOTH
    }
}

/// A seeded continuous scalar field.
pub trait NoiseField {
    /// Samples the field. Always in `[-1, 1]`.
    fn sample(&self, x: f64, y: f64) -> f64;

    /// Generates octaved (fractal) noise.
    ///
    /// Combines `config.octaves` layers at increasing frequency and
    /// decreasing amplitude, normalized by the total amplitude.
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    fn fractal(&self, x: f64, y: f64, config: &NoiseConfig) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0 / config.scale;
        let mut max_amplitude = 0.0;

        for _ in 0..config.octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= config.persistence;
            frequency *= config.lacunarity;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }

    /// Samples `(fractal + 1) / 2` at every integer coordinate of a
    /// `width × height` area.
    fn elevation_map(&self, width: usize, height: usize, config: &NoiseConfig) -> ScalarGrid {
        ScalarGrid::from_fn(width, height, |x, y| {
            ((self.fractal(x as f64, y as f64, config) + 1.0) * 0.5).clamp(0.0, 1.0)
        })
    }
}

/// 2D Perlin noise generator.
///
/// # Example
///
/// ```rust,ignore
/// let noise = PerlinNoise::new(WorldSeed::new(42));
///
/// assert_eq!(noise.sample(3.0, 7.0), 0.0);
/// let terrain = noise.fractal(x, y, &NoiseConfig::TERRAIN);
/// ```
pub struct PerlinNoise {
    /// The permutation table.
    perm_table: PermutationTable,
}

impl PerlinNoise {
    /// Eight unit-lattice gradient directions.
    const GRADIENTS: [[f64; 2]; 8] = [
        [1.0, 0.0],
        [-1.0, 0.0],
        [0.0, 1.0],
        [0.0, -1.0],
        [1.0, 1.0],
        [-1.0, 1.0],
        [1.0, -1.0],
        [-1.0, -1.0],
    ];

    /// Creates a new Perlin noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
        }
    }

    /// Creates a generator seeded by `config.seed`.
    #[must_use]
    pub fn from_config(config: &NoiseConfig) -> Self {
        Self::new(WorldSeed::new(config.seed))
    }

    #[inline]
    fn gradient_dot(hash: usize, x: f64, y: f64) -> f64 {
        let g = Self::GRADIENTS[hash & 7];
        g[0] * x + g[1] * y
    }
}

impl NoiseField for PerlinNoise {
    fn sample(&self, x: f64, y: f64) -> f64 {
        if !x.is_finite() || !y.is_finite() {
            return 0.0;
        }

        let xf = x.floor();
        let yf = y.floor();
        let xi = ((xf as i64) & 255) as usize;
        let yi = ((yf as i64) & 255) as usize;
        let dx = x - xf;
        let dy = y - yf;

        let u = fade(dx);
        let v = fade(dy);

        let p = &self.perm_table;
        let aa = p.get(p.get(xi) + yi);
        let ab = p.get(p.get(xi) + yi + 1);
        let ba = p.get(p.get(xi + 1) + yi);
        let bb = p.get(p.get(xi + 1) + yi + 1);

        let bottom = lerp(
            Self::gradient_dot(aa, dx, dy),
            Self::gradient_dot(ba, dx - 1.0, dy),
            u,
        );
        let top = lerp(
            Self::gradient_dot(ab, dx, dy - 1.0),
            Self::gradient_dot(bb, dx - 1.0, dy - 1.0),
            u,
        );

        lerp(bottom, top, v).clamp(-1.0, 1.0)
    }
}

/// 2D Simplex noise generator.
///
/// Produces smooth, continuous noise values in the range [-1, 1].
pub struct SimplexNoise {
    /// The permutation table.
    perm_table: PermutationTable,
}

impl SimplexNoise {
    /// Skewing factor for 2D simplex grid.
    const F2: f64 = 0.366_025_403_784_439; // (sqrt(3) - 1) / 2
    /// Unskewing factor for 2D simplex grid.
    const G2: f64 = 0.211_324_865_405_187; // (3 - sqrt(3)) / 6

    /// 12 gradient vectors, vertices of a regular 12-gon.
    const GRADIENTS: [[f64; 2]; 12] = [
        [1.0, 0.0],
        [1.0, 1.0],
        [0.0, 1.0],
        [-1.0, 1.0],
        [-1.0, 0.0],
        [-1.0, -1.0],
        [0.0, -1.0],
        [1.0, -1.0],
        [1.0, 0.0],
        [0.0, 1.0],
        [-1.0, 0.0],
        [0.0, -1.0],
    ];

    /// Creates a new simplex noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
        }
    }

    /// Calculates the contribution from one corner of the simplex.
    #[inline]
    fn contribution(x: f64, y: f64, gradient_index: usize) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            0.0
        } else {
            let grad = Self::GRADIENTS[gradient_index % 12];
            let t2 = t * t;
            t2 * t2 * (x * grad[0] + y * grad[1])
        }
    }
}

impl NoiseField for SimplexNoise {
    fn sample(&self, x: f64, y: f64) -> f64 {
        if !x.is_finite() || !y.is_finite() {
            return 0.0;
        }

        // Skew input coordinates to simplex grid
        let skew = (x + y) * Self::F2;
        let i = (x + skew).floor() as i64;
        let j = (y + skew).floor() as i64;

        // Unskew to get first corner in simplex
        let unskew = (i + j) as f64 * Self::G2;
        let x0 = x - (i as f64 - unskew);
        let y0 = y - (j as f64 - unskew);

        // Upper or lower triangle
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + Self::G2;
        let y1 = y0 - j1 as f64 + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;

        let p = &self.perm_table;
        let gi0 = p.get(ii + p.get(jj));
        let gi1 = p.get(ii + i1 + p.get(jj + j1));
        let gi2 = p.get(ii + 1 + p.get(jj + 1));

        let n0 = Self::contribution(x0, y0, gi0);
        let n1 = Self::contribution(x1, y1, gi1);
        let n2 = Self::contribution(x2, y2, gi2);

        // The magic number 70.0 normalizes the output
        (70.0 * (n0 + n1 + n2)).clamp(-1.0, 1.0)
    }
}

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Row-major grid of scalar samples.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarGrid {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl ScalarGrid {
    /// Builds a grid by evaluating `f(x, y)` at every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                values.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            values,
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// All values, row-major.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at a cell; coordinates are clamped to the grid. An empty grid
    /// reads as 0.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.values[y * self.width + x]
    }

    /// Value at normalized coordinates `u, v` in `[0, 1]`.
    #[must_use]
    pub fn sample_normalized(&self, u: f64, v: f64) -> f64 {
        let x = (u.clamp(0.0, 1.0) * self.width as f64) as usize;
        let y = (v.clamp(0.0, 1.0) * self.height as f64) as usize;
        self.get(x, y)
    }
}

/// Builds a `[0, 1]` density map seeded by `config.seed`.
///
/// With `natural_clustering`, a coarser second field is blended in so
/// dense areas gather into clumps.
#[must_use]
pub fn density_map(
    width: usize,
    height: usize,
    config: &NoiseConfig,
    natural_clustering: bool,
) -> ScalarGrid {
    let noise = PerlinNoise::from_config(config);
    let cluster_config = config.with_scale(config.scale * 2.0).with_octaves(3);

    let raw = ScalarGrid::from_fn(width, height, |x, y| {
        let (x, y) = (x as f64, y as f64);
        let value = noise.fractal(x, y, config);
        if natural_clustering {
            let cluster = noise.fractal(x * 0.5, y * 0.5, &cluster_config);
            (value + cluster * 0.3) / 1.3
        } else {
            value
        }
    });

    let (min, max) = raw
        .values()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;

    ScalarGrid::from_fn(width, height, |x, y| {
        if range > f64::EPSILON {
            (raw.get(x, y) - min) / range
        } else {
            0.5
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let seed = WorldSeed::new(12345);
        let noise1 = PerlinNoise::new(seed);
        let noise2 = PerlinNoise::new(seed);

        for i in 0..100 {
            let x = i as f64 * 0.1;
            let y = i as f64 * 0.17;
            assert_eq!(
                noise1.sample(x, y),
                noise2.sample(x, y),
                "Noise should be deterministic"
            );
        }
    }

    #[test]
    fn test_call_order_independence() {
        let noise = PerlinNoise::new(WorldSeed::new(9));
        let first = noise.sample(4.3, 1.7);
        for i in 0..50 {
            let _ = noise.sample(i as f64 * 0.31, 2.0);
        }
        assert_eq!(noise.sample(4.3, 1.7), first);
    }

    #[test]
    fn test_different_seeds_different_results() {
        let noise1 = PerlinNoise::new(WorldSeed::new(1));
        let noise2 = PerlinNoise::new(WorldSeed::new(2));

        let differs = (0..20).any(|i| {
            let x = i as f64 * 0.37 + 0.5;
            noise1.sample(x, x * 0.7) != noise2.sample(x, x * 0.7)
        });
        assert!(differs, "Different seeds should produce different results");
    }

    #[test]
    fn test_range() {
        let perlin = PerlinNoise::new(WorldSeed::new(42));
        let simplex = SimplexNoise::new(WorldSeed::new(42));

        for i in 0..10000 {
            let x = (i as f64 * 0.1) - 500.0;
            let y = (i as f64 * 0.13) - 650.0;
            for value in [perlin.sample(x, y), simplex.sample(x, y)] {
                assert!(
                    (-1.0..=1.0).contains(&value),
                    "Value {value} out of range at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn test_lattice_points_are_zero() {
        let noise = PerlinNoise::new(WorldSeed::new(77));
        for x in -20..20 {
            for y in -20..20 {
                assert_eq!(noise.sample(f64::from(x), f64::from(y)), 0.0);
            }
        }
    }

    #[test]
    fn test_non_finite_input_is_zero() {
        let noise = PerlinNoise::new(WorldSeed::new(1));
        assert_eq!(noise.sample(f64::NAN, 1.5), 0.0);
        assert_eq!(noise.sample(0.5, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_continuity() {
        let noise = PerlinNoise::new(WorldSeed::new(42));

        let x = 100.3;
        let y = 100.6;
        let delta = 0.001;

        let v1 = noise.sample(x, y);
        let v2 = noise.sample(x + delta, y);
        let v3 = noise.sample(x, y + delta);

        assert!((v1 - v2).abs() < 0.01, "Noise should be continuous");
        assert!((v1 - v3).abs() < 0.01, "Noise should be continuous");
    }

    #[test]
    fn test_fractal_origin_is_zero() {
        let config = NoiseConfig::new(1, 0.1, 1, 0.5, 2.0).expect("valid config");
        let noise = PerlinNoise::from_config(&config);
        assert_eq!(noise.fractal(0.0, 0.0, &config), 0.0);
    }

    #[test]
    fn test_fractal_range() {
        let noise = SimplexNoise::new(WorldSeed::new(3));
        for i in 0..1000 {
            let v = noise.fractal(i as f64 * 1.7, i as f64 * 0.9, &NoiseConfig::ROUGH);
            assert!((-1.0..=1.0).contains(&v), "Fractal value {v} out of range");
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(NoiseConfig::new(1, 0.0, 4, 0.5, 2.0).is_err());
        assert!(NoiseConfig::new(1, 10.0, 0, 0.5, 2.0).is_err());
        assert!(NoiseConfig::new(1, 10.0, 4, -0.5, 2.0).is_err());
        assert!(NoiseConfig::TERRAIN.validate().is_ok());
    }

    #[test]
    fn test_elevation_map_in_unit_range() {
        let noise = PerlinNoise::new(WorldSeed::new(5));
        let map = noise.elevation_map(64, 32, &NoiseConfig::TERRAIN);
        assert_eq!(map.width(), 64);
        assert_eq!(map.height(), 32);
        assert_eq!(map.values().len(), 64 * 32);
        assert!(map.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_density_map_normalized() {
        let config = NoiseConfig::ORGANIC_VARIATION.with_seed(11);
        for clustering in [false, true] {
            let map = density_map(80, 40, &config, clustering);
            let min = map.values().iter().copied().fold(f64::INFINITY, f64::min);
            let max = map.values().iter().copied().fold(f64::NEG_INFINITY, f64::max);
            assert!((min - 0.0).abs() < 1e-9);
            assert!((max - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_seed_derivation() {
        let base = WorldSeed::new(42);
        let derived1 = base.derive(1);
        let derived2 = base.derive(2);

        assert_ne!(derived1, derived2, "Different purposes should give different seeds");
        assert_eq!(derived1, base.derive(1), "Same purpose should give same seed");
        assert_ne!(derived1, base, "Derived seed should differ from base");
    }

    #[test]
    fn test_text_seeds() {
        assert_eq!(WorldSeed::from("arcology"), WorldSeed::from_text("arcology"));
        assert_ne!(WorldSeed::from_text("a"), WorldSeed::from_text("b"));
        // FNV-1a of the empty string is the offset basis
        assert_eq!(WorldSeed::from_text("").value(), 0xcbf2_9ce4_8422_2325);
    }

    #[test]
    fn test_rng_streams_are_reproducible() {
        use rand::Rng;

        let seed = WorldSeed::new(8);
        let a: Vec<u32> = seed.rng(1).sample_iter(rand::distributions::Standard).take(8).collect();
        let b: Vec<u32> = seed.rng(1).sample_iter(rand::distributions::Standard).take(8).collect();
        let c: Vec<u32> = seed.rng(2).sample_iter(rand::distributions::Standard).take(8).collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_scalar_grid_clamps() {
        let grid = ScalarGrid::from_fn(3, 2, |x, y| (x + y * 10) as f64);
        assert_eq!(grid.get(2, 1), 12.0);
        assert_eq!(grid.get(99, 99), 12.0);
        assert_eq!(grid.sample_normalized(1.0, 0.0), 2.0);
        assert_eq!(ScalarGrid::from_fn(0, 0, |_, _| 1.0).get(0, 0), 0.0);
    }
}
