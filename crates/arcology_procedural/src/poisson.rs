//! # Poisson Disk Sampling
//!
//! Blue-noise point scattering inside a rectangle: no two points closer
//! than `radius`, optionally wider apart where a density map is low.
//!
//! Bridson's algorithm over a background grid of cell size `radius / √2`,
//! so each cell holds at most one point and a candidate only has to be
//! checked against the 5×5 cells around it.

use arcology_shared::Point;
use rand::Rng;

use crate::error::{check_dimensions, check_positive, ProceduralResult};
use crate::noise::{NoiseField, PerlinNoise, ScalarGrid, WorldSeed};

/// Stream id for sampler randomness.
const POISSON_STREAM: u64 = 0x504f_4953;

/// Blue-noise point sampler for one rectangle `[0, width) × [0, height)`.
#[derive(Clone, Debug)]
pub struct PoissonDiskSampler {
    width: f64,
    height: f64,
    radius: f64,
    cell_size: f64,
    grid_width: usize,
    grid_height: usize,
}

impl PoissonDiskSampler {
    /// Candidates tried around an active point before it is retired.
    pub const MAX_CANDIDATES: usize = 30;

    /// Maximum distance the first point is jittered away from the center.
    const INITIAL_JITTER: f64 = 50.0;

    /// Creates a sampler.
    ///
    /// # Errors
    ///
    /// Returns an error if the area is empty or `radius` is not positive.
    pub fn new(width: f64, height: f64, radius: f64) -> ProceduralResult<Self> {
        check_dimensions(width, height)?;
        check_positive("radius", radius)?;

        let cell_size = radius / std::f64::consts::SQRT_2;
        Ok(Self {
            width,
            height,
            radius,
            cell_size,
            grid_width: (width / cell_size).ceil() as usize,
            grid_height: (height / cell_size).ceil() as usize,
        })
    }

    /// Minimum distance between any two generated points.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Scatters points.
    ///
    /// `density` is read in normalized coordinates over the sampler's
    /// rectangle; values are clamped to `[0, 1]` and low density spreads
    /// candidates up to twice as far.
    #[must_use]
    pub fn generate(&self, seed: WorldSeed, density: Option<&ScalarGrid>) -> Vec<Point> {
        let mut rng = seed.rng(POISSON_STREAM);
        let noise = PerlinNoise::new(seed.derive(POISSON_STREAM));

        let mut grid: Vec<Option<usize>> = vec![None; self.grid_width * self.grid_height];
        let mut points: Vec<Point> = Vec::new();
        let mut active: Vec<usize> = Vec::new();

        let jitter_x = noise.sample(self.width * 0.01 + 0.5, self.height * 0.01 + 0.5);
        let jitter_y = noise.sample(self.width * 0.01 + 100.5, self.height * 0.01 + 100.5);
        let initial = self.clamp_inside(Point::new(
            self.width * 0.5 + jitter_x * Self::INITIAL_JITTER,
            self.height * 0.5 + jitter_y * Self::INITIAL_JITTER,
        ));
        self.insert(initial, &mut grid, &mut points, &mut active);

        while !active.is_empty() {
            let slot = rng.gen_range(0..active.len());
            let center = points[active[slot]];
            let spread = density.map_or(1.0, |map| {
                let local = map
                    .sample_normalized(center.x / self.width, center.y / self.height)
                    .clamp(0.0, 1.0);
                2.0 - local
            });

            let accepted = (0..Self::MAX_CANDIDATES).find_map(|_| {
                let angle = rng.gen_range(0.0..std::f64::consts::TAU);
                let distance = (self.radius + rng.gen_range(0.0..self.radius)) * spread;
                let candidate = Point::new(
                    center.x + angle.cos() * distance,
                    center.y + angle.sin() * distance,
                );
                self.is_valid(candidate, &grid, &points).then_some(candidate)
            });

            match accepted {
                Some(point) => self.insert(point, &mut grid, &mut points, &mut active),
                None => {
                    active.swap_remove(slot);
                }
            }
        }

        tracing::trace!(points = points.len(), radius = self.radius, "poisson sampling done");
        points
    }

    fn clamp_inside(&self, p: Point) -> Point {
        // Half-open bounds: stay strictly below width/height
        let max_x = (self.width - 1e-6).max(0.0);
        let max_y = (self.height - 1e-6).max(0.0);
        Point::new(p.x.clamp(0.0, max_x), p.y.clamp(0.0, max_y))
    }

    #[inline]
    fn cell_of(&self, p: Point) -> (usize, usize) {
        let gx = ((p.x / self.cell_size) as usize).min(self.grid_width.saturating_sub(1));
        let gy = ((p.y / self.cell_size) as usize).min(self.grid_height.saturating_sub(1));
        (gx, gy)
    }

    fn is_valid(&self, candidate: Point, grid: &[Option<usize>], points: &[Point]) -> bool {
        if candidate.x < 0.0
            || candidate.x >= self.width
            || candidate.y < 0.0
            || candidate.y >= self.height
        {
            return false;
        }

        let (gx, gy) = self.cell_of(candidate);
        let radius_sq = self.radius * self.radius;

        let x_range = gx.saturating_sub(2)..=(gx + 2).min(self.grid_width - 1);
        for y in gy.saturating_sub(2)..=(gy + 2).min(self.grid_height - 1) {
            for x in x_range.clone() {
                if let Some(index) = grid[y * self.grid_width + x] {
                    if points[index].distance_squared(candidate) < radius_sq {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn insert(
        &self,
        point: Point,
        grid: &mut [Option<usize>],
        points: &mut Vec<Point>,
        active: &mut Vec<usize>,
    ) {
        let (gx, gy) = self.cell_of(point);
        grid[gy * self.grid_width + gx] = Some(points.len());
        active.push(points.len());
        points.push(point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_spacing(points: &[Point], radius: f64) {
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                assert!(
                    a.distance(*b) >= radius,
                    "Points {a:?} and {b:?} closer than {radius}"
                );
            }
        }
    }

    #[test]
    fn test_minimum_spacing() {
        let sampler = PoissonDiskSampler::new(300.0, 200.0, 25.0).expect("valid sampler");
        let points = sampler.generate(WorldSeed::new(42), None);

        assert!(points.len() > 20, "Expected a dense fill, got {}", points.len());
        assert_spacing(&points, 25.0);
    }

    #[test]
    fn test_points_stay_in_bounds() {
        let sampler = PoissonDiskSampler::new(120.0, 80.0, 10.0).expect("valid sampler");
        for p in sampler.generate(WorldSeed::new(7), None) {
            assert!(p.x >= 0.0 && p.x < 120.0 && p.y >= 0.0 && p.y < 80.0);
        }
    }

    #[test]
    fn test_determinism() {
        let sampler = PoissonDiskSampler::new(200.0, 200.0, 15.0).expect("valid sampler");
        let a = sampler.generate(WorldSeed::new(99), None);
        let b = sampler.generate(WorldSeed::new(99), None);
        let c = sampler.generate(WorldSeed::new(100), None);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_low_density_spreads_points() {
        let sampler = PoissonDiskSampler::new(400.0, 400.0, 20.0).expect("valid sampler");
        let sparse = ScalarGrid::from_fn(4, 4, |_, _| 0.0);
        let dense = ScalarGrid::from_fn(4, 4, |_, _| 1.0);

        let sparse_points = sampler.generate(WorldSeed::new(5), Some(&sparse));
        let dense_points = sampler.generate(WorldSeed::new(5), Some(&dense));

        assert_spacing(&sparse_points, 20.0);
        assert!(
            sparse_points.len() < dense_points.len(),
            "Sparse {} should be below dense {}",
            sparse_points.len(),
            dense_points.len()
        );
    }

    #[test]
    fn test_tiny_area_still_yields_initial_point() {
        let sampler = PoissonDiskSampler::new(5.0, 5.0, 50.0).expect("valid sampler");
        let points = sampler.generate(WorldSeed::new(1), None);
        assert_eq!(points.len(), 1);
        assert!(points[0].x < 5.0 && points[0].y < 5.0);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(PoissonDiskSampler::new(0.0, 10.0, 1.0).is_err());
        assert!(PoissonDiskSampler::new(10.0, 10.0, 0.0).is_err());
        assert!(PoissonDiskSampler::new(10.0, -3.0, 1.0).is_err());
    }
}
