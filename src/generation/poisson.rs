//! Poisson-disc sampling over a rectangle
//!
//! Bridson-style sampler backed by a uniform background grid whose cells are small
//! enough to hold at most one sample, so neighbour queries touch a constant number
//! of cells.

use std::f32::consts::{SQRT_2, TAU};

use glam::Vec2;
use rand::Rng;

use crate::error::{DungeonError, Result};

/// Sampling attempts around an active point before it is retired
pub const DEFAULT_ATTEMPTS: usize = 30;

/// Grid cells scanned on each side of a candidate's cell
///
/// With a cell size of `r / √2` a point closer than `r` can sit up to two cells away.
const SCAN_RADIUS: isize = 2;

/// Poisson-disc sampler for the rectangle `[0, width] × [0, height]`
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use voronoi_dungeon::generation::PoissonSampler;
///
/// let sampler = PoissonSampler::new(4.0, 50.0, 50.0).unwrap();
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
/// let points = sampler.sample(&mut rng);
///
/// for (i, a) in points.iter().enumerate() {
///     for b in &points[i + 1..] {
///         assert!(a.distance(*b) >= 4.0 - 1e-4);
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonSampler {
    min_distance: f32,
    width: f32,
    height: f32,
    attempts: usize,
}

impl PoissonSampler {
    /// Create a sampler
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the distance or either dimension is not a
    /// positive finite number.
    pub fn new(min_distance: f32, width: f32, height: f32) -> Result<Self> {
        for (name, value) in [
            ("minimum distance", min_distance),
            ("width", width),
            ("height", height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DungeonError::InvalidConfig(format!(
                    "Poisson {} must be positive (got {})",
                    name, value
                )));
            }
        }

        Ok(Self {
            min_distance,
            width,
            height,
            attempts: DEFAULT_ATTEMPTS,
        })
    }

    /// Override the number of attempts per active point
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `attempts` is zero
    pub fn with_attempts(mut self, attempts: usize) -> Result<Self> {
        if attempts == 0 {
            return Err(DungeonError::InvalidConfig(
                "Poisson attempts must be at least 1".to_string(),
            ));
        }
        self.attempts = attempts;
        Ok(self)
    }

    #[inline]
    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    /// Draw a point set
    ///
    /// Points are returned in background-grid order (row-major, bottom row first).
    /// The count depends on the random stream and is not fixed.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Vec2> {
        let mut grid = BackgroundGrid::new(self.min_distance, self.width, self.height);
        let mut active: Vec<Vec2> = Vec::new();

        let start = Vec2::new(
            rng.gen_range(0.0..self.width),
            rng.gen_range(0.0..self.height),
        );
        grid.insert(start);
        active.push(start);

        let r = self.min_distance;
        while !active.is_empty() {
            let index = rng.gen_range(0..active.len());
            let center = active[index];
            let mut accepted_any = false;

            for _ in 0..self.attempts {
                let angle = rng.gen_range(0.0..TAU);
                let radius = rng.gen_range(r..2.0 * r);
                let candidate = center + Vec2::new(angle.cos(), angle.sin()) * radius;

                if self.in_domain(candidate) && grid.is_free(candidate) {
                    grid.insert(candidate);
                    active.push(candidate);
                    accepted_any = true;
                }
            }

            if !accepted_any {
                active.swap_remove(index);
            }
        }

        grid.into_points()
    }

    fn in_domain(&self, p: Vec2) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }
}

struct BackgroundGrid {
    cell_size: f32,
    min_distance_sq: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Option<Vec2>>,
}

impl BackgroundGrid {
    fn new(min_distance: f32, width: f32, height: f32) -> Self {
        let cell_size = min_distance / SQRT_2;
        let cols = ((width / cell_size).ceil() as usize).max(1);
        let rows = ((height / cell_size).ceil() as usize).max(1);
        Self {
            cell_size,
            min_distance_sq: min_distance * min_distance,
            cols,
            rows,
            cells: vec![None; cols * rows],
        }
    }

    fn coords(&self, p: Vec2) -> (usize, usize) {
        let col = ((p.x / self.cell_size) as usize).min(self.cols - 1);
        let row = ((p.y / self.cell_size) as usize).min(self.rows - 1);
        (col, row)
    }

    fn is_free(&self, p: Vec2) -> bool {
        let (col, row) = self.coords(p);
        if self.cells[row * self.cols + col].is_some() {
            return false;
        }

        for dr in -SCAN_RADIUS..=SCAN_RADIUS {
            for dc in -SCAN_RADIUS..=SCAN_RADIUS {
                let (r, c) = (row as isize + dr, col as isize + dc);
                if r < 0 || c < 0 || r >= self.rows as isize || c >= self.cols as isize {
                    continue;
                }
                if let Some(other) = self.cells[r as usize * self.cols + c as usize] {
                    if other.distance_squared(p) < self.min_distance_sq {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn insert(&mut self, p: Vec2) {
        let (col, row) = self.coords(p);
        self.cells[row * self.cols + col] = Some(p);
    }

    fn into_points(self) -> Vec<Vec2> {
        self.cells.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_invalid_parameters_fail_fast() {
        assert!(PoissonSampler::new(0.0, 10.0, 10.0).is_err());
        assert!(PoissonSampler::new(-1.0, 10.0, 10.0).is_err());
        assert!(PoissonSampler::new(1.0, 0.0, 10.0).is_err());
        assert!(PoissonSampler::new(1.0, 10.0, f32::INFINITY).is_err());
        assert!(PoissonSampler::new(1.0, 10.0, 10.0).unwrap().with_attempts(0).is_err());
    }

    #[test]
    fn test_samples_stay_inside_domain() {
        let sampler = PoissonSampler::new(3.0, 40.0, 25.0).unwrap();
        let points = sampler.sample(&mut ChaCha8Rng::seed_from_u64(11));
        assert!(!points.is_empty());
        for p in &points {
            assert!((0.0..=40.0).contains(&p.x));
            assert!((0.0..=25.0).contains(&p.y));
        }
    }

    #[test]
    fn test_same_seed_same_points() {
        let sampler = PoissonSampler::new(4.0, 60.0, 60.0).unwrap();
        let a = sampler.sample(&mut ChaCha8Rng::seed_from_u64(99));
        let b = sampler.sample(&mut ChaCha8Rng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sampling_is_dense() {
        // a 100x100 square packs several hundred points at r = 4
        let sampler = PoissonSampler::new(4.0, 100.0, 100.0).unwrap();
        let points = sampler.sample(&mut ChaCha8Rng::seed_from_u64(3));
        assert!(points.len() > 200, "only {} points", points.len());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn every_pair_respects_min_distance(
            seed in any::<u64>(),
            r in 1.5f32..6.0,
            width in 10.0f32..60.0,
            height in 10.0f32..60.0,
        ) {
            let sampler = PoissonSampler::new(r, width, height).unwrap();
            let points = sampler.sample(&mut ChaCha8Rng::seed_from_u64(seed));
            for (i, a) in points.iter().enumerate() {
                for b in &points[i + 1..] {
                    prop_assert!(a.distance_squared(*b) >= r * r);
                }
            }
        }
    }
}
