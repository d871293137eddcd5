//! Seed generation
//!
//! Positions are a pure function of the grid. Only aliveness is random.

use rand::Rng;

use super::{generation::Generation, grid::GridDimensions, patterns::Pattern};

/// Position of every cell in normalized device space, row-major.
pub type CellPositions = Vec<[f32; 2]>;

/// What a run starts from.
#[derive(Debug, Clone)]
pub struct Seed {
    pub generation: Generation,
    pub positions: CellPositions,
}

/// Maps a grid coordinate to `[-1, 1]`. A single-cell axis sits at 0.
pub fn normalize(coord: u32, count: u32) -> f32 {
    if count < 2 {
        return 0.0;
    }
    2.0 * coord as f32 / (count - 1) as f32 - 1.0
}

/// `(2x/(numX-1)-1, 2y/(numY-1)-1)` for every cell.
pub fn cell_positions(grid: GridDimensions) -> CellPositions {
    let mut positions = Vec::with_capacity(grid.num_cells());
    for y in 0..grid.num_y {
        let y_norm = normalize(y, grid.num_y);
        for x in 0..grid.num_x {
            positions.push([normalize(x, grid.num_x), y_norm]);
        }
    }
    positions
}

#[derive(Debug, Clone, Copy)]
pub struct InitialStateGenerator {
    alive_probability: f64,
    pattern: Option<Pattern>,
}

impl InitialStateGenerator {
    /// `alive_probability` must already be validated to lie in `[0, 1]`.
    pub fn new(alive_probability: f64, pattern: Option<Pattern>) -> Self {
        Self {
            alive_probability,
            pattern,
        }
    }

    pub fn seed<R: Rng + ?Sized>(&self, grid: GridDimensions, rng: &mut R) -> Seed {
        let generation = match self.pattern {
            Some(pattern) => {
                let mut generation = Generation::empty(grid);
                pattern.stamp_centered(&mut generation);
                generation
            }
            None => self.random_generation(grid, rng),
        };

        Seed {
            generation,
            positions: cell_positions(grid),
        }
    }

    fn random_generation<R: Rng + ?Sized>(&self, grid: GridDimensions, rng: &mut R) -> Generation {
        let mut generation = Generation::empty(grid);
        for y in 0..grid.num_y {
            for x in 0..grid.num_x {
                generation.set(x, y, rng.random_bool(self.alive_probability));
            }
        }
        generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_positions_follow_formula() {
        let grid = GridDimensions::new(5, 3).unwrap();
        let positions = cell_positions(grid);
        assert_eq!(positions.len(), 15);
        assert_eq!(positions[grid.index(0, 0)], [-1.0, -1.0]);
        assert_eq!(positions[grid.index(4, 2)], [1.0, 1.0]);
        assert_eq!(positions[grid.index(2, 1)], [0.0, 0.0]);
        assert_eq!(positions[grid.index(1, 0)], [-0.5, -1.0]);
    }

    #[test]
    fn test_reseeding_keeps_positions() {
        let grid = GridDimensions::new(16, 9).unwrap();
        let generator = InitialStateGenerator::new(0.5, None);

        let first = generator.seed(grid, &mut StdRng::seed_from_u64(1));
        let second = generator.seed(grid, &mut StdRng::seed_from_u64(2));

        assert_eq!(first.positions, second.positions);
        assert_ne!(first.generation, second.generation);
    }

    #[test]
    fn test_single_cell_axis_is_centered() {
        let grid = GridDimensions::new(1, 2).unwrap();
        assert_eq!(cell_positions(grid), vec![[0.0, -1.0], [0.0, 1.0]]);
    }

    #[test]
    fn test_probability_extremes() {
        let grid = GridDimensions::new(8, 8).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let none = InitialStateGenerator::new(0.0, None).seed(grid, &mut rng);
        assert_eq!(none.generation.live_count(), 0);

        let all = InitialStateGenerator::new(1.0, None).seed(grid, &mut rng);
        assert_eq!(all.generation.live_count(), 64);
    }

    #[test]
    fn test_dense_seed_is_roughly_half_alive() {
        let grid = GridDimensions::new(100, 100).unwrap();
        let seed = InitialStateGenerator::new(0.5, None).seed(grid, &mut StdRng::seed_from_u64(42));
        let live = seed.generation.live_count();
        assert!(live > 4_000 && live < 6_000, "live = {}", live);
    }

    #[test]
    fn test_pattern_seed_ignores_probability() {
        let grid = GridDimensions::new(10, 10).unwrap();
        let seed = InitialStateGenerator::new(1.0, Some(Pattern::Block))
            .seed(grid, &mut StdRng::seed_from_u64(0));
        assert_eq!(seed.generation.live_count(), 4);
    }
}
