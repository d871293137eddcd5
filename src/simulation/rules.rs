//! Game of Life rule
//!
//! The WGSL rule pass (`compute-fragment.wgsl`) evaluates exactly this table.
//! The CPU version here is the reference the GPU output is checked against.
//!
//! 1. Live cell with fewer than `under_population_limit` neighbors dies
//! 2. Live cell with more than `over_population_limit` neighbors dies
//! 3. Dead cell with exactly `num_neighbors_to_reproduce` neighbors becomes alive
//! 4. Everything else keeps its state

use super::{generation::Generation, grid::GridDimensions};

/// What happens to neighbor lookups that fall outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgePolicy {
    /// Out-of-bounds neighbors count as dead. No wraparound.
    #[default]
    Clamp,
    /// Lookups wrap to the opposite edge (toroidal grid).
    Wrap,
}

impl EdgePolicy {
    pub fn as_u32(&self) -> u32 {
        match self {
            EdgePolicy::Clamp => 0,
            EdgePolicy::Wrap => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleParameters {
    pub under_population_limit: u32,
    pub over_population_limit: u32,
    pub num_neighbors_to_reproduce: u32,
    /// Distance in cells between a cell and the neighbors it samples.
    pub resolution_multiplier: u32,
}

impl Default for RuleParameters {
    fn default() -> Self {
        // B3/S23
        Self {
            under_population_limit: 2,
            over_population_limit: 3,
            num_neighbors_to_reproduce: 3,
            resolution_multiplier: 1,
        }
    }
}

/// Uniform block read by the rule pass. Layout must match `RuleUniforms` in
/// `compute-fragment.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RuleUniforms {
    pub grid: [u32; 2],
    pub under_population_limit: u32,
    pub over_population_limit: u32,
    pub num_neighbors_to_reproduce: u32,
    pub resolution_multiplier: u32,
    pub edge_policy: u32,
    pub _padding: u32,
}

impl RuleUniforms {
    pub fn new(grid: GridDimensions, params: &RuleParameters, edge: EdgePolicy) -> Self {
        Self {
            grid: [grid.num_x, grid.num_y],
            under_population_limit: params.under_population_limit,
            over_population_limit: params.over_population_limit,
            num_neighbors_to_reproduce: params.num_neighbors_to_reproduce,
            resolution_multiplier: params.resolution_multiplier.max(1),
            edge_policy: edge.as_u32(),
            _padding: 0,
        }
    }
}

pub fn next_state(alive: bool, neighbors: u32, params: &RuleParameters) -> bool {
    if alive && neighbors < params.under_population_limit {
        false
    } else if alive && neighbors > params.over_population_limit {
        false
    } else if !alive && neighbors == params.num_neighbors_to_reproduce {
        true
    } else {
        alive
    }
}

fn sample(generation: &Generation, x: i64, y: i64, edge: EdgePolicy) -> bool {
    let grid = generation.grid();
    match edge {
        EdgePolicy::Clamp => grid.contains(x, y) && generation.is_alive(x as u32, y as u32),
        EdgePolicy::Wrap => {
            let wx = x.rem_euclid(grid.num_x as i64) as u32;
            let wy = y.rem_euclid(grid.num_y as i64) as u32;
            generation.is_alive(wx, wy)
        }
    }
}

/// Live neighbors among the eight cells `multiplier` cells away from `(x, y)`.
pub fn count_neighbors(
    generation: &Generation,
    x: u32,
    y: u32,
    edge: EdgePolicy,
    multiplier: u32,
) -> u32 {
    let stride = multiplier.max(1) as i64;
    let mut count = 0;
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            if sample(generation, x as i64 + dx * stride, y as i64 + dy * stride, edge) {
                count += 1;
            }
        }
    }
    count
}

/// Writes the successor of `read` into `write`. `read` is never touched.
pub fn step(read: &Generation, write: &mut Generation, params: &RuleParameters, edge: EdgePolicy) {
    let grid = read.grid();
    assert_eq!(grid, write.grid(), "generations must share a grid");

    for y in 0..grid.num_y {
        for x in 0..grid.num_x {
            let neighbors = count_neighbors(read, x, y, edge, params.resolution_multiplier);
            write.set(x, y, next_state(read.is_alive(x, y), neighbors, params));
        }
    }
}
