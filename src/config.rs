//! Run configuration
//!
//! Built with `with_*` calls on top of [`LifeConfig::default`], then checked
//! once by [`LifeConfig::validate`] before anything touches the GPU.

use std::path::PathBuf;

use crate::{
    error::{LifeError, Result},
    simulation::{
        grid::GridDimensions,
        patterns::Pattern,
        rules::{EdgePolicy, RuleParameters},
    },
};

/// How the grid size is derived when a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridSizing {
    /// One cell per `n x n` block of surface pixels.
    CellSize(u32),
    /// A fixed `edge x edge` grid, independent of the surface. Power of two.
    Square(u32),
}

impl GridSizing {
    pub fn resolve(&self, surface_width: u32, surface_height: u32) -> Result<GridDimensions> {
        match *self {
            GridSizing::CellSize(size) => {
                GridDimensions::from_surface(surface_width, surface_height, size)
            }
            GridSizing::Square(edge) => GridDimensions::square(edge),
        }
    }
}

/// How a generation is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentStyle {
    /// One full-surface quad; each pixel looks up its cell.
    #[default]
    Quad,
    /// One square per cell, placed at the cell's seeded position.
    Cells,
}

/// Where the WGSL stage sources come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShaderLocation {
    /// Sources compiled into the binary.
    #[default]
    Embedded,
    /// `<dir>/<stage-name>.wgsl` read at start.
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct LifeConfig {
    pub grid: GridSizing,
    pub alive_probability: f64,
    pub pattern: Option<Pattern>,
    pub edge_policy: EdgePolicy,
    pub rules: RuleParameters,
    pub present_style: PresentStyle,
    pub shaders: ShaderLocation,
    pub alive_color: [f32; 4],
    /// Fixed RNG seed for reproducible runs; `None` draws one from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            grid: GridSizing::CellSize(4),
            alive_probability: 0.5,
            pattern: None,
            edge_policy: EdgePolicy::Clamp,
            rules: RuleParameters::default(),
            present_style: PresentStyle::Quad,
            shaders: ShaderLocation::Embedded,
            alive_color: [0.85, 0.95, 0.85, 1.0],
            rng_seed: None,
        }
    }
}

impl LifeConfig {
    pub fn with_grid(mut self, grid: GridSizing) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_alive_probability(mut self, probability: f64) -> Self {
        self.alive_probability = probability;
        self
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn with_edge_policy(mut self, edge_policy: EdgePolicy) -> Self {
        self.edge_policy = edge_policy;
        self
    }

    pub fn with_rules(mut self, rules: RuleParameters) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_present_style(mut self, style: PresentStyle) -> Self {
        self.present_style = style;
        self
    }

    pub fn with_shader_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shaders = ShaderLocation::Directory(dir.into());
        self
    }

    pub fn with_alive_color(mut self, color: [f32; 4]) -> Self {
        self.alive_color = color;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alive_probability) {
            return Err(LifeError::Configuration(format!(
                "alive probability {} is outside [0, 1]",
                self.alive_probability
            )));
        }
        match self.grid {
            GridSizing::CellSize(0) => {
                return Err(LifeError::Configuration("cell size must be at least one pixel".into()))
            }
            GridSizing::Square(edge) => {
                GridDimensions::square(edge)?;
            }
            GridSizing::CellSize(_) => {}
        }
        if self.rules.resolution_multiplier == 0 {
            return Err(LifeError::Configuration("resolution multiplier must be at least 1".into()));
        }
        Ok(())
    }
}
