//! Logical grid dimensions
//!
//! The grid is fixed for the lifetime of a run. Changing it means stopping
//! and starting again, which re-seeds every cell.

use crate::error::{LifeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDimensions {
    pub num_x: u32,
    pub num_y: u32,
}

impl GridDimensions {
    pub fn new(num_x: u32, num_y: u32) -> Result<Self> {
        if num_x == 0 || num_y == 0 {
            return Err(LifeError::Configuration(format!(
                "grid of {}x{} cells has no cells",
                num_x, num_y
            )));
        }
        Ok(Self { num_x, num_y })
    }

    /// Derives the grid from a surface size and a cell edge in pixels.
    pub fn from_surface(width: u32, height: u32, cell_size: u32) -> Result<Self> {
        if cell_size == 0 {
            return Err(LifeError::Configuration("cell size must be at least one pixel".into()));
        }
        Self::new(width / cell_size, height / cell_size).map_err(|_| {
            LifeError::Configuration(format!(
                "surface of {}x{} px is too small for {} px cells",
                width, height, cell_size
            ))
        })
    }

    /// A square grid; the edge length must be a power of two.
    pub fn square(edge: u32) -> Result<Self> {
        if !edge.is_power_of_two() {
            return Err(LifeError::Configuration(format!(
                "square grid edge {} is not a power of two",
                edge
            )));
        }
        Self::new(edge, edge)
    }

    pub fn num_cells(&self) -> usize {
        self.num_x as usize * self.num_y as usize
    }

    /// Row-major index of cell `(x, y)`.
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.num_x as usize + x as usize
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.num_x as i64 && y < self.num_y as i64
    }

    /// Rejects grids the device cannot hold in a single state texture.
    pub fn check_texture_limit(&self, max_dimension: u32) -> Result<()> {
        if self.num_x > max_dimension || self.num_y > max_dimension {
            return Err(LifeError::Configuration(format!(
                "grid of {}x{} cells exceeds the device texture limit of {}",
                self.num_x, self.num_y, max_dimension
            )));
        }
        Ok(())
    }

    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.num_x,
            height: self.num_y,
            depth_or_array_layers: 1,
        }
    }
}
