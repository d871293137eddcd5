//! CPU-side snapshot of one generation

use super::grid::GridDimensions;

/// Texel value written for a live cell in the single-channel state texture.
pub const ALIVE_TEXEL: u8 = 255;

/// Aliveness of every cell at one tick, row-major (`y * num_x + x`), 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    grid: GridDimensions,
    cells: Vec<u8>,
}

impl Generation {
    /// An all-dead generation.
    pub fn empty(grid: GridDimensions) -> Self {
        Self {
            grid,
            cells: vec![0; grid.num_cells()],
        }
    }

    /// Builds a generation from rows of 0/1, row 0 first.
    ///
    /// # Panics
    /// Panics if there are no rows or the rows are empty.
    pub fn from_rows<const W: usize>(rows: &[[u8; W]]) -> Self {
        let grid = GridDimensions::new(W as u32, rows.len() as u32)
            .expect("rows must describe at least one cell");
        let cells = rows
            .iter()
            .flat_map(|row| row.iter().map(|&v| (v != 0) as u8))
            .collect();

        Self { grid, cells }
    }

    pub fn grid(&self) -> GridDimensions {
        self.grid
    }

    pub fn is_alive(&self, x: u32, y: u32) -> bool {
        self.cells[self.grid.index(x, y)] != 0
    }

    pub fn set(&mut self, x: u32, y: u32, alive: bool) {
        let index = self.grid.index(x, y);
        self.cells[index] = alive as u8;
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != 0).count()
    }

    /// Rows of 0/1, mainly for readable assertions.
    pub fn rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.grid.num_x as usize)
            .map(|row| row.to_vec())
            .collect()
    }

    /// Bytes for the R8 state texture.
    pub fn to_texels(&self) -> Vec<u8> {
        self.cells
            .iter()
            .map(|&cell| if cell != 0 { ALIVE_TEXEL } else { 0 })
            .collect()
    }

    /// Inverse of [`Generation::to_texels`]; anything above half intensity is alive.
    pub fn from_texels(grid: GridDimensions, texels: &[u8]) -> Self {
        debug_assert_eq!(texels.len(), grid.num_cells());
        Self {
            grid,
            cells: texels.iter().map(|&t| (t > 127) as u8).collect(),
        }
    }
}
