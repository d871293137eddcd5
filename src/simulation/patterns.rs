//! Classic Game of Life patterns that can replace random seeding

use super::generation::Generation;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pattern {
    Glider,
    Blinker,
    Block,
    GosperGun,
}

const GLIDER: &[(u32, u32)] = &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];

const BLINKER: &[(u32, u32)] = &[(1, 0), (1, 1), (1, 2)];

const BLOCK: &[(u32, u32)] = &[(0, 0), (1, 0), (0, 1), (1, 1)];

const GOSPER_GUN: &[(u32, u32)] = &[
    (24, 0),
    (22, 1),
    (24, 1),
    (12, 2),
    (13, 2),
    (20, 2),
    (21, 2),
    (34, 2),
    (35, 2),
    (11, 3),
    (15, 3),
    (20, 3),
    (21, 3),
    (34, 3),
    (35, 3),
    (0, 4),
    (1, 4),
    (10, 4),
    (16, 4),
    (20, 4),
    (21, 4),
    (0, 5),
    (1, 5),
    (10, 5),
    (14, 5),
    (16, 5),
    (17, 5),
    (22, 5),
    (24, 5),
    (10, 6),
    (16, 6),
    (24, 6),
    (11, 7),
    (15, 7),
    (12, 8),
    (13, 8),
];

impl Pattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::Glider => "Glider",
            Pattern::Blinker => "Blinker",
            Pattern::Block => "Block",
            Pattern::GosperGun => "Gosper Gun",
        }
    }

    /// Live cells relative to the pattern's top-left corner.
    pub fn cells(&self) -> &'static [(u32, u32)] {
        match self {
            Pattern::Glider => GLIDER,
            Pattern::Blinker => BLINKER,
            Pattern::Block => BLOCK,
            Pattern::GosperGun => GOSPER_GUN,
        }
    }

    /// Width and height of the pattern's bounding box.
    pub fn size(&self) -> (u32, u32) {
        self.cells()
            .iter()
            .fold((0, 0), |(w, h), &(x, y)| (w.max(x + 1), h.max(y + 1)))
    }

    /// Sets the pattern's cells alive with its corner at `(x, y)`.
    /// Cells falling outside the grid are dropped.
    pub fn stamp(&self, generation: &mut Generation, x: u32, y: u32) {
        let grid = generation.grid();
        for &(dx, dy) in self.cells() {
            let (cx, cy) = (x + dx, y + dy);
            if cx < grid.num_x && cy < grid.num_y {
                generation.set(cx, cy, true);
            }
        }
    }

    pub fn stamp_centered(&self, generation: &mut Generation) {
        let grid = generation.grid();
        let (w, h) = self.size();
        let x = grid.num_x.saturating_sub(w) / 2;
        let y = grid.num_y.saturating_sub(h) / 2;
        self.stamp(generation, x, y);
    }
}
