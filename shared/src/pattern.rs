//! A few well-known patterns to seed a world with.

use crate::error::Result;
use crate::grid::Grid;

/// Live cells of a pattern, as `(x, y)` offsets from its top-left corner
/// with `y` growing downwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(i32, i32)],
}

pub const BLOCK: Pattern = Pattern {
    name: "Block",
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
};

pub const BEEHIVE: Pattern = Pattern {
    name: "Beehive",
    cells: &[(1, 0), (2, 0), (0, 1), (3, 1), (1, 2), (2, 2)],
};

pub const BLINKER: Pattern = Pattern {
    name: "Blinker",
    cells: &[(0, 0), (1, 0), (2, 0)],
};

pub const TOAD: Pattern = Pattern {
    name: "Toad",
    cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
};

pub const BEACON: Pattern = Pattern {
    name: "Beacon",
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
};

/// Moves one cell right and one down every 4 generations.
pub const GLIDER: Pattern = Pattern {
    name: "Glider",
    cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
};

/// Lightweight spaceship, moving left.
#[rustfmt::skip]
pub const LWSS: Pattern = Pattern {
    name: "LWSS",
    cells: &[
        (1, 0), (4, 0),
        (0, 1),
        (0, 2), (4, 2),
        (0, 3), (1, 3), (2, 3), (3, 3),
    ],
};

pub const R_PENTOMINO: Pattern = Pattern {
    name: "R-pentomino",
    cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
};

pub const PATTERNS: &[Pattern] = &[
    BLOCK,
    BEEHIVE,
    BLINKER,
    TOAD,
    BEACON,
    GLIDER,
    LWSS,
    R_PENTOMINO,
];

/// Looks a pattern up by name, ignoring case.
pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS
        .iter()
        .find(|pattern| pattern.name.eq_ignore_ascii_case(name))
}

impl Pattern {
    /// Width and height of the pattern's bounding box.
    pub fn extent(&self) -> (i32, i32) {
        self.cells
            .iter()
            .fold((0, 0), |(w, h), &(x, y)| (w.max(x + 1), h.max(y + 1)))
    }

    /// Sets the pattern's cells alive with its top-left corner at `(x, y)`.
    /// Nothing is written unless every cell fits on the grid.
    pub fn stamp(&self, grid: &mut Grid, x: i32, y: i32) -> Result<()> {
        let at = |&(dx, dy): &(i32, i32)| (x.saturating_add(dx), y.saturating_add(dy));
        for (cx, cy) in self.cells.iter().map(at) {
            grid.get(cx, cy)?;
        }
        for (cx, cy) in self.cells.iter().map(at) {
            grid.set(cx, cy, true)?;
        }
        Ok(())
    }

    /// Stamps the pattern as close to the middle of the grid as it fits.
    pub fn stamp_centered(&self, grid: &mut Grid) -> Result<()> {
        let (w, h) = self.extent();
        let size = grid.size() as i32;
        self.stamp(grid, (size - w) / 2, (size - h) / 2)
    }
}
