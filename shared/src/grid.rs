use std::fmt;
use std::iter::FusedIterator;

use rand::Rng;

use crate::error::{Error, Result};

/// Largest supported world side. Bounds memory and per-step work.
pub const MAX_WORLD_SIZE: usize = 1024;

pub const DEFAULT_WORLD_SIZE: usize = 40;

/// Moore neighborhood offsets, row by row, without the center.
#[rustfmt::skip]
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Dense square grid, one bit per cell.
///
/// Cell `(x, y)` lives at bit `x * size + y`, least-significant bit first
/// within each byte. This is also the snapshot layout, so a snapshot is the
/// storage itself. Padding bits past `size * size` are kept at zero.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    cells: Vec<u8>,
}

/// Number of bytes holding `size * size` packed cells.
#[inline]
pub fn snapshot_len(size: usize) -> usize {
    (size * size).div_ceil(8)
}

fn check_size(size: usize) -> Result<()> {
    if size == 0 || size > MAX_WORLD_SIZE {
        return Err(Error::InvalidSize {
            size,
            max: MAX_WORLD_SIZE,
        });
    }
    Ok(())
}

impl Grid {
    /// A `size` x `size` grid with every cell dead.
    pub fn new(size: usize) -> Result<Self> {
        check_size(size)?;
        Ok(Self {
            size,
            cells: vec![0; snapshot_len(size)],
        })
    }

    /// Unpacks a grid from the first `snapshot_len(size)` bytes of `bytes`.
    ///
    /// Trailing bytes and padding bits in the last used byte are ignored.
    pub fn from_snapshot(size: usize, bytes: &[u8]) -> Result<Self> {
        check_size(size)?;
        let expected = snapshot_len(size);
        if bytes.len() < expected {
            return Err(Error::SnapshotSize {
                size,
                expected,
                actual: bytes.len(),
            });
        }

        let mut cells = bytes[..expected].to_vec();
        let tail = (size * size) % 8;
        if tail != 0 {
            if let Some(last) = cells.last_mut() {
                *last &= (1u8 << tail) - 1;
            }
        }
        Ok(Self { size, cells })
    }

    /// Packs the grid into `snapshot_len(size)` bytes.
    pub fn to_snapshot(&self) -> Vec<u8> {
        self.cells.clone()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, x: i32, y: i32) -> Result<bool> {
        let i = self.index(x, y)?;
        Ok(self.bit(i))
    }

    pub fn set(&mut self, x: i32, y: i32, value: bool) -> Result<()> {
        let i = self.index(x, y)?;
        self.put(i, value);
        Ok(())
    }

    /// Flips a cell and returns its new state.
    pub fn toggle(&mut self, x: i32, y: i32) -> Result<bool> {
        let i = self.index(x, y)?;
        let value = !self.bit(i);
        self.put(i, value);
        Ok(value)
    }

    /// Every cell in row-major order: `x` outer, `y` inner.
    pub fn iter(&self) -> Cells<'_> {
        Cells {
            grid: self,
            index: 0,
        }
    }

    /// In-bounds Moore neighbors of `(x, y)`. The grid does not wrap, so
    /// corners have 3 neighbors, edges 5 and interior cells 8.
    pub fn neighbors(&self, x: i32, y: i32) -> Result<impl Iterator<Item = (i32, i32)>> {
        self.index(x, y)?;
        Ok(self
            .neighbor_coords(x as usize, y as usize)
            .map(|(nx, ny)| (nx as i32, ny as i32)))
    }

    /// Number of live cells among [`Grid::neighbors`], in `0..=8`.
    pub fn count_live_neighbors(&self, x: i32, y: i32) -> Result<u8> {
        self.index(x, y)?;
        Ok(self.live_neighbors(x as usize, y as usize))
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().map(|byte| byte.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&byte| byte == 0)
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Makes each cell alive with probability `density`, clamped to `[0, 1]`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R, density: f64) {
        let p = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };
        for i in 0..self.size * self.size {
            self.put(i, rng.random_bool(p));
        }
    }

    #[inline]
    pub(crate) fn alive(&self, x: usize, y: usize) -> bool {
        self.bit(x * self.size + y)
    }

    pub(crate) fn live_neighbors(&self, x: usize, y: usize) -> u8 {
        self.neighbor_coords(x, y)
            .filter(|&(nx, ny)| self.alive(nx, ny))
            .count() as u8
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Raw storage for writers that fill whole bytes. Callers keep the
    /// padding bits zero.
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    fn neighbor_coords(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
        let max_index = self.size - 1;
        NEIGHBOR_OFFSETS.into_iter().filter_map(move |(dx, dy)| {
            let nx = x.checked_add_signed(dx)?;
            let ny = y.checked_add_signed(dy)?;
            (nx <= max_index && ny <= max_index).then_some((nx, ny))
        })
    }

    fn index(&self, x: i32, y: i32) -> Result<usize> {
        let in_range = |v: i32| usize::try_from(v).is_ok_and(|v| v < self.size);
        if in_range(x) && in_range(y) {
            Ok(x as usize * self.size + y as usize)
        } else {
            Err(Error::OutOfBounds {
                x,
                y,
                size: self.size,
            })
        }
    }

    #[inline]
    fn bit(&self, i: usize) -> bool {
        (self.cells[i / 8] >> (i % 8)) & 1 == 1
    }

    #[inline]
    fn put(&mut self, i: usize, value: bool) {
        let mask = 1u8 << (i % 8);
        if value {
            self.cells[i / 8] |= mask;
        } else {
            self.cells[i / 8] &= !mask;
        }
    }
}

/// Plaintext picture, one line per `y`, `o` for live cells and `.` for dead.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                f.write_str(if self.alive(x, y) { "o" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("size", &self.size)
            .field("population", &self.population())
            .finish()
    }
}

/// Iterator over the cells of a [`Grid`], see [`Grid::iter`].
#[derive(Clone)]
pub struct Cells<'a> {
    grid: &'a Grid,
    index: usize,
}

impl Iterator for Cells<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.index >= self.grid.size * self.grid.size {
            return None;
        }
        let value = self.grid.bit(self.index);
        self.index += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.size * self.grid.size - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Cells<'_> {}

impl FusedIterator for Cells<'_> {}

impl<'a> IntoIterator for &'a Grid {
    type Item = bool;
    type IntoIter = Cells<'a>;

    fn into_iter(self) -> Cells<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn full(size: usize) -> Grid {
        let mut grid = Grid::new(size).unwrap();
        grid.randomize(&mut StdRng::seed_from_u64(0), 1.0);
        grid
    }

    #[test]
    fn new_grid_is_dead() {
        let grid = Grid::new(5).unwrap();
        assert_eq!(grid.size(), 5);
        assert!(grid.is_empty());
        assert_eq!(grid.iter().count(), 25);
        assert!(grid.iter().all(|cell| !cell));
    }

    #[test]
    fn rejects_bad_sizes() {
        assert_eq!(
            Grid::new(0),
            Err(Error::InvalidSize {
                size: 0,
                max: MAX_WORLD_SIZE
            })
        );
        assert!(matches!(
            Grid::new(MAX_WORLD_SIZE + 1),
            Err(Error::InvalidSize { .. })
        ));
        assert!(Grid::new(1).is_ok());
        assert!(Grid::new(MAX_WORLD_SIZE).is_ok());
    }

    #[test]
    fn set_then_get() {
        let mut grid = Grid::new(4).unwrap();
        grid.set(3, 1, true).unwrap();
        assert!(grid.get(3, 1).unwrap());
        assert!(!grid.get(1, 3).unwrap());
        assert_eq!(grid.population(), 1);
        grid.set(3, 1, false).unwrap();
        assert!(grid.is_empty());
    }

    #[test]
    fn toggle_flips() {
        let mut grid = Grid::new(2).unwrap();
        assert_eq!(grid.toggle(1, 0), Ok(true));
        assert_eq!(grid.toggle(1, 0), Ok(false));
        assert!(grid.toggle(2, 0).is_err());
        assert!(grid.is_empty());
    }

    #[test]
    fn out_of_bounds_access() {
        let mut grid = Grid::new(6).unwrap();
        for (x, y) in [(-1, 0), (6, 0), (0, -1), (0, 6), (i32::MIN, i32::MAX)] {
            assert_eq!(grid.get(x, y), Err(Error::OutOfBounds { x, y, size: 6 }));
            assert!(grid.set(x, y, true).is_err());
            assert!(grid.count_live_neighbors(x, y).is_err());
            assert!(grid.neighbors(x, y).is_err());
        }
        assert!(grid.is_empty());
    }

    #[test]
    fn neighbor_candidates_by_position() {
        let grid = Grid::new(5).unwrap();
        let count = |x, y| grid.neighbors(x, y).unwrap().count();
        for (x, y) in [(0, 0), (4, 0), (0, 4), (4, 4)] {
            assert_eq!(count(x, y), 3, "corner ({x},{y})");
        }
        for (x, y) in [(2, 0), (0, 2), (4, 2), (2, 4)] {
            assert_eq!(count(x, y), 5, "edge ({x},{y})");
        }
        for x in 1..4 {
            for y in 1..4 {
                assert_eq!(count(x, y), 8, "interior ({x},{y})");
            }
        }
    }

    #[test]
    fn neighbors_exclude_self_and_outside() {
        let grid = Grid::new(4).unwrap();
        for x in 0..4 {
            for y in 0..4 {
                for (nx, ny) in grid.neighbors(x, y).unwrap() {
                    assert_ne!((nx, ny), (x, y));
                    assert!((0..4).contains(&nx) && (0..4).contains(&ny));
                    assert!((nx - x).abs() <= 1 && (ny - y).abs() <= 1);
                }
            }
        }
    }

    #[test]
    fn full_grid_counts_every_neighbor() {
        let grid = full(3);
        assert_eq!(grid.count_live_neighbors(1, 1), Ok(8));
        assert_eq!(grid.count_live_neighbors(0, 0), Ok(3));
        assert_eq!(grid.count_live_neighbors(2, 1), Ok(5));
    }

    #[test]
    fn tiny_grids_have_fewer_neighbors() {
        assert_eq!(full(1).count_live_neighbors(0, 0), Ok(0));
        assert_eq!(full(2).count_live_neighbors(1, 1), Ok(3));
    }

    #[test]
    fn far_edge_is_not_counted_twice() {
        let mut grid = Grid::new(3).unwrap();
        grid.set(2, 2, true).unwrap();
        assert_eq!(grid.count_live_neighbors(2, 2), Ok(0));
        assert_eq!(grid.count_live_neighbors(1, 1), Ok(1));
        assert_eq!(grid.count_live_neighbors(0, 0), Ok(0));
    }

    #[test]
    fn iteration_follows_index_order() {
        let mut grid = Grid::new(3).unwrap();
        grid.set(0, 2, true).unwrap();
        grid.set(2, 0, true).unwrap();
        let cells: Vec<bool> = grid.iter().collect();
        let live: Vec<usize> = cells
            .iter()
            .enumerate()
            .filter_map(|(i, &alive)| alive.then_some(i))
            .collect();
        assert_eq!(live, vec![2, 6]);

        let again: Vec<bool> = (&grid).into_iter().collect();
        assert_eq!(cells, again);
        assert_eq!(grid.iter().len(), 9);
    }

    #[test]
    fn snapshot_round_trip() {
        let mut rng = StdRng::seed_from_u64(7);
        for size in [1, 3, 8, 13, 40] {
            let mut grid = Grid::new(size).unwrap();
            grid.randomize(&mut rng, 0.4);
            let bytes = grid.to_snapshot();
            assert_eq!(bytes.len(), snapshot_len(size));

            let restored = Grid::from_snapshot(size, &bytes).unwrap();
            for x in 0..size as i32 {
                for y in 0..size as i32 {
                    assert_eq!(restored.get(x, y), grid.get(x, y));
                }
            }
        }
    }

    #[test]
    fn snapshot_bits_are_lsb_first() {
        let grid = Grid::from_snapshot(3, &[0b0000_0011, 0b1111_1111]).unwrap();
        assert!(grid.get(0, 0).unwrap());
        assert!(grid.get(0, 1).unwrap());
        assert!(!grid.get(0, 2).unwrap());
        assert!(grid.get(2, 2).unwrap());
        // Only bit 0 of the second byte is a cell.
        assert_eq!(grid.population(), 3);
        assert_eq!(grid.to_snapshot(), vec![0b0000_0011, 0b0000_0001]);
    }

    #[test]
    fn short_snapshot_is_rejected() {
        assert_eq!(
            Grid::from_snapshot(5, &[0xff, 0xff, 0xff]),
            Err(Error::SnapshotSize {
                size: 5,
                expected: 4,
                actual: 3
            })
        );
        assert!(Grid::from_snapshot(5, &[0; 10]).is_ok());
        assert!(matches!(
            Grid::from_snapshot(0, &[]),
            Err(Error::InvalidSize { .. })
        ));
    }

    #[test]
    fn display_draws_rows_by_y() {
        let mut grid = Grid::new(3).unwrap();
        for x in 0..3 {
            grid.set(x, 1, true).unwrap();
        }
        assert_eq!(grid.to_string(), "...\nooo\n...\n");
    }

    #[test]
    fn randomize_density_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = Grid::new(9).unwrap();
        grid.randomize(&mut rng, 2.0);
        assert_eq!(grid.population(), 81);
        grid.randomize(&mut rng, f64::NAN);
        assert!(grid.is_empty());
        grid.randomize(&mut rng, 1.0);
        grid.clear();
        assert!(grid.is_empty());
    }
}
