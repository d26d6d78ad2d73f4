use log::{debug, trace};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::rule::Rule;

/// Bytes of the write buffer (8 cells each) handed to one rayon task.
const PARALLEL_CHUNK_BYTES: usize = 64;

/// Steps a world one generation at a time using two preallocated grids.
///
/// `buffers[current]` holds the latest generation. A step writes the next
/// generation into the other buffer, reading only the current one, and then
/// flips `current`. No grid is allocated after construction.
#[derive(Debug)]
pub struct Engine {
    buffers: [Grid; 2],
    current: usize,
    generation: u64,
}

impl Engine {
    /// A new engine for a `world_size` x `world_size` world, starting from
    /// `initial` or from an empty grid.
    pub fn new(world_size: usize, initial: Option<Grid>) -> Result<Self> {
        let current = match initial {
            Some(grid) if grid.size() != world_size => {
                return Err(Error::SizeMismatch {
                    expected: world_size,
                    actual: grid.size(),
                })
            }
            Some(grid) => grid,
            None => Grid::new(world_size)?,
        };
        let scratch = Grid::new(world_size)?;
        debug!(
            "engine created: {world_size}x{world_size}, {} live cells",
            current.population()
        );
        Ok(Self {
            buffers: [current, scratch],
            current: 0,
            generation: 0,
        })
    }

    /// A new engine seeded from packed snapshot bytes.
    pub fn from_snapshot(world_size: usize, bytes: &[u8]) -> Result<Self> {
        let grid = Grid::from_snapshot(world_size, bytes)?;
        Self::new(world_size, Some(grid))
    }

    pub fn world_size(&self) -> usize {
        self.buffers[0].size()
    }

    /// Number of completed steps since construction or the last reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The latest generation.
    pub fn current(&self) -> &Grid {
        &self.buffers[self.current]
    }

    /// The latest generation, for edits between steps.
    pub fn current_mut(&mut self) -> &mut Grid {
        &mut self.buffers[self.current]
    }

    /// Replaces the current generation with a copy of `grid` and restarts
    /// the generation count.
    pub fn reset(&mut self, grid: &Grid) -> Result<()> {
        if grid.size() != self.world_size() {
            return Err(Error::SizeMismatch {
                expected: self.world_size(),
                actual: grid.size(),
            });
        }
        self.current_mut()
            .bytes_mut()
            .copy_from_slice(grid.as_bytes());
        self.generation = 0;
        debug!("engine reset: {} live cells", grid.population());
        Ok(())
    }

    /// Advances one generation.
    pub fn step<R: Rule + ?Sized>(&mut self, rule: &R) {
        let (current, next) = self.split();
        for (index, byte) in next.bytes_mut().iter_mut().enumerate() {
            *byte = next_byte(current, rule, index);
        }
        self.swap();
    }

    /// Advances one generation, spreading the cells over the rayon pool.
    ///
    /// Each task owns a disjoint byte range of the write buffer. The swap
    /// happens once every task has finished.
    pub fn step_parallel<R: Rule + Sync + ?Sized>(&mut self, rule: &R) {
        let (current, next) = self.split();
        next.bytes_mut()
            .par_chunks_mut(PARALLEL_CHUNK_BYTES)
            .enumerate()
            .for_each(|(chunk, bytes)| {
                let first = chunk * PARALLEL_CHUNK_BYTES;
                for (offset, byte) in bytes.iter_mut().enumerate() {
                    *byte = next_byte(current, rule, first + offset);
                }
            });
        self.swap();
    }

    /// Advances `generations` generations.
    pub fn advance<R: Rule + ?Sized>(&mut self, rule: &R, generations: u64) {
        for _ in 0..generations {
            self.step(rule);
        }
    }

    /// The current grid to read from and the other one to write into.
    fn split(&mut self) -> (&Grid, &mut Grid) {
        let [first, second] = &mut self.buffers;
        if self.current == 0 {
            (&*first, second)
        } else {
            (&*second, first)
        }
    }

    fn swap(&mut self) {
        self.current ^= 1;
        self.generation += 1;
        trace!(
            "generation {}: {} live cells",
            self.generation,
            self.current().population()
        );
    }
}

/// Next states of the 8 cells packed in byte `byte_index`. Padding bits past
/// the last cell stay zero.
fn next_byte<R: Rule + ?Sized>(current: &Grid, rule: &R, byte_index: usize) -> u8 {
    let size = current.size();
    let start = byte_index * 8;
    let end = (start + 8).min(size * size);

    let mut byte = 0;
    for i in start..end {
        let (x, y) = (i / size, i % size);
        if rule.next_state(current.live_neighbors(x, y), current.alive(x, y)) {
            byte |= 1 << (i - start);
        }
    }
    byte
}
