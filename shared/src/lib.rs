/*!
 * A bounded Game of Life world and the engine that steps it.
 *
 * A live cell dies if it has fewer than two live neighbors.
 * A live cell with two or three live neighbors lives on to the next generation.
 * A live cell with more than three live neighbors dies.
 * A dead cell will be brought back to live if it has exactly three live neighbors.
 *
 * The world is a square that does not wrap: cells past the edge do not exist.
 */

pub mod engine;
pub mod error;
pub mod grid;
pub mod pattern;
pub mod rule;

pub use engine::Engine;
pub use error::{Error, Result};
pub use grid::{Cells, Grid, DEFAULT_WORLD_SIZE, MAX_WORLD_SIZE};
pub use pattern::Pattern;
pub use rule::{conway, LifeLike, Rule};
