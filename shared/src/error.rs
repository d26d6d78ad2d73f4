//! Errors raised by grid and engine construction and cell access.

use thiserror::Error;

/// All kinds of errors in this crate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The world side is zero or above the supported maximum.
    #[error("invalid world size {size}: must be between 1 and {max}")]
    InvalidSize { size: usize, max: usize },
    /// A coordinate lies outside `[0, size)`.
    #[error("cell ({x}, {y}) is outside a {size}x{size} grid")]
    OutOfBounds { x: i32, y: i32, size: usize },
    /// A snapshot holds fewer bytes than the grid needs.
    #[error("snapshot for a {size}x{size} grid needs {expected} bytes, got {actual}")]
    SnapshotSize {
        size: usize,
        expected: usize,
        actual: usize,
    },
    /// An initial grid does not match the engine's world size.
    #[error("initial grid is {actual}x{actual} but the world is {expected}x{expected}")]
    SizeMismatch { expected: usize, actual: usize },
    /// A rule string is not valid B/S notation.
    #[error("invalid rule {0:?}: expected B/S notation such as \"B3/S23\"")]
    InvalidRule(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
