/// Errors raised by the union-find structure and the percolation grid.
///
/// Every fallible operation validates its arguments before touching any state,
/// so a returned error always means nothing was changed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PercolationError {
    /// Size is zero, or too large to address `size * size + 2` elements.
    #[error("Invalid size {0}: must be at least 1 and small enough to index")]
    InvalidSize(usize),

    /// A 1-indexed grid coordinate fell outside `[1, side]`.
    #[error("Site ({row}, {col}) is outside the {side}x{side} grid")]
    OutOfBounds { row: usize, col: usize, side: usize },

    /// A 0-indexed union-find element fell outside `[0, count)`.
    #[error("Element {index} is out of range for {count} elements")]
    IndexOutOfRange { index: usize, count: usize },
}

pub type Result<T> = std::result::Result<T, PercolationError>;
