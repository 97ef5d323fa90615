// Library exports for percolation
pub mod error;
pub mod percolation;
pub mod simulation;
pub mod union_find;

pub use error::PercolationError;
pub use percolation::{CellState, Percolation, Snapshot};
pub use union_find::UnionFind;
