//! Hex grid core: axial math and the dynamic cell grid the hull docks debris into.

pub mod grid;
pub mod math;

pub use grid::{CellState, HexGrid};
pub use math::AxialCoord;
