//! Dynamic hex grid around the hull.
//!
//! Cell lifecycle:
//! ```text
//!   Empty --reserve--> Reserved --occupy--> Occupied
//!     ^                   |                    |
//!     +------release------+                    |
//!     +-------------------vacate---------------+
//! ```
//! `occupy` is accepted from any state. After every occupation the grid grows
//! so that each neighbor of each occupied cell is tracked; there is always a free
//! ring beyond the occupied frontier.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::common::error::{ShipError, ShipResult};

use super::math::{self, AxialCoord};

/// Smallest hex size `resize` will shrink to.
pub const MIN_HEX_SIZE: f32 = 0.01;

// Distances closer than this count as a tie (unit-size squared distance).
const TIE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Empty,
    Reserved,
    Occupied,
}

#[derive(Component, Debug, Clone)]
pub struct HexGrid {
    hex_size: f32,
    cells: HashMap<AxialCoord, CellState>,
    // Enumeration order (insertion order); makes nearest-cell ties deterministic.
    order: Vec<AxialCoord>,
}

impl HexGrid {
    /// New grid with the center occupied by the hull core and ring 1 tracked.
    pub fn new(hex_size: f32) -> ShipResult<Self> {
        if !hex_size.is_finite() || hex_size <= 0.0 {
            return Err(ShipError::InvalidHexSize { value: hex_size });
        }

        let mut grid = Self {
            hex_size,
            cells: HashMap::default(),
            order: Vec::new(),
        };
        grid.occupy(AxialCoord::ORIGIN);
        Ok(grid)
    }

    #[inline]
    pub fn hex_size(&self) -> f32 {
        self.hex_size
    }

    pub fn state(&self, coord: AxialCoord) -> Option<CellState> {
        self.cells.get(&coord).copied()
    }

    #[inline]
    pub fn is_tracked(&self, coord: AxialCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Occupied or Reserved: unavailable to new claims.
    pub fn is_occupied(&self, coord: AxialCoord) -> bool {
        matches!(
            self.state(coord),
            Some(CellState::Occupied | CellState::Reserved)
        )
    }

    /// Claim an Empty cell. Returns false for Reserved, Occupied or untracked cells.
    pub fn reserve(&mut self, coord: AxialCoord) -> bool {
        match self.cells.get_mut(&coord) {
            Some(state @ CellState::Empty) => {
                *state = CellState::Reserved;
                true
            }
            _ => false,
        }
    }

    /// Mark a cell Occupied regardless of its prior state, then grow the frontier.
    pub fn occupy(&mut self, coord: AxialCoord) {
        self.set(coord, CellState::Occupied);
        self.expand();
    }

    /// Drop a reservation that will never be fulfilled.
    pub fn release(&mut self, coord: AxialCoord) -> bool {
        match self.cells.get_mut(&coord) {
            Some(state @ CellState::Reserved) => {
                *state = CellState::Empty;
                true
            }
            _ => false,
        }
    }

    /// Free an occupied cell whose attachment was destroyed. The center never frees.
    pub fn vacate(&mut self, coord: AxialCoord) -> bool {
        if coord == AxialCoord::ORIGIN {
            return false;
        }
        match self.cells.get_mut(&coord) {
            Some(state @ CellState::Occupied) => {
                *state = CellState::Empty;
                true
            }
            _ => false,
        }
    }

    /// Empty cell closest (in world space) to `from`.
    ///
    /// Ties go to the first cell in enumeration order. Falls back to the origin
    /// if no empty cell exists, which auto-expansion prevents in practice.
    pub fn find_nearest_unoccupied(&self, from: AxialCoord) -> AxialCoord {
        let anchor = math::to_world(from, 1.0);
        let mut best: Option<(AxialCoord, f32)> = None;

        for &coord in &self.order {
            if self.cells[&coord] != CellState::Empty {
                continue;
            }
            let d = math::to_world(coord, 1.0).distance_squared(anchor);
            if best.is_none_or(|(_, bd)| d + TIE_EPSILON < bd) {
                best = Some((coord, d));
            }
        }

        best.map_or(AxialCoord::ORIGIN, |(coord, _)| coord)
    }

    #[inline]
    pub fn nearest_unoccupied_to_center(&self) -> AxialCoord {
        self.find_nearest_unoccupied(AxialCoord::ORIGIN)
    }

    pub fn is_ring_fully_occupied(&self, radius: u32) -> bool {
        math::ring(radius)
            .into_iter()
            .all(|c| self.state(c) == Some(CellState::Occupied))
    }

    /// Grow (or shrink, with a negative delta) the cell size. Topology is unchanged;
    /// callers re-derive attachment positions afterwards.
    pub fn resize(&mut self, delta: f32) {
        self.hex_size = (self.hex_size + delta).max(MIN_HEX_SIZE);
    }

    /// Cell center relative to the hull at the current size.
    #[inline]
    pub fn world_offset(&self, coord: AxialCoord) -> Vec2 {
        math::to_world(coord, self.hex_size)
    }

    #[inline]
    pub fn to_axial(&self, world: Vec2, origin: Vec2) -> AxialCoord {
        math::to_axial(world, origin, self.hex_size)
    }

    /// Tracked cells in enumeration order.
    pub fn cells(&self) -> impl Iterator<Item = (AxialCoord, CellState)> + '_ {
        self.order.iter().map(|c| (*c, self.cells[c]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells
            .values()
            .filter(|s| **s == CellState::Occupied)
            .count()
    }

    fn set(&mut self, coord: AxialCoord, state: CellState) {
        if self.cells.insert(coord, state).is_none() {
            self.order.push(coord);
        }
    }

    /// Track every unknown neighbor of every occupied cell as Empty.
    fn expand(&mut self) {
        let frontier: Vec<AxialCoord> = self
            .order
            .iter()
            .filter(|c| self.cells[*c] == CellState::Occupied)
            .flat_map(|c| math::neighbors(*c))
            .filter(|n| !self.cells.contains_key(n))
            .collect();

        for coord in frontier {
            if !self.cells.contains_key(&coord) {
                self.set(coord, CellState::Empty);
            }
        }
    }
}
