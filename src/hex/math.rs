//! Axial hex coordinate math (flat-top layout).
//!
//! All functions here are free of ECS state and operate on plain integers and
//! `Vec2`, so the grid and the docking code can share them and tests can hit
//! them directly.

use bevy::prelude::Vec2;

const SQRT_3: f32 = 1.732_050_8;

/// Axial hex coordinate `(q, r)`. The implicit cube component is `s = -q - r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AxialCoord {
    pub q: i32,
    pub r: i32,
}

impl AxialCoord {
    pub const ORIGIN: Self = Self::new(0, 0);

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    #[inline]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    #[inline]
    pub fn offset(self, dir: Self) -> Self {
        Self::new(self.q + dir.q, self.r + dir.r)
    }

    #[inline]
    pub fn scaled(self, k: i32) -> Self {
        Self::new(self.q * k, self.r * k)
    }
}

impl std::fmt::Display for AxialCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// The six axial unit directions.
///
/// The order is fixed: neighbor enumeration and ring walking both index into it.
pub const DIRECTIONS: [AxialCoord; 6] = [
    AxialCoord::new(1, 0),
    AxialCoord::new(1, -1),
    AxialCoord::new(0, -1),
    AxialCoord::new(-1, 0),
    AxialCoord::new(-1, 1),
    AxialCoord::new(0, 1),
];

/// Center of `coord` relative to the grid origin.
pub fn to_world(coord: AxialCoord, hex_size: f32) -> Vec2 {
    let q = coord.q as f32;
    let r = coord.r as f32;
    Vec2::new(hex_size * (1.5 * q), hex_size * SQRT_3 * (r + q / 2.0))
}

/// Nearest hex to `world`, measured from `origin`.
pub fn to_axial(world: Vec2, origin: Vec2, hex_size: f32) -> AxialCoord {
    let rel = world - origin;
    let q = (2.0 / 3.0 * rel.x) / hex_size;
    let r = (-1.0 / 3.0 * rel.x + SQRT_3 / 3.0 * rel.y) / hex_size;
    round_axial(q, r)
}

/// Cube rounding: the component with the largest rounding error is rebuilt from
/// the other two so that `q + r + s == 0` always holds.
pub fn round_axial(q: f32, r: f32) -> AxialCoord {
    let s = -q - r;

    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let dq = (rq - q).abs();
    let dr = (rr - r).abs();
    let ds = (rs - s).abs();

    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }

    AxialCoord::new(rq as i32, rr as i32)
}

pub fn neighbors(coord: AxialCoord) -> [AxialCoord; 6] {
    DIRECTIONS.map(|d| coord.offset(d))
}

/// Hex (cube) distance between two cells.
pub fn hex_distance(a: AxialCoord, b: AxialCoord) -> u32 {
    let dq = (a.q - b.q).unsigned_abs();
    let dr = (a.r - b.r).unsigned_abs();
    let ds = (a.s() - b.s()).unsigned_abs();
    dq.max(dr).max(ds)
}

/// Cells at exactly `radius` steps from the origin.
///
/// Starts at `(-radius, 0)` and walks the six sides in a fixed order, yielding
/// `6 * radius` cells (or just the origin for radius 0).
pub fn ring(radius: u32) -> Vec<AxialCoord> {
    if radius == 0 {
        return vec![AxialCoord::ORIGIN];
    }

    let steps = radius as i32;
    let mut out = Vec::with_capacity(6 * radius as usize);
    let mut cell = DIRECTIONS[3].scaled(steps);

    for side in 0..6 {
        let dir = DIRECTIONS[(side + 5) % 6];
        for _ in 0..steps {
            out.push(cell);
            cell = cell.offset(dir);
        }
    }

    out
}

/// World-space distance of a cell from the origin at unit hex size.
///
/// Used for "closest to center" orderings; scale-invariant.
#[inline]
pub fn center_distance(coord: AxialCoord) -> f32 {
    to_world(coord, 1.0).length()
}
