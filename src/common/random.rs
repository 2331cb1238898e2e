//! Small sampling helpers over `rand`.

use rand::Rng;

/// Uniform sample from a `[a, b]` pair given in either order.
pub fn between(range: [f32; 2], rng: &mut impl Rng) -> f32 {
    let lo = range[0].min(range[1]);
    let hi = range[0].max(range[1]);
    rng.random_range(lo..=hi)
}

/// True with probability `chance`, clamped into `[0, 1]`.
pub fn roll(chance: f32, rng: &mut impl Rng) -> bool {
    rng.random_bool(f64::from(chance.clamp(0.0, 1.0)))
}
