//! Bullet patterns.
//!
//! A pattern turns one trigger pull into a list of [`Shot`]s relative to the
//! shooter: a direction, an offset from the muzzle, a delay and a motion kind.
//! Angles in pattern parameters are degrees, measured from the shooter's facing.
//!
//! ```text
//!   Spread{5, 60}     \ \ | / /        Circular{8}    \ | /
//!                                                     -  o  -
//!   Burst{3, 0.1}     |  |  |  (t=0, 0.1, 0.2)         / | \
//! ```
//!
//! `Rocket` and `Missile` shots carry a blast radius; everything else is a plain
//! bullet.

use bevy::prelude::*;
use rand::Rng;

use super::components::BulletMotion;

/// Stagger between shots of a `Wave` volley, seconds.
const WAVE_VOLLEY_GAP: f32 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BulletPattern {
    Single,
    /// `count` shots fanned evenly across `angle` degrees.
    Spread { count: u32, angle: f32 },
    Circular { count: u32 },
    /// A circle that turns `rotation_speed` degrees per second of firing.
    Spiral { count: u32, rotation_speed: f32 },
    /// `count` shots straight ahead, `interval` seconds apart.
    Burst { count: u32, interval: f32 },
    /// Rings of `per_ring` shots, each ring `spacing` further from the muzzle.
    Concentric { rings: u32, per_ring: u32, spacing: f32 },
    RandomSpray { count: u32, angle: f32 },
    RandomDirection { angle: f32 },
    Wave {
        count: u32,
        frequency: f32,
        amplitude: f32,
    },
    Homing { turn_rate: f32 },
    /// One straight shot that explodes on impact.
    Rocket { blast_radius: f32 },
    /// A homing shot that explodes on impact.
    Missile { turn_rate: f32, blast_radius: f32 },
}

/// How a shot moves once launched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotKind {
    Straight,
    Wave { frequency: f32, amplitude: f32 },
    Homing { turn_rate: f32 },
}

impl ShotKind {
    pub fn into_motion(self, launch: Vec2) -> BulletMotion {
        match self {
            Self::Straight => BulletMotion::Straight,
            Self::Wave {
                frequency,
                amplitude,
            } => BulletMotion::Wave {
                launch,
                frequency,
                amplitude,
                elapsed: 0.0,
            },
            Self::Homing { turn_rate } => BulletMotion::Homing { turn_rate },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    /// Unit direction in world space.
    pub direction: Vec2,
    /// Spawn point relative to the muzzle.
    pub offset: Vec2,
    /// Seconds after the trigger pull.
    pub delay: f32,
    pub kind: ShotKind,
    /// Zero unless the shot explodes.
    pub blast_radius: f32,
}

impl Shot {
    fn straight(direction: Vec2) -> Self {
        Self {
            direction,
            offset: Vec2::ZERO,
            delay: 0.0,
            kind: ShotKind::Straight,
            blast_radius: 0.0,
        }
    }
}

#[inline]
pub fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// Degrees covered by the i-th of `count` evenly spaced shots across `angle`.
fn fan_angle(i: u32, count: u32, angle: f32) -> f32 {
    if count <= 1 {
        return 0.0;
    }
    -angle * 0.5 + angle * i as f32 / (count - 1) as f32
}

impl BulletPattern {
    /// Shots for one trigger pull.
    ///
    /// `spiral_angle` is the running rotation carried by the shooter; only
    /// `Spiral` reads and advances it, by `rotation_speed * period`.
    pub fn fire(
        &self,
        facing: Vec2,
        period: f32,
        spiral_angle: &mut f32,
        rng: &mut impl Rng,
    ) -> Vec<Shot> {
        let facing = facing.normalize_or(Vec2::Y);

        match *self {
            Self::Single => vec![Shot::straight(facing)],
            Self::Spread { count, angle } => (0..count.max(1))
                .map(|i| Shot::straight(rotate_degrees(facing, fan_angle(i, count, angle))))
                .collect(),
            Self::Circular { count } => {
                let step = 360.0 / count.max(1) as f32;
                (0..count.max(1))
                    .map(|i| Shot::straight(rotate_degrees(facing, step * i as f32)))
                    .collect()
            }
            Self::Spiral {
                count,
                rotation_speed,
            } => {
                let step = 360.0 / count.max(1) as f32;
                let base = *spiral_angle;
                *spiral_angle = (base + rotation_speed * period).rem_euclid(360.0);
                (0..count.max(1))
                    .map(|i| Shot::straight(rotate_degrees(facing, base + step * i as f32)))
                    .collect()
            }
            Self::Burst { count, interval } => (0..count.max(1))
                .map(|i| Shot {
                    delay: interval.max(0.0) * i as f32,
                    ..Shot::straight(facing)
                })
                .collect(),
            Self::Concentric {
                rings,
                per_ring,
                spacing,
            } => {
                let step = 360.0 / per_ring.max(1) as f32;
                (0..rings.max(1))
                    .flat_map(|ring| {
                        (0..per_ring.max(1)).map(move |i| {
                            let dir = rotate_degrees(facing, step * i as f32);
                            Shot {
                                offset: dir * spacing * ring as f32,
                                ..Shot::straight(dir)
                            }
                        })
                    })
                    .collect()
            }
            Self::RandomSpray { count, angle } => {
                let half = angle.abs() * 0.5;
                (0..count.max(1))
                    .map(|_| Shot::straight(rotate_degrees(facing, rng.random_range(-half..=half))))
                    .collect()
            }
            Self::RandomDirection { angle } => {
                let half = angle.abs() * 0.5;
                vec![Shot::straight(rotate_degrees(
                    facing,
                    rng.random_range(-half..=half),
                ))]
            }
            Self::Wave {
                count,
                frequency,
                amplitude,
            } => (0..count.max(1))
                .map(|i| Shot {
                    delay: WAVE_VOLLEY_GAP * i as f32,
                    kind: ShotKind::Wave {
                        frequency,
                        amplitude,
                    },
                    ..Shot::straight(facing)
                })
                .collect(),
            Self::Homing { turn_rate } => vec![Shot {
                kind: ShotKind::Homing { turn_rate },
                ..Shot::straight(facing)
            }],
            Self::Rocket { blast_radius } => vec![Shot {
                blast_radius: blast_radius.max(0.0),
                ..Shot::straight(facing)
            }],
            Self::Missile {
                turn_rate,
                blast_radius,
            } => vec![Shot {
                kind: ShotKind::Homing { turn_rate },
                blast_radius: blast_radius.max(0.0),
                ..Shot::straight(facing)
            }],
        }
    }
}
