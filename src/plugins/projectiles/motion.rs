//! Bullet steering and expiry (fixed step).

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::plugins::enemies::Enemy;
use crate::plugins::hull::Hull;
use crate::plugins::world::PlayField;

use super::components::{Bullet, BulletMotion, BulletState, Faction, PooledBullet};

/// Launch velocity plus a sideways sinusoid of the given amplitude (units/s).
pub fn wave_velocity(launch: Vec2, frequency: f32, amplitude: f32, elapsed: f32) -> Vec2 {
    let side = launch.normalize_or_zero().perp();
    launch + side * (elapsed * frequency).sin() * amplitude
}

/// Rotate `vel` toward `to_target` by at most `max_radians`, keeping its speed.
pub fn turn_toward(vel: Vec2, to_target: Vec2, max_radians: f32) -> Vec2 {
    let speed = vel.length();
    if speed <= f32::EPSILON || to_target.length_squared() <= f32::EPSILON {
        return vel;
    }
    let current = vel.to_angle();
    let wanted = to_target.to_angle();
    let mut delta = wanted - current;
    // Wrap into (-PI, PI].
    delta = (delta + std::f32::consts::PI).rem_euclid(std::f32::consts::TAU) - std::f32::consts::PI;
    let step = delta.clamp(-max_radians, max_radians);
    Vec2::from_angle(current + step) * speed
}

fn nearest(from: Vec2, targets: impl Iterator<Item = Vec2>) -> Option<Vec2> {
    targets.min_by(|a, b| {
        a.distance_squared(from)
            .total_cmp(&b.distance_squared(from))
    })
}

pub fn steer_bullets(
    time: Res<Time>,
    mut q: Query<
        (&Transform, &Bullet, &BulletState, &mut BulletMotion, &mut LinearVelocity),
        With<PooledBullet>,
    >,
    q_enemies: Query<&GlobalTransform, With<Enemy>>,
    q_hull: Query<&GlobalTransform, With<Hull>>,
) {
    let dt = time.delta_secs();

    for (tf, bullet, state, mut motion, mut vel) in &mut q {
        if *state != BulletState::Active {
            continue;
        }

        match &mut *motion {
            BulletMotion::Straight => {}
            BulletMotion::Wave {
                launch,
                frequency,
                amplitude,
                elapsed,
            } => {
                *elapsed += dt;
                vel.0 = wave_velocity(*launch, *frequency, *amplitude, *elapsed);
            }
            BulletMotion::Homing { turn_rate } => {
                let pos = tf.translation.truncate();
                let target = match bullet.faction {
                    Faction::Player => nearest(pos, q_enemies.iter().map(|g| g.translation().truncate())),
                    Faction::Enemy => nearest(pos, q_hull.iter().map(|g| g.translation().truncate())),
                };
                if let Some(target) = target {
                    vel.0 = turn_toward(vel.0, target - pos, turn_rate.to_radians() * dt);
                }
            }
        }
    }
}

/// Out of time or out of the field: hand back to the pool.
pub fn expire_bullets(
    time: Res<Time>,
    field: Res<PlayField>,
    mut q: Query<(&Transform, &mut Bullet, &mut BulletState), With<PooledBullet>>,
) {
    for (tf, mut bullet, mut state) in &mut q {
        if *state != BulletState::Active {
            continue;
        }

        bullet.lifetime.tick(time.delta());
        if bullet.lifetime.is_finished() || !field.contains_with_margin(tf.translation.truncate()) {
            *state = BulletState::PendingReturn;
        }
    }
}
