//! Return commit: recycle bullets back into the pool.
//!
//! This system owns the Inactive invariants: hidden, parked, velocity zero,
//! colliding with nothing.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{BulletEntity, BulletState, PooledBullet};
use super::pool::{BulletPool, PARK_POSITION, inactive_bullet_layers};

pub fn return_to_pool_commit(
    mut pool: ResMut<BulletPool>,
    mut q: Query<
        (
            Entity,
            &mut BulletState,
            &mut Visibility,
            &mut Transform,
            &mut LinearVelocity,
            &mut CollisionLayers,
        ),
        With<PooledBullet>,
    >,
) {
    for (e, mut state, mut vis, mut tf, mut vel, mut layers) in &mut q {
        if *state != BulletState::PendingReturn {
            continue;
        }

        *state = BulletState::Inactive;
        *vis = Visibility::Hidden;
        tf.translation = PARK_POSITION;
        vel.0 = Vec2::ZERO;
        *layers = inactive_bullet_layers();

        pool.push_free(BulletEntity(e));
    }
}

/// Leaving play: everything in flight goes back to the pool at once.
pub fn recall_all_bullets(mut q: Query<&mut BulletState, With<PooledBullet>>) {
    for mut state in &mut q {
        if *state == BulletState::Active {
            *state = BulletState::PendingReturn;
        }
    }
}
