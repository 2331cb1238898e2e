//! Spawn consumer: activate bullets from the pool.
//!
//! The pool free list contains only pooled bullet entities, so a pooled entity
//! missing bullet components is a bug, not a runtime condition.

use avian2d::prelude::*;
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use super::components::{Bullet, BulletEntity, BulletMotion, BulletState, PooledBullet};
use super::messages::SpawnBulletRequest;
use super::pool::{BulletPool, active_layers, bullet_color};

pub fn allocate_bullets_from_pool(
    mut pool: ResMut<BulletPool>,
    mut reader: MessageReader<SpawnBulletRequest>,
    mut q: Query<
        (
            &mut BulletState,
            &mut Bullet,
            &mut BulletMotion,
            &mut Transform,
            &mut LinearVelocity,
            &mut Visibility,
            &mut CollisionLayers,
            &mut Sprite,
        ),
        With<PooledBullet>,
    >,
) {
    let mut dropped = 0usize;

    for req in reader.read() {
        let Some(BulletEntity(e)) = pool.pop_free() else {
            // Capacity decision, not a correctness failure.
            dropped += 1;
            continue;
        };

        let Ok((mut state, mut bullet, mut motion, mut tf, mut vel, mut vis, mut layers, mut sprite)) =
            q.get_mut(e)
        else {
            error!("bullet pool held {e}, which has no pooled bullet components");
            continue;
        };

        *state = BulletState::Active;
        bullet.reset_for_fire(req.damage, req.faction, req.blast_radius);
        *motion = req.motion;
        tf.translation = req.pos.extend(2.0);
        vel.0 = req.vel;
        *vis = Visibility::Visible;
        *layers = active_layers(req.faction);
        sprite.color = bullet_color(req.faction);
    }

    if dropped > 0 {
        debug!("bullet pool exhausted, dropped {dropped} requests");
    }
}
