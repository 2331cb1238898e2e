//! Pre-spawned bullet pool.
//!
//! Pooled bullets are never despawned. Inactive ones stay in the world hidden,
//! parked off-field, motionless, with empty collision filters; activating one only
//! rewrites component values, so firing never moves entities between archetypes.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::tunables::Tunables;

use super::components::{Bullet, BulletEntity, BulletMotion, BulletState, Faction, PooledBullet};

/// Where inactive bullets wait.
pub const PARK_POSITION: Vec3 = Vec3::new(0.0, -100_000.0, -10.0);

#[derive(Resource, Debug)]
pub struct BulletPool {
    free: Vec<BulletEntity>,
    capacity: usize,
}

impl BulletPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn pop_free(&mut self) -> Option<BulletEntity> {
        self.free.pop()
    }

    #[inline]
    pub fn push_free(&mut self, bullet: BulletEntity) {
        self.free.push(bullet);
    }

    #[inline]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[inline]
pub fn active_layers(faction: Faction) -> CollisionLayers {
    match faction {
        Faction::Player => CollisionLayers::new(Layer::PlayerBullet, [Layer::Enemy, Layer::Obstacle]),
        Faction::Enemy => CollisionLayers::new(Layer::EnemyBullet, [Layer::Player, Layer::Obstacle]),
    }
}

/// Collides with nothing.
#[inline]
pub fn inactive_bullet_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PlayerBullet, [] as [Layer; 0])
}

pub fn bullet_color(faction: Faction) -> Color {
    match faction {
        Faction::Player => Color::srgb(1.0, 0.85, 0.3),
        Faction::Enemy => Color::srgb(1.0, 0.35, 0.55),
    }
}

/// Pre-spawn `capacity` inactive bullets.
pub fn init_bullet_pool(
    mut commands: Commands,
    mut pool: ResMut<BulletPool>,
    tunables: Res<Tunables>,
) {
    pool.free.clear();
    let cap = pool.capacity;
    pool.free.reserve(cap);

    let radius = tunables.bullets.radius;
    let lifetime = tunables.bullets.lifetime;

    for _ in 0..cap {
        let e = commands
            .spawn((
                Name::new("Bullet(Pooled)"),
                PooledBullet,
                BulletState::Inactive,
                Bullet::new(0.0, Faction::Player, lifetime),
                BulletMotion::Straight,
                Sprite {
                    color: bullet_color(Faction::Player),
                    custom_size: Some(Vec2::splat(radius * 2.0)),
                    ..default()
                },
                Transform::from_translation(PARK_POSITION),
                Visibility::Hidden,
                RigidBody::Dynamic,
                Collider::circle(radius),
                Sensor,
                inactive_bullet_layers(),
                LinearVelocity(Vec2::ZERO),
                CollisionEventsEnabled,
            ))
            .id();

        pool.free.push(BulletEntity(e));
    }

    debug!("bullet pool filled with {cap} entities");
}
