//! Bullet hit resolution.
//!
//! Reads avian `CollisionStart` messages and applies gameplay:
//! - player bullets damage enemies;
//! - enemy bullets damage the hull core, or a docked part unless that part is
//!   immune, in which case the bullet is absorbed with no damage;
//! - obstacles soak up bullets of either side.
//!
//! An explosive bullet deals no direct damage. It writes a [`Blast`] at its own
//! position instead, and [`super::blast::resolve_blasts`] spreads the damage.
//!
//! Every hit returns the bullet to the pool. Each bullet resolves at most one hit
//! per tick.

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::plugins::enemies::Enemy;
use crate::plugins::hull::registry::AttachmentRegistry;
use crate::plugins::hull::{Hull, HullPart};
use crate::plugins::obstacles::Obstacle;

use super::components::{Bullet, BulletState, Faction, Health, PooledBullet};
use super::messages::Blast;

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn targets(ev: &CollisionStart) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget {
            collider: ev.collider1,
            body: ev.body1,
        },
        CollisionTarget {
            collider: ev.collider2,
            body: ev.body2,
        },
    )
}

/// What a bullet struck.
#[derive(Clone, Copy)]
enum Hit {
    Enemy(Entity),
    Core(Entity),
    Part { part: Entity, hull: Entity },
}

impl Hit {
    #[inline]
    fn entity(self) -> Entity {
        match self {
            Self::Enemy(e) | Self::Core(e) => e,
            Self::Part { part, .. } => part,
        }
    }
}

pub fn process_bullet_collisions(
    mut started: MessageReader<CollisionStart>,
    q_is_bullet: Query<(), With<PooledBullet>>,
    mut q_bullets: Query<(&Bullet, &mut BulletState, Option<&Transform>), With<PooledBullet>>,
    q_enemies: Query<(), With<Enemy>>,
    q_cores: Query<(), With<Hull>>,
    q_parts: Query<&HullPart>,
    q_obstacles: Query<(), With<Obstacle>>,
    q_registry: Query<&AttachmentRegistry>,
    mut q_health: Query<&mut Health>,
    mut blasts: MessageWriter<Blast>,
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();

    for ev in started.read() {
        let (t1, t2) = targets(ev);

        let b1 = q_is_bullet.contains(t1.collider);
        let b2 = q_is_bullet.contains(t2.collider);
        if !(b1 ^ b2) {
            continue; // must be exactly one bullet
        }
        let (bullet_side, other_side) = if b1 { (t1, t2) } else { (t2, t1) };

        if seen.contains(&bullet_side.collider) {
            continue;
        }

        let Ok((bullet, mut state, tf)) = q_bullets.get_mut(bullet_side.collider) else {
            continue;
        };
        if *state != BulletState::Active {
            continue;
        }

        // Hostile the bullet struck; `None` for an obstacle.
        let struck = if q_obstacles.contains(other_side.collider) {
            None
        } else {
            match bullet.faction {
                Faction::Player => {
                    let enemy = other_side.gameplay_owner();
                    if !q_enemies.contains(enemy) {
                        continue;
                    }
                    Some(Hit::Enemy(enemy))
                }
                // Parts share the hull's rigid body, so check the collider first.
                Faction::Enemy => {
                    if let Ok(part) = q_parts.get(other_side.collider) {
                        Some(Hit::Part {
                            part: other_side.collider,
                            hull: part.hull,
                        })
                    } else if q_cores.contains(other_side.collider) {
                        Some(Hit::Core(other_side.collider))
                    } else {
                        continue;
                    }
                }
            }
        };

        if bullet.is_explosive() {
            let Some(tf) = tf else {
                error!("explosive bullet {} has no transform", bullet_side.collider);
                continue;
            };
            blasts.write(Blast {
                faction: bullet.faction,
                origin: tf.translation.truncate(),
                radius: bullet.blast_radius,
                damage: bullet.damage,
                struck: struck.map(Hit::entity),
            });
        } else if let Some(hit) = struck {
            let shielded = match hit {
                Hit::Part { part, hull } => q_registry
                    .get(hull)
                    .is_ok_and(|registry| registry.is_immune(part)),
                Hit::Core(_) | Hit::Enemy(_) => false,
            };
            if !shielded {
                if let Ok(mut hp) = q_health.get_mut(hit.entity()) {
                    hp.damage(bullet.damage);
                }
            }
        }

        seen.insert(bullet_side.collider);
        *state = BulletState::PendingReturn;
    }
}
