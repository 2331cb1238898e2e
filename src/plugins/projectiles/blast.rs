//! Area damage from explosive bullets.
//!
//! Every hostile whose center lies within the blast radius takes the full
//! damage once, plus whatever set the blast off. Immune hull parts shrug it off
//! the same way they absorb plain bullets.

use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::plugins::enemies::Enemy;
use crate::plugins::hull::registry::AttachmentRegistry;
use crate::plugins::hull::{Hull, HullPart};

use super::components::{Faction, Health};
use super::messages::Blast;

#[inline]
fn within(origin: Vec2, radius: f32, gt: &GlobalTransform) -> bool {
    gt.translation().truncate().distance_squared(origin) <= radius * radius
}

pub fn resolve_blasts(
    mut blasts: MessageReader<Blast>,
    q_enemies: Query<(Entity, &GlobalTransform), With<Enemy>>,
    q_cores: Query<(Entity, &GlobalTransform), With<Hull>>,
    q_parts: Query<(Entity, &GlobalTransform, &HullPart)>,
    q_is_part: Query<&HullPart>,
    q_registry: Query<&AttachmentRegistry>,
    mut q_health: Query<&mut Health>,
    mut victims: Local<HashSet<Entity>>,
) {
    for blast in blasts.read() {
        victims.clear();
        victims.extend(blast.struck);

        match blast.faction {
            Faction::Player => {
                victims.extend(
                    q_enemies
                        .iter()
                        .filter(|(_, gt)| within(blast.origin, blast.radius, gt))
                        .map(|(e, _)| e),
                );
            }
            Faction::Enemy => {
                victims.extend(
                    q_cores
                        .iter()
                        .filter(|(_, gt)| within(blast.origin, blast.radius, gt))
                        .map(|(e, _)| e),
                );
                victims.extend(
                    q_parts
                        .iter()
                        .filter(|(_, gt, _)| within(blast.origin, blast.radius, gt))
                        .map(|(e, ..)| e),
                );
            }
        }

        for &e in victims.iter() {
            let shielded = q_is_part.get(e).is_ok_and(|part| {
                q_registry
                    .get(part.hull)
                    .is_ok_and(|registry| registry.is_immune(e))
            });
            if shielded {
                continue;
            }
            if let Ok(mut hp) = q_health.get_mut(e) {
                hp.damage(blast.damage);
            }
        }

        debug!(
            "blast at {} hit {} targets",
            blast.origin,
            victims.len()
        );
    }
}
