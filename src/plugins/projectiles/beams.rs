//! Beam weapons: a continuous ray instead of bullets.
//!
//! ```text
//!   Firing (firing_secs) -> Cooling (cooldown_secs) -> Firing -> ...
//! ```
//! While firing, the beam casts a ray along its facing every fixed step and
//! damages every hostile collider on it by `damage_per_second * dt`. The ray
//! passes through everything; its drawn length stops at the nearest target.

use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::hostile_layer;
use crate::common::tunables::BeamTunables;
use crate::plugins::enemies::Enemy;
use crate::plugins::hull::registry::AttachmentRegistry;
use crate::plugins::hull::{Hull, HullPart};

use super::components::{Faction, Health};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamPhase {
    Firing,
    Cooling,
}

#[derive(Component, Debug, Clone)]
pub struct BeamEmitter {
    pub damage_per_second: f32,
    pub max_length: f32,
    pub faction: Faction,
    /// Firing direction in local space; the entity's global rotation applies.
    pub facing: Vec2,
    pub enabled: bool,
    phase: BeamPhase,
    timer: Timer,
    firing_secs: f32,
    cooldown_secs: f32,
    /// Drawn length: distance to the nearest target hit on the last cast.
    reach: f32,
}

impl BeamEmitter {
    /// Starts firing straight away.
    pub fn new(cfg: &BeamTunables, faction: Faction) -> Self {
        Self {
            damage_per_second: cfg.damage_per_second,
            max_length: cfg.max_length,
            faction,
            facing: Vec2::Y,
            enabled: true,
            phase: BeamPhase::Firing,
            timer: Timer::from_seconds(cfg.firing_secs.max(0.0), TimerMode::Once),
            firing_secs: cfg.firing_secs.max(0.0),
            cooldown_secs: cfg.cooldown_secs.max(0.0),
            reach: cfg.max_length,
        }
    }

    #[inline]
    pub fn phase(&self) -> BeamPhase {
        self.phase
    }

    #[inline]
    pub fn is_firing(&self) -> bool {
        self.enabled && self.phase == BeamPhase::Firing
    }

    #[inline]
    pub fn reach(&self) -> f32 {
        self.reach
    }

    /// Advance the firing/cooling cycle. Returns whether `delta` was spent firing.
    ///
    /// Disabling a firing beam cuts it off and starts a cooldown, which resumes
    /// once the beam is enabled again.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if !self.enabled {
            if self.phase == BeamPhase::Firing {
                self.enter(BeamPhase::Cooling);
            }
            return false;
        }

        let firing = self.phase == BeamPhase::Firing;
        if self.timer.tick(delta).is_finished() {
            let next = match self.phase {
                BeamPhase::Firing => BeamPhase::Cooling,
                BeamPhase::Cooling => BeamPhase::Firing,
            };
            self.enter(next);
        }
        firing
    }

    fn enter(&mut self, phase: BeamPhase) {
        let secs = match phase {
            BeamPhase::Firing => self.firing_secs,
            BeamPhase::Cooling => self.cooldown_secs,
        };
        self.phase = phase;
        self.timer = Timer::from_seconds(secs, TimerMode::Once);
    }
}

/// Drawn part of a beam; a child of the emitter.
#[derive(Component, Debug, Clone, Copy)]
pub struct BeamRay;

pub fn fire_beams(
    time: Res<Time>,
    spatial: SpatialQuery,
    mut q_beams: Query<(&GlobalTransform, &mut BeamEmitter)>,
    q_enemies: Query<(), With<Enemy>>,
    q_cores: Query<(), With<Hull>>,
    q_parts: Query<&HullPart>,
    q_registry: Query<&AttachmentRegistry>,
    mut q_health: Query<&mut Health>,
) {
    let dt = time.delta_secs();

    for (gt, mut beam) in &mut q_beams {
        if !beam.tick(time.delta()) {
            continue;
        }

        let (_, rotation, origin) = gt.to_scale_rotation_translation();
        let Ok(dir) = Dir2::new((rotation * beam.facing.extend(0.0)).truncate()) else {
            continue;
        };

        let filter = SpatialQueryFilter::from_mask(hostile_layer(beam.faction));
        let hits = spatial.ray_hits(
            origin.truncate(),
            dir,
            beam.max_length,
            u32::MAX,
            true,
            &filter,
        );

        let damage = beam.damage_per_second * dt;
        let mut reach = beam.max_length;

        for hit in hits {
            let target = hit.entity;
            let hostile = match beam.faction {
                Faction::Player => q_enemies.contains(target),
                Faction::Enemy => q_cores.contains(target) || q_parts.contains(target),
            };
            if !hostile {
                continue;
            }
            reach = reach.min(hit.distance);

            let shielded = q_parts.get(target).is_ok_and(|part| {
                q_registry
                    .get(part.hull)
                    .is_ok_and(|registry| registry.is_immune(target))
            });
            if shielded {
                continue;
            }
            if let Ok(mut hp) = q_health.get_mut(target) {
                hp.damage(damage);
            }
        }

        beam.reach = reach;
    }
}

/// Stretch each beam's ray sprite from the emitter to its reach.
pub fn draw_beams(
    q_beams: Query<&BeamEmitter>,
    mut q_rays: Query<(&ChildOf, &mut Transform, &mut Visibility), With<BeamRay>>,
) {
    for (child_of, mut tf, mut vis) in &mut q_rays {
        let Ok(beam) = q_beams.get(child_of.parent()) else {
            continue;
        };
        if !beam.is_firing() {
            *vis = Visibility::Hidden;
            continue;
        }

        let dir = beam.facing.normalize_or(Vec2::Y);
        *vis = Visibility::Inherited;
        tf.translation = (dir * beam.reach * 0.5).extend(-0.1);
        tf.rotation = Quat::from_rotation_z(Vec2::Y.angle_to(dir));
        tf.scale = Vec3::new(1.0, beam.reach, 1.0);
    }
}
