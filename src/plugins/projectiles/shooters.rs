//! Shooters: anything that fires a [`BulletPattern`] on a cooldown.
//!
//! A shooter only produces [`SpawnBulletRequest`]s; it never touches the pool.
//! Delayed shots (bursts, wave volleys) sit in the shooter's own queue, so
//! despawning the shooter drops them.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use crate::common::schedule::TaskQueue;

use super::components::Faction;
use super::messages::SpawnBulletRequest;
use super::patterns::{BulletPattern, Shot};

#[derive(Component, Debug, Clone)]
pub struct Shooter {
    pub pattern: BulletPattern,
    pub damage: f32,
    pub speed: f32,
    pub faction: Faction,
    /// Firing direction in local space; the entity's global rotation applies.
    pub facing: Vec2,
    pub enabled: bool,
    cooldown: Timer,
    spiral_angle: f32,
    queued: TaskQueue<Shot>,
}

impl Shooter {
    /// Players fire up the screen, enemies down. A non-positive `fire_rate`
    /// yields a shooter that never fires.
    pub fn new(
        pattern: BulletPattern,
        fire_rate: f32,
        damage: f32,
        speed: f32,
        faction: Faction,
    ) -> Self {
        let period = if fire_rate > 0.0 { 1.0 / fire_rate } else { 1.0 };
        Self {
            pattern,
            damage,
            speed,
            faction,
            facing: match faction {
                Faction::Player => Vec2::Y,
                Faction::Enemy => Vec2::NEG_Y,
            },
            enabled: fire_rate > 0.0,
            cooldown: Timer::from_seconds(period, TimerMode::Repeating),
            spiral_angle: 0.0,
            queued: TaskQueue::default(),
        }
    }

    pub fn with_facing(mut self, facing: Vec2) -> Self {
        self.facing = facing;
        self
    }

    #[inline]
    pub fn period(&self) -> f32 {
        self.cooldown.duration().as_secs_f32()
    }

    #[inline]
    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Advance the cooldown and the delayed-shot queue; return every shot due now.
    ///
    /// Queued shots come first, then whatever the trigger pulls of this tick
    /// produce. A disabled shooter drops its queue.
    pub fn tick(&mut self, delta: Duration, rotation: Quat, rng: &mut impl Rng) -> Vec<Shot> {
        if !self.enabled {
            self.queued.clear();
            return Vec::new();
        }

        let mut due = self.queued.tick(delta);

        self.cooldown.tick(delta);
        let pulls = self.cooldown.times_finished_this_tick();
        if pulls == 0 {
            return due;
        }

        let facing = (rotation * self.facing.extend(0.0)).truncate();
        let period = self.period();
        for _ in 0..pulls {
            for shot in self.pattern.fire(facing, period, &mut self.spiral_angle, rng) {
                if shot.delay > 0.0 {
                    self.queued.push_after(shot.delay, shot);
                } else {
                    due.push(shot);
                }
            }
        }
        due
    }
}

pub fn run_shooters(
    time: Res<Time>,
    mut q: Query<(&GlobalTransform, &mut Shooter)>,
    mut writer: MessageWriter<SpawnBulletRequest>,
) {
    let mut rng = rand::rng();

    for (gt, mut shooter) in &mut q {
        let (_, rotation, origin) = gt.to_scale_rotation_translation();
        let shots = shooter.tick(time.delta(), rotation, &mut rng);

        for shot in shots {
            let vel = shot.direction * shooter.speed;
            writer.write(SpawnBulletRequest {
                faction: shooter.faction,
                pos: origin.truncate() + shot.offset,
                vel,
                damage: shooter.damage,
                motion: shot.kind.into_motion(vel),
                blast_radius: shot.blast_radius,
            });
        }
    }
}
