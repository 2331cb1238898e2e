//! Enemy waves.
//!
//! A wave is a list of groups. Spawn times are laid out up front:
//! ```text
//!   t = 0
//!   for group:  for each enemy: spawn at t, t += spawn_rate
//!               t += interval
//! ```
//! The next wave is queued only when no enemy is left on the field and nothing
//! from the previous wave is still waiting to spawn.

use std::time::Duration;

use bevy::prelude::*;
use serde::Deserialize;

use crate::common::schedule::TaskQueue;
use crate::common::tunables::Tunables;
use crate::plugins::projectiles::patterns::BulletPattern;
use crate::plugins::world::PlayField;

use super::{Enemy, spawn_enemy};

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyArchetype {
    Scout,
    Gunner,
    Lancer,
    Spinner,
    Sprayer,
    Weaver,
    Bomber,
    Turret,
    /// Fires rockets that explode on impact.
    Rocketeer,
    /// Fires homing missiles that explode on impact.
    Hunter,
    /// Sweeps a beam instead of firing bullets.
    Beamer,
}

/// Per-archetype scaling on top of the shared enemy tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeProfile {
    pub pattern: BulletPattern,
    pub health: f32,
    pub speed: f32,
    pub fire_rate: f32,
    pub size: f32,
    pub strafes: bool,
    /// Carries a beam emitter. Beam ships have a zero fire rate, so their
    /// bullet shooter stays idle.
    pub beam: bool,
    pub color: Color,
}

impl EnemyArchetype {
    pub fn profile(self) -> ArchetypeProfile {
        let base = ArchetypeProfile {
            pattern: BulletPattern::Single,
            health: 1.0,
            speed: 1.0,
            fire_rate: 1.0,
            size: 1.0,
            strafes: false,
            beam: false,
            color: Color::srgb(0.9, 0.25, 0.25),
        };

        match self {
            Self::Scout => ArchetypeProfile {
                speed: 1.4,
                size: 0.8,
                strafes: true,
                ..base
            },
            Self::Gunner => ArchetypeProfile {
                pattern: BulletPattern::Spread {
                    count: 3,
                    angle: 30.0,
                },
                health: 1.5,
                strafes: true,
                color: Color::srgb(0.9, 0.45, 0.2),
                ..base
            },
            Self::Lancer => ArchetypeProfile {
                pattern: BulletPattern::Burst {
                    count: 4,
                    interval: 0.1,
                },
                speed: 1.2,
                color: Color::srgb(0.95, 0.3, 0.5),
                ..base
            },
            Self::Spinner => ArchetypeProfile {
                pattern: BulletPattern::Spiral {
                    count: 4,
                    rotation_speed: 90.0,
                },
                health: 3.0,
                speed: 0.5,
                fire_rate: 3.0,
                size: 1.3,
                color: Color::srgb(0.7, 0.3, 0.85),
                ..base
            },
            Self::Sprayer => ArchetypeProfile {
                pattern: BulletPattern::RandomSpray {
                    count: 5,
                    angle: 50.0,
                },
                health: 2.0,
                strafes: true,
                color: Color::srgb(0.85, 0.7, 0.2),
                ..base
            },
            Self::Weaver => ArchetypeProfile {
                pattern: BulletPattern::Wave {
                    count: 3,
                    frequency: 6.0,
                    amplitude: 120.0,
                },
                health: 1.5,
                strafes: true,
                color: Color::srgb(0.3, 0.8, 0.6),
                ..base
            },
            Self::Bomber => ArchetypeProfile {
                pattern: BulletPattern::Concentric {
                    rings: 2,
                    per_ring: 8,
                    spacing: 12.0,
                },
                health: 4.0,
                speed: 0.6,
                fire_rate: 0.7,
                size: 1.5,
                color: Color::srgb(0.6, 0.15, 0.15),
                ..base
            },
            Self::Turret => ArchetypeProfile {
                pattern: BulletPattern::Circular { count: 10 },
                health: 5.0,
                speed: 0.35,
                size: 1.4,
                color: Color::srgb(0.5, 0.5, 0.6),
                ..base
            },
            Self::Rocketeer => ArchetypeProfile {
                pattern: BulletPattern::Rocket { blast_radius: 36.0 },
                health: 2.0,
                speed: 0.8,
                fire_rate: 0.6,
                size: 1.1,
                color: Color::srgb(0.95, 0.55, 0.15),
                ..base
            },
            Self::Hunter => ArchetypeProfile {
                pattern: BulletPattern::Missile {
                    turn_rate: 90.0,
                    blast_radius: 28.0,
                },
                health: 2.0,
                fire_rate: 0.5,
                strafes: true,
                color: Color::srgb(0.75, 0.85, 0.25),
                ..base
            },
            Self::Beamer => ArchetypeProfile {
                health: 4.0,
                speed: 0.4,
                fire_rate: 0.0,
                size: 1.3,
                beam: true,
                color: Color::srgb(0.3, 0.6, 1.0),
                ..base
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WaveEnemy {
    pub archetype: EnemyArchetype,
    pub count: u32,
    /// Seconds between two spawns of this group.
    #[serde(default)]
    pub spawn_rate: f32,
    #[serde(default)]
    pub from_side: bool,
}

impl WaveEnemy {
    pub fn new(archetype: EnemyArchetype, count: u32, spawn_rate: f32, from_side: bool) -> Self {
        Self {
            archetype,
            count,
            spawn_rate,
            from_side,
        }
    }
}

fn default_group_interval() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnemyWave {
    pub enemies: Vec<WaveEnemy>,
    /// Pause between two groups.
    #[serde(default = "default_group_interval")]
    pub interval: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedSpawn {
    pub archetype: EnemyArchetype,
    pub from_side: bool,
}

/// Spawn offsets (seconds from wave start) for every enemy of `wave`.
pub fn schedule_wave(wave: &EnemyWave) -> Vec<(f32, QueuedSpawn)> {
    let mut t = 0.0;
    let mut out = Vec::new();

    for group in &wave.enemies {
        for _ in 0..group.count {
            out.push((
                t,
                QueuedSpawn {
                    archetype: group.archetype,
                    from_side: group.from_side,
                },
            ));
            t += group.spawn_rate.max(0.0);
        }
        t += wave.interval.max(0.0);
    }

    out
}

#[derive(Resource, Debug, Default)]
pub struct WaveSpawner {
    waves: Vec<EnemyWave>,
    next_wave: usize,
    queue: TaskQueue<QueuedSpawn>,
    pub paused: bool,
}

impl WaveSpawner {
    pub fn new(waves: Vec<EnemyWave>) -> Self {
        Self {
            waves,
            ..default()
        }
    }

    /// Swap in a new wave list from the start; anything still queued is dropped.
    pub fn load(&mut self, waves: Vec<EnemyWave>) {
        self.waves = waves;
        self.next_wave = 0;
        self.queue.clear();
    }

    #[inline]
    pub fn next_wave(&self) -> usize {
        self.next_wave
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Every wave has been queued and spawned.
    pub fn is_exhausted(&self) -> bool {
        self.next_wave >= self.waves.len() && self.queue.is_empty()
    }

    /// Queue the next wave if the field is clear. Returns the wave index started.
    pub fn try_start_next(&mut self, enemies_alive: usize) -> Option<usize> {
        if self.paused || enemies_alive > 0 || !self.queue.is_empty() {
            return None;
        }
        let wave = self.waves.get(self.next_wave)?;

        for (delay, spawn) in schedule_wave(wave) {
            self.queue.push_after(delay, spawn);
        }
        self.next_wave += 1;
        Some(self.next_wave - 1)
    }

    pub fn tick(&mut self, delta: Duration) -> Vec<QueuedSpawn> {
        if self.paused {
            return Vec::new();
        }
        self.queue.tick(delta)
    }
}

pub fn advance_waves(mut spawner: ResMut<WaveSpawner>, q_enemies: Query<(), With<Enemy>>) {
    if let Some(index) = spawner.try_start_next(q_enemies.iter().count()) {
        info!("wave {} started ({} enemies queued)", index + 1, spawner.pending());
    }
}

pub fn spawn_queued_enemies(
    mut commands: Commands,
    time: Res<Time>,
    tunables: Res<Tunables>,
    field: Res<PlayField>,
    mut spawner: ResMut<WaveSpawner>,
) {
    let mut rng = rand::rng();

    for spawn in spawner.tick(time.delta()) {
        let (pos, facing) = if spawn.from_side {
            field.side_spawn_point(&mut rng)
        } else {
            (field.top_spawn_point(&mut rng), Vec2::NEG_Y)
        };
        spawn_enemy(&mut commands, &tunables, spawn.archetype, pos, facing, &mut rng);
    }
}
