//! Combat components shared by bullets, the hull and enemies.

use bevy::prelude::*;

/// Who fired a bullet, and therefore who it can hurt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Faction {
    Player,
    Enemy,
}

#[derive(Component)]
pub struct PooledBullet;

/// Typed handle for entities that live in the bullet pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulletEntity(pub Entity);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulletState {
    #[default]
    Inactive,
    Active,
    PendingReturn,
}

#[derive(Component, Debug, Clone)]
pub struct Bullet {
    pub damage: f32,
    pub faction: Faction,
    pub lifetime: Timer,
    /// Zero for a plain bullet. Anything larger detonates on impact and hurts
    /// every hostile within this distance.
    pub blast_radius: f32,
}

impl Bullet {
    pub fn new(damage: f32, faction: Faction, lifetime_secs: f32) -> Self {
        Self {
            damage,
            faction,
            lifetime: Timer::from_seconds(lifetime_secs, TimerMode::Once),
            blast_radius: 0.0,
        }
    }

    pub fn with_blast_radius(mut self, radius: f32) -> Self {
        self.blast_radius = radius;
        self
    }

    #[inline]
    pub fn reset_for_fire(&mut self, damage: f32, faction: Faction, blast_radius: f32) {
        self.damage = damage;
        self.faction = faction;
        self.blast_radius = blast_radius;
        self.lifetime.reset();
    }

    #[inline]
    pub fn is_explosive(&self) -> bool {
        self.blast_radius > 0.0
    }
}

/// Per-bullet steering on top of the launch velocity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub enum BulletMotion {
    #[default]
    Straight,
    /// Sideways sinusoid perpendicular to the launch velocity.
    Wave {
        launch: Vec2,
        frequency: f32,
        amplitude: f32,
        elapsed: f32,
    },
    /// Turns toward the nearest hostile target, at most `turn_rate` degrees/s.
    Homing { turn_rate: f32 },
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    #[inline]
    pub fn damage(&mut self, amount: f32) {
        self.current -= amount;
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// Change the maximum and clamp current health into `[0, max]`.
    pub fn set_max(&mut self, max: f32) {
        self.max = max;
        self.current = self.current.clamp(0.0, max);
    }
}
