//! Buffered spawn requests and detonations.
//!
//! Producers (shooters) write intent; the allocator is the only system that pops
//! the pool. This is a producer -> queue -> consumer pipeline. Hit resolution
//! hands explosions to the blast resolver the same way.

use bevy::prelude::*;

use super::components::{BulletMotion, Faction};

#[derive(Message, Clone, Copy, Debug)]
pub struct SpawnBulletRequest {
    pub faction: Faction,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub motion: BulletMotion,
    /// See [`super::components::Bullet::blast_radius`].
    pub blast_radius: f32,
}

/// An explosive bullet went off at `origin`.
///
/// `struck` is whatever set it off, if that was a hostile; it takes the blast
/// even when its center lies outside `radius`.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct Blast {
    pub faction: Faction,
    pub origin: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub struck: Option<Entity>,
}
