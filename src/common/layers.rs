//! Collision layers.

use avian2d::prelude::*;

use crate::plugins::projectiles::components::Faction;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    /// Hull core and every docked part.
    Player,
    Enemy,
    PlayerBullet,
    EnemyBullet,
    /// Free-floating debris detection sensors.
    Debris,
    /// Scrolling blockers: push the hull, soak up bullets of both sides.
    Obstacle,
}

/// Hull core and attached parts: hit by enemy fire, detected by debris,
/// blocked by obstacles.
pub fn hull_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Player,
        [Layer::EnemyBullet, Layer::Debris, Layer::Obstacle],
    )
}

pub fn enemy_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [Layer::PlayerBullet])
}

/// Debris only looks for the hull.
pub fn debris_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Debris, [Layer::Player])
}

pub fn obstacle_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Obstacle,
        [Layer::Player, Layer::PlayerBullet, Layer::EnemyBullet],
    )
}

/// What a weapon of `faction` is allowed to hurt.
pub fn hostile_layer(faction: Faction) -> Layer {
    match faction {
        Faction::Player => Layer::Enemy,
        Faction::Enemy => Layer::Player,
    }
}
