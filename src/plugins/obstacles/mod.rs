//! Obstacles plugin: solid blocks that scroll down the field.
//!
//! ```text
//! OnEnter(InGame):  reset_obstacles
//! FixedUpdate:      spawn_obstacles (timer, capped) -> cull_obstacles
//! ```
//!
//! Obstacles are kinematic, so they shove the hull aside instead of hurting it,
//! and they soak up bullets from both sides. The stage director sets the cap and
//! pauses the spawner between stages.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::Occluder2d;
use rand::Rng;

use crate::common::layers::obstacle_layers;
use crate::common::random;
use crate::common::state::GameState;
use crate::common::tunables::{ObstacleTunables, Tunables};
use crate::plugins::world::PlayField;

const OBSTACLE_COLOR: Color = Color::srgb(0.32, 0.34, 0.4);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Obstacle;

#[derive(Resource, Debug, Clone)]
pub struct ObstacleSpawner {
    timer: Timer,
    max_active: usize,
    pub paused: bool,
}

impl ObstacleSpawner {
    /// Starts with a zero cap; nothing spawns until a stage allows it.
    pub fn new(interval: f32) -> Self {
        Self {
            timer: Timer::from_seconds(interval.max(0.0), TimerMode::Repeating),
            max_active: 0,
            paused: false,
        }
    }

    #[inline]
    pub fn max_active(&self) -> usize {
        self.max_active
    }

    pub fn set_max_active(&mut self, max_active: usize) {
        self.max_active = max_active;
    }

    /// True when an obstacle should spawn this tick, given how many are already
    /// on the field. A full field skips the slot; it does not queue it.
    pub fn tick(&mut self, delta: std::time::Duration, active: usize) -> bool {
        if self.paused {
            return false;
        }
        self.timer.tick(delta).just_finished() && active < self.max_active
    }
}

impl Default for ObstacleSpawner {
    fn default() -> Self {
        Self::new(ObstacleTunables::default().spawn_interval)
    }
}

pub fn plugin(app: &mut App) {
    let interval = app.world().get_resource::<Tunables>().map_or_else(
        || ObstacleTunables::default().spawn_interval,
        |t| t.obstacles.spawn_interval,
    );

    app.insert_resource(ObstacleSpawner::new(interval));

    app.add_systems(OnEnter(GameState::InGame), reset_obstacles);

    app.add_systems(
        FixedUpdate,
        (spawn_obstacles, cull_obstacles)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
}

pub fn reset_obstacles(mut spawner: ResMut<ObstacleSpawner>, tunables: Res<Tunables>) {
    *spawner = ObstacleSpawner::new(tunables.obstacles.spawn_interval);
}

/// Spawn one square obstacle at `position`, already scrolling.
pub fn spawn_obstacle(
    commands: &mut Commands,
    cfg: &ObstacleTunables,
    position: Vec2,
    rng: &mut impl Rng,
) -> Entity {
    let size = random::between([cfg.min_size, cfg.max_size], rng);

    commands
        .spawn((
            Name::new("Obstacle"),
            Obstacle,
            Sprite::from_color(OBSTACLE_COLOR, Vec2::splat(size)),
            Transform::from_translation(position.extend(0.5)),
            RigidBody::Kinematic,
            Collider::rectangle(size, size),
            obstacle_layers(),
            LinearVelocity(Vec2::new(0.0, -cfg.scroll_speed)),
            Occluder2d::rectangle(size, size),
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

fn spawn_obstacles(
    mut commands: Commands,
    time: Res<Time>,
    tunables: Res<Tunables>,
    field: Res<PlayField>,
    mut spawner: ResMut<ObstacleSpawner>,
    q: Query<(), With<Obstacle>>,
) {
    if !spawner.tick(time.delta(), q.iter().count()) {
        return;
    }

    let mut rng = rand::rng();
    let position = field.top_spawn_point(&mut rng);
    spawn_obstacle(&mut commands, &tunables.obstacles, position, &mut rng);
}

fn cull_obstacles(
    mut commands: Commands,
    field: Res<PlayField>,
    q: Query<(Entity, &Transform), With<Obstacle>>,
) {
    for (e, tf) in &q {
        if !field.contains_with_margin(tf.translation.truncate()) {
            commands.entity(e).despawn();
        }
    }
}
