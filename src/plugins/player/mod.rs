//! Player plugin: WASD steering for the hull.
//!
//! Pipeline:
//! - Update: sample input, write PlayerInput resource
//! - FixedUpdate: turn the axis into hull velocity, clamped to the play field
//!
//! The hull fires on its own; input is movement only.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::{state::GameState, tunables::Tunables};
use crate::plugins::hull::{Hull, HullStats};
use crate::plugins::world::PlayField;

#[derive(Resource, Default, Debug)]
pub struct PlayerInput {
    pub move_axis: Vec2,
}

pub fn plugin(app: &mut App) {
    app.insert_resource(PlayerInput::default())
        .add_systems(Update, gather_input.run_if(in_state(GameState::InGame)))
        .add_systems(
            FixedUpdate,
            apply_movement.run_if(in_state(GameState::InGame)),
        );
}

fn gather_input(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<PlayerInput>) {
    let mut axis = Vec2::ZERO;

    if keys.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }

    input.move_axis = axis.normalize_or_zero();
}

/// Velocity that moves `pos` along `axis` for `dt` without leaving `field`.
pub fn clamped_velocity(pos: Vec2, axis: Vec2, speed: Vec2, dt: f32, field: &PlayField) -> Vec2 {
    if dt <= 0.0 {
        return Vec2::ZERO;
    }
    let desired = axis * speed;
    let next = field.clamp(pos + desired * dt);
    (next - pos) / dt
}

fn apply_movement(
    time: Res<Time>,
    tunables: Res<Tunables>,
    field: Res<PlayField>,
    input: Res<PlayerInput>,
    mut q_hull: Query<(&Transform, &HullStats, &mut LinearVelocity), With<Hull>>,
) {
    let cfg = &tunables.hull;

    for (tf, stats, mut vel) in &mut q_hull {
        let speed = Vec2::new(
            cfg.horizontal_speed + stats.speed_bonus,
            cfg.vertical_speed + stats.speed_bonus,
        );
        vel.0 = clamped_velocity(
            tf.translation.truncate(),
            input.move_axis,
            speed,
            time.delta_secs(),
            &field,
        );
    }
}
