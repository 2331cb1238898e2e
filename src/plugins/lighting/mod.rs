//! Lighting plugin (Firefly) (render-only).
//!
//! One warm point light rides on the hull. Enemies carry occluders, so they
//! cast shadows from it.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::*;

use crate::common::state::GameState;
use crate::plugins::hull::Hull;

#[derive(Component)]
pub struct HullLight;

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(OnEnter(GameState::InGame), setup)
        .add_systems(
            Update,
            follow_hull_light.run_if(in_state(GameState::InGame)),
        );
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Name::new("HullLight"),
        HullLight,
        PointLight2d {
            color: Color::srgb(1.0, 0.9, 0.75),
            radius: 450.0,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 10.0),
        DespawnOnExit(GameState::InGame),
    ));
}

fn follow_hull_light(
    q_hull: Query<&Transform, (With<Hull>, Without<HullLight>)>,
    mut q_light: Query<&mut Transform, (With<HullLight>, Without<Hull>)>,
) {
    let Ok(tf_hull) = q_hull.single() else {
        return;
    };
    let Ok(mut tf_light) = q_light.single_mut() else {
        return;
    };

    tf_light.translation.x = tf_hull.translation.x;
    tf_light.translation.y = tf_hull.translation.y;
}
