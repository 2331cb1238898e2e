//! Camera plugin: follows the hull and zooms out as it levels up.
//!
//! ```text
//! OnEnter(InGame): spawn MainCamera
//! Update:          retarget_zoom (LevelChanged) -> smooth_zoom
//! PostUpdate:      follow_hull (before transform propagation)
//! ```
//!
//! Hull and camera transforms are read and written in the same system, so the
//! queries are kept disjoint with `Without<...>` filters.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::{CameraTunables, Tunables};
use crate::plugins::hull::{Hull, LevelChanged};
use crate::plugins::world::PlayField;

/// Zoom closer than this to the target snaps onto it.
const ZOOM_SNAP: f32 = 0.001;

#[derive(Component)]
pub struct MainCamera {
    pub responsiveness: f32,
}

/// Orthographic scale the camera is easing toward.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CameraZoom {
    pub target: f32,
}

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_camera)
        .add_systems(
            Update,
            (retarget_zoom, smooth_zoom)
                .chain()
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            PostUpdate,
            follow_hull
                .before(TransformSystems::Propagate)
                .run_if(in_state(GameState::InGame)),
        );
}

/// Orthographic scale for `level` out of `max_level`: `min` at level 1, `max` at the top.
pub fn zoom_target(level: usize, max_level: usize, min: f32, max: f32) -> f32 {
    if max_level <= 1 {
        return min;
    }
    let t = (level.saturating_sub(1) as f32 / (max_level - 1) as f32).clamp(0.0, 1.0);
    min + (max - min) * t
}

/// One smoothing step from `current` toward `target`.
pub fn zoom_step(current: f32, target: f32, speed: f32, dt: f32) -> f32 {
    let alpha = 1.0 - (-speed * dt).exp();
    let next = current + (target - current) * alpha;
    if (target - next).abs() < ZOOM_SNAP {
        target
    } else {
        next
    }
}

fn spawn_camera(mut commands: Commands, tunables: Res<Tunables>) {
    let zoom = tunables.camera.min_zoom;

    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera { responsiveness: 5.0 },
        CameraZoom { target: zoom },
        Projection::Orthographic(OrthographicProjection {
            scale: zoom,
            ..OrthographicProjection::default_2d()
        }),
        FireflyConfig::default(),
        Transform::from_xyz(0.0, 0.0, 999.0),
        DespawnOnExit(GameState::InGame),
    ));
}

fn retarget_zoom(
    tunables: Res<Tunables>,
    mut changes: MessageReader<LevelChanged>,
    mut q_cam: Query<&mut CameraZoom, With<MainCamera>>,
) {
    let Some(change) = changes.read().last() else {
        return;
    };
    let CameraTunables {
        min_zoom, max_zoom, ..
    } = tunables.camera;
    let target = zoom_target(change.to, change.max_level, min_zoom, max_zoom);

    for mut zoom in &mut q_cam {
        zoom.target = target;
    }
}

fn smooth_zoom(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut q_cam: Query<(&CameraZoom, &mut Projection), With<MainCamera>>,
) {
    let dt = time.delta_secs();

    for (zoom, mut projection) in &mut q_cam {
        let Projection::Orthographic(ortho) = &mut *projection else {
            continue;
        };
        if ortho.scale != zoom.target {
            ortho.scale = zoom_step(ortho.scale, zoom.target, tunables.camera.zoom_speed, dt);
        }
    }
}

/// Ease toward the hull, keeping the view center inside the play field.
fn follow_hull(
    time: Res<Time>,
    field: Res<PlayField>,
    q_hull: Query<&Transform, (With<Hull>, Without<MainCamera>)>,
    mut q_cam: Query<(&mut Transform, &MainCamera), Without<Hull>>,
) {
    let Ok(tf_hull) = q_hull.single() else {
        return;
    };
    let Ok((mut tf_cam, main_cam)) = q_cam.single_mut() else {
        return;
    };

    let dt = time.delta_secs();
    let alpha = 1.0 - (-main_cam.responsiveness * dt).exp();

    let cam = tf_cam.translation.truncate();
    let target = field.clamp(tf_hull.translation.truncate());
    let next = cam + (target - cam) * alpha;

    tf_cam.translation = next.extend(tf_cam.translation.z);
}

#[cfg(test)]
mod tests;
