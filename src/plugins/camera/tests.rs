use bevy::{ecs::message::Messages, prelude::*};

use super::*;
use crate::common::test_utils::{insert_time_with_delta, run_system_once};

fn camera_world() -> (World, Entity) {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(PlayField::default());
    world.init_resource::<Messages<LevelChanged>>();

    let cam = world
        .spawn((
            MainCamera { responsiveness: 5.0 },
            CameraZoom { target: 1.0 },
            Projection::Orthographic(OrthographicProjection::default_2d()),
            Transform::from_xyz(0.0, 0.0, 999.0),
        ))
        .id();
    (world, cam)
}

fn scale(world: &World, cam: Entity) -> f32 {
    match world.get::<Projection>(cam).unwrap() {
        Projection::Orthographic(o) => o.scale,
        _ => panic!("camera lost its orthographic projection"),
    }
}

#[test]
fn zoom_target_spans_min_to_max() {
    assert_eq!(zoom_target(1, 5, 1.0, 2.0), 1.0);
    assert_eq!(zoom_target(3, 5, 1.0, 2.0), 1.5);
    assert_eq!(zoom_target(5, 5, 1.0, 2.0), 2.0);
}

#[test]
fn single_level_table_stays_at_min_zoom() {
    assert_eq!(zoom_target(1, 1, 1.0, 2.0), 1.0);
    assert_eq!(zoom_target(4, 1, 1.0, 2.0), 1.0);
}

#[test]
fn zoom_step_eases_then_snaps() {
    let next = zoom_step(1.0, 2.0, 2.0, 0.1);
    assert!(next > 1.0 && next < 2.0);

    assert_eq!(zoom_step(1.9995, 2.0, 2.0, 0.1), 2.0);
}

#[test]
fn level_change_retargets_and_smooths_zoom() {
    let (mut world, cam) = camera_world();
    let tunables = Tunables::default();
    world.write_message(LevelChanged {
        hull: Entity::PLACEHOLDER,
        from: 1,
        to: 6,
        max_level: 6,
    });

    run_system_once(&mut world, super::retarget_zoom);
    assert_eq!(
        world.get::<CameraZoom>(cam).unwrap().target,
        tunables.camera.max_zoom
    );

    insert_time_with_delta(&mut world, 0.1);
    run_system_once(&mut world, super::smooth_zoom);
    let s = scale(&world, cam);
    assert!(s > 1.0 && s < tunables.camera.max_zoom);
}

#[test]
fn camera_eases_toward_the_hull() {
    let (mut world, cam) = camera_world();
    world.spawn((Hull, Transform::from_xyz(100.0, -50.0, 1.0)));
    insert_time_with_delta(&mut world, 0.1);

    run_system_once(&mut world, super::follow_hull);

    let tf = world.get::<Transform>(cam).unwrap();
    assert!(tf.translation.x > 0.0 && tf.translation.x < 100.0);
    assert!(tf.translation.y < 0.0 && tf.translation.y > -50.0);
    assert_eq!(tf.translation.z, 999.0);
}
