use bevy::prelude::*;

use super::{FieldBorder, PlayField};
use crate::common::test_utils::run_system_once;

fn field() -> PlayField {
    PlayField {
        half_extents: Vec2::new(100.0, 200.0),
        spawn_margin: 10.0,
        despawn_margin: 50.0,
    }
}

#[test]
fn clamp_keeps_points_inside() {
    let f = field();
    assert_eq!(f.clamp(Vec2::new(500.0, -500.0)), Vec2::new(100.0, -200.0));
    assert_eq!(f.clamp(Vec2::new(3.0, 4.0)), Vec2::new(3.0, 4.0));
}

#[test]
fn cull_boundary_extends_past_the_field() {
    let f = field();
    let p = Vec2::new(140.0, 0.0);
    assert!(!f.contains(p));
    assert!(f.contains_with_margin(p));
    assert!(!f.contains_with_margin(Vec2::new(0.0, 251.0)));
}

#[test]
fn spawn_points_sit_in_the_spawn_band() {
    let f = field();
    let mut rng = rand::rng();

    for _ in 0..50 {
        let top = f.top_spawn_point(&mut rng);
        assert_eq!(top.y, 210.0);
        assert!(top.x.abs() <= 100.0);

        let (side, dir) = f.side_spawn_point(&mut rng);
        assert_eq!(side.x.abs(), 110.0);
        assert!(side.y >= 0.0);
        // Points back into the field.
        assert!(dir.x * side.x < 0.0);
        assert!(f.contains_with_margin(side));
    }
}

#[test]
fn spawns_four_border_edges() {
    let mut world = World::new();
    world.insert_resource(field());
    run_system_once(&mut world, super::spawn_border);

    let edges = world.query::<&FieldBorder>().iter(&world).count();
    assert_eq!(edges, 4);
}
