mod common;

use bevy::prelude::*;
use ship_eater::hex::HexGrid;
use ship_eater::plugins::hull::progression::HullProgression;
use ship_eater::plugins::hull::registry::AttachmentRegistry;

#[test]
fn docking_enough_parts_levels_the_hull_up() {
    let tunables = common::quiet_tunables();
    let threshold = tunables.hull.levels[0].threshold;
    let base_hex = tunables.hull.hex_size;

    let mut app = common::app_headless_with(tunables);
    common::run(&mut app, 3);
    let hull = common::hull(&mut app);
    let pos = common::hull_position(&mut app);

    for i in 0..threshold {
        let x = (i as f32 - 1.0) * 15.0;
        common::drop_debris(&mut app, pos + Vec2::new(x, 25.0));
    }
    common::run(&mut app, 120);

    let world = app.world();
    assert_eq!(world.get::<AttachmentRegistry>(hull).unwrap().len(), threshold);
    assert_eq!(world.get::<HullProgression>(hull).unwrap().level(), 2);
    assert!(world.get::<HexGrid>(hull).unwrap().hex_size() > base_hex);
}
