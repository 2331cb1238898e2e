mod common;

use bevy::prelude::*;
use ship_eater::hex::math::hex_distance;
use ship_eater::hex::{AxialCoord, CellState, HexGrid};
use ship_eater::plugins::debris::docking::{DockingLedger, DockingState};
use ship_eater::plugins::hull::registry::AttachmentRegistry;
use ship_eater::plugins::hull::{HullPart, HullStats};

#[test]
fn debris_touching_the_hull_docks_onto_a_ring_one_cell() {
    let mut app = common::app_headless_with(common::quiet_tunables());
    common::run(&mut app, 3);

    let hull = common::hull(&mut app);
    let pos = common::hull_position(&mut app);
    let debris = common::drop_debris(&mut app, pos + Vec2::new(0.0, 30.0));

    common::run(&mut app, 90);

    let state = *app.world().get::<DockingState>(debris).expect("debris state");
    let DockingState::Attached { hull: owner, cell } = state else {
        panic!("debris never docked: {state:?}");
    };
    assert_eq!(owner, hull);
    assert_eq!(hex_distance(cell, AxialCoord::default()), 1);

    let world = app.world();
    assert_eq!(world.get::<HexGrid>(hull).unwrap().state(cell), Some(CellState::Occupied));
    assert_eq!(world.get::<AttachmentRegistry>(hull).unwrap().len(), 1);
    assert!(world.get::<DockingLedger>(hull).unwrap().is_empty());
    assert_eq!(world.get::<HullPart>(debris).unwrap().hull, hull);
    assert_eq!(world.get::<ChildOf>(debris).unwrap().parent(), hull);
    assert!(world.get::<HullStats>(hull).unwrap().speed_bonus > 0.0);
}

#[test]
fn simultaneous_contacts_claim_distinct_cells() {
    let mut app = common::app_headless_with(common::quiet_tunables());
    common::run(&mut app, 3);

    let pos = common::hull_position(&mut app);
    let a = common::drop_debris(&mut app, pos + Vec2::new(-20.0, 25.0));
    let b = common::drop_debris(&mut app, pos + Vec2::new(20.0, 25.0));

    common::run(&mut app, 90);

    let cell = |e: Entity| match *app.world().get::<DockingState>(e).expect("state") {
        DockingState::Attached { cell, .. } => cell,
        other => panic!("{e} did not dock: {other:?}"),
    };
    assert_ne!(cell(a), cell(b));
}
