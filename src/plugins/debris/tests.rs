use std::time::Duration;

use avian2d::prelude::*;
use bevy::{ecs::message::Messages, prelude::*};

use super::docking::{self, DockingIntent, DockingLedger, DockingState};
use super::{Armament, Debris, DebrisDrop, DebrisSpawner};
use crate::common::test_utils::{insert_time_with_delta, run_system_once};
use crate::common::tunables::Tunables;
use crate::hex::{AxialCoord, CellState, HexGrid};
use crate::plugins::hull::registry::AttachmentRegistry;
use crate::plugins::hull::{Hull, HullCore, HullPart, HullStats};
use crate::plugins::projectiles::components::Health;
use crate::plugins::projectiles::patterns::BulletPattern;
use crate::plugins::projectiles::shooters::Shooter;
use crate::plugins::world::PlayField;

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn world_with_hull() -> (World, Entity) {
    let mut world = World::new();
    let tunables = Tunables::default();
    let core = HullCore::from_tunables(&tunables.hull).unwrap();
    let hull = world
        .spawn((
            Hull,
            core,
            HullStats::new(100.0),
            Health::new(100.0),
            Transform::default(),
        ))
        .id();
    world.insert_resource(tunables);
    world.init_resource::<Messages<DockingIntent>>();
    (world, hull)
}

fn debris() -> Debris {
    Debris {
        detection_range: 60.0,
        pull_speed: 180.0,
        health_modifier: 1.1,
        speed_modifier: 5.0,
    }
}

fn spawn_debris_at(world: &mut World, pos: Vec2, state: DockingState) -> Entity {
    world
        .spawn((
            debris(),
            state,
            Transform::from_translation(pos.extend(0.5)),
            LinearVelocity(Vec2::new(0.0, -60.0)),
            RigidBody::Kinematic,
        ))
        .id()
}

fn state(world: &World, e: Entity) -> DockingState {
    *world.get::<DockingState>(e).unwrap()
}

fn claimed_cell(world: &World, e: Entity) -> AxialCoord {
    match state(world, e) {
        DockingState::Pulling { cell, .. } | DockingState::Attached { cell, .. } => cell,
        DockingState::Idle => panic!("{e} never claimed a cell"),
    }
}

/// Put `debris` into Pulling toward `cell` the way the resolver would.
fn start_pull(world: &mut World, hull: Entity, debris: Entity) -> AxialCoord {
    world.write_message(DockingIntent { debris, hull });
    run_system_once(world, docking::resolve_docking_intents);
    claimed_cell(world, debris)
}

// -----------------------------------------------------------------------------
// Claiming
// -----------------------------------------------------------------------------

#[test]
fn claim_cell_reserves_a_ring_one_cell_on_a_fresh_grid() {
    let mut grid = HexGrid::new(16.0).unwrap();
    let cell = docking::claim_cell(&mut grid).unwrap();

    assert_eq!(crate::hex::math::hex_distance(cell, AxialCoord::ORIGIN), 1);
    assert_eq!(grid.state(cell), Some(CellState::Reserved));
}

#[test]
fn claim_cell_skips_a_cell_someone_else_reserved() {
    let mut grid = HexGrid::new(16.0).unwrap();
    let taken = grid.nearest_unoccupied_to_center();
    assert!(grid.reserve(taken));

    let cell = docking::claim_cell(&mut grid).unwrap();
    assert_ne!(cell, taken);
    assert_eq!(crate::hex::math::hex_distance(cell, AxialCoord::ORIGIN), 1);
    assert_eq!(grid.state(taken), Some(CellState::Reserved));
    assert_eq!(grid.state(cell), Some(CellState::Reserved));
}

#[test]
fn claim_cell_fails_only_when_no_cell_is_empty() {
    let mut grid = HexGrid::new(16.0).unwrap();
    let ring: Vec<AxialCoord> = (0..6).filter_map(|_| docking::claim_cell(&mut grid)).collect();
    assert_eq!(ring.len(), 6);

    // Reservations do not grow the grid, so ring 1 is the whole frontier.
    assert_eq!(docking::claim_cell(&mut grid), None);
}

#[test]
fn intents_in_the_same_tick_claim_distinct_cells() {
    let (mut world, hull) = world_with_hull();
    let a = spawn_debris_at(&mut world, Vec2::new(0.0, 80.0), DockingState::Idle);
    let b = spawn_debris_at(&mut world, Vec2::new(0.0, 90.0), DockingState::Idle);

    world.write_message(DockingIntent { debris: a, hull });
    world.write_message(DockingIntent { debris: b, hull });
    run_system_once(&mut world, docking::resolve_docking_intents);

    let (ca, cb) = (claimed_cell(&world, a), claimed_cell(&world, b));
    assert_ne!(ca, cb);

    let grid = world.get::<HexGrid>(hull).unwrap();
    assert_eq!(grid.state(ca), Some(CellState::Reserved));
    assert_eq!(grid.state(cb), Some(CellState::Reserved));

    let ledger = world.get::<DockingLedger>(hull).unwrap();
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.cell_for(a), Some(ca));
}

#[test]
fn repeated_intent_keeps_the_first_claim() {
    let (mut world, hull) = world_with_hull();
    let a = spawn_debris_at(&mut world, Vec2::new(0.0, 80.0), DockingState::Idle);

    world.write_message(DockingIntent { debris: a, hull });
    world.write_message(DockingIntent { debris: a, hull });
    run_system_once(&mut world, docking::resolve_docking_intents);

    let reserved = world
        .get::<HexGrid>(hull)
        .unwrap()
        .cells()
        .filter(|(_, s)| *s == CellState::Reserved)
        .count();
    assert_eq!(reserved, 1);
}

#[test]
fn intent_for_missing_hull_leaves_debris_idle() {
    let (mut world, _) = world_with_hull();
    let a = spawn_debris_at(&mut world, Vec2::ZERO, DockingState::Idle);
    let ghost = world.spawn_empty().id();
    world.despawn(ghost);

    world.write_message(DockingIntent { debris: a, hull: ghost });
    run_system_once(&mut world, docking::resolve_docking_intents);

    assert_eq!(state(&world, a), DockingState::Idle);
}

// -----------------------------------------------------------------------------
// Contact detection
// -----------------------------------------------------------------------------

#[test]
fn contact_with_core_or_part_writes_an_intent() {
    let (mut world, hull) = world_with_hull();
    world.init_resource::<Messages<CollisionStart>>();
    let part = world.spawn(HullPart { hull }).id();
    let a = spawn_debris_at(&mut world, Vec2::ZERO, DockingState::Idle);
    let b = spawn_debris_at(&mut world, Vec2::ZERO, DockingState::Idle);
    let busy = spawn_debris_at(
        &mut world,
        Vec2::ZERO,
        DockingState::Pulling {
            hull,
            cell: AxialCoord::new(1, 0),
        },
    );
    let stranger = world.spawn_empty().id();

    for (c1, c2) in [(a, hull), (part, b), (busy, hull), (a, stranger)] {
        world.write_message(CollisionStart {
            collider1: c1,
            collider2: c2,
            body1: None,
            body2: None,
        });
    }

    run_system_once(&mut world, docking::detect_hull_contact);

    let msgs = world.resource::<Messages<DockingIntent>>();
    let mut cursor = msgs.get_cursor();
    let intents: Vec<_> = cursor.read(msgs).copied().collect();
    assert_eq!(
        intents,
        vec![
            DockingIntent { debris: a, hull },
            DockingIntent { debris: b, hull },
        ]
    );
}

// -----------------------------------------------------------------------------
// Pulling / attaching
// -----------------------------------------------------------------------------

#[test]
fn pulled_debris_moves_toward_its_cell() {
    let (mut world, hull) = world_with_hull();
    insert_time_with_delta(&mut world, 0.1);
    let a = spawn_debris_at(&mut world, Vec2::new(0.0, 200.0), DockingState::Idle);
    let cell = start_pull(&mut world, hull, a);

    run_system_once(&mut world, docking::pull_debris);

    let target = world.get::<HexGrid>(hull).unwrap().world_offset(cell);
    let pos = world.get::<Transform>(a).unwrap().translation.truncate();
    let before = Vec2::new(0.0, 200.0).distance(target);
    assert!((before - pos.distance(target) - 18.0).abs() < 1e-3);
    assert_eq!(world.get::<LinearVelocity>(a).unwrap().0, Vec2::ZERO);
    assert!(matches!(state(&world, a), DockingState::Pulling { .. }));
}

#[test]
fn arrival_docks_the_piece_onto_the_hull() {
    let (mut world, hull) = world_with_hull();
    insert_time_with_delta(&mut world, 0.1);
    let a = spawn_debris_at(&mut world, Vec2::ZERO, DockingState::Idle);
    world.entity_mut(a).insert(Armament {
        pattern: BulletPattern::Single,
    });
    let cell = start_pull(&mut world, hull, a);
    let target = world.get::<HexGrid>(hull).unwrap().world_offset(cell);
    world.get_mut::<Transform>(a).unwrap().translation = target.extend(0.5);

    run_system_once(&mut world, docking::pull_debris);

    assert_eq!(state(&world, a), DockingState::Attached { hull, cell });
    assert_eq!(world.get::<HexGrid>(hull).unwrap().state(cell), Some(CellState::Occupied));
    assert!(world.get::<DockingLedger>(hull).unwrap().is_empty());

    let registry = world.get::<AttachmentRegistry>(hull).unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(a).unwrap().cell, cell);

    let stats = world.get::<HullStats>(hull).unwrap();
    assert!((stats.max_health - 110.0).abs() < 1e-3);
    assert_eq!(stats.speed_bonus, 5.0);
    assert!((world.get::<Health>(hull).unwrap().max - 110.0).abs() < 1e-3);

    assert_eq!(world.get::<HullPart>(a).unwrap().hull, hull);
    assert_eq!(world.get::<ChildOf>(a).unwrap().parent(), hull);
    assert!(world.get::<RigidBody>(a).is_none());
    assert!(world.get::<Shooter>(a).is_some());
    assert_eq!(world.get::<Transform>(a).unwrap().translation.truncate(), target);
}

#[test]
fn pulled_debris_despawns_when_its_hull_is_gone() {
    let (mut world, hull) = world_with_hull();
    insert_time_with_delta(&mut world, 0.1);
    let a = spawn_debris_at(&mut world, Vec2::new(0.0, 100.0), DockingState::Idle);
    start_pull(&mut world, hull, a);
    world.despawn(hull);

    run_system_once(&mut world, docking::pull_debris);

    assert!(world.get_entity(a).is_err());
}

// -----------------------------------------------------------------------------
// Abandoned claims
// -----------------------------------------------------------------------------

#[test]
fn destroyed_puller_releases_its_cell() {
    let (mut world, hull) = world_with_hull();
    let a = spawn_debris_at(&mut world, Vec2::new(0.0, 100.0), DockingState::Idle);
    let cell = start_pull(&mut world, hull, a);

    world.despawn(a);
    run_system_once(&mut world, docking::release_abandoned_claims);

    assert_eq!(world.get::<HexGrid>(hull).unwrap().state(cell), Some(CellState::Empty));
    assert!(world.get::<DockingLedger>(hull).unwrap().is_empty());
}

#[test]
fn destroyed_puller_leaks_its_cell_when_release_is_off() {
    let (mut world, hull) = world_with_hull();
    world.resource_mut::<Tunables>().release_abandoned_reservations = false;
    let a = spawn_debris_at(&mut world, Vec2::new(0.0, 100.0), DockingState::Idle);
    let cell = start_pull(&mut world, hull, a);

    world.despawn(a);
    run_system_once(&mut world, docking::release_abandoned_claims);

    assert_eq!(world.get::<HexGrid>(hull).unwrap().state(cell), Some(CellState::Reserved));
    assert!(world.get::<DockingLedger>(hull).unwrap().is_empty());
}

// -----------------------------------------------------------------------------
// Spawning / culling
// -----------------------------------------------------------------------------

#[test]
fn spawner_fires_on_interval_and_respects_pause() {
    let mut spawner = DebrisSpawner::new([1.0, 1.0]);
    let mut rng = rand::rng();

    assert!(!spawner.tick(Duration::from_millis(500), &mut rng));
    assert!(spawner.tick(Duration::from_millis(500), &mut rng));

    spawner.paused = true;
    assert!(!spawner.tick(Duration::from_secs(5), &mut rng));

    spawner.paused = false;
    spawner.set_interval([2.0, 2.0]);
    assert!(spawner.tick(Duration::from_millis(1000), &mut rng));
    assert!(!spawner.tick(Duration::from_millis(1500), &mut rng));
    assert!(spawner.tick(Duration::from_millis(500), &mut rng));
}

#[test]
fn enemy_drops_become_idle_debris() {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.init_resource::<Messages<DebrisDrop>>();
    world.write_message(DebrisDrop {
        position: Vec2::new(12.0, 34.0),
    });

    run_system_once(&mut world, super::spawn_dropped_debris);

    let tunables = Tunables::default();
    let mut q = world.query::<(&Debris, &DockingState, &Transform)>();
    let (d, s, tf) = q.single(&world).unwrap();
    assert_eq!(*s, DockingState::Idle);
    assert_eq!(tf.translation.truncate(), Vec2::new(12.0, 34.0));
    assert!(d.detection_range >= tunables.debris.min_detection_range);
    assert!(d.detection_range <= tunables.debris.max_detection_range);
}

#[test]
fn cull_removes_only_idle_debris_outside_the_field() {
    let (mut world, hull) = world_with_hull();
    world.insert_resource(PlayField::default());
    let far = Vec2::new(0.0, -5_000.0);
    let idle_far = spawn_debris_at(&mut world, far, DockingState::Idle);
    let idle_near = spawn_debris_at(&mut world, Vec2::ZERO, DockingState::Idle);
    let pulling_far = spawn_debris_at(
        &mut world,
        far,
        DockingState::Pulling {
            hull,
            cell: AxialCoord::new(1, 0),
        },
    );

    run_system_once(&mut world, super::cull_debris);

    assert!(world.get_entity(idle_far).is_err());
    assert!(world.get_entity(idle_near).is_ok());
    assert!(world.get_entity(pulling_far).is_ok());
}
