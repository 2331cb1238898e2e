//! Debris docking protocol.
//!
//! ```text
//!   Idle --contact--> DockingIntent --resolve (reserve)--> Pulling --arrive (occupy)--> Attached
//!                                          |
//!                                          +-- no free cell: stays Idle, retries on next contact
//! ```
//!
//! `resolve_docking_intents` is the only system that reserves cells; it handles
//! every intent of a tick in message order, so two pieces touching the hull in
//! the same tick can never claim the same cell. `pull_debris` is the only system
//! that occupies them.

use avian2d::prelude::*;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::common::layers::hull_layers;
use crate::common::tunables::Tunables;
use crate::hex::{AxialCoord, HexGrid};
use crate::plugins::hull::registry::{Attachment, AttachmentRegistry};
use crate::plugins::hull::{Hull, HullPart, HullStats};
use crate::plugins::projectiles::components::{Faction, Health};
use crate::plugins::projectiles::shooters::Shooter;

use super::{Armament, Debris};

const PART_COLOR: Color = Color::srgb(0.62, 0.58, 0.5);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DockingState {
    #[default]
    Idle,
    Pulling { hull: Entity, cell: AxialCoord },
    Attached { hull: Entity, cell: AxialCoord },
}

/// A debris piece touched a hull (or one of its parts) while Idle.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DockingIntent {
    pub debris: Entity,
    pub hull: Entity,
}

/// Cells reserved for debris still on their way in, keyed by debris entity.
#[derive(Component, Debug, Default, Clone)]
pub struct DockingLedger {
    claims: HashMap<Entity, AxialCoord>,
}

impl DockingLedger {
    pub fn claim(&mut self, debris: Entity, cell: AxialCoord) {
        self.claims.insert(debris, cell);
    }

    /// Forget a claim, returning its cell.
    pub fn remove(&mut self, debris: Entity) -> Option<AxialCoord> {
        self.claims.remove(&debris)
    }

    pub fn cell_for(&self, debris: Entity) -> Option<AxialCoord> {
        self.claims.get(&debris).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Reserve the free cell nearest the center. `None` when the grid has no Empty cell.
///
/// The search skips Reserved cells, so a second claim in the same tick lands on
/// the next nearest cell instead of colliding with the first.
pub fn claim_cell(grid: &mut HexGrid) -> Option<AxialCoord> {
    let cell = grid.nearest_unoccupied_to_center();
    grid.reserve(cell).then_some(cell)
}

pub fn detect_hull_contact(
    mut started: MessageReader<CollisionStart>,
    q_debris: Query<&DockingState, With<Debris>>,
    q_hulls: Query<(), With<Hull>>,
    q_parts: Query<&HullPart>,
    mut writer: MessageWriter<DockingIntent>,
) {
    for ev in started.read() {
        for (debris, other) in [(ev.collider1, ev.collider2), (ev.collider2, ev.collider1)] {
            if !matches!(q_debris.get(debris), Ok(DockingState::Idle)) {
                continue;
            }

            let hull = if q_hulls.contains(other) {
                other
            } else if let Ok(part) = q_parts.get(other) {
                part.hull
            } else {
                continue;
            };

            writer.write(DockingIntent { debris, hull });
        }
    }
}

pub fn resolve_docking_intents(
    mut reader: MessageReader<DockingIntent>,
    mut q_debris: Query<&mut DockingState, With<Debris>>,
    mut q_hull: Query<(&mut HexGrid, &mut DockingLedger), With<Hull>>,
) {
    for intent in reader.read() {
        let Ok(mut state) = q_debris.get_mut(intent.debris) else {
            debug!("docking intent for missing debris {}", intent.debris);
            continue;
        };
        // A piece touching twice in one tick keeps its first claim.
        if *state != DockingState::Idle {
            continue;
        }

        let Ok((mut grid, mut ledger)) = q_hull.get_mut(intent.hull) else {
            debug!("docking intent for missing hull {}", intent.hull);
            continue;
        };

        match claim_cell(&mut grid) {
            Some(cell) => {
                ledger.claim(intent.debris, cell);
                *state = DockingState::Pulling {
                    hull: intent.hull,
                    cell,
                };
                debug!("debris {} claimed {cell}", intent.debris);
            }
            None => debug!("no free cell for debris {}; it stays idle", intent.debris),
        }
    }
}

/// Move pulled debris toward its cell and dock it on arrival.
pub fn pull_debris(
    mut commands: Commands,
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut q_debris: Query<
        (
            Entity,
            &Debris,
            &mut DockingState,
            &mut Transform,
            &mut LinearVelocity,
            Option<&Armament>,
        ),
        Without<Hull>,
    >,
    mut q_hull: Query<
        (
            &Transform,
            &mut HexGrid,
            &mut AttachmentRegistry,
            &mut DockingLedger,
            &mut HullStats,
            &mut Health,
        ),
        With<Hull>,
    >,
) {
    let dt = time.delta_secs();
    let epsilon = tunables.debris.attach_epsilon;

    for (e, debris, mut state, mut tf, mut vel, armament) in &mut q_debris {
        let DockingState::Pulling { hull, cell } = *state else {
            continue;
        };

        let Ok((hull_tf, mut grid, mut registry, mut ledger, mut stats, mut health)) =
            q_hull.get_mut(hull)
        else {
            debug!("hull {hull} vanished under pulled debris {e}");
            commands.entity(e).despawn();
            continue;
        };

        vel.0 = Vec2::ZERO;
        let target = hull_tf.translation.truncate() + grid.world_offset(cell);
        let next = tf
            .translation
            .truncate()
            .move_towards(target, debris.pull_speed * dt);

        if next.distance(target) >= epsilon {
            tf.translation = next.extend(tf.translation.z);
            continue;
        }

        grid.occupy(cell);
        ledger.remove(e);
        let attachment = Attachment::new(e, cell, &grid);
        registry.add(attachment);
        stats.apply_health_modifier(&mut health, debris.health_modifier);
        stats.apply_speed_modifier(debris.speed_modifier);
        *state = DockingState::Attached { hull, cell };

        let part_radius = tunables.hull.part_radius;
        let mut part = commands.entity(e);
        part.remove::<(RigidBody, LinearVelocity, Sensor)>().insert((
            HullPart { hull },
            Health::new(tunables.hull.part_health),
            Collider::circle(part_radius),
            hull_layers(),
            Sprite::from_color(PART_COLOR, Vec2::splat(part_radius * 2.0)),
            Transform::from_translation(attachment.offset.extend(0.5)),
            ChildOf(hull),
        ));
        if let Some(armament) = armament {
            part.insert(Shooter::new(
                armament.pattern,
                tunables.hull.fire_rate,
                tunables.hull.bullet_damage,
                tunables.bullets.player_speed,
                Faction::Player,
            ));
        }

        info!(
            "debris docked at {cell} ({} parts, max health {:.1}, speed bonus {:.1})",
            registry.len(),
            stats.max_health,
            stats.speed_bonus
        );
    }
}

/// Debris despawned mid-pull leaves a claim behind.
///
/// With `release_abandoned_reservations` on, the cell goes back to Empty. With
/// it off the claim is forgotten and the cell stays Reserved.
pub fn release_abandoned_claims(
    mut removed: RemovedComponents<Debris>,
    tunables: Res<Tunables>,
    mut q_hull: Query<(&mut HexGrid, &mut DockingLedger)>,
) {
    for e in removed.read() {
        for (mut grid, mut ledger) in &mut q_hull {
            let Some(cell) = ledger.remove(e) else {
                continue;
            };

            if tunables.release_abandoned_reservations {
                grid.release(cell);
                warn!("debris {e} lost mid-pull; released {cell}");
            } else {
                warn!("debris {e} lost mid-pull; {cell} stays reserved");
            }
        }
    }
}
