//! Hull plugin: the player ship core, its hex grid of docked parts, and leveling.
//!
//! ```text
//! OnEnter(InGame):  spawn_hull (grid + registry + progression + ledger)
//! FixedPostUpdate:  bullet collisions, blasts -> destroy_broken_parts -> check_progression
//!                   -> LevelChanged messages -> hull_destroyed
//! Update:           tint_parts / tint_hull (presentation only)
//! ```
//!
//! Everything that mutates grid occupancy lives either here (part destruction) or
//! in the debris docking plugin (reserve/occupy). Progression runs only when the
//! registry changed, so an idle hull costs nothing per tick.

pub mod progression;
pub mod registry;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::error::{ShipError, ShipResult};
use crate::common::layers::hull_layers;
use crate::common::state::GameState;
use crate::common::tunables::{HullTunables, Tunables};
use crate::hex::HexGrid;
use crate::plugins::debris::docking::DockingLedger;
use crate::plugins::projectiles::blast::resolve_blasts;
use crate::plugins::projectiles::components::{Faction, Health};
use crate::plugins::projectiles::patterns::BulletPattern;
use crate::plugins::projectiles::shooters::Shooter;
use crate::plugins::world::PlayField;

use progression::HullProgression;
use registry::AttachmentRegistry;

const CORE_COLOR: Color = Color::srgb(0.2, 0.75, 0.9);
const PART_COLOR: Color = Color::srgb(0.62, 0.58, 0.5);
const IMMUNE_PART_COLOR: Color = Color::srgb(0.55, 0.85, 1.0);

// -----------------------------------------------------------------------------
// Components / messages
// -----------------------------------------------------------------------------

#[derive(Component, Debug, Clone, Copy)]
pub struct Hull;

/// A docked piece of debris, child of `hull`.
#[derive(Component, Debug, Clone, Copy)]
pub struct HullPart {
    pub hull: Entity,
}

#[derive(Component, Debug, Clone)]
pub struct HullStats {
    pub max_health: f32,
    /// Added to both base movement speeds.
    pub speed_bonus: f32,
}

impl HullStats {
    pub fn new(max_health: f32) -> Self {
        Self {
            max_health,
            speed_bonus: 0.0,
        }
    }

    /// Scale max health; current health is clamped to the new maximum.
    pub fn apply_health_modifier(&mut self, health: &mut Health, multiplier: f32) {
        self.max_health *= multiplier;
        health.set_max(self.max_health);
    }

    pub fn apply_speed_modifier(&mut self, amount: f32) {
        self.speed_bonus += amount;
    }
}

/// Written on every level transition, in the tick it happens.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChanged {
    pub hull: Entity,
    pub from: usize,
    pub to: usize,
    pub max_level: usize,
}

/// Everything the hull needs to accept debris, built and validated together.
#[derive(Bundle)]
pub struct HullCore {
    pub grid: HexGrid,
    pub registry: AttachmentRegistry,
    pub progression: HullProgression,
    pub ledger: DockingLedger,
}

impl HullCore {
    pub fn from_tunables(hull: &HullTunables) -> ShipResult<Self> {
        Ok(Self {
            grid: HexGrid::new(hull.hex_size)?,
            registry: AttachmentRegistry::default(),
            progression: HullProgression::new(
                hull.levels.clone(),
                hull.immunity,
                hull.hex_expansion,
            )?,
            ledger: DockingLedger::default(),
        })
    }
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

pub fn plugin(app: &mut App) {
    app.add_message::<LevelChanged>();

    app.add_systems(OnEnter(GameState::InGame), spawn_hull);

    app.add_systems(
        FixedPostUpdate,
        (
            destroy_broken_parts.after(resolve_blasts),
            check_progression.after(destroy_broken_parts),
            hull_destroyed.after(resolve_blasts),
        )
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        Update,
        (tint_parts, tint_hull).run_if(in_state(GameState::InGame)),
    );
}

// -----------------------------------------------------------------------------
// Spawn
// -----------------------------------------------------------------------------

fn spawn_hull(
    mut commands: Commands,
    tunables: Res<Tunables>,
    field: Option<Res<PlayField>>,
) -> Result<(), BevyError> {
    let field = field.ok_or(ShipError::MissingCollaborator {
        context: "PlayField resource",
    })?;
    let cfg = &tunables.hull;
    let core = HullCore::from_tunables(cfg)?;
    let start = field.clamp(Vec2::new(0.0, cfg.start_y));

    commands.spawn((
        Name::new("Hull"),
        Hull,
        core,
        HullStats::new(cfg.max_health),
        Health::new(cfg.max_health),
        Shooter::new(
            BulletPattern::Single,
            cfg.fire_rate,
            cfg.bullet_damage,
            tunables.bullets.player_speed,
            Faction::Player,
        ),
        Sprite {
            color: CORE_COLOR,
            custom_size: Some(Vec2::splat(cfg.core_radius * 2.0)),
            ..default()
        },
        Transform::from_translation(start.extend(1.0)),
        RigidBody::Dynamic,
        LockedAxes::ROTATION_LOCKED,
        Collider::circle(cfg.core_radius),
        hull_layers(),
        LinearVelocity::ZERO,
        DespawnOnExit(GameState::InGame),
    ));

    info!(
        "hull spawned: hex size {}, {} levels",
        cfg.hex_size,
        cfg.levels.len().max(1)
    );
    Ok(())
}

// -----------------------------------------------------------------------------
// Rules
// -----------------------------------------------------------------------------

/// Evaluate leveling for every hull whose registry changed this tick.
///
/// Immunity and offsets are written without tripping change detection; after a
/// level step the registry is re-flagged so the next tick checks again (a count
/// that crossed two thresholds climbs one level per tick).
pub fn check_progression(
    mut q_hull: Query<
        (
            Entity,
            &mut HexGrid,
            &mut AttachmentRegistry,
            &mut HullProgression,
        ),
        Changed<AttachmentRegistry>,
    >,
    mut q_parts: Query<&mut Transform, With<HullPart>>,
    mut writer: MessageWriter<LevelChanged>,
) {
    for (hull, mut grid, mut registry, mut progression) in &mut q_hull {
        let change = {
            let registry = registry.bypass_change_detection();
            let change = progression.check_for_level_change(&mut grid, registry);

            if change.is_some() {
                for a in registry.iter() {
                    if let Ok(mut tf) = q_parts.get_mut(a.entity) {
                        tf.translation = a.offset.extend(tf.translation.z);
                    }
                }
            }
            change
        };

        let Some(change) = change else {
            continue;
        };

        registry.set_changed();

        info!(
            "hull level {} -> {} ({} parts, {} immune, hex size {:.2})",
            change.from,
            change.to,
            registry.len(),
            registry.immune_count(),
            grid.hex_size()
        );

        writer.write(LevelChanged {
            hull,
            from: change.from,
            to: change.to,
            max_level: progression.max_level(),
        });
    }
}

/// Despawn parts whose health ran out and free their cells.
pub fn destroy_broken_parts(
    mut commands: Commands,
    q_parts: Query<(Entity, &HullPart, &Health), Changed<Health>>,
    mut q_hull: Query<(&mut HexGrid, &mut AttachmentRegistry), With<Hull>>,
) {
    for (e, part, hp) in &q_parts {
        if !hp.is_depleted() {
            continue;
        }

        let Ok((mut grid, mut registry)) = q_hull.get_mut(part.hull) else {
            debug!("part {e} outlived its hull");
            continue;
        };

        if let Some(a) = registry.remove(e) {
            grid.vacate(a.cell);
            info!("part at {} destroyed", a.cell);
        }
        commands.entity(e).despawn();
    }
}

fn hull_destroyed(
    q_hull: Query<&Health, (With<Hull>, Changed<Health>)>,
    mut next: ResMut<NextState<GameState>>,
) {
    for hp in &q_hull {
        if hp.is_depleted() {
            info!("hull destroyed");
            next.set(GameState::GameOver);
        }
    }
}

// -----------------------------------------------------------------------------
// Presentation
// -----------------------------------------------------------------------------

fn tint_parts(
    q_hull: Query<&AttachmentRegistry, Changed<AttachmentRegistry>>,
    mut q_sprites: Query<&mut Sprite, With<HullPart>>,
) {
    for registry in &q_hull {
        for a in registry.iter() {
            if let Ok(mut sprite) = q_sprites.get_mut(a.entity) {
                sprite.color = if a.is_immune() {
                    IMMUNE_PART_COLOR
                } else {
                    PART_COLOR
                };
            }
        }
    }
}

/// Hull core brightens with each fully occupied inner ring.
fn tint_hull(mut q: Query<(&HullProgression, &mut Sprite), (With<Hull>, Changed<HullProgression>)>) {
    for (progression, mut sprite) in &mut q {
        let lift = progression.ring_tier() as f32 * 0.08;
        sprite.color = Color::srgb(0.2 + lift, 0.75 + lift * 0.5, 0.9);
    }
}
