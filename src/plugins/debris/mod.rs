//! Debris plugin: loose scrap that drifts down the field and docks onto the hull.
//!
//! ```text
//! FixedUpdate:      spawn_debris (timer) + spawn_dropped_debris (enemy drops)
//!                   -> pull_debris (Pulling -> Attached) -> cull_debris
//! FixedPostUpdate:  detect_hull_contact -> resolve_docking_intents
//!                   -> release_abandoned_claims
//! ```
//!
//! A debris piece is a kinematic sensor whose collider radius is its detection
//! range; touching the hull (or any docked part) starts the docking protocol in
//! [`docking`].

pub mod docking;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use rand::Rng;

use crate::common::layers::debris_layers;
use crate::common::random;
use crate::common::state::GameState;
use crate::common::tunables::{BulletTunables, DebrisTunables, Tunables};
use crate::plugins::projectiles::patterns::BulletPattern;
use crate::plugins::world::PlayField;

use docking::{DockingIntent, DockingState};

const DEBRIS_COLOR: Color = Color::srgb(0.55, 0.5, 0.42);
const ARMED_DEBRIS_COLOR: Color = Color::srgb(0.8, 0.55, 0.3);

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Debris {
    pub detection_range: f32,
    pub pull_speed: f32,
    /// Multiplies the hull's max health on dock.
    pub health_modifier: f32,
    /// Added to the hull's speed on dock.
    pub speed_modifier: f32,
}

impl Debris {
    pub fn roll(cfg: &DebrisTunables, rng: &mut impl Rng) -> Self {
        Self {
            detection_range: random::between(
                [cfg.min_detection_range, cfg.max_detection_range],
                rng,
            ),
            pull_speed: cfg.pull_speed,
            health_modifier: cfg.health_modifier,
            speed_modifier: cfg.speed_modifier,
        }
    }
}

/// Weapon a debris piece brings with it; installed as a shooter on dock.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Armament {
    pub pattern: BulletPattern,
}

impl Armament {
    fn roll(bullets: &BulletTunables, rng: &mut impl Rng) -> Self {
        let pattern = match rng.random_range(0..7) {
            0 => BulletPattern::Single,
            1 => BulletPattern::Spread {
                count: 3,
                angle: 30.0,
            },
            2 => BulletPattern::Burst {
                count: 3,
                interval: 0.08,
            },
            3 => BulletPattern::RandomDirection { angle: 25.0 },
            4 => BulletPattern::Circular { count: 6 },
            5 => BulletPattern::Rocket {
                blast_radius: bullets.blast_radius,
            },
            _ => BulletPattern::Homing {
                turn_rate: bullets.homing_turn_rate,
            },
        };
        Self { pattern }
    }
}

/// An enemy died and left scrap at `position`.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct DebrisDrop {
    pub position: Vec2,
}

/// Timed debris rain. The stage director pauses it between stages and swaps
/// the interval.
#[derive(Resource, Debug, Clone)]
pub struct DebrisSpawner {
    interval: [f32; 2],
    timer: Timer,
    pub paused: bool,
}

impl DebrisSpawner {
    pub fn new(interval: [f32; 2]) -> Self {
        let first = interval[0].min(interval[1]).max(0.0);
        Self {
            interval,
            timer: Timer::from_seconds(first, TimerMode::Once),
            paused: false,
        }
    }

    #[inline]
    pub fn interval(&self) -> [f32; 2] {
        self.interval
    }

    /// New bounds apply from the next spawn on.
    pub fn set_interval(&mut self, interval: [f32; 2]) {
        self.interval = interval;
    }

    /// True when a piece should spawn this tick.
    pub fn tick(&mut self, delta: std::time::Duration, rng: &mut impl Rng) -> bool {
        if self.paused {
            return false;
        }

        self.timer.tick(delta);
        if !self.timer.is_finished() {
            return false;
        }

        let next = random::between(self.interval, rng).max(0.0);
        self.timer = Timer::from_seconds(next, TimerMode::Once);
        true
    }
}

pub fn plugin(app: &mut App) {
    let interval = app.world().get_resource::<Tunables>().map_or_else(
        || {
            let d = DebrisTunables::default();
            [d.min_interval, d.max_interval]
        },
        |t| [t.debris.min_interval, t.debris.max_interval],
    );

    app.insert_resource(DebrisSpawner::new(interval))
        .add_message::<DockingIntent>()
        .add_message::<DebrisDrop>();

    app.add_systems(OnEnter(GameState::InGame), reset_spawner);

    app.add_systems(
        FixedUpdate,
        (
            spawn_debris,
            spawn_dropped_debris,
            docking::pull_debris,
            cull_debris,
        )
            .chain()
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedPostUpdate,
        (
            docking::detect_hull_contact.after(CollisionEventSystems),
            docking::resolve_docking_intents.after(docking::detect_hull_contact),
            docking::release_abandoned_claims.after(docking::resolve_docking_intents),
        )
            .run_if(in_state(GameState::InGame)),
    );
}

pub fn reset_spawner(mut spawner: ResMut<DebrisSpawner>, tunables: Res<Tunables>) {
    *spawner = DebrisSpawner::new([tunables.debris.min_interval, tunables.debris.max_interval]);
}

/// Spawn one idle debris piece drifting down from `position`.
pub fn spawn_debris_piece(
    commands: &mut Commands,
    tunables: &Tunables,
    position: Vec2,
    rng: &mut impl Rng,
) -> Entity {
    let cfg = &tunables.debris;
    let debris = Debris::roll(cfg, rng);
    let armament = random::roll(cfg.armed_chance, rng)
        .then(|| Armament::roll(&tunables.bullets, rng));

    let color = if armament.is_some() {
        ARMED_DEBRIS_COLOR
    } else {
        DEBRIS_COLOR
    };

    let mut e = commands.spawn((
        Name::new("Debris"),
        debris,
        DockingState::Idle,
        Sprite::from_color(color, Vec2::splat(cfg.radius * 2.0)),
        Transform::from_translation(position.extend(0.5)),
        RigidBody::Kinematic,
        Collider::circle(debris.detection_range),
        Sensor,
        debris_layers(),
        CollisionEventsEnabled,
        LinearVelocity(Vec2::new(0.0, -cfg.drift_speed)),
        DespawnOnExit(GameState::InGame),
    ));
    if let Some(armament) = armament {
        e.insert(armament);
    }
    e.id()
}

fn spawn_debris(
    mut commands: Commands,
    time: Res<Time>,
    tunables: Res<Tunables>,
    field: Res<PlayField>,
    mut spawner: ResMut<DebrisSpawner>,
) {
    let mut rng = rand::rng();
    if spawner.tick(time.delta(), &mut rng) {
        let pos = field.top_spawn_point(&mut rng);
        spawn_debris_piece(&mut commands, &tunables, pos, &mut rng);
    }
}

fn spawn_dropped_debris(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut drops: MessageReader<DebrisDrop>,
) {
    let mut rng = rand::rng();
    for drop in drops.read() {
        spawn_debris_piece(&mut commands, &tunables, drop.position, &mut rng);
    }
}

/// Idle pieces that drifted past the cull boundary are gone for good.
fn cull_debris(
    mut commands: Commands,
    field: Res<PlayField>,
    q: Query<(Entity, &Transform, &DockingState), With<Debris>>,
) {
    for (e, tf, state) in &q {
        if *state == DockingState::Idle && !field.contains_with_margin(tf.translation.truncate()) {
            commands.entity(e).despawn();
        }
    }
}

#[cfg(test)]
mod tests;
