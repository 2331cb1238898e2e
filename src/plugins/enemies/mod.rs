//! Enemies plugin: wave-spawned ships that fly down (or in from the sides),
//! strafe, shoot, and sometimes leave debris behind.
//!
//! ```text
//! Update:           advance_waves -> spawn_queued_enemies -> cull_enemies
//! FixedUpdate:      move_enemies, tick_lifespans, flash_on_hit
//! FixedPostUpdate:  process_bullet_collisions -> resolve_blasts -> enemy_death_trigger
//!                   -> enemy_death_progress
//! PostUpdate:       despawn_marked_enemies
//! ```
//!
//! Enemies are never despawned inside the fixed step. Death is a short
//! `Dying` animation, then `PendingDespawn`, then a PostUpdate despawn.
//!
//! An enemy moves along its local +Y. Top spawns are rotated to face down the
//! field and side spawns face inward, so movement and firing both follow the
//! spawn rotation.

pub mod waves;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::Occluder2d;
use rand::Rng;

use crate::common::layers::{Layer, enemy_layers};
use crate::common::random;
use crate::common::state::GameState;
use crate::common::tunables::{EnemyTunables, Tunables};
use crate::plugins::debris::DebrisDrop;
use crate::plugins::projectiles::beams::{BeamEmitter, BeamRay};
use crate::plugins::projectiles::blast::resolve_blasts;
use crate::plugins::projectiles::components::{Faction, Health};
use crate::plugins::projectiles::shooters::Shooter;
use crate::plugins::world::PlayField;

use waves::{EnemyArchetype, WaveSpawner, advance_waves, spawn_queued_enemies};

const DEATH_SECS: f32 = 0.35;
const HIT_FLASH_SECS: f32 = 0.1;
const HIT_FLASH_COLOR: Color = Color::srgb(1.0, 0.1, 0.1);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enemy;

#[derive(Component, Debug, Clone)]
pub enum EnemyLifeState {
    Alive,
    Dying { timer: Timer },
    Dead,
}

/// Despawned in PostUpdate, outside the fixed step.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct EnemyMotion {
    pub speed: f32,
}

/// Sideways sway. Active for a `resume` window, idle for a `pause` window,
/// and so on for the enemy's whole life.
#[derive(Component, Debug, Clone)]
pub struct Strafe {
    amount: f32,
    speed: f32,
    /// +1 or -1 along the local X axis.
    direction: f32,
    phase: f32,
    active: bool,
    window: Timer,
    pause: [f32; 2],
    resume: [f32; 2],
}

impl Strafe {
    pub fn roll(cfg: &EnemyTunables, rng: &mut impl Rng) -> Self {
        Self {
            amount: cfg.strafe_amount,
            speed: cfg.strafe_speed,
            direction: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
            phase: rng.random_range(0.0..std::f32::consts::TAU),
            active: true,
            window: Timer::from_seconds(random::between(cfg.strafe_resume, rng), TimerMode::Once),
            pause: cfg.strafe_pause,
            resume: cfg.strafe_resume,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance by `dt` and return the lateral speed along local X.
    pub fn advance(&mut self, delta: std::time::Duration, rng: &mut impl Rng) -> f32 {
        self.window.tick(delta);
        if self.window.is_finished() {
            self.active = !self.active;
            let range = if self.active { self.resume } else { self.pause };
            self.window = Timer::from_seconds(random::between(range, rng), TimerMode::Once);
        }

        if !self.active {
            return 0.0;
        }
        self.phase += self.speed * delta.as_secs_f32();
        self.phase.sin() * self.amount * self.direction
    }
}

/// Time until the enemy dies on its own.
#[derive(Component, Debug, Clone)]
pub struct Lifespan(pub Timer);

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct DropsDebris {
    pub chance: f32,
}

/// Brief red tint after taking damage.
#[derive(Component, Debug, Clone)]
pub struct HitFlash {
    base: Color,
    last_health: f32,
    timer: Timer,
}

impl HitFlash {
    fn new(base: Color, health: f32) -> Self {
        let mut timer = Timer::from_seconds(HIT_FLASH_SECS, TimerMode::Once);
        timer.finish();
        Self {
            base,
            last_health: health,
            timer,
        }
    }
}

pub fn plugin(app: &mut App) {
    app.insert_resource(WaveSpawner::default());

    app.add_systems(
        Update,
        (advance_waves, spawn_queued_enemies, cull_enemies)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedUpdate,
        (move_enemies, tick_lifespans, flash_on_hit).run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedPostUpdate,
        (
            enemy_death_trigger.after(resolve_blasts),
            enemy_death_progress.after(enemy_death_trigger),
        )
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        PostUpdate,
        despawn_marked_enemies.run_if(in_state(GameState::InGame)),
    );
}

/// Membership stays Enemy, filters go empty: a dying enemy stops taking hits.
#[inline]
fn non_interacting_enemy_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [] as [Layer; 0])
}

/// Spawn one enemy at `position`, moving (and firing) along `facing`.
pub fn spawn_enemy(
    commands: &mut Commands,
    tunables: &Tunables,
    archetype: EnemyArchetype,
    position: Vec2,
    facing: Vec2,
    rng: &mut impl Rng,
) -> Entity {
    let cfg = &tunables.enemies;
    let profile = archetype.profile();
    let radius = cfg.radius * profile.size;
    let health = cfg.health * profile.health;
    let rotation = Quat::from_rotation_z(Vec2::Y.angle_to(facing.normalize_or(Vec2::NEG_Y)));

    let shooter = Shooter::new(
        profile.pattern,
        cfg.fire_rate * profile.fire_rate,
        cfg.bullet_damage,
        tunables.bullets.enemy_speed,
        Faction::Enemy,
    )
    .with_facing(Vec2::Y);

    let mut e = commands.spawn((
        Name::new(format!("{archetype:?}")),
        Enemy,
        archetype,
        EnemyLifeState::Alive,
        Health::new(health),
        EnemyMotion {
            speed: cfg.speed * profile.speed,
        },
        Lifespan(Timer::from_seconds(cfg.lifespan, TimerMode::Once)),
        DropsDebris {
            chance: cfg.drop_chance,
        },
        shooter,
        HitFlash::new(profile.color, health),
        Sprite::from_color(profile.color, Vec2::splat(radius * 2.0)),
        Transform::from_translation(position.extend(1.0)).with_rotation(rotation),
    ));
    e.insert((
        RigidBody::Kinematic,
        Collider::circle(radius),
        enemy_layers(),
        LinearVelocity::ZERO,
        Occluder2d::circle(radius),
        DespawnOnExit(GameState::InGame),
    ));
    if profile.strafes {
        e.insert(Strafe::roll(cfg, rng));
    }
    if profile.beam {
        e.insert(BeamEmitter::new(&tunables.beams, Faction::Enemy)).with_child((
            Name::new("BeamRay"),
            BeamRay,
            Sprite::from_color(profile.color.with_alpha(0.8), Vec2::new(tunables.beams.width, 1.0)),
            Transform::from_xyz(0.0, 0.0, -0.1),
            Visibility::Hidden,
        ));
    }
    e.id()
}

/// Forward along local +Y plus any strafe along local +X.
fn move_enemies(
    time: Res<Time>,
    mut q: Query<
        (
            &Transform,
            &EnemyMotion,
            &EnemyLifeState,
            Option<&mut Strafe>,
            &mut LinearVelocity,
        ),
        With<Enemy>,
    >,
) {
    let mut rng = rand::rng();

    for (tf, motion, life, strafe, mut vel) in &mut q {
        if !matches!(life, EnemyLifeState::Alive) {
            vel.0 = Vec2::ZERO;
            continue;
        }

        let forward = (tf.rotation * Vec3::Y).truncate();
        let right = (tf.rotation * Vec3::X).truncate();
        let lateral = strafe.map_or(0.0, |mut s| s.advance(time.delta(), &mut rng));

        vel.0 = forward * motion.speed + right * lateral;
    }
}

/// An expired lifespan kills the enemy the same way bullets do.
fn tick_lifespans(time: Res<Time>, mut q: Query<(&mut Lifespan, &mut Health), With<Enemy>>) {
    for (mut lifespan, mut hp) in &mut q {
        if lifespan.0.tick(time.delta()).just_finished() {
            hp.current = 0.0;
        }
    }
}

fn flash_on_hit(time: Res<Time>, mut q: Query<(&Health, &mut HitFlash, &mut Sprite), With<Enemy>>) {
    for (hp, mut flash, mut sprite) in &mut q {
        if hp.current < flash.last_health {
            flash.timer.reset();
            sprite.color = HIT_FLASH_COLOR;
        }
        flash.last_health = hp.current;

        if flash.timer.is_finished() {
            continue;
        }
        if flash.timer.tick(time.delta()).just_finished() {
            sprite.color = flash.base;
        }
    }
}

/// Alive -> Dying once health is gone. Stops collisions, bullets and beams, and
/// rolls the debris drop.
pub fn enemy_death_trigger(
    mut q: Query<
        (
            &Health,
            &Transform,
            &DropsDebris,
            &mut EnemyLifeState,
            &mut CollisionLayers,
            &mut Shooter,
            Option<&mut BeamEmitter>,
        ),
        (With<Enemy>, Without<PendingDespawn>),
    >,
    mut drops: MessageWriter<DebrisDrop>,
) {
    let mut rng = rand::rng();

    for (hp, tf, drop, mut life, mut layers, mut shooter, beam) in &mut q {
        if !matches!(*life, EnemyLifeState::Alive) || !hp.is_depleted() {
            continue;
        }

        *life = EnemyLifeState::Dying {
            timer: Timer::from_seconds(DEATH_SECS, TimerMode::Once),
        };
        *layers = non_interacting_enemy_layers();
        shooter.enabled = false;
        if let Some(mut beam) = beam {
            beam.enabled = false;
        }

        if random::roll(drop.chance, &mut rng) {
            drops.write(DebrisDrop {
                position: tf.translation.truncate(),
            });
        }
    }
}

/// Shrink and fade, then mark for despawn.
pub fn enemy_death_progress(
    time: Res<Time>,
    mut commands: Commands,
    mut q: Query<
        (Entity, &mut EnemyLifeState, &mut Sprite, &mut Transform),
        (With<Enemy>, Without<PendingDespawn>),
    >,
) {
    for (e, mut life, mut sprite, mut tf) in &mut q {
        let EnemyLifeState::Dying { timer } = &mut *life else {
            continue;
        };

        timer.tick(time.delta());
        let t = timer.fraction();

        tf.scale = Vec3::splat(1.0 - t);
        sprite.color = sprite.color.with_alpha(1.0 - t);

        if timer.is_finished() {
            *life = EnemyLifeState::Dead;
            commands.entity(e).insert(PendingDespawn);
        }
    }
}

/// Live enemies that left through the cull boundary go without dropping.
fn cull_enemies(
    mut commands: Commands,
    field: Res<PlayField>,
    q: Query<(Entity, &Transform), (With<Enemy>, Without<PendingDespawn>)>,
) {
    for (e, tf) in &q {
        if !field.contains_with_margin(tf.translation.truncate()) {
            commands.entity(e).insert(PendingDespawn);
        }
    }
}

fn despawn_marked_enemies(mut commands: Commands, q: Query<Entity, With<PendingDespawn>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}
