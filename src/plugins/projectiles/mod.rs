//! Projectiles plugin: **message-based producer → consumer** spawning + pooling.
//!
//! Producers never borrow the pool. Shooters write [`messages::SpawnBulletRequest`];
//! the allocator is the single writer that pops `BulletPool.free`, and the return
//! commit is the single writer that pushes it back.
//!
//! # Data flow
//! ```text
//!   Update (variable dt)
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ (A) run_shooters: cooldowns + queued burst shots                     │
//! │     writes: SpawnBulletRequest                                       │
//! │ (B) allocate_bullets_from_pool                                       │
//! │     pops BulletPool.free, rewrites state/transform/velocity/layers   │
//! └──────────────────────────────────────────────────────────────────────┘
//!                 │
//!   FixedUpdate   v
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ (C) steer_bullets: wave / homing velocity                            │
//! │ (D) expire_bullets: lifetime or out of field -> PendingReturn        │
//! │     fire_beams: raycast damage while a beam is firing                │
//! └──────────────────────────────────────────────────────────────────────┘
//!                 │
//!   FixedPostUpdate (after avian collision events)
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ (E) process_bullet_collisions: damage, immune absorb -> PendingReturn │
//! │     explosive bullets write Blast instead of dealing damage          │
//! │ (F) resolve_blasts: area damage around each Blast                    │
//! │ (G) return_to_pool_commit: PendingReturn -> Inactive, push free      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Capacity is the one runtime branch: an empty pool drops the request.

pub mod allocator;
pub mod beams;
pub mod blast;
pub mod collision;
pub mod commit;
pub mod components;
pub mod messages;
pub mod motion;
pub mod patterns;
pub mod pool;
pub mod shooters;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        let capacity = app
            .world()
            .get_resource::<Tunables>()
            .map_or_else(|| Tunables::default().bullets.pool_capacity, |t| t.bullets.pool_capacity);

        app.insert_resource(pool::BulletPool::new(capacity))
            .add_message::<messages::SpawnBulletRequest>()
            .add_message::<messages::Blast>()
            .add_systems(Startup, pool::init_bullet_pool);

        app.add_systems(
            Update,
            (
                shooters::run_shooters,
                allocator::allocate_bullets_from_pool.after(shooters::run_shooters),
                beams::draw_beams,
            )
                .run_if(in_state(GameState::InGame)),
        );

        app.add_systems(
            FixedUpdate,
            (
                (motion::steer_bullets, motion::expire_bullets).chain(),
                beams::fire_beams,
            )
                .run_if(in_state(GameState::InGame)),
        );

        app.add_systems(
            FixedPostUpdate,
            (
                collision::process_bullet_collisions.after(CollisionEventSystems),
                blast::resolve_blasts.after(collision::process_bullet_collisions),
                commit::return_to_pool_commit.after(collision::process_bullet_collisions),
            )
                .run_if(in_state(GameState::InGame)),
        );

        app.add_systems(
            OnExit(GameState::InGame),
            (commit::recall_all_bullets, commit::return_to_pool_commit).chain(),
        );
    }
}
