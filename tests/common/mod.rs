//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `ship_eater::game::configure_headless` to install gameplay plugins.
//!
//! Time advances a fixed 16 ms per `app.update()`, so fixed-step systems run
//! about once per frame regardless of wall-clock speed.

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::ecs::system::RunSystemOnce;
use bevy::input::InputPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use ship_eater::common::tunables::Tunables;
use ship_eater::plugins::debris::spawn_debris_piece;
use ship_eater::plugins::hull::Hull;
use ship_eater::plugins::stages::StageConfig;

pub const STEP: Duration = Duration::from_millis(16);

pub fn app_headless() -> App {
    build(None)
}

/// Headless app running on `tunables` instead of the file on disk.
pub fn app_headless_with(tunables: Tunables) -> App {
    build(Some(tunables))
}

fn build(tunables: Option<Tunables>) -> App {
    let mut app = App::new();

    // AssetPlugin + ScenePlugin so SceneSpawner exists; InputPlugin for the key state.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        InputPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(STEP));

    if let Some(tunables) = tunables {
        app.insert_resource(tunables);
    }

    ship_eater::game::configure_headless(&mut app);
    // `App::run` does this; driving `update()` by hand must finish plugin setup first.
    app.finish();
    app.cleanup();
    app
}

/// One stage, no enemy waves, no timed debris, unarmed debris only.
pub fn quiet_tunables() -> Tunables {
    let mut t = Tunables::default();
    t.debris.min_interval = 1_000.0;
    t.debris.max_interval = 1_000.0;
    t.debris.armed_chance = 0.0;
    t.stages = vec![StageConfig {
        name: "Quiet".into(),
        required_hull_level: 1,
        clear_color: [0.0, 0.0, 0.0],
        transition_secs: 0.0,
        debris_interval: [1_000.0, 1_000.0],
        max_obstacles: 0,
        waves: Vec::new(),
    }];
    t
}

pub fn run(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

pub fn hull(app: &mut App) -> Entity {
    app.world_mut()
        .query_filtered::<Entity, With<Hull>>()
        .single(app.world())
        .expect("exactly one hull")
}

pub fn hull_position(app: &mut App) -> Vec2 {
    let hull = hull(app);
    app.world()
        .get::<Transform>(hull)
        .expect("hull transform")
        .translation
        .truncate()
}

/// Spawn an idle debris piece at `position` the way the spawner does.
pub fn drop_debris(app: &mut App, position: Vec2) -> Entity {
    app.world_mut()
        .run_system_once(move |mut commands: Commands, t: Res<Tunables>| {
            spawn_debris_piece(&mut commands, &t, position, &mut rand::rng())
        })
        .expect("spawn debris")
}
