//! Stage director: swaps wave lists, debris pacing, the obstacle cap and the
//! backdrop as the hull levels up.
//!
//! ```text
//! OnEnter(InGame): start_first_stage (after the debris and obstacle spawners reset)
//! Update:          track_hull_level -> run_stage_transition -> report_completion
//!
//!   LevelChanged ... level >= next.required_hull_level
//!        -> pause spawners -> wait transition_secs -> install stage -> resume
//! ```
//!
//! Only one transition is in flight at a time. A hull that jumps past several
//! requirements walks through the stages one after another.

use bevy::prelude::*;
use serde::Deserialize;

use crate::common::schedule::TaskQueue;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::debris::{DebrisSpawner, reset_spawner};
use crate::plugins::enemies::Enemy;
use crate::plugins::enemies::waves::{EnemyWave, WaveSpawner};
use crate::plugins::hull::LevelChanged;
use crate::plugins::obstacles::{ObstacleSpawner, reset_obstacles};

fn default_clear_color() -> [f32; 3] {
    [0.05, 0.05, 0.07]
}

fn default_debris_interval() -> [f32; 2] {
    [2.0, 5.0]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StageConfig {
    pub name: String,
    pub required_hull_level: usize,
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 3],
    /// Quiet time with every spawner paused before the stage starts.
    #[serde(default)]
    pub transition_secs: f32,
    #[serde(default = "default_debris_interval")]
    pub debris_interval: [f32; 2],
    /// Cap on obstacles scrolling at once; zero keeps the lane clear.
    #[serde(default)]
    pub max_obstacles: usize,
    #[serde(default)]
    pub waves: Vec<EnemyWave>,
}

impl StageConfig {
    #[inline]
    pub fn clear_color(&self) -> Color {
        let [r, g, b] = self.clear_color;
        Color::srgb(r, g, b)
    }
}

#[derive(Resource, Debug, Default)]
pub struct StageDirector {
    stages: Vec<StageConfig>,
    current: Option<usize>,
    pending: Option<usize>,
    transition: TaskQueue<usize>,
    hull_level: usize,
    completed: bool,
}

impl StageDirector {
    pub fn new(stages: Vec<StageConfig>) -> Self {
        Self {
            stages,
            hull_level: 1,
            ..default()
        }
    }

    #[inline]
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_stage(&self) -> Option<&StageConfig> {
        self.current.and_then(|i| self.stages.get(i))
    }

    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.pending.is_some()
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn stage(&self, index: usize) -> Option<&StageConfig> {
        self.stages.get(index)
    }

    pub fn set_hull_level(&mut self, level: usize) {
        self.hull_level = level;
    }

    /// Queue the stage after the current one if the hull meets its requirement.
    /// Returns the queued index.
    pub fn request_next(&mut self) -> Option<usize> {
        if self.pending.is_some() {
            return None;
        }

        let next = self.current.map_or(0, |i| i + 1);
        let stage = self.stages.get(next)?;
        if self.hull_level < stage.required_hull_level {
            return None;
        }

        self.pending = Some(next);
        self.transition.push_after(stage.transition_secs, next);
        Some(next)
    }

    /// Returns the stage whose transition finished this tick.
    pub fn tick(&mut self, delta: std::time::Duration) -> Option<usize> {
        let ready = self.transition.tick(delta).pop()?;
        self.current = Some(ready);
        self.pending = None;
        Some(ready)
    }

    #[inline]
    pub fn is_last_stage(&self) -> bool {
        self.current.is_some_and(|i| i + 1 >= self.stages.len())
    }
}

pub fn plugin(app: &mut App) {
    let stages = app
        .world()
        .get_resource::<Tunables>()
        .map_or_else(|| Tunables::default().stages, |t| t.stages.clone());

    app.insert_resource(StageDirector::new(stages));

    app.add_systems(
        OnEnter(GameState::InGame),
        start_first_stage.after(reset_spawner).after(reset_obstacles),
    );

    app.add_systems(
        Update,
        (track_hull_level, run_stage_transition, report_completion)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
}

fn pause_spawners(
    waves: &mut WaveSpawner,
    debris: &mut DebrisSpawner,
    obstacles: &mut ObstacleSpawner,
) {
    waves.paused = true;
    debris.paused = true;
    obstacles.paused = true;
}

fn start_first_stage(
    tunables: Res<Tunables>,
    mut director: ResMut<StageDirector>,
    mut waves: ResMut<WaveSpawner>,
    mut debris: ResMut<DebrisSpawner>,
    mut obstacles: ResMut<ObstacleSpawner>,
) {
    *director = StageDirector::new(tunables.stages.clone());
    waves.load(Vec::new());
    pause_spawners(&mut waves, &mut debris, &mut obstacles);

    if director.request_next().is_none() {
        warn!("no stage is open to a level 1 hull; spawners stay paused");
    }
}

fn track_hull_level(
    mut changes: MessageReader<LevelChanged>,
    mut director: ResMut<StageDirector>,
    mut waves: ResMut<WaveSpawner>,
    mut debris: ResMut<DebrisSpawner>,
    mut obstacles: ResMut<ObstacleSpawner>,
) {
    for change in changes.read() {
        director.set_hull_level(change.to);
    }

    let Some(next) = director.request_next() else {
        return;
    };
    pause_spawners(&mut waves, &mut debris, &mut obstacles);

    if let Some(stage) = director.stage(next) {
        info!(
            "stage '{}' begins in {:.1}s",
            stage.name, stage.transition_secs
        );
    }
}

fn run_stage_transition(
    mut commands: Commands,
    time: Res<Time>,
    mut director: ResMut<StageDirector>,
    mut waves: ResMut<WaveSpawner>,
    mut debris: ResMut<DebrisSpawner>,
    mut obstacles: ResMut<ObstacleSpawner>,
) {
    if director.tick(time.delta()).is_none() {
        return;
    }
    let Some(stage) = director.current_stage() else {
        return;
    };

    waves.load(stage.waves.clone());
    waves.paused = false;
    debris.set_interval(stage.debris_interval);
    debris.paused = false;
    obstacles.set_max_active(stage.max_obstacles);
    obstacles.paused = false;
    commands.insert_resource(ClearColor(stage.clear_color()));

    info!(
        "stage '{}' started ({} waves)",
        stage.name,
        stage.waves.len()
    );
}

/// The last stage is done once its final wave has spawned and been cleared.
fn report_completion(
    mut director: ResMut<StageDirector>,
    waves: Res<WaveSpawner>,
    q_enemies: Query<(), With<Enemy>>,
) {
    if director.is_completed()
        || director.is_transitioning()
        || !director.is_last_stage()
        || !waves.is_exhausted()
        || !q_enemies.is_empty()
    {
        return;
    }

    director.completed = true;
    info!("all stages completed");
}
