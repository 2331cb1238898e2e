//! Tunable gameplay constants.
//!
//! [`Tunables`] carries compiled defaults for every knob in the game. At plugin
//! build time `assets/tunables.toml` is read (if present) and any keys it sets
//! override the defaults; missing keys keep their compiled values because every
//! section is `#[serde(default)]`.

use bevy::prelude::*;
use serde::Deserialize;

use crate::common::error::{ShipError, ShipResult};
use crate::plugins::enemies::waves::{EnemyArchetype, EnemyWave, WaveEnemy};
use crate::plugins::hull::progression::{ImmunityPolicy, LevelConfig};
use crate::plugins::stages::StageConfig;

pub const TUNABLES_PATH: &str = "assets/tunables.toml";

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    /// Free the claimed cell when debris is destroyed mid-pull. With this off a
    /// destroyed puller leaves its cell Reserved for the rest of the run.
    pub release_abandoned_reservations: bool,
    pub field: FieldTunables,
    pub hull: HullTunables,
    pub debris: DebrisTunables,
    pub bullets: BulletTunables,
    pub beams: BeamTunables,
    pub enemies: EnemyTunables,
    pub obstacles: ObstacleTunables,
    pub camera: CameraTunables,
    pub stages: Vec<StageConfig>,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,
            release_abandoned_reservations: true,
            field: FieldTunables::default(),
            hull: HullTunables::default(),
            debris: DebrisTunables::default(),
            bullets: BulletTunables::default(),
            beams: BeamTunables::default(),
            enemies: EnemyTunables::default(),
            obstacles: ObstacleTunables::default(),
            camera: CameraTunables::default(),
            stages: default_stages(),
        }
    }
}

impl Tunables {
    pub fn from_toml_str(contents: &str, path: &str) -> ShipResult<Self> {
        toml::from_str(contents).map_err(|e| ShipError::ConfigParse {
            path: path.to_owned(),
            message: e.to_string(),
        })
    }

    /// Read `path`, falling back to compiled defaults when the file is missing or
    /// does not parse.
    pub fn load_or_default(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents, path) {
                Ok(loaded) => {
                    info!("loaded tunables from {path}");
                    loaded
                }
                Err(e) => {
                    warn!("{e}; using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("no {path} found; using compiled defaults");
                Self::default()
            }
        }
    }
}

/// Visible play area, centered on the world origin.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FieldTunables {
    pub half_width: f32,
    pub half_height: f32,
    /// Distance outside the field where enemies and debris appear.
    pub spawn_margin: f32,
    /// Distance outside the field after which anything is culled.
    pub despawn_margin: f32,
}

impl Default for FieldTunables {
    fn default() -> Self {
        Self {
            half_width: 360.0,
            half_height: 480.0,
            spawn_margin: 40.0,
            despawn_margin: 120.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HullTunables {
    pub hex_size: f32,
    /// Hex size change per level step.
    pub hex_expansion: f32,
    pub core_radius: f32,
    /// Collider radius of a docked part.
    pub part_radius: f32,
    pub part_health: f32,
    pub max_health: f32,
    pub horizontal_speed: f32,
    pub vertical_speed: f32,
    pub start_y: f32,
    pub immunity: ImmunityPolicy,
    pub levels: Vec<LevelConfig>,
    pub bullet_damage: f32,
    /// Shots per second from the core's forward gun.
    pub fire_rate: f32,
}

impl Default for HullTunables {
    fn default() -> Self {
        Self {
            hex_size: 16.0,
            hex_expansion: 2.0,
            core_radius: 14.0,
            part_radius: 6.0,
            part_health: 30.0,
            max_health: 100.0,
            horizontal_speed: 260.0,
            vertical_speed: 200.0,
            start_y: -300.0,
            immunity: ImmunityPolicy::Both,
            levels: vec![
                LevelConfig::new(3, 0),
                LevelConfig::new(6, 2),
                LevelConfig::new(10, 4),
                LevelConfig::new(15, 6),
                LevelConfig::new(21, 9),
                LevelConfig::new(28, 12),
            ],
            bullet_damage: 1.0,
            fire_rate: 4.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DebrisTunables {
    pub min_interval: f32,
    pub max_interval: f32,
    pub drift_speed: f32,
    pub pull_speed: f32,
    pub min_detection_range: f32,
    pub max_detection_range: f32,
    /// Remaining distance at which a pulled piece snaps onto its cell.
    pub attach_epsilon: f32,
    /// Multiplies the hull's max health on dock.
    pub health_modifier: f32,
    /// Added to the hull's movement speed on dock.
    pub speed_modifier: f32,
    /// Chance in [0, 1] that a spawned piece carries a weapon.
    pub armed_chance: f32,
    pub radius: f32,
}

impl Default for DebrisTunables {
    fn default() -> Self {
        Self {
            min_interval: 2.0,
            max_interval: 5.0,
            drift_speed: 60.0,
            pull_speed: 180.0,
            min_detection_range: 40.0,
            max_detection_range: 100.0,
            attach_epsilon: 0.1,
            health_modifier: 1.1,
            speed_modifier: 5.0,
            armed_chance: 0.3,
            radius: 6.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BulletTunables {
    pub pool_capacity: usize,
    pub radius: f32,
    pub lifetime: f32,
    pub player_speed: f32,
    pub enemy_speed: f32,
    /// Degrees per second a homing bullet may turn.
    pub homing_turn_rate: f32,
    /// Blast radius of rockets and missiles carried by armed debris.
    pub blast_radius: f32,
}

impl Default for BulletTunables {
    fn default() -> Self {
        Self {
            pool_capacity: 768,
            radius: 4.0,
            lifetime: 5.0,
            player_speed: 520.0,
            enemy_speed: 220.0,
            homing_turn_rate: 120.0,
            blast_radius: 32.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BeamTunables {
    pub damage_per_second: f32,
    pub max_length: f32,
    pub firing_secs: f32,
    pub cooldown_secs: f32,
    pub width: f32,
}

impl Default for BeamTunables {
    fn default() -> Self {
        Self {
            damage_per_second: 10.0,
            max_length: 400.0,
            firing_secs: 1.0,
            cooldown_secs: 2.0,
            width: 4.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnemyTunables {
    pub health: f32,
    pub speed: f32,
    pub radius: f32,
    pub lifespan: f32,
    pub bullet_damage: f32,
    pub fire_rate: f32,
    /// Chance in [0, 1] to leave debris behind on death.
    pub drop_chance: f32,
    pub strafe_amount: f32,
    pub strafe_speed: f32,
    pub strafe_pause: [f32; 2],
    pub strafe_resume: [f32; 2],
}

impl Default for EnemyTunables {
    fn default() -> Self {
        Self {
            health: 3.0,
            speed: 90.0,
            radius: 14.0,
            lifespan: 30.0,
            bullet_damage: 10.0,
            fire_rate: 0.6,
            drop_chance: 0.5,
            strafe_amount: 80.0,
            strafe_speed: 2.0,
            strafe_pause: [1.0, 3.0],
            strafe_resume: [5.0, 10.0],
        }
    }
}

/// Scrolling blockers. How many may be on the field at once is set per stage.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObstacleTunables {
    pub spawn_interval: f32,
    pub scroll_speed: f32,
    pub min_size: f32,
    pub max_size: f32,
}

impl Default for ObstacleTunables {
    fn default() -> Self {
        Self {
            spawn_interval: 3.0,
            scroll_speed: 80.0,
            min_size: 24.0,
            max_size: 56.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraTunables {
    /// Orthographic scale at level 1.
    pub min_zoom: f32,
    /// Orthographic scale at the top level.
    pub max_zoom: f32,
    pub zoom_speed: f32,
}

impl Default for CameraTunables {
    fn default() -> Self {
        Self {
            min_zoom: 1.0,
            max_zoom: 1.8,
            zoom_speed: 2.0,
        }
    }
}

fn default_stages() -> Vec<StageConfig> {
    use EnemyArchetype::*;

    let wave = |enemies: Vec<WaveEnemy>, interval: f32| EnemyWave { enemies, interval };

    vec![
        StageConfig {
            name: "Outer Belt".into(),
            required_hull_level: 1,
            clear_color: [0.05, 0.05, 0.07],
            transition_secs: 0.0,
            debris_interval: [2.0, 4.0],
            max_obstacles: 0,
            waves: vec![
                wave(vec![WaveEnemy::new(Scout, 4, 0.8, false)], 1.0),
                wave(
                    vec![
                        WaveEnemy::new(Scout, 3, 0.6, true),
                        WaveEnemy::new(Gunner, 2, 1.2, false),
                    ],
                    1.5,
                ),
            ],
        },
        StageConfig {
            name: "Scrap Nebula".into(),
            required_hull_level: 3,
            clear_color: [0.08, 0.04, 0.10],
            transition_secs: 2.0,
            debris_interval: [1.5, 3.5],
            max_obstacles: 3,
            waves: vec![
                wave(
                    vec![
                        WaveEnemy::new(Gunner, 3, 1.0, false),
                        WaveEnemy::new(Spinner, 1, 0.0, false),
                    ],
                    2.0,
                ),
                wave(
                    vec![
                        WaveEnemy::new(Sprayer, 3, 1.5, true),
                        WaveEnemy::new(Rocketeer, 2, 1.0, false),
                    ],
                    1.0,
                ),
            ],
        },
        StageConfig {
            name: "Core Wastes".into(),
            required_hull_level: 5,
            clear_color: [0.10, 0.03, 0.03],
            transition_secs: 2.0,
            debris_interval: [1.0, 3.0],
            max_obstacles: 5,
            waves: vec![
                wave(
                    vec![
                        WaveEnemy::new(Spinner, 2, 2.0, false),
                        WaveEnemy::new(Bomber, 2, 1.5, true),
                        WaveEnemy::new(Beamer, 1, 0.0, false),
                    ],
                    2.0,
                ),
                wave(
                    vec![
                        WaveEnemy::new(Hunter, 3, 1.0, true),
                        WaveEnemy::new(Beamer, 2, 2.0, false),
                    ],
                    1.5,
                ),
                wave(
                    vec![
                        WaveEnemy::new(Sprayer, 2, 1.0, false),
                        WaveEnemy::new(Bomber, 1, 0.0, false),
                        WaveEnemy::new(Gunner, 4, 0.5, true),
                    ],
                    1.5,
                ),
            ],
        },
    ]
}
