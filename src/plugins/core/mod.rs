//! Core plugin: shared resources and global settings.
//!
//! Tunables already inserted by the caller (tests, the headless harness) win over
//! the file on disk.

use crate::common::tunables::{TUNABLES_PATH, Tunables};
use bevy::prelude::*;

pub fn plugin(app: &mut App) {
    if !app.world().contains_resource::<Tunables>() {
        app.insert_resource(Tunables::load_or_default(TUNABLES_PATH));
    }

    let clear = app
        .world()
        .resource::<Tunables>()
        .stages
        .first()
        .map_or(Color::srgb(0.05, 0.05, 0.07), |s| s.clear_color());
    app.insert_resource(ClearColor(clear));
}
