//! World plugin: the play field bounds and the backdrop behind them.
//!
//! The field is an axis-aligned rectangle centered on the origin. Things spawn in
//! a band `spawn_margin` outside it and are culled once they drift
//! `despawn_margin` outside it.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use rand::Rng;

use crate::common::state::GameState;
use crate::common::tunables::{FieldTunables, Tunables};

const STAR_COUNT: usize = 90;
const BORDER_THICKNESS: f32 = 4.0;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PlayField {
    pub half_extents: Vec2,
    pub spawn_margin: f32,
    pub despawn_margin: f32,
}

impl PlayField {
    pub fn from_tunables(field: &FieldTunables) -> Self {
        Self {
            half_extents: Vec2::new(field.half_width, field.half_height),
            spawn_margin: field.spawn_margin,
            despawn_margin: field.despawn_margin,
        }
    }

    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(-self.half_extents, self.half_extents)
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.abs().cmple(self.half_extents).all()
    }

    /// Still inside the cull boundary.
    #[inline]
    pub fn contains_with_margin(&self, p: Vec2) -> bool {
        p.abs()
            .cmple(self.half_extents + Vec2::splat(self.despawn_margin))
            .all()
    }

    /// Random point in the band above the top edge.
    pub fn top_spawn_point(&self, rng: &mut impl Rng) -> Vec2 {
        let hw = self.half_extents.x;
        Vec2::new(
            rng.random_range(-hw..=hw),
            self.half_extents.y + self.spawn_margin,
        )
    }

    /// Random point beside the upper half of the field, and the inward direction.
    pub fn side_spawn_point(&self, rng: &mut impl Rng) -> (Vec2, Vec2) {
        let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let y = rng.random_range(0.0..=self.half_extents.y);
        let pos = Vec2::new(side * (self.half_extents.x + self.spawn_margin), y);
        (pos, Vec2::new(-side, 0.0))
    }
}

impl Default for PlayField {
    fn default() -> Self {
        Self::from_tunables(&FieldTunables::default())
    }
}

pub fn plugin(app: &mut App) {
    let field = app
        .world()
        .get_resource::<Tunables>()
        .map_or_else(PlayField::default, |t| PlayField::from_tunables(&t.field));

    app.insert_resource(field)
        .add_systems(OnEnter(GameState::InGame), (spawn_border, spawn_stars));
}

#[derive(Component)]
pub struct FieldBorder;

fn spawn_border(mut commands: Commands, field: Res<PlayField>) {
    let color = Color::srgb(0.25, 0.27, 0.33);
    let h = field.half_extents;
    let t = BORDER_THICKNESS;

    let edges = [
        ("BorderTop", Vec2::new(0.0, h.y + t * 0.5), Vec2::new(h.x * 2.0 + t * 2.0, t)),
        ("BorderBottom", Vec2::new(0.0, -h.y - t * 0.5), Vec2::new(h.x * 2.0 + t * 2.0, t)),
        ("BorderLeft", Vec2::new(-h.x - t * 0.5, 0.0), Vec2::new(t, h.y * 2.0)),
        ("BorderRight", Vec2::new(h.x + t * 0.5, 0.0), Vec2::new(t, h.y * 2.0)),
    ];

    for (name, pos, size) in edges {
        commands.spawn((
            Name::new(name),
            FieldBorder,
            Sprite::from_color(color, size),
            Transform::from_translation(pos.extend(-1.0)),
            DespawnOnExit(GameState::InGame),
        ));
    }
}

/// Static starfield; solid-color sprites so the game ships without image assets.
fn spawn_stars(mut commands: Commands, field: Res<PlayField>) {
    let mut rng = rand::rng();
    let h = field.half_extents;

    for _ in 0..STAR_COUNT {
        let pos = Vec2::new(rng.random_range(-h.x..=h.x), rng.random_range(-h.y..=h.y));
        let grey = rng.random_range(0.25..0.6);
        let size = rng.random_range(1.0..3.0);

        commands.spawn((
            Sprite::from_color(Color::srgb(grey, grey, grey + 0.05), Vec2::splat(size)),
            Transform::from_translation(pos.extend(-5.0)),
            DespawnOnExit(GameState::InGame),
        ));
    }
}

#[cfg(test)]
mod tests;
