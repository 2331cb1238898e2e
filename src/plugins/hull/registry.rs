//! Attachments docked onto the hull.
//!
//! The registry is the single owner of each attachment's cell, immunity flag and
//! hull-relative offset. It never decides immunity itself; progression does.

use bevy::prelude::*;

use crate::hex::math::{self, AxialCoord};
use crate::hex::HexGrid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    pub entity: Entity,
    pub cell: AxialCoord,
    /// Granted by a level transition.
    pub immune: bool,
    /// Granted by a fully occupied inner ring; rebuilt on every progression check.
    pub ring_immune: bool,
    /// Position relative to the hull at the grid's current hex size.
    pub offset: Vec2,
}

impl Attachment {
    pub fn new(entity: Entity, cell: AxialCoord, grid: &HexGrid) -> Self {
        Self {
            entity,
            cell,
            immune: false,
            ring_immune: false,
            offset: grid.world_offset(cell),
        }
    }

    #[inline]
    pub fn is_immune(&self) -> bool {
        self.immune || self.ring_immune
    }
}

#[derive(Component, Debug, Default, Clone)]
pub struct AttachmentRegistry {
    attachments: Vec<Attachment>,
}

impl AttachmentRegistry {
    pub fn add(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// Remove an attachment; a no-op for unknown entities.
    pub fn remove(&mut self, entity: Entity) -> Option<Attachment> {
        let idx = self.attachments.iter().position(|a| a.entity == entity)?;
        Some(self.attachments.remove(idx))
    }

    pub fn get(&self, entity: Entity) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.entity == entity)
    }

    pub fn is_immune(&self, entity: Entity) -> bool {
        self.get(entity).is_some_and(Attachment::is_immune)
    }

    /// Returns false if the entity is not registered.
    pub fn set_immune(&mut self, entity: Entity, immune: bool) -> bool {
        match self.attachments.iter_mut().find(|a| a.entity == entity) {
            Some(a) => {
                a.immune = immune;
                true
            }
            None => false,
        }
    }

    pub fn clear_immunity(&mut self) {
        for a in &mut self.attachments {
            a.immune = false;
        }
    }

    /// Returns false if the entity is not registered.
    pub fn set_ring_immune(&mut self, entity: Entity, immune: bool) -> bool {
        match self.attachments.iter_mut().find(|a| a.entity == entity) {
            Some(a) => {
                a.ring_immune = immune;
                true
            }
            None => false,
        }
    }

    pub fn clear_ring_immunity(&mut self) {
        for a in &mut self.attachments {
            a.ring_immune = false;
        }
    }

    /// The `n` attachments nearest the hull center.
    ///
    /// Distance is measured in world space at unit hex size; equal distances keep
    /// insertion order.
    pub fn closest_to_center(&self, n: usize) -> Vec<Entity> {
        let mut sorted: Vec<&Attachment> = self.attachments.iter().collect();
        // Quantized key so float noise between equidistant cells cannot reorder them.
        sorted.sort_by_key(|a| (math::center_distance(a.cell) * 1000.0).round() as i64);
        sorted.into_iter().take(n).map(|a| a.entity).collect()
    }

    pub fn in_ring(&self, radius: u32) -> Vec<Entity> {
        self.attachments
            .iter()
            .filter(|a| math::hex_distance(a.cell, AxialCoord::ORIGIN) == radius)
            .map(|a| a.entity)
            .collect()
    }

    /// Re-derive every offset from the grid's current hex size.
    pub fn reposition_all(&mut self, grid: &HexGrid) {
        for a in &mut self.attachments {
            a.offset = grid.world_offset(a.cell);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    pub fn immune_count(&self) -> usize {
        self.attachments.iter().filter(|a| a.is_immune()).count()
    }
}
