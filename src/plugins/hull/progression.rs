//! Hull leveling state machine.
//!
//! ```text
//!   count >= configs[level-1].threshold && level < max  -> level + 1
//!   level > 1 && count < configs[level-2].threshold     -> level - 1
//! ```
//! At most one step per check. `configs[L-1].immune_count` is applied when the
//! hull enters level `L`. Every step rescales the grid by `expansion` and
//! re-derives attachment offsets.
//!
//! Two immunity rules exist and are kept apart, selected by [`ImmunityPolicy`]:
//! - level threshold: the N attachments closest to the center become immune on
//!   each transition;
//! - rings: every fully occupied ring 1..=3, contiguous from the center, is immune.
//!
//! Each rule owns its own flag on the attachment. Under `Both` a ring that breaks
//! drops only its ring immunity.

use bevy::prelude::*;
use serde::Deserialize;

use crate::common::error::{ShipError, ShipResult};
use crate::hex::HexGrid;

use super::registry::AttachmentRegistry;

/// Highest ring radius the ring rule looks at.
pub const RING_IMMUNITY_MAX_RADIUS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LevelConfig {
    /// Attachment count needed to leave this level upward.
    pub threshold: usize,
    /// Attachments made immune on entering this level.
    pub immune_count: usize,
}

impl LevelConfig {
    pub const fn new(threshold: usize, immune_count: usize) -> Self {
        Self {
            threshold,
            immune_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImmunityPolicy {
    /// Closest-to-center attachments on each level transition.
    LevelThreshold,
    /// Fully occupied inner rings, recomputed from scratch after every check.
    Rings,
    /// Level rule on transitions, ring rule added on top after every check.
    #[default]
    Both,
}

impl ImmunityPolicy {
    #[inline]
    fn uses_levels(self) -> bool {
        matches!(self, Self::LevelThreshold | Self::Both)
    }

    #[inline]
    fn uses_rings(self) -> bool {
        matches!(self, Self::Rings | Self::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    pub from: usize,
    pub to: usize,
}

impl LevelChange {
    #[inline]
    pub fn is_up(self) -> bool {
        self.to > self.from
    }
}

#[derive(Component, Debug, Clone)]
pub struct HullProgression {
    level: usize,
    configs: Vec<LevelConfig>,
    policy: ImmunityPolicy,
    expansion: f32,
    ring_tier: u32,
}

impl HullProgression {
    /// Thresholds must strictly increase. An empty table is allowed and leaves
    /// the hull at level 1 for good.
    pub fn new(
        configs: Vec<LevelConfig>,
        policy: ImmunityPolicy,
        expansion: f32,
    ) -> ShipResult<Self> {
        for (i, pair) in configs.windows(2).enumerate() {
            if pair[1].threshold <= pair[0].threshold {
                return Err(ShipError::NonIncreasingThreshold {
                    level: i + 2,
                    threshold: pair[1].threshold,
                    previous: pair[0].threshold,
                });
            }
        }

        Ok(Self {
            level: 1,
            configs,
            policy,
            expansion,
            ring_tier: 0,
        })
    }

    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    #[inline]
    pub fn max_level(&self) -> usize {
        self.configs.len().max(1)
    }

    /// Highest fully occupied ring, contiguous from the center (0..=3).
    #[inline]
    pub fn ring_tier(&self) -> u32 {
        self.ring_tier
    }

    #[inline]
    pub fn policy(&self) -> ImmunityPolicy {
        self.policy
    }

    /// Evaluate the attachment count once and step the level by at most one.
    pub fn check_for_level_change(
        &mut self,
        grid: &mut HexGrid,
        registry: &mut AttachmentRegistry,
    ) -> Option<LevelChange> {
        let count = registry.len();
        let from = self.level;

        let up = self.level < self.max_level()
            && self
                .configs
                .get(self.level - 1)
                .is_some_and(|c| count >= c.threshold);
        let down = !up && self.level > 1 && count < self.configs[self.level - 2].threshold;

        if up {
            self.level_up(grid, registry);
        } else if down {
            self.level_down(grid, registry);
        }

        self.apply_ring_rule(grid, registry);

        (self.level != from).then_some(LevelChange {
            from,
            to: self.level,
        })
    }

    fn level_up(&mut self, grid: &mut HexGrid, registry: &mut AttachmentRegistry) {
        self.level += 1;

        if self.policy.uses_levels() {
            self.mark_closest_immune(registry);
        }

        grid.resize(self.expansion);
        registry.reposition_all(grid);
    }

    fn level_down(&mut self, grid: &mut HexGrid, registry: &mut AttachmentRegistry) {
        self.level -= 1;

        if self.policy.uses_levels() {
            registry.clear_immunity();
            self.mark_closest_immune(registry);
        }

        grid.resize(-self.expansion);
        registry.reposition_all(grid);
    }

    fn mark_closest_immune(&self, registry: &mut AttachmentRegistry) {
        let n = self
            .configs
            .get(self.level - 1)
            .map_or(0, |c| c.immune_count);
        for e in registry.closest_to_center(n) {
            registry.set_immune(e, true);
        }
    }

    fn apply_ring_rule(&mut self, grid: &HexGrid, registry: &mut AttachmentRegistry) {
        self.ring_tier = (1..=RING_IMMUNITY_MAX_RADIUS)
            .take_while(|r| grid.is_ring_fully_occupied(*r))
            .last()
            .unwrap_or(0);

        if !self.policy.uses_rings() {
            return;
        }
        // Ring immunity is its own flag, so level-granted immunity survives this.
        registry.clear_ring_immunity();

        for radius in 1..=self.ring_tier {
            for e in registry.in_ring(radius) {
                registry.set_ring_immune(e, true);
            }
        }
    }
}
