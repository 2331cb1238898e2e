//! Tick-driven delayed tasks.
//!
//! `TaskQueue<T>` holds payloads that become due after a delay. The owner ticks it
//! with the frame (or fixed-step) delta and acts on whatever comes back. Dropping
//! the owner, or despawning the entity that carries it, cancels everything pending.
//!
//! ```text
//!   push_after(0.5, A)   push_after(1.0, B)
//!   tick(0.6) -> [A]
//!   tick(0.6) -> [B]
//! ```

use std::time::Duration;

use bevy::prelude::*;

#[derive(Debug, Clone)]
pub struct TaskQueue<T> {
    pending: Vec<(Timer, T)>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self { pending: Vec::new() }
    }
}

impl<T> TaskQueue<T> {
    /// Schedule `task` to become due `secs` from now. Negative delays count as zero.
    pub fn push_after(&mut self, secs: f32, task: T) {
        let timer = Timer::from_seconds(secs.max(0.0), TimerMode::Once);
        self.pending.push((timer, task));
    }

    /// Advance every timer and return the tasks that came due, in push order.
    pub fn tick(&mut self, delta: Duration) -> Vec<T> {
        let mut ready = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            let timer = &mut self.pending[i].0;
            timer.tick(delta);
            if timer.is_finished() {
                ready.push(self.pending.remove(i).1);
            } else {
                i += 1;
            }
        }
        ready
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
