//! Tick-driven animation scheduler.
//!
//! Owns the set of live animations and advances them once per tick.
//! Structural changes are double-buffered: `register` only appends to a
//! pending buffer, and finished animations are collected into a removal
//! buffer during the update pass. Both buffers are applied to the active set
//! only after the iteration, so registering from another thread mid-tick can
//! never corrupt the pass.

use crate::motion::animation::Animation;
use std::sync::Mutex;
use std::time::Instant;
use tracing::error;

#[derive(Default)]
struct Buffers {
    active: Vec<Animation>,
    pending: Vec<Animation>,
}

#[derive(Default)]
pub struct AnimationScheduler {
    buffers: Mutex<Buffers>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Buffers> {
        self.buffers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue an animation for activation at the end of the current tick.
    /// The active set itself is never touched here, so an animation is in at
    /// most one of the active and pending sets at any time.
    pub fn register(&self, animation: Animation) {
        self.lock().pending.push(animation);
    }

    /// Advance every active animation one tick, then merge the pending
    /// registrations into the active set and drop everything that finished.
    ///
    /// A failing update is logged and that animation dropped; the tick
    /// continues for the rest.
    pub fn advance(&self, now: Instant) {
        let mut buffers = self.lock();
        let mut finished: Vec<usize> = Vec::new();

        for (index, animation) in buffers.active.iter_mut().enumerate() {
            match animation.update(now) {
                Ok(()) => {
                    if animation.is_finished() {
                        finished.push(index);
                    }
                }
                Err(e) => {
                    error!(
                        "animation update failed on '{}': {} (dropping it)",
                        animation.target_id(),
                        e
                    );
                    finished.push(index);
                }
            }
        }

        // Merge first (appends leave the collected indices valid), then
        // remove in reverse index order.
        let pending = std::mem::take(&mut buffers.pending);
        buffers.active.extend(pending);
        for index in finished.into_iter().rev() {
            buffers.active.remove(index);
        }
    }

    pub fn active_count(&self) -> usize {
        self.lock().active.len()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }
}
