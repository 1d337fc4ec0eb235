//! Time-bounded linear interpolation of a single parameter, optionally
//! chained to a follow-up stage after a wait delay.

use crate::motion::parameter::Parameter;
use crate::renderer::RenderError;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The follow-up stage of an animation chain.
///
/// A deferred stage is built lazily on first use so it can capture the
/// parameter state at hand-off time rather than at creation time. The
/// `Deferred` to `Immediate` transition happens exactly once.
pub enum NextStage {
    None,
    Immediate(Box<Animation>),
    Deferred(Box<dyn FnOnce() -> Animation + Send>),
}

/// One interpolation of one parameter from a start value to a finish value
/// over a fixed duration, with no easing.
///
/// After creation only the `done` flag and the one-time materialization of
/// the next stage ever change.
pub struct Animation {
    target: Arc<Parameter>,
    start_value: f32,
    finish_value: f32,
    duration: Duration,
    pub(crate) created_at: Instant,
    done: bool,
    next: NextStage,
    next_delay: Duration,
}

impl Animation {
    pub fn new(target: Arc<Parameter>, start: f32, finish: f32, duration: Duration) -> Self {
        Self {
            target,
            start_value: start,
            finish_value: finish,
            duration,
            created_at: Instant::now(),
            done: false,
            next: NextStage::None,
            next_delay: Duration::ZERO,
        }
    }

    /// Chain an already-built animation, started `delay` after this stage
    /// completes.
    pub fn followed_by(mut self, delay: Duration, next: Animation) -> Self {
        self.next = NextStage::Immediate(Box::new(next));
        self.next_delay = delay;
        self
    }

    /// Chain a lazily-built animation. The builder runs once, at hand-off
    /// time, so it sees the parameter state left behind by this stage.
    pub fn followed_by_deferred<F>(mut self, delay: Duration, builder: F) -> Self
    where
        F: FnOnce() -> Animation + Send + 'static,
    {
        self.next = NextStage::Deferred(Box::new(builder));
        self.next_delay = delay;
        self
    }

    pub fn target_id(&self) -> &str {
        &self.target.id
    }

    pub fn start_value(&self) -> f32 {
        self.start_value
    }

    pub fn finish_value(&self) -> f32 {
        self.finish_value
    }

    /// True only once this stage and its entire successor chain are done.
    /// A pending deferred stage counts as unfinished even after this stage
    /// completed, so the scheduler never reaps a chain early.
    pub fn is_finished(&self) -> bool {
        if !self.done {
            return false;
        }
        match &self.next {
            NextStage::None => true,
            NextStage::Deferred(_) => false,
            NextStage::Immediate(next) => next.is_finished(),
        }
    }

    /// Advance one tick at `now`.
    ///
    /// Once this stage is done and the chain delay has elapsed, the tick is
    /// delegated to the next stage (materializing it on first entry). Until
    /// then, past-duration ticks snap to the finish value and in-flight
    /// ticks interpolate linearly.
    pub fn update(&mut self, now: Instant) -> Result<(), RenderError> {
        if self.done
            && !matches!(self.next, NextStage::None)
            && now >= self.created_at + self.duration + self.next_delay
        {
            if matches!(self.next, NextStage::Deferred(_)) {
                if let NextStage::Deferred(builder) =
                    std::mem::replace(&mut self.next, NextStage::None)
                {
                    self.next = NextStage::Immediate(Box::new(builder()));
                }
            }
            if let NextStage::Immediate(next) = &mut self.next {
                return next.update(now);
            }
            return Ok(());
        }

        if now >= self.created_at + self.duration {
            self.done = true;
            return self.target.set_immediate(self.finish_value);
        }

        let t = (now - self.created_at).as_secs_f32() / self.duration.as_secs_f32();
        self.target
            .set_immediate(self.start_value * (1.0 - t) + self.finish_value * t)
    }
}
