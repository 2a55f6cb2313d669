//! Deferred one-shot scheduling

use std::time::Duration;

use crate::RetryTicket;

/// Work the facade wants executed later from the control thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredAction {
    /// Re-attempt a play transition after the engine had time to release
    /// its tuner.
    RetryPlay(RetryTicket),
    /// Enter standby shortly after startup, per startup policy.
    EnterStandby,
}

/// The event-loop timer primitive.
///
/// The facade never blocks; everything deferred goes through here as a
/// one-shot. The event-loop owner arms a timer and, when it fires, feeds the
/// action back through `Navigation::run_deferred` on the control thread.
/// Scheduling a new retry while one is pending logically replaces it; the
/// facade enforces this with the generation carried by [`RetryTicket`], so
/// the scheduler itself may keep stale timers armed.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, action: DeferredAction);
}
