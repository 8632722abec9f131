//! Movement queue and trajectory tracer.
//!
//! The tracer turns queued movements into step pulses. Movements are
//! planned in the foreground, cut into sub-movements ahead of time and
//! emitted by the stepper interrupt one window at a time.

mod engine;
mod isr;
mod state;
mod tools;

pub use engine::TrajectoryTracer;
pub use state::TracerState;

/// Movements the queue holds.
pub const MOVEMENT_QUEUE_CAPACITY: usize = 8;

/// Outcome of a successful enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Enqueued {
    /// The movement was queued under this id.
    Queued(u32),
    /// The movement produces no step and was dropped.
    NullMovement,
}
