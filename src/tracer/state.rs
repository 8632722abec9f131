//! Tracer lifecycle states.

/// Lifecycle of the movement stream.
///
/// ```text
/// Stopped --enqueue--> Running --queue exhausted--> StopProgrammed
///    ^                    ^                             |     |
///    |                    +--------late enqueue---------+     |
///    |                                                        v
///    +-------------final pulse------------------ FinalSubMovement
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TracerState {
    /// Timer off, nothing queued.
    #[default]
    Stopped,
    /// Movements are being traced.
    Running,
    /// The queue ran dry, the lookahead is draining.
    StopProgrammed,
    /// The last window is being emitted.
    FinalSubMovement,
}

impl TracerState {
    /// Check whether the stepper interrupt is live.
    #[inline]
    pub fn is_active(self) -> bool {
        self != TracerState::Stopped
    }
}

/// Handler run by the next stepper interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Handler {
    /// Activate the prepared window and compute the next one.
    #[default]
    Prepare,
    /// Emit one pulse of the active window.
    Finish,
}
