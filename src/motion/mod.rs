//! Motion module for stepper-tracer.
//!
//! Provides movement descriptors, increment computation, the sub-movement
//! pre-computation pipeline and the step signature encoder.

mod descriptor;
mod increment;
mod signature;
mod sub_movement;

pub use descriptor::{MovementDescriptor, MovementHook, MovementRequest, ToolData, MAX_TOOLS};
pub use increment::{compute_increments, IncrementBounds};
pub use signature::{Signature, StepPattern, MAX_DEPTH, PULSE_COUNTS};
pub use sub_movement::{
    DistanceTrackers, SubMovement, SubMovementManager, LOOKAHEAD_CAPACITY, MAX_WINDOW_DISTANCE,
};
