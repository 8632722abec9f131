//! Time functions of the tracer.
//!
//! A kinematics backend decides how long each sub-movement lasts. The tracer
//! loads it with the speed environment of the executing movement and asks
//! it for a duration per window; the window duration divided by its pulse
//! count becomes the timer period.

mod delay;
mod speed;

pub use delay::DelayKinematics;
pub use speed::SpeedKinematics;

use crate::motion::{DistanceTrackers, MovementDescriptor, SubMovement};
use crate::planner::JerkLink;

/// Duration given to a window in which no axis moves.
pub const IDLE_WINDOW_US: f32 = 100.0;

/// Pluggable time computation.
pub trait Kinematics<const N: usize> {
    /// Reset the backend before the first movement of a stream.
    fn initialise_tracing(&mut self);

    /// Called when a movement starts pre-processing.
    fn load_pre_process_data(&mut self, _movement: &MovementDescriptor<N>) {}

    /// Called when a movement starts executing.
    fn load_real_time_data(&mut self, movement: &MovementDescriptor<N>);

    /// Called when a successor links to the executing movement.
    fn load_real_time_jerk_data(&mut self, link: &JerkLink);

    /// Duration in µs of the first sub-movement of a stream.
    fn compute_time_for_first_sub_movement(
        &mut self,
        sub_movement: &SubMovement<N>,
        trackers: &DistanceTrackers,
    ) -> f32;

    /// Duration in µs of a sub-movement. `trackers` already exclude it.
    fn compute_time_for_sub_movement(&mut self, sub_movement: &SubMovement<N>, trackers: &DistanceTrackers)
        -> f32;

    /// Path speed at the end of the last computed sub-movement.
    fn current_speed(&self) -> f32;
}
