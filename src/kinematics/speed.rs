//! Speed-integrating kinematics.

use libm::sqrtf;

use crate::motion::{DistanceTrackers, MovementDescriptor, SubMovement};
use crate::planner::{JerkLink, MICROS_PER_SECOND};

use super::{Kinematics, IDLE_WINDOW_US};

/// Tracks the path speed and integrates it over each sub-movement.
///
/// At the end of a window the speed is the lowest of:
/// - the regulation speed,
/// - what acceleration allows from the current speed,
/// - what still allows braking to the exit speed at the end of the movement,
/// - what still allows stopping at the end of the queued motion.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeedKinematics {
    speed: f32,
    regulation_speed: f32,
    acceleration: f32,
    exit_speed: f32,
}

impl SpeedKinematics {
    /// Create a backend at rest.
    pub const fn new() -> Self {
        Self {
            speed: 0.0,
            regulation_speed: 0.0,
            acceleration: 0.0,
            exit_speed: 0.0,
        }
    }

    fn integrate(&mut self, length: f32, trackers: &DistanceTrackers) -> f32 {
        if length <= 0.0 || self.acceleration <= 0.0 {
            return IDLE_WINDOW_US;
        }

        let a2 = 2.0 * self.acceleration;
        let next = self
            .regulation_speed
            .min(sqrtf(self.speed * self.speed + a2 * length))
            .min(sqrtf(self.exit_speed * self.exit_speed + a2 * trackers.jerk_distance))
            .min(sqrtf(a2 * trackers.end_distance));

        // Accelerating then braking within the window bounds the average
        let average = (0.5 * (self.speed + next)).max(0.5 * sqrtf(self.acceleration * length));

        self.speed = next;
        MICROS_PER_SECOND * length / average
    }
}

impl<const N: usize> Kinematics<N> for SpeedKinematics {
    fn initialise_tracing(&mut self) {
        self.speed = 0.0;
    }

    fn load_real_time_data(&mut self, movement: &MovementDescriptor<N>) {
        self.regulation_speed = movement.speed.regulation_speed;
        self.acceleration = movement.speed.acceleration;
        self.exit_speed = movement.exit_speed;
    }

    fn load_real_time_jerk_data(&mut self, link: &JerkLink) {
        self.exit_speed = link.junction_speed;
    }

    fn compute_time_for_first_sub_movement(
        &mut self,
        sub_movement: &SubMovement<N>,
        trackers: &DistanceTrackers,
    ) -> f32 {
        self.speed = 0.0;
        self.integrate(sub_movement.path_length, trackers)
    }

    fn compute_time_for_sub_movement(&mut self, sub_movement: &SubMovement<N>, trackers: &DistanceTrackers) -> f32 {
        self.integrate(sub_movement.path_length, trackers)
    }

    fn current_speed(&self) -> f32 {
        self.speed
    }
}
