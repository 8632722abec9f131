//! Step-delay kinematics.
//!
//! Works on the regulation axis step delay instead of the path speed. On a
//! constant acceleration ramp the `n`-th step from rest lasts
//! `delay_numerator / sqrt(n)`, so the ramp is tracked as a step index:
//! accelerating adds the steps travelled, braking caps the index by the
//! steps left.

use libm::sqrtf;

use crate::motion::{DistanceTrackers, MovementDescriptor, SubMovement};
use crate::planner::{JerkLink, MICROS_PER_SECOND};

use super::{Kinematics, IDLE_WINDOW_US};

/// Delay-based time computation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelayKinematics {
    index: f32,
    delay_numerator: f32,
    regulation_delay: f32,
    distance_ratio: f32,
    regulation_index: f32,
    exit_index: f32,
}

impl DelayKinematics {
    /// Create a backend at rest.
    pub const fn new() -> Self {
        Self {
            index: 0.0,
            delay_numerator: 0.0,
            regulation_delay: 0.0,
            distance_ratio: 0.0,
            regulation_index: 0.0,
            exit_index: 0.0,
        }
    }

    /// Ramp index reached at path speed `speed`.
    fn index_for(&self, speed: f32) -> f32 {
        let rate = self.delay_numerator * speed * self.distance_ratio / MICROS_PER_SECOND;
        rate * rate
    }

    fn speed(&self) -> f32 {
        if self.index <= 0.0 || self.delay_numerator <= 0.0 || self.distance_ratio <= 0.0 {
            return 0.0;
        }
        MICROS_PER_SECOND * sqrtf(self.index) / (self.delay_numerator * self.distance_ratio)
    }

    fn advance(&mut self, length: f32, trackers: &DistanceTrackers) -> f32 {
        let steps = length * self.distance_ratio;
        if steps <= 0.0 || self.delay_numerator <= 0.0 {
            return IDLE_WINDOW_US;
        }

        let previous = self.index;
        self.index = (previous + steps)
            .min(trackers.end_distance * self.distance_ratio)
            .min(self.exit_index + trackers.jerk_distance * self.distance_ratio)
            .min(self.regulation_index)
            .max(0.0);

        let middle = (0.5 * (previous + self.index)).max(1.0);
        let delay = (self.delay_numerator / sqrtf(middle)).max(self.regulation_delay);
        delay * steps
    }
}

impl<const N: usize> Kinematics<N> for DelayKinematics {
    fn initialise_tracing(&mut self) {
        self.index = 0.0;
    }

    fn load_real_time_data(&mut self, movement: &MovementDescriptor<N>) {
        let speed = self.speed();
        let environment = &movement.speed;

        self.delay_numerator = environment.delay_numerator;
        self.regulation_delay = environment.regulation_delay;
        self.distance_ratio = environment.distance_ratio;
        self.regulation_index = self.index_for(environment.regulation_speed);
        self.exit_index = self.index_for(movement.exit_speed);

        // Keep the path speed across the boundary
        self.index = self.index_for(speed);
    }

    fn load_real_time_jerk_data(&mut self, link: &JerkLink) {
        self.exit_index = self.index_for(link.junction_speed);
    }

    fn compute_time_for_first_sub_movement(
        &mut self,
        sub_movement: &SubMovement<N>,
        trackers: &DistanceTrackers,
    ) -> f32 {
        self.index = 0.0;
        self.advance(sub_movement.path_length, trackers)
    }

    fn compute_time_for_sub_movement(&mut self, sub_movement: &SubMovement<N>, trackers: &DistanceTrackers) -> f32 {
        self.advance(sub_movement.path_length, trackers)
    }

    fn current_speed(&self) -> f32 {
        self.speed()
    }
}
