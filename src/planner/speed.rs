//! Regulation speed projection and speed environment.

use heapless::{String, Vec};

use crate::config::{AxisTable, MachineConfig, MAX_SPEED_GROUPS};
use crate::error::{ConfigError, MotionError};
use crate::motion::Signature;

/// Microseconds per second, the time unit of every delay.
pub const MICROS_PER_SECOND: f32 = 1_000_000.0;

/// Speed-related constants of one movement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpeedEnvironment {
    /// Step delay numerator of the acceleration ramp, in µs.
    ///
    /// The `n`-th step from rest lasts `delay_numerator / sqrt(n)`.
    pub delay_numerator: f32,

    /// Step delay of the regulation axis at regulation speed, in µs.
    pub regulation_delay: f32,

    /// Regulation axis steps per unit of path.
    pub distance_ratio: f32,

    /// Target steps per sub-movement window.
    pub processing_steps: u8,

    /// Feed rate along the path, in units per second.
    pub regulation_speed: f32,

    /// Acceleration along the path that no axis exceeds.
    pub acceleration: f32,

    /// Axis with the most steps.
    pub regulation_axis: u8,
}

/// A runtime speed group.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedGroup {
    /// Group name.
    pub name: String<32>,
    /// Axes of the group.
    pub axes: Signature,
    /// Feed rate in units per second.
    pub speed: f32,
}

/// Projects speed group feed rates onto movements.
#[derive(Debug, Clone)]
pub struct SpeedPlanner<const N: usize> {
    axes: AxisTable<N>,
    groups: Vec<SpeedGroup, MAX_SPEED_GROUPS>,
    active: u8,
}

impl<const N: usize> SpeedPlanner<N> {
    /// Create a planner without speed groups.
    pub fn new(axes: AxisTable<N>) -> Self {
        Self {
            axes,
            groups: Vec::new(),
            active: 0,
        }
    }

    /// Create a planner from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AxisCountMismatch` when the configuration does
    /// not declare `N` axes.
    pub fn from_config(config: &MachineConfig) -> Result<Self, ConfigError> {
        let mut planner = Self::new(AxisTable::from_config(config)?);
        for group in config.speed_groups.iter() {
            let mut axes = Signature::EMPTY;
            for &axis in group.axes.iter().filter(|&&a| usize::from(a) < N) {
                axes.set(usize::from(axis), true);
            }
            planner.add_speed_group(group.name.as_str(), axes, group.speed.value())?;
        }
        planner.active = config.tracer.default_speed_group;
        Ok(planner)
    }

    /// Append a speed group and return its index.
    ///
    /// # Errors
    ///
    /// Returns an error when the group is empty, has a non-positive speed,
    /// or no slot is left.
    pub fn add_speed_group(&mut self, name: &str, axes: Signature, speed: f32) -> Result<u8, ConfigError> {
        let name = String::try_from(name).unwrap_or_default();
        if (axes & Signature::first(N)).is_empty() {
            return Err(ConfigError::EmptySpeedGroup(name));
        }
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ConfigError::InvalidGroupSpeed(speed));
        }
        let index = self.groups.len() as u8;
        self.groups
            .push(SpeedGroup { name, axes, speed })
            .map_err(|_| ConfigError::TooManySpeedGroups)?;
        Ok(index)
    }

    /// Axis constraints used by the planner.
    pub fn axes(&self) -> &AxisTable<N> {
        &self.axes
    }

    /// Select the speed group used for the next movements.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::UnknownSpeedGroup` for an out-of-range index.
    pub fn set_speed_group(&mut self, group: u8) -> Result<(), MotionError> {
        if usize::from(group) >= self.groups.len() {
            return Err(MotionError::UnknownSpeedGroup(group));
        }
        self.active = group;
        Ok(())
    }

    /// Change the feed rate of a speed group.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown group or a speed that is not finite
    /// and positive.
    pub fn set_speed_for_group(&mut self, group: u8, speed: f32) -> Result<(), MotionError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(MotionError::InvalidSpeed(speed));
        }
        let slot = self
            .groups
            .get_mut(usize::from(group))
            .ok_or(MotionError::UnknownSpeedGroup(group))?;
        slot.speed = speed;
        Ok(())
    }

    /// Index of the selected speed group.
    pub fn speed_group(&self) -> u8 {
        self.active
    }

    /// Feed rate of a speed group.
    pub fn speed_for_group(&self, group: u8) -> Option<f32> {
        self.groups.get(usize::from(group)).map(|g| g.speed)
    }

    /// All speed groups.
    pub fn speed_groups(&self) -> &[SpeedGroup] {
        &self.groups
    }

    /// Regulation speed of a straight movement.
    ///
    /// `distances` are the per-axis distances and `euclidean` their norm.
    pub fn compute_regulation_speed(&self, distances: &[f32; N], euclidean: f32) -> Result<f32, MotionError> {
        let peaks: [f32; N] = core::array::from_fn(|i| {
            if euclidean > 0.0 {
                distances[i].abs() / euclidean
            } else {
                0.0
            }
        });
        self.compute_regulation_speed_with_peaks(distances, euclidean, &peaks)
    }

    /// Regulation speed of a movement whose axes reach at most `peaks`
    /// times the path speed.
    ///
    /// The selected group's feed rate is projected onto the movement; if the
    /// group has no moving axis the first group that has one is used. The
    /// result is then scaled down uniformly until no axis exceeds its
    /// maximum speed.
    pub fn compute_regulation_speed_with_peaks(
        &self,
        distances: &[f32; N],
        euclidean: f32,
        peaks: &[f32; N],
    ) -> Result<f32, MotionError> {
        let coverage = |group: &SpeedGroup| -> f32 {
            group
                .axes
                .axes()
                .filter(|&a| a < N)
                .map(|a| distances[a] * distances[a])
                .sum()
        };

        let active = usize::from(self.active);
        let (group, covered) = match self.groups.get(active).map(|g| (g, coverage(g))) {
            Some((group, covered)) if covered > 0.0 => (group, covered),
            _ => {
                let fallback = self
                    .groups
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != active)
                    .map(|(_, g)| (g, coverage(g)))
                    .find(|(_, covered)| *covered > 0.0);
                match fallback {
                    Some(found) => {
                        warn!("speed group {} has no moving axis, using {}", self.active, found.0.name.as_str());
                        found
                    }
                    None => {
                        error!("no speed group covers the movement");
                        return Err(MotionError::NoSpeedGroup);
                    }
                }
            }
        };

        let mut speed = group.speed * euclidean / libm::sqrtf(covered);

        let mut ratio = 1.0f32;
        for (axis, peak) in self.axes.iter().zip(peaks.iter()) {
            let axis_speed = speed * peak;
            if axis_speed > axis.max_speed {
                ratio = ratio.min(axis.max_speed / axis_speed);
            }
        }
        speed *= ratio;

        if !speed.is_finite() || speed <= 0.0 {
            return Err(MotionError::InvalidSpeed(speed));
        }

        debug!("regulation speed {} (clamp ratio {})", speed, ratio);
        Ok(speed)
    }

    /// Speed environment of a movement regulated on `axis`.
    ///
    /// `distance_coefficient` is the distance the axis travels per unit of
    /// path.
    pub fn pre_set_speed_axis(
        &self,
        axis: usize,
        distance_coefficient: f32,
        regulation_speed: f32,
        processing_steps: u8,
    ) -> SpeedEnvironment {
        let constraints = self.axes.axis(axis);
        let steps = constraints.steps_per_unit;
        let acceleration = constraints.max_acceleration;

        SpeedEnvironment {
            delay_numerator: MICROS_PER_SECOND / libm::sqrtf(2.0 * steps * acceleration),
            regulation_delay: MICROS_PER_SECOND / (steps * distance_coefficient * regulation_speed),
            distance_ratio: steps * distance_coefficient,
            processing_steps,
            regulation_speed,
            acceleration: acceleration / distance_coefficient,
            regulation_axis: axis as u8,
        }
    }

    /// Full speed environment of a movement.
    ///
    /// The regulation axis is the axis with the most steps. The path
    /// acceleration is the largest one every axis can follow.
    pub fn plan(
        &self,
        distances: &[f32; N],
        euclidean: f32,
        peaks: &[f32; N],
        processing_steps: u8,
    ) -> Result<SpeedEnvironment, MotionError> {
        let speed = self.compute_regulation_speed_with_peaks(distances, euclidean, peaks)?;

        let mut axis = 0;
        let mut most_steps = 0.0f32;
        for (i, constraints) in self.axes.iter().enumerate() {
            let steps = peaks[i] * constraints.steps_per_unit;
            if steps > most_steps {
                most_steps = steps;
                axis = i;
            }
        }
        if most_steps <= 0.0 {
            return Err(MotionError::InvalidSpeed(speed));
        }

        let mut environment = self.pre_set_speed_axis(axis, peaks[axis], speed, processing_steps);

        environment.acceleration = self
            .axes
            .iter()
            .zip(peaks.iter())
            .filter(|(_, &peak)| peak > 0.0)
            .map(|(constraints, &peak)| constraints.max_acceleration / peak)
            .fold(f32::INFINITY, f32::min);
        environment.delay_numerator =
            MICROS_PER_SECOND / libm::sqrtf(2.0 * environment.acceleration * environment.distance_ratio);

        Ok(environment)
    }
}
