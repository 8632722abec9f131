//! Runtime axis constraints derived from the configuration.

use crate::error::ConfigError;
use crate::motion::Signature;

use super::axis::AxisConfig;
use super::machine::MachineConfig;

/// Per-axis limits used by the planners, in plain `f32` machine units.
///
/// These are computed once at initialization and used for all motion planning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisConstraints {
    /// Steps per unit.
    pub steps_per_unit: f32,

    /// Maximum speed in units per second.
    pub max_speed: f32,

    /// Maximum acceleration in units per second squared.
    pub max_acceleration: f32,

    /// Maximum speed change at a movement boundary.
    pub max_jerk: f32,

    /// Direction pin logic is inverted.
    pub invert_direction: bool,
}

impl AxisConstraints {
    /// Compute constraints from an axis configuration.
    pub fn from_config(config: &AxisConfig) -> Self {
        Self {
            steps_per_unit: config.steps_per_unit,
            max_speed: config.max_speed.value(),
            max_acceleration: config.max_acceleration.value(),
            max_jerk: config.max_jerk.value(),
            invert_direction: config.invert_direction,
        }
    }

    /// Maximum step rate in steps per second.
    #[inline]
    pub fn max_step_rate(&self) -> f32 {
        self.max_speed * self.steps_per_unit
    }
}

/// Fails the build for an axis count a [`Signature`] cannot address.
struct AxisCount<const N: usize>;

impl<const N: usize> AxisCount<N> {
    const SUPPORTED: () = assert!(N <= Signature::CAPACITY, "axis count exceeds Signature::CAPACITY");
}

/// Constraints of all `N` axes of a machine.
///
/// `N` is bounded by [`Signature::CAPACITY`]; larger tables do not compile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTable<const N: usize> {
    axes: [AxisConstraints; N],
}

impl<const N: usize> AxisTable<N> {
    /// Build a table from explicit constraints.
    pub const fn new(axes: [AxisConstraints; N]) -> Self {
        let () = AxisCount::<N>::SUPPORTED;
        Self { axes }
    }

    /// Build a table from a machine configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AxisCountMismatch` when the configuration does
    /// not declare exactly `N` axes.
    pub fn from_config(config: &MachineConfig) -> Result<Self, ConfigError> {
        if config.axes.len() != N {
            return Err(ConfigError::AxisCountMismatch {
                expected: N,
                found: config.axes.len(),
            });
        }

        let axes = core::array::from_fn(|i| AxisConstraints::from_config(&config.axes[i]));
        Ok(Self::new(axes))
    }

    /// Constraints of one axis.
    #[inline]
    pub fn axis(&self, index: usize) -> &AxisConstraints {
        &self.axes[index]
    }

    /// Iterate over the axes in index order.
    pub fn iter(&self) -> impl Iterator<Item = &AxisConstraints> {
        self.axes.iter()
    }

    /// Steps per unit of every axis.
    pub fn steps_per_unit(&self) -> [f32; N] {
        core::array::from_fn(|i| self.axes[i].steps_per_unit)
    }

    /// Maximum jerk of every axis.
    pub fn max_jerk(&self) -> [f32; N] {
        core::array::from_fn(|i| self.axes[i].max_jerk)
    }

    /// Convert a position in units to the nearest step position.
    pub fn to_steps(&self, position: &[f32; N]) -> [i32; N] {
        core::array::from_fn(|i| libm::roundf(position[i] * self.axes[i].steps_per_unit) as i32)
    }

    /// Convert a step position to units.
    pub fn to_units(&self, steps: &[i32; N]) -> [f32; N] {
        core::array::from_fn(|i| steps[i] as f32 / self.axes[i].steps_per_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AxisConfig;

    #[test]
    fn test_axis_count_mismatch() {
        let mut config = MachineConfig::default();
        config.axes.push(AxisConfig::new("x", 100.0, 200.0, 1000.0)).unwrap();

        let err = AxisTable::<3>::from_config(&config).unwrap_err();
        assert_eq!(err, ConfigError::AxisCountMismatch { expected: 3, found: 1 });
    }

    #[test]
    fn test_step_conversion() {
        let mut config = MachineConfig::default();
        config.axes.push(AxisConfig::new("x", 80.0, 200.0, 1000.0)).unwrap();
        config.axes.push(AxisConfig::new("e", 93.0, 50.0, 1000.0)).unwrap();

        let table = AxisTable::<2>::from_config(&config).unwrap();
        assert_eq!(table.to_steps(&[1.0, 1.0]), [80, 93]);
        assert_eq!(table.to_units(&[160, -93]), [2.0, -1.0]);
        assert!((table.axis(0).max_step_rate() - 16_000.0).abs() < 0.01);
    }
}
