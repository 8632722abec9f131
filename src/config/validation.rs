//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{AxisConfig, MachineConfig, SpeedGroupConfig};

/// Validate a machine configuration.
///
/// Checks:
/// - Axis limits are positive (jerk may be zero)
/// - At least one speed group exists
/// - Speed groups are non-empty, reference existing axes, and have a positive speed
/// - The default speed group exists
pub fn validate_config(config: &MachineConfig) -> Result<()> {
    for axis in config.axes.iter() {
        validate_axis(axis)?;
    }

    if config.speed_groups.is_empty() {
        return Err(Error::Config(ConfigError::NoSpeedGroups));
    }

    for group in config.speed_groups.iter() {
        validate_speed_group(group, config.axes.len())?;
    }

    let default_group = config.tracer.default_speed_group;
    if usize::from(default_group) >= config.speed_groups.len() {
        return Err(Error::Config(ConfigError::UnknownDefaultSpeedGroup(default_group)));
    }

    Ok(())
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn validate_axis(axis: &AxisConfig) -> Result<()> {
    if !positive(axis.steps_per_unit) {
        return Err(Error::Config(ConfigError::InvalidStepsPerUnit(axis.steps_per_unit)));
    }

    if !positive(axis.max_speed.0) {
        return Err(Error::Config(ConfigError::InvalidMaxSpeed(axis.max_speed.0)));
    }

    if !positive(axis.max_acceleration.0) {
        return Err(Error::Config(ConfigError::InvalidMaxAcceleration(
            axis.max_acceleration.0,
        )));
    }

    if !axis.max_jerk.0.is_finite() || axis.max_jerk.0 < 0.0 {
        return Err(Error::Config(ConfigError::InvalidMaxJerk(axis.max_jerk.0)));
    }

    Ok(())
}

fn validate_speed_group(group: &SpeedGroupConfig, axis_count: usize) -> Result<()> {
    if group.axes.is_empty() {
        return Err(Error::Config(ConfigError::EmptySpeedGroup(group.name.clone())));
    }

    if let Some(&axis) = group.axes.iter().find(|&&a| usize::from(a) >= axis_count) {
        return Err(Error::Config(ConfigError::SpeedGroupAxisOutOfRange {
            group: group.name.clone(),
            axis,
        }));
    }

    if !positive(group.speed.0) {
        return Err(Error::Config(ConfigError::InvalidGroupSpeed(group.speed.0)));
    }

    Ok(())
}
