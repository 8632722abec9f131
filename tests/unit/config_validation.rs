//! Unit tests for configuration validation.

use stepper_tracer::config::{validate_config, AxisConfig, MachineConfig, SpeedGroupConfig};
use stepper_tracer::error::{ConfigError, Error};
use stepper_tracer::SpeedPlanner;

fn machine() -> MachineConfig {
    let mut config = MachineConfig::default();
    for name in ["x", "y"] {
        config
            .axes
            .push(AxisConfig::new(name, 100.0, 200.0, 1000.0).with_jerk(5.0))
            .unwrap();
    }
    config
        .speed_groups
        .push(SpeedGroupConfig::new("xy", &[0, 1], 50.0))
        .unwrap();
    config
}

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    assert!(validate_config(&machine()).is_ok());
}

/// Test that a zero jerk allowance is accepted.
#[test]
fn test_zero_jerk_is_valid() {
    let mut config = machine();
    config.axes[0] = config.axes[0].clone().with_jerk(0.0);
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for a negative jerk allowance.
#[test]
fn test_negative_jerk_rejected() {
    let mut config = machine();
    config.axes[0] = config.axes[0].clone().with_jerk(-0.5);

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidMaxJerk(_)))
    ));
}

/// Test validation fails for a non-positive acceleration.
#[test]
fn test_zero_acceleration_rejected() {
    let mut config = machine();
    config.axes[1] = AxisConfig::new("y", 100.0, 200.0, 0.0);

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidMaxAcceleration(_)))
    ));
}

/// Test validation fails for a speed group without axes.
#[test]
fn test_empty_speed_group_rejected() {
    let mut config = machine();
    config
        .speed_groups
        .push(SpeedGroupConfig::new("none", &[], 10.0))
        .unwrap();

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::EmptySpeedGroup(_)))
    ));
}

/// Test validation fails for a speed group referencing a missing axis.
#[test]
fn test_speed_group_axis_out_of_range() {
    let mut config = machine();
    config
        .speed_groups
        .push(SpeedGroupConfig::new("z", &[2], 10.0))
        .unwrap();

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::SpeedGroupAxisOutOfRange { axis: 2, .. }))
    ));
}

/// Test validation fails for an unknown default speed group.
#[test]
fn test_unknown_default_speed_group() {
    let mut config = machine();
    config.tracer.default_speed_group = 3;

    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::UnknownDefaultSpeedGroup(3)))
    );
}

/// Test that an empty configuration is rejected.
#[test]
fn test_empty_config_is_invalid() {
    assert_eq!(
        validate_config(&MachineConfig::default()),
        Err(Error::Config(ConfigError::NoSpeedGroups))
    );
}

/// Test that a planner built for the wrong axis count is refused.
#[test]
fn test_axis_count_mismatch() {
    let result = SpeedPlanner::<3>::from_config(&machine());
    assert!(matches!(
        result,
        Err(ConfigError::AxisCountMismatch { expected: 3, found: 2 })
    ));
}
