//! Unit tests for TOML configuration parsing.

use stepper_tracer::config::parse_config;
use stepper_tracer::error::{ConfigError, Error};

/// Test parsing a complete machine.
#[test]
fn test_parse_machine_config() {
    let toml_str = r#"
[tracer]
processing_steps = 31
position_report_period = 10
default_speed_group = 1

[[axes]]
name = "x"
steps_per_unit = 80.0
max_speed = 250.0
max_acceleration = 3000.0
max_jerk = 8.0

[[axes]]
name = "y"
steps_per_unit = 80.0
max_speed = 250.0
max_acceleration = 3000.0
max_jerk = 8.0
invert_direction = true

[[axes]]
name = "z"
steps_per_unit = 400.0
max_speed = 10.0
max_acceleration = 100.0

[[speed_groups]]
name = "xy"
axes = [0, 1]
speed = 120.0

[[speed_groups]]
name = "z"
axes = [2]
speed = 5.0
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.tracer.processing_steps.value(), 31);
    assert_eq!(config.tracer.position_report_period, 10);
    assert_eq!(config.tracer.default_speed_group, 1);

    assert_eq!(config.axis_names().collect::<Vec<_>>(), ["x", "y", "z"]);
    assert_eq!(config.axis_index("z"), Some(2));

    let y = config.axis("y").expect("Axis not found");
    assert_eq!(y.steps_per_unit, 80.0);
    assert_eq!(y.max_jerk.value(), 8.0);
    assert!(y.invert_direction);

    let z = config.axis("z").expect("Axis not found");
    assert_eq!(z.max_jerk.value(), 0.0);
    assert!(!z.invert_direction);

    let xy = config.speed_group("xy").expect("Speed group not found");
    assert!(xy.contains(0) && xy.contains(1) && !xy.contains(2));
    assert_eq!(xy.speed.value(), 120.0);
}

/// Test that the `[tracer]` table is optional.
#[test]
fn test_tracer_defaults() {
    let toml_str = r#"
[[axes]]
name = "x"
steps_per_unit = 100.0
max_speed = 100.0
max_acceleration = 500.0

[[speed_groups]]
name = "x"
axes = [0]
speed = 50.0
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");
    assert_eq!(config.tracer.processing_steps.value(), 7);
    assert_eq!(config.tracer.position_report_period, 5);
    assert_eq!(config.tracer.default_speed_group, 0);
}

/// Test that a window target of zero steps is rejected while parsing.
#[test]
fn test_zero_processing_steps_rejected() {
    let toml_str = r#"
[tracer]
processing_steps = 0

[[axes]]
name = "x"
steps_per_unit = 100.0
max_speed = 100.0
max_acceleration = 500.0

[[speed_groups]]
name = "x"
axes = [0]
speed = 50.0
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::ParseError(_)))
    ));
}

/// Test that a missing required axis field is a parse error.
#[test]
fn test_missing_axis_field_rejected() {
    let toml_str = r#"
[[axes]]
name = "x"
steps_per_unit = 100.0
max_speed = 100.0

[[speed_groups]]
name = "x"
axes = [0]
speed = 50.0
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::ParseError(_)))
    ));
}
